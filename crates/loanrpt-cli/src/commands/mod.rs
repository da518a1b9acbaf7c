pub mod aggregate;
pub mod convert;
pub mod fetch;
pub mod layouts;

use loanrpt_core::error::ReportError;
use loanrpt_core::layout::builtin;
use loanrpt_core::layout::schema::LayoutProfile;
use std::path::PathBuf;

/// Resolve `--preset` / `--layout` into a validated layout.
pub fn resolve_layout(
    preset: Option<String>,
    layout_file: Option<PathBuf>,
) -> Result<LayoutProfile, ReportError> {
    let layout = match (preset, layout_file) {
        (_, Some(path)) => loanrpt_core::layout::load_layout(&path)?,
        (Some(name), None) => builtin::load_preset(&name)?,
        (None, None) => {
            return Err(ReportError::LayoutInvalid(format!(
                "no layout specified; use --preset ({}) or --layout FILE",
                builtin::PRESETS.join(", ")
            )))
        }
    };
    log::debug!("using layout '{}' v{}", layout.name, layout.version);
    Ok(layout)
}
