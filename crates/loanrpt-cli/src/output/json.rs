use loanrpt_core::error::ReportError;
use loanrpt_core::model::Table;

pub fn print(table: &Table) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(table)?;
    println!("{json}");
    Ok(())
}
