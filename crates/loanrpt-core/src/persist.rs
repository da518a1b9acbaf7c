//! Persistence collaborator: raw documents and reconstructed rows on disk.

use crate::error::ReportError;
use crate::model::Row;
use std::fs;
use std::io;
use std::path::Path;

pub trait Persistence {
    fn ensure_directory(&self, dir: &Path) -> Result<(), ReportError>;
    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), ReportError>;
    fn write_rows(&self, path: &Path, rows: &[Row]) -> Result<(), ReportError>;
}

/// Writes to the local filesystem, creating parent directories as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPersistence;

fn write_failure(path: &Path) -> impl FnOnce(io::Error) -> ReportError + '_ {
    move |source| ReportError::WriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(windows)]
fn line_terminator() -> csv::Terminator {
    csv::Terminator::CRLF
}

#[cfg(not(windows))]
fn line_terminator() -> csv::Terminator {
    csv::Terminator::Any(b'\n')
}

/// Write rows as CSV with the platform line terminator. Rows may differ in
/// width; cells holding separators, quotes or newlines are quoted.
pub fn write_csv<W: io::Write>(out: W, rows: &[Row]) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(line_terminator())
        .from_writer(out);
    for row in rows {
        writer.write_record(row).map_err(io::Error::from)?;
    }
    writer.flush()
}

impl FsPersistence {
    fn ensure_parent(&self, path: &Path) -> Result<(), ReportError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.ensure_directory(parent),
            _ => Ok(()),
        }
    }
}

impl Persistence for FsPersistence {
    fn ensure_directory(&self, dir: &Path) -> Result<(), ReportError> {
        fs::create_dir_all(dir).map_err(write_failure(dir))
    }

    fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<(), ReportError> {
        self.ensure_parent(path)?;
        fs::write(path, bytes).map_err(write_failure(path))?;
        log::info!("wrote {} byte(s) to {}", bytes.len(), path.display());
        Ok(())
    }

    fn write_rows(&self, path: &Path, rows: &[Row]) -> Result<(), ReportError> {
        self.ensure_parent(path)?;
        let file = fs::File::create(path).map_err(write_failure(path))?;
        write_csv(file, rows).map_err(write_failure(path))?;
        log::info!("wrote {} row(s) to {}", rows.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_write_rows_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/2024/new_loans.csv");

        FsPersistence
            .write_rows(
                &path,
                &[row(&["Loan #", "Name"]), row(&["1234", "Smith, John"]), row(&["", ""])],
            )
            .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let expected = if cfg!(windows) {
            "Loan #,Name\r\n1234,\"Smith, John\"\r\n,\r\n"
        } else {
            "Loan #,Name\n1234,\"Smith, John\"\n,\n"
        };
        assert_eq!(written, expected);
    }

    #[test]
    fn test_multiline_label_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");

        FsPersistence
            .write_rows(&path, &[row(&["Report Totals\nAll Investors", ""])])
            .unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], "Report Totals\nAll Investors");
    }

    #[test]
    fn test_write_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf/report.pdf");

        FsPersistence.write_bytes(&path, b"%PDF-1.4").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_unwritable_path_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        // A regular file stands where a directory is needed.
        let err = FsPersistence
            .write_rows(&blocker.join("out.csv"), &[row(&["a"])])
            .unwrap_err();

        match err {
            ReportError::WriteFailure { path, .. } => assert_eq!(path, blocker),
            other => panic!("expected WriteFailure, got {other:?}"),
        }
    }
}
