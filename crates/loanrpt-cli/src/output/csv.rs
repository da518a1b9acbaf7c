use loanrpt_core::error::ReportError;
use loanrpt_core::model::Table;
use loanrpt_core::persist::write_csv;

pub fn print(table: &Table) -> Result<(), ReportError> {
    write_csv(std::io::stdout().lock(), &table.cell_rows())?;
    Ok(())
}
