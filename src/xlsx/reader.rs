use crate::error::{AnonymizeError, Result};
use crate::table::{Cell, Table};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// A worksheet read back as a table
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub table: Table,
}

/// Read the first worksheet of a workbook; its first row is the header.
///
/// Works for any format calamine opens (xlsx, xlsm, xls, ods).
pub fn read_first_sheet(path: &Path) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path)?;
    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| AnonymizeError::EmptyWorkbook(path.display().to_string()))?;
    let range = workbook.worksheet_range(&name)?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row.iter().map(|cell| data_to_cell(cell).to_string()).collect(),
        None => Vec::new(),
    };
    let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(data_to_cell).collect()).collect();

    log::debug!("Read {} rows from sheet '{}'", rows.len(), name);
    Ok(Sheet {
        name,
        table: Table::new(headers).with_rows(rows),
    })
}

/// Convert a calamine value. Dates keep their serial number so they round-trip as numbers.
fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::write_table_to_xlsx;

    #[test]
    fn test_sheet_round_trip_keeps_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.xlsx");

        let table = Table::new(vec!["Nome completo".into(), "Tarefa 1".into(), "Aprovado".into()])
            .with_rows(vec![
                vec![Cell::Text("Ana Silva".into()), Cell::Number(9.25), Cell::Bool(true)],
                vec![Cell::Text("Bruno Costa".into()), Cell::Empty, Cell::Bool(false)],
            ]);
        write_table_to_xlsx(&table, Some("Notas"), &path).unwrap();

        let sheet = read_first_sheet(&path).unwrap();
        assert_eq!(sheet.name, "Notas");
        assert_eq!(sheet.table.headers, table.headers);
        assert_eq!(sheet.table.cell(0, 1), Some(&Cell::Number(9.25)));
        assert_eq!(sheet.table.cell(0, 2), Some(&Cell::Bool(true)));
        assert_eq!(sheet.table.cell(1, 0), Some(&Cell::Text("Bruno Costa".into())));
        assert_eq!(sheet.table.cell(1, 1), Some(&Cell::Empty));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_first_sheet(Path::new("/nonexistent/grades.xlsx")).is_err());
    }
}
