use crate::error::Result;
use crate::schema::{header_matches, GradeColumn};
use crate::table::{Cell, Table};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use std::path::Path;

/// Write a table to a single-sheet Excel workbook
pub fn write_table_to_xlsx(table: &Table, sheet_name: Option<&str>, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    write_table_sheet(worksheet, table)?;
    if let Some(name) = sheet_name {
        worksheet.set_name(name)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Write headers and cells to a worksheet, keeping numbers numeric
fn write_table_sheet(sheet: &mut Worksheet, table: &Table) -> Result<()> {
    // Header format
    let header_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border_bottom(FormatBorder::Thin);

    for (col, header) in table.headers.iter().enumerate() {
        let col = col as u16;
        let width = if header_matches(header, GradeColumn::FullName.aliases()) {
            28
        } else {
            14
        };
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, header, &header_format)?;
    }

    let left_format = Format::new().set_align(FormatAlign::Left);

    for (row_idx, cells) in table.rows.iter().enumerate() {
        let row = (row_idx + 1) as u32;

        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    sheet.write_string_with_format(row, col, s, &left_format)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(row, col, *n)?;
                }
                Cell::Bool(b) => {
                    sheet.write_boolean(row, col, *b)?;
                }
            }
        }
    }

    Ok(())
}
