//! CSV reading and writing of tables

use crate::error::Result;
use crate::table::{Cell, Table};
use csv::{ReaderBuilder, Writer};
use std::io::{Read, Write};
use std::path::Path;

/// Read a CSV file whose first row is the header
pub fn read_table(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    read_table_from(file)
}

/// Read CSV from any reader. Rows may have more or fewer fields than the header.
pub fn read_table_from<R: Read>(input: R) -> Result<Table> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(Cell::from_field).collect());
    }

    log::debug!("Read {} CSV rows", rows.len());
    Ok(Table::new(headers).with_rows(rows))
}

/// Write a table as CSV, header first
pub fn write_table(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_table_to(table, file)
}

pub fn write_table_to<W: Write>(table: &Table, output: W) -> Result<()> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::to_string))?;
    }
    writer.flush()?;
    Ok(())
}
