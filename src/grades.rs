//! Grade-sheet anonymization
//!
//! Grades only carry the student's full name. Running them through the same
//! [`Session`] as the logs reuses the pseudonyms already assigned there, so
//! anonymized logs and grades can still be joined on the name column.

use crate::csvio;
use crate::error::{AnonymizeError, Result};
use crate::identity::collect_names;
use crate::pipeline::{PassSummary, Session};
use crate::pseudonym::NameSource;
use crate::schema::GradeColumn;
use crate::table::Table;
use crate::xlsx;
use rand::Rng;
use std::collections::BTreeSet;
use std::path::Path;

/// Spreadsheet or delimited text, picked from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradesFormat {
    Csv,
    Spreadsheet,
}

impl GradesFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(GradesFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(GradesFormat::Spreadsheet),
            _ => Err(AnonymizeError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

impl<S: NameSource, R: Rng> Session<S, R> {
    /// Pseudonymize the full-name column of a grade sheet.
    ///
    /// Every other column, grades included, is returned untouched. A sheet
    /// without a full-name column comes back unchanged.
    pub fn anonymize_grades(&mut self, mut table: Table) -> Result<(Table, PassSummary)> {
        let name_columns = grade_name_columns(&table);
        if name_columns.is_empty() {
            log::warn!("Grade sheet has no '{}' column", GradeColumn::FullName);
        }

        let (seen, created) = self.pseudonymize_name_columns(&mut table, &name_columns)?;
        log::info!(
            "Anonymized {} grade rows: {} names, {} not seen before in this session",
            table.len(),
            seen,
            created
        );

        let summary = PassSummary {
            rows: table.len(),
            names_seen: seen,
            new_pseudonyms: created,
            ..Default::default()
        };
        Ok((table, summary))
    }
}

fn grade_name_columns(table: &Table) -> Vec<usize> {
    GradeColumn::NAME_SOURCES
        .iter()
        .filter_map(|column| table.position(column.aliases()))
        .collect()
}

/// Read a grade sheet. Spreadsheets also return the first sheet's name.
fn read_grades_table(source: &Path) -> Result<(Table, Option<String>)> {
    Ok(match GradesFormat::from_path(source)? {
        GradesFormat::Csv => (csvio::read_table(source)?, None),
        GradesFormat::Spreadsheet => {
            let sheet = xlsx::read_first_sheet(source)?;
            (sheet.table, Some(sheet.name))
        }
    })
}

/// Read a grade sheet and return the real names it contains.
///
/// Reserve these in the session before a log pass so no log pseudonym can
/// equal a student who only appears in the grades.
pub fn read_grade_identities(source: &Path) -> Result<BTreeSet<String>> {
    let (table, _) = read_grades_table(source)?;
    Ok(collect_names(&table, &grade_name_columns(&table)))
}

/// Read a grade sheet, anonymize it, and write it in the target's format.
///
/// Only the output extension decides the output format, so an `.xlsx` sheet
/// can be exported as `.csv` and the other way around. `.xlsx` is the only
/// spreadsheet format written.
pub fn anonymize_grades_file<S: NameSource, R: Rng>(
    session: &mut Session<S, R>,
    source: &Path,
    target: &Path,
) -> Result<PassSummary> {
    let target_format = GradesFormat::from_path(target)?;
    let (table, sheet_name) = read_grades_table(source)?;

    let (table, summary) = session.anonymize_grades(table)?;

    match target_format {
        GradesFormat::Csv => csvio::write_table(&table, target)?,
        GradesFormat::Spreadsheet => {
            let is_xlsx = target
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
            if !is_xlsx {
                return Err(AnonymizeError::UnsupportedFormat(format!(
                    "{} (spreadsheets are written as .xlsx)",
                    target.display()
                )));
            }
            xlsx::write_table_to_xlsx(&table, sheet_name.as_deref(), target)?
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    fn grades() -> Table {
        Table::new(vec!["Nome completo".into(), "Tarefa 1".into(), "Total".into()]).with_rows(vec![
            vec![Cell::Text("Alice".into()), Cell::Number(8.5), Cell::Number(85.0)],
            vec![Cell::Text("Dave".into()), Cell::Empty, Cell::Number(40.0)],
        ])
    }

    fn logs() -> Table {
        Table::new(vec!["Nome completo".into(), "Usuário afetado".into()])
            .with_rows(vec![vec![Cell::Text("Bob".into()), Cell::Text("Alice".into())]])
    }

    #[test]
    fn test_names_shared_with_logs() {
        let mut session = Session::seeded(17);
        let (logs_out, _) = session.anonymize_logs(logs()).unwrap();
        let (grades_out, summary) = session.anonymize_grades(grades()).unwrap();

        assert_eq!(grades_out.cell(0, 0), logs_out.cell(0, 1));
        assert_ne!(grades_out.cell(1, 0), Some(&Cell::Text("Dave".into())));
        assert_ne!(grades_out.cell(1, 0), grades_out.cell(0, 0));
        assert_eq!(summary.names_seen, 2);
        assert_eq!(summary.new_pseudonyms, 1);
    }

    #[test]
    fn test_grade_only_student_reserved_before_logs() {
        // A real student in the grades happens to carry Bob's log pseudonym
        let (plain_logs, _) = Session::seeded(17).anonymize_logs(logs()).unwrap();
        let taken_name = plain_logs.cell(0, 0).map(Cell::to_string).unwrap();
        let sheet = Table::new(vec!["Nome completo".into()])
            .with_rows(vec![vec![Cell::Text(taken_name.clone())]]);

        // Unreserved: the grades pass refuses to alias the log student
        let mut session = Session::seeded(17);
        session.anonymize_logs(logs()).unwrap();
        assert!(matches!(
            session.anonymize_grades(sheet.clone()),
            Err(AnonymizeError::PseudonymCollision(1))
        ));

        // Reserved up front: both passes succeed and stay distinct
        let mut session = Session::seeded(17);
        let reserved: BTreeSet<String> = [taken_name.clone()].into_iter().collect();
        session.reserve_identities(&reserved).unwrap();
        let (logs_out, _) = session.anonymize_logs(logs()).unwrap();
        let (grades_out, _) = session.anonymize_grades(sheet).unwrap();
        let grade_name = grades_out.cell(0, 0).map(Cell::to_string).unwrap();
        assert_ne!(grade_name, taken_name);
        for col in 0..2 {
            assert_ne!(logs_out.cell(0, col).map(Cell::to_string).unwrap(), taken_name);
            assert_ne!(logs_out.cell(0, col).map(Cell::to_string).unwrap(), grade_name);
        }
    }

    #[test]
    fn test_grade_columns_untouched() {
        let mut session = Session::seeded(2);
        let (out, _) = session.anonymize_grades(grades()).unwrap();
        assert_eq!(out.headers, grades().headers);
        assert_eq!(out.cell(0, 1), Some(&Cell::Number(8.5)));
        assert_eq!(out.cell(1, 1), Some(&Cell::Empty));
        assert_eq!(out.cell(1, 2), Some(&Cell::Number(40.0)));
    }

    #[test]
    fn test_sheet_without_name_column_unchanged() {
        let table = Table::new(vec!["Total".into()]).with_rows(vec![vec![Cell::Number(1.0)]]);
        let mut session = Session::seeded(2);
        let (out, summary) = session.anonymize_grades(table.clone()).unwrap();
        assert_eq!(out, table);
        assert_eq!(summary.names_seen, 0);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(GradesFormat::from_path(Path::new("g.CSV")).unwrap(), GradesFormat::Csv);
        assert_eq!(
            GradesFormat::from_path(Path::new("g.xlsx")).unwrap(),
            GradesFormat::Spreadsheet
        );
        assert!(GradesFormat::from_path(Path::new("g.txt")).is_err());
    }
}
