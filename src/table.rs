//! In-memory table shared by the log and grade pipelines

use crate::schema::header_matches;
use std::fmt;

/// A single table cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Build a cell from raw delimited-text input; empty fields stay empty
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(field.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// A header row plus data rows. Rows may be ragged; missing cells read as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first header matching any of the aliases
    pub fn position(&self, aliases: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| header_matches(h, aliases))
    }

    pub fn has_column(&self, aliases: &[&str]) -> bool {
        self.position(aliases).is_some()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Iterate the text values of one column, skipping non-text cells
    pub fn column_text(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.get(col).and_then(Cell::as_text))
    }

    /// Remove a column from the header and from every row.
    ///
    /// Returns the removed header, or `None` if the index was out of range.
    pub fn drop_column(&mut self, col: usize) -> Option<String> {
        if col >= self.headers.len() {
            return None;
        }
        let header = self.headers.remove(col);
        for row in &mut self.rows {
            if col < row.len() {
                row.remove(col);
            }
        }
        Some(header)
    }

    /// Rewrite every text cell of a column in place
    pub fn try_map_column<F, E>(&mut self, col: usize, mut f: F) -> std::result::Result<(), E>
    where
        F: FnMut(usize, &str) -> std::result::Result<Option<String>, E>,
    {
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            if let Some(Cell::Text(value)) = row.get_mut(col) {
                if let Some(replacement) = f(row_idx, value)? {
                    *value = replacement;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(vec!["A".into(), "\"B\"".into(), "C".into()]).with_rows(vec![
            vec![Cell::from_field("a1"), Cell::from_field("b1"), Cell::from_field("c1")],
            vec![Cell::from_field("a2"), Cell::from_field("")],
        ])
    }

    #[test]
    fn test_position_tolerates_quotes() {
        let table = sample();
        assert_eq!(table.position(&["B"]), Some(1));
        assert_eq!(table.position(&["missing"]), None);
    }

    #[test]
    fn test_drop_column_handles_ragged_rows() {
        let mut table = sample();
        assert_eq!(table.drop_column(2), Some("C".to_string()));
        assert_eq!(table.headers, vec!["A".to_string(), "\"B\"".to_string()]);
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[1].len(), 2);
        assert_eq!(table.drop_column(5), None);
    }

    #[test]
    fn test_column_text_skips_empty_cells() {
        let table = sample();
        let values: Vec<&str> = table.column_text(1).collect();
        assert_eq!(values, vec!["b1"]);
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(Cell::Number(85.0).to_string(), "85");
        assert_eq!(Cell::Number(7.5).to_string(), "7.5");
        assert_eq!(Cell::Empty.to_string(), "");
    }
}
