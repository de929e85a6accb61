//! Column schema for the exported log and grade tables.
//!
//! Moodle localizes its export headers, so each column is matched against a
//! small set of known aliases rather than a single literal.

use std::fmt;

/// Columns of an activity-log export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogColumn {
    Hour,
    FullName,
    AffectedUser,
    EventContext,
    Component,
    EventName,
    Description,
    Origin,
    IpAddress,
}

impl LogColumn {
    pub const ALL: [LogColumn; 9] = [
        LogColumn::Hour,
        LogColumn::FullName,
        LogColumn::AffectedUser,
        LogColumn::EventContext,
        LogColumn::Component,
        LogColumn::EventName,
        LogColumn::Description,
        LogColumn::Origin,
        LogColumn::IpAddress,
    ];

    /// Columns whose values are personal names
    pub const NAME_SOURCES: [LogColumn; 2] = [LogColumn::FullName, LogColumn::AffectedUser];

    /// Columns removed from every anonymized log
    pub const SUPPRESSED: [LogColumn; 2] = [LogColumn::Origin, LogColumn::IpAddress];

    /// Header names this column is exported under (Portuguese first, then English)
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            LogColumn::Hour => &["Hora", "Time"],
            LogColumn::FullName => &["Nome completo", "User full name", "Full name"],
            LogColumn::AffectedUser => &["Usuário afetado", "Affected user"],
            LogColumn::EventContext => &["Contexto do Evento", "Event context"],
            LogColumn::Component => &["Componente", "Component"],
            LogColumn::EventName => &["Nome do evento", "Event name"],
            LogColumn::Description => &["Descrição", "Description"],
            LogColumn::Origin => &["Origem", "Origin"],
            LogColumn::IpAddress => &["endereço IP", "IP address"],
        }
    }
}

impl fmt::Display for LogColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.aliases()[0])
    }
}

/// Columns of a grade-sheet export. Everything else is a grade and passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GradeColumn {
    FullName,
}

impl GradeColumn {
    pub const NAME_SOURCES: [GradeColumn; 1] = [GradeColumn::FullName];

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            GradeColumn::FullName => &["Nome completo", "Full name", "User full name"],
        }
    }
}

impl fmt::Display for GradeColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.aliases()[0])
    }
}

/// Normalize a raw header for comparison.
///
/// Exports written without quoting keep the quote characters inside the
/// header text (`"Nome completo"`), so those are stripped along with padding
/// and any byte-order mark.
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .trim_matches('"')
        .trim()
        .to_lowercase()
}

/// Check whether a raw header names one of the given aliases
pub fn header_matches(header: &str, aliases: &[&str]) -> bool {
    let normalized = normalize_header(header);
    aliases.iter().any(|alias| normalize_header(alias) == normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_matches_quoted_and_padded() {
        assert!(header_matches("\"Nome completo\"", LogColumn::FullName.aliases()));
        assert!(header_matches("  IP address ", LogColumn::IpAddress.aliases()));
        assert!(header_matches("ENDEREÇO IP", LogColumn::IpAddress.aliases()));
        assert!(header_matches("\u{feff}Hora", LogColumn::Hour.aliases()));
        assert!(!header_matches("Origem", LogColumn::IpAddress.aliases()));
    }

    #[test]
    fn test_display_uses_primary_alias() {
        assert_eq!(LogColumn::AffectedUser.to_string(), "Usuário afetado");
        assert_eq!(GradeColumn::FullName.to_string(), "Nome completo");
    }

    #[test]
    fn test_aliases_are_unique_across_log_columns() {
        let mut seen = std::collections::HashSet::new();
        for column in LogColumn::ALL {
            for alias in column.aliases() {
                assert!(seen.insert(normalize_header(alias)), "duplicate alias {}", alias);
            }
        }
    }
}
