//! Discovery of the real identities present in a table

use crate::table::Table;
use regex::Regex;
use std::collections::BTreeSet;

/// Placeholder Moodle writes when an event has no affected user
pub const NO_AFFECTED_USER: &str = "-";

/// System, guest and admin accounts. These ids are never substituted.
pub const RESERVED_USER_IDS: [i64; 4] = [-1, 0, 1, 2];

/// Id assigned to rows whose description names no acting user
pub const FALLBACK_USER_ID: i64 = -1;

/// Sentence prefix that introduces the acting user in a description
pub const ANCHOR_PHRASE: &str = "The user with id ";

lazy_static::lazy_static! {
    // Acting user: the description must open with the anchor phrase.
    // Leading quote tolerated for exports written without CSV quoting.
    static ref ACTING_USER: Regex = Regex::new(r#"^\s*"?The user with id '(\d+)'"#).unwrap();
}

/// Whether a name value is exempt from pseudonymization
pub fn is_sentinel_name(value: &str) -> bool {
    value.trim().is_empty() || value == NO_AFFECTED_USER
}

pub fn is_reserved_id(id: i64) -> bool {
    RESERVED_USER_IDS.contains(&id)
}

/// Collect the distinct names found across the given columns.
///
/// Sentinels and empty cells are excluded. Column indices beyond the header
/// are ignored so callers can pass the result of an optional lookup directly.
pub fn collect_names(table: &Table, columns: &[usize]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for &col in columns {
        for value in table.column_text(col) {
            if !is_sentinel_name(value) {
                names.insert(value.to_string());
            }
        }
    }
    names
}

/// Extract the acting user's id from a description.
///
/// Only an id directly following the anchor phrase at the start of the
/// description counts. Anything else, including ids that fail to parse,
/// yields [`FALLBACK_USER_ID`].
pub fn acting_user_id(description: &str) -> i64 {
    ACTING_USER
        .captures(description)
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .unwrap_or(FALLBACK_USER_ID)
}

/// Per-row acting-user ids for a description column
pub fn acting_user_ids(table: &Table, description_col: usize) -> Vec<i64> {
    table
        .rows
        .iter()
        .map(|row| {
            row.get(description_col)
                .and_then(|cell| cell.as_text())
                .map(acting_user_id)
                .unwrap_or(FALLBACK_USER_ID)
        })
        .collect()
}

/// Distinct acting-user ids of a description column, fallback included if any row fell back
pub fn collect_user_ids(table: &Table, description_col: usize) -> BTreeSet<i64> {
    let ids = acting_user_ids(table, description_col);
    let fallbacks = ids.iter().filter(|&&id| id == FALLBACK_USER_ID).count();
    if fallbacks > 0 {
        log::warn!(
            "{} of {} descriptions carry no acting user id",
            fallbacks,
            ids.len()
        );
    }
    ids.into_iter().collect()
}
