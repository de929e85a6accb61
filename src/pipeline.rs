//! Log anonymization pipeline and the session that carries pseudonyms between files

use crate::csvio;
use crate::error::{AnonymizeError, Result};
use crate::identity::{collect_names, collect_user_ids};
use crate::pseudonym::{GeneratedNames, IdAllocator, NameAllocator, NameMap, NameSource};
use crate::rewrite::{rewrite_acting_user, rewrite_name};
use crate::schema::LogColumn;
use crate::table::Table;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::path::Path;

/// Keeps the id generator's stream apart from the name generator's for a shared seed
const ID_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

/// What one anonymization pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    pub rows: usize,
    pub names_seen: usize,
    pub new_pseudonyms: usize,
    pub user_ids: usize,
    pub dropped_columns: Vec<String>,
}

/// One anonymization session.
///
/// Every pass run through the same session shares one name mapping, so a
/// student appearing in both the logs and the grade sheet gets the same
/// pseudonym in both outputs. User-id mappings are rebuilt for each log pass.
pub struct Session<S = GeneratedNames<StdRng>, R = StdRng> {
    names: NameAllocator<S>,
    ids: IdAllocator<R>,
}

impl Session {
    /// Reproducible session: the same seed and inputs give the same output
    pub fn seeded(seed: u64) -> Self {
        Self::new(
            NameAllocator::new(GeneratedNames::new(StdRng::seed_from_u64(seed))),
            IdAllocator::new(StdRng::seed_from_u64(seed.wrapping_add(ID_SEED_OFFSET))),
        )
    }

    pub fn from_entropy() -> Self {
        Self::new(
            NameAllocator::new(GeneratedNames::new(StdRng::from_entropy())),
            IdAllocator::new(StdRng::from_entropy()),
        )
    }
}

impl<S: NameSource, R: Rng> Session<S, R> {
    pub fn new(names: NameAllocator<S>, ids: IdAllocator<R>) -> Self {
        Self { names, ids }
    }

    /// Names mapped so far in this session
    pub fn name_map(&self) -> &NameMap {
        self.names.map()
    }

    /// Seed the session with a mapping saved by an earlier run
    pub fn preload_names(&mut self, map: &NameMap) -> Result<()> {
        self.names.preload(map)
    }

    /// Make real names from files processed later in this session off-limits
    /// as pseudonyms for the passes that run before them.
    pub fn reserve_identities(&mut self, identities: &BTreeSet<String>) -> Result<()> {
        self.names.reserve(identities)
    }

    /// Anonymize an activity-log table.
    ///
    /// Drops the origin and IP columns, pseudonymizes the full-name and
    /// affected-user columns with one shared mapping, and replaces the acting
    /// user's id in each description. Any missing column is skipped.
    pub fn anonymize_logs(&mut self, mut table: Table) -> Result<(Table, PassSummary)> {
        let mut summary = PassSummary {
            rows: table.len(),
            dropped_columns: suppress_columns(&mut table),
            ..Default::default()
        };

        for column in LogColumn::NAME_SOURCES {
            if !table.has_column(column.aliases()) {
                log::warn!("Log has no '{}' column", column);
            }
        }
        let name_columns = log_name_columns(&table);
        let (seen, created) = self.pseudonymize_name_columns(&mut table, &name_columns)?;
        summary.names_seen = seen;
        summary.new_pseudonyms = created;

        match table.position(LogColumn::Description.aliases()) {
            Some(col) => summary.user_ids = self.pseudonymize_user_ids(&mut table, col)?,
            None => log::warn!("Log has no '{}' column, user ids left as is", LogColumn::Description),
        }

        log::info!(
            "Anonymized {} log rows: {} names, {} user ids, dropped {:?}",
            summary.rows,
            summary.names_seen,
            summary.user_ids,
            summary.dropped_columns
        );
        Ok((table, summary))
    }

    /// Pseudonymize whole-cell names across several columns with one mapping.
    ///
    /// Returns (distinct names seen, pseudonyms newly created).
    pub(crate) fn pseudonymize_name_columns(
        &mut self,
        table: &mut Table,
        columns: &[usize],
    ) -> Result<(usize, usize)> {
        let identities = collect_names(table, columns);
        if identities.is_empty() {
            return Ok((0, 0));
        }
        let created = self.names.allocate(&identities)?;

        let map = self.names.map();
        for &col in columns {
            let header = table.headers[col].clone();
            table.try_map_column(col, |row, value| {
                rewrite_name(value, map).map_err(|_| {
                    AnonymizeError::UnmappedIdentity(format!("column '{}', row {}", header, row + 1))
                })
            })?;
        }
        Ok((identities.len(), created))
    }

    /// Replace acting-user ids in a description column. Returns the distinct ids found.
    fn pseudonymize_user_ids(&mut self, table: &mut Table, col: usize) -> Result<usize> {
        let ids = collect_user_ids(table, col);
        if ids.is_empty() {
            return Ok(0);
        }
        let map = self.ids.allocate(&ids)?;
        table.try_map_column::<_, AnonymizeError>(col, |_, value| {
            Ok(rewrite_acting_user(value, &map))
        })?;
        Ok(ids.len())
    }
}

fn log_name_columns(table: &Table) -> Vec<usize> {
    LogColumn::NAME_SOURCES
        .iter()
        .filter_map(|column| table.position(column.aliases()))
        .collect()
}

/// Real names in a log's name columns, without anonymizing anything
pub fn log_identities(table: &Table) -> BTreeSet<String> {
    collect_names(table, &log_name_columns(table))
}

/// Read a logs CSV and return the real names it contains
pub fn read_log_identities(source: &Path) -> Result<BTreeSet<String>> {
    Ok(log_identities(&csvio::read_table(source)?))
}

/// Remove the origin and IP-address columns. Returns the headers removed.
///
/// A table without them is left untouched.
pub fn suppress_columns(table: &mut Table) -> Vec<String> {
    let mut dropped = Vec::new();
    for column in LogColumn::SUPPRESSED {
        while let Some(idx) = table.position(column.aliases()) {
            if let Some(header) = table.drop_column(idx) {
                log::debug!("Dropped column '{}'", header);
                dropped.push(header);
            }
        }
    }
    dropped
}

/// Read a logs CSV, anonymize it, and write the result.
///
/// The output file is only created once the whole table is anonymized.
pub fn anonymize_logs_file<S: NameSource, R: Rng>(
    session: &mut Session<S, R>,
    source: &Path,
    target: &Path,
) -> Result<PassSummary> {
    let table = csvio::read_table(source)?;
    let (table, summary) = session.anonymize_logs(table)?;
    csvio::write_table(&table, target)?;
    Ok(summary)
}
