//! Saving and loading the name mapping between separate runs
//!
//! Logs and grades are sometimes exported at different times. Saving the
//! mapping after the first run and loading it before the second keeps the
//! pseudonyms consistent. The file links real names to pseudonyms, so it must
//! be stored as carefully as the raw exports.

use crate::error::{AnonymizeError, Result};
use crate::pseudonym::NameMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One line of a mapping file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MappingRow {
    identity: String,
    pseudonym: String,
}

/// Load a mapping file written by [`save_name_map`]
pub fn load_name_map(path: &Path) -> Result<NameMap> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut map = NameMap::new();
    for (line, result) in reader.deserialize::<MappingRow>().enumerate() {
        let row = result?;
        if row.identity.is_empty() || row.pseudonym.is_empty() {
            return Err(AnonymizeError::Mapping(format!("empty field on line {}", line + 2)));
        }
        map.insert(row.identity, row.pseudonym)
            .map_err(|e| AnonymizeError::Mapping(format!("line {}: {}", line + 2, e)))?;
    }
    log::info!("Loaded {} name mappings from {}", map.len(), path.display());
    Ok(map)
}

/// Write every mapping entry, ordered by real name
pub fn save_name_map(map: &NameMap, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for (identity, pseudonym) in map.iter() {
        writer.serialize(MappingRow {
            identity: identity.to_string(),
            pseudonym: pseudonym.to_string(),
        })?;
    }
    writer.flush()?;
    log::warn!(
        "Saved {} name mappings to {}; this file re-identifies students",
        map.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");

        let mut map = NameMap::new();
        map.insert("Alice".into(), "Ana Silva".into()).unwrap();
        map.insert("Bob, Jr.".into(), "Bruno Costa".into()).unwrap();
        save_name_map(&map, &path).unwrap();

        let loaded = load_name_map(&path).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn test_duplicate_pseudonym_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");
        std::fs::write(&path, "identity,pseudonym\nAlice,Ana Silva\nBob,Ana Silva\n").unwrap();

        match load_name_map(&path) {
            Err(AnonymizeError::Mapping(msg)) => assert!(msg.contains("line 3")),
            other => panic!("expected mapping error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.csv");
        std::fs::write(&path, "identity\nAlice\n").unwrap();
        assert!(load_name_map(&path).is_err());
    }
}
