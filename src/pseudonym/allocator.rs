//! Assignment of pseudonyms to real identities

use super::names::NameSource;
use crate::error::{AnonymizeError, Result};
use crate::identity::{is_reserved_id, is_sentinel_name};
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::RangeInclusive;

/// Fresh draws attempted before a colliding name gets a numeric suffix
pub const MAX_DRAW_ATTEMPTS: usize = 64;

/// Range generated user ids are drawn from
pub const DEFAULT_ID_RANGE: RangeInclusive<i64> = 1000..=999_999;

/// One-to-one mapping from real names to pseudonyms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMap {
    forward: BTreeMap<String, String>,
    pseudonyms: HashSet<String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &str) -> Option<&str> {
        self.forward.get(identity).map(String::as_str)
    }

    pub fn contains_identity(&self, identity: &str) -> bool {
        self.forward.contains_key(identity)
    }

    pub fn contains_pseudonym(&self, pseudonym: &str) -> bool {
        self.pseudonyms.contains(pseudonym)
    }

    /// Add an entry, refusing anything that would break injectivity
    pub fn insert(&mut self, identity: String, pseudonym: String) -> Result<()> {
        if self.forward.contains_key(&identity) {
            return Err(AnonymizeError::Mapping(format!(
                "identity listed twice (pseudonym '{}')",
                pseudonym
            )));
        }
        if self.pseudonyms.contains(&pseudonym) {
            return Err(AnonymizeError::Mapping(format!(
                "pseudonym '{}' assigned to more than one identity",
                pseudonym
            )));
        }
        self.pseudonyms.insert(pseudonym.clone());
        self.forward.insert(identity, pseudonym);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Entries ordered by real identity
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Hands out distinct pseudonyms for names, remembering every assignment.
///
/// Allocating a set that overlaps earlier calls reuses the earlier pseudonyms,
/// which is what keeps the log and grade outputs joinable.
pub struct NameAllocator<S> {
    source: S,
    map: NameMap,
    known_identities: HashSet<String>,
}

impl<S: NameSource> NameAllocator<S> {
    pub fn new(source: S) -> Self {
        Self::with_map(source, NameMap::new())
    }

    /// Continue from a previously built mapping
    pub fn with_map(source: S, map: NameMap) -> Self {
        let known_identities = map.iter().map(|(identity, _)| identity.to_string()).collect();
        Self {
            source,
            map,
            known_identities,
        }
    }

    pub fn map(&self) -> &NameMap {
        &self.map
    }

    /// Merge entries from an earlier run. Entries already present must agree.
    pub fn preload(&mut self, previous: &NameMap) -> Result<()> {
        for (identity, pseudonym) in previous.iter() {
            match self.map.get(identity) {
                Some(existing) if existing == pseudonym => continue,
                Some(_) => {
                    return Err(AnonymizeError::Mapping(
                        "preloaded mapping disagrees with the current session".to_string(),
                    ))
                }
                None => {
                    if self.map.contains_pseudonym(identity) {
                        return Err(AnonymizeError::PseudonymCollision(1));
                    }
                    if self.known_identities.contains(pseudonym) {
                        return Err(AnonymizeError::Mapping(
                            "a preloaded pseudonym is a real name in this session".to_string(),
                        ));
                    }
                    self.map.insert(identity.to_string(), pseudonym.to_string())?;
                    self.known_identities.insert(identity.to_string());
                }
            }
        }
        Ok(())
    }

    /// Declare real names up front so no pseudonym handed out later equals one.
    ///
    /// Names that will only be allocated in a later pass (a grade sheet
    /// processed after the logs) must be reserved before the first pass.
    pub fn reserve(&mut self, identities: &BTreeSet<String>) -> Result<()> {
        let pending: Vec<&String> = identities
            .iter()
            .filter(|identity| !is_sentinel_name(identity))
            .collect();
        self.check_not_handed_out(&pending)?;
        self.known_identities.extend(pending.into_iter().cloned());
        Ok(())
    }

    /// Assign a pseudonym to every identity not yet mapped.
    ///
    /// Sentinel names are skipped. Returns how many new entries were created.
    pub fn allocate(&mut self, identities: &BTreeSet<String>) -> Result<usize> {
        let pending: Vec<&String> = identities
            .iter()
            .filter(|identity| !is_sentinel_name(identity) && !self.map.contains_identity(identity))
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }
        self.check_not_handed_out(&pending)?;

        // All real values must be known before drawing so no pseudonym equals one.
        self.known_identities.extend(pending.iter().map(|identity| identity.to_string()));

        for identity in &pending {
            let pseudonym = self.fresh_name();
            self.map.insert(identity.to_string(), pseudonym)?;
        }
        log::debug!("Allocated {} new pseudonyms ({} total)", pending.len(), self.map.len());
        Ok(pending.len())
    }

    /// A real name that is already somebody's pseudonym cannot be mapped safely
    fn check_not_handed_out(&self, identities: &[&String]) -> Result<()> {
        let taken = identities
            .iter()
            .filter(|identity| self.map.contains_pseudonym(identity))
            .count();
        if taken > 0 {
            return Err(AnonymizeError::PseudonymCollision(taken));
        }
        Ok(())
    }

    fn is_available(&self, candidate: &str) -> bool {
        !is_sentinel_name(candidate)
            && !self.map.contains_pseudonym(candidate)
            && !self.known_identities.contains(candidate)
    }

    fn fresh_name(&mut self) -> String {
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let candidate = self.source.draw();
            if self.is_available(&candidate) {
                return candidate;
            }
        }

        // Name space looks saturated: disambiguate with a counter
        let base = self.source.draw();
        let mut suffix = 2;
        loop {
            let candidate = format!("{} {}", base, suffix);
            if self.is_available(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Mapping from real user ids to generated ones. Reserved ids map to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMap {
    forward: BTreeMap<i64, i64>,
}

impl IdMap {
    pub fn get(&self, id: i64) -> Option<i64> {
        self.forward.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.forward.iter().map(|(&k, &v)| (k, v))
    }
}

/// Draws replacement user ids from a bounded range
pub struct IdAllocator<R> {
    rng: R,
    range: RangeInclusive<i64>,
}

impl<R: Rng> IdAllocator<R> {
    pub fn new(rng: R) -> Self {
        Self::with_range(rng, DEFAULT_ID_RANGE)
    }

    pub fn with_range(rng: R, range: RangeInclusive<i64>) -> Self {
        Self { rng, range }
    }

    /// Number of values in range a real id could be mapped to
    fn available(&self, ids: &BTreeSet<i64>) -> usize {
        let (start, end) = (*self.range.start(), *self.range.end());
        if start > end {
            return 0;
        }
        let size = usize::try_from(i128::from(end) - i128::from(start) + 1).unwrap_or(usize::MAX);
        let blocked = ids
            .iter()
            .copied()
            .chain(crate::identity::RESERVED_USER_IDS)
            .collect::<BTreeSet<i64>>()
            .into_iter()
            .filter(|id| self.range.contains(id))
            .count();
        size.saturating_sub(blocked)
    }

    /// Build an injective mapping for one pass.
    ///
    /// Generated ids never coincide with a reserved id or with any real id of
    /// the same pass, so output ids cannot be mistaken for real ones.
    pub fn allocate(&mut self, ids: &BTreeSet<i64>) -> Result<IdMap> {
        let mut map = IdMap::default();
        let mut real = Vec::new();
        for &id in ids {
            if is_reserved_id(id) {
                map.forward.insert(id, id);
            } else {
                real.push(id);
            }
        }
        if real.is_empty() {
            return Ok(map);
        }

        let available = self.available(ids);
        if real.len() > available {
            return Err(AnonymizeError::IdSpaceExhausted {
                requested: real.len(),
                available,
            });
        }

        let mut used = HashSet::with_capacity(real.len());
        for id in real {
            loop {
                let candidate = self.rng.gen_range(self.range.clone());
                if is_reserved_id(candidate) || ids.contains(&candidate) || used.contains(&candidate) {
                    continue;
                }
                used.insert(candidate);
                map.forward.insert(id, candidate);
                break;
            }
        }
        log::debug!("Allocated {} replacement user ids", used.len());
        Ok(map)
    }
}
