//! Substitution of pseudonyms into field values

use crate::error::{AnonymizeError, Result};
use crate::identity::is_sentinel_name;
use crate::pseudonym::{IdMap, NameMap};
use regex::Regex;

lazy_static::lazy_static! {
    // Anchor phrase followed by a quoted id, anywhere in the description
    static ref USER_REFERENCE: Regex = Regex::new(r"The user with id '(\d+)'").unwrap();
}

/// Replace a whole-cell name with its pseudonym.
///
/// Returns `Ok(None)` for sentinels, which stay as they are. A name with no
/// pseudonym means discovery missed it; that is an error, never a pass-through.
pub fn rewrite_name(value: &str, names: &NameMap) -> Result<Option<String>> {
    if is_sentinel_name(value) {
        return Ok(None);
    }
    names
        .get(value)
        .map(|pseudonym| Some(pseudonym.to_string()))
        .ok_or_else(|| AnonymizeError::UnmappedIdentity("name cell".to_string()))
}

/// Replace the acting user's id inside a description.
///
/// Scans the anchor-phrase occurrences in order and rewrites only the first
/// one whose id is in the mapping. Other digits in the sentence, including a
/// second mention of the same id in a different role, are left alone.
/// Returns `None` when the description does not change.
pub fn rewrite_acting_user(description: &str, ids: &IdMap) -> Option<String> {
    for caps in USER_REFERENCE.captures_iter(description) {
        let Some(digits) = caps.get(1) else {
            continue;
        };
        let Ok(id) = digits.as_str().parse::<i64>() else {
            continue;
        };
        let Some(replacement) = ids.get(id) else {
            continue;
        };
        if replacement == id {
            return None;
        }
        return Some(format!(
            "{}{}{}",
            &description[..digits.start()],
            replacement,
            &description[digits.end()..]
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::FALLBACK_USER_ID;
    use crate::pseudonym::IdAllocator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn id_map(real: &[i64]) -> IdMap {
        let ids: BTreeSet<i64> = real.iter().copied().collect();
        IdAllocator::new(StdRng::seed_from_u64(0)).allocate(&ids).unwrap()
    }

    #[test]
    fn test_rewrite_name() {
        let mut names = NameMap::new();
        names.insert("Alice".into(), "Ana Silva".into()).unwrap();
        assert_eq!(rewrite_name("Alice", &names).unwrap(), Some("Ana Silva".to_string()));
        assert_eq!(rewrite_name("-", &names).unwrap(), None);
        assert!(matches!(
            rewrite_name("Mallory", &names),
            Err(AnonymizeError::UnmappedIdentity(_))
        ));
    }

    #[test]
    fn test_only_anchored_occurrence_is_replaced() {
        let ids = id_map(&[123]);
        let new_id = ids.get(123).unwrap();
        let out = rewrite_acting_user("The user with id '123' viewed course module '123'.", &ids);
        assert_eq!(
            out,
            Some(format!("The user with id '{}' viewed course module '123'.", new_id))
        );
    }

    #[test]
    fn test_stops_after_first_match() {
        let ids = id_map(&[654321]);
        let new_id = ids.get(654321).unwrap();
        let description = "The user with id '654321' viewed the feedback for the user with id '654321' \
                           for the assignment with course module id '000000'.";
        let out = rewrite_acting_user(description, &ids).unwrap();
        assert!(out.starts_with(&format!("The user with id '{}' viewed", new_id)));
        assert!(out.contains("for the user with id '654321'"));
        assert!(out.ends_with("course module id '000000'."));
    }

    #[test]
    fn test_digit_prefix_of_longer_id_untouched() {
        let ids = id_map(&[12]);
        assert_eq!(rewrite_acting_user("The user with id '123' logged in.", &ids), None);
    }

    #[test]
    fn test_unanchored_description_unchanged() {
        let ids = id_map(&[123]);
        assert_eq!(rewrite_acting_user("Item deleted.", &ids), None);
        assert_eq!(rewrite_acting_user("Course module '123' updated.", &ids), None);
    }

    #[test]
    fn test_reserved_id_unchanged() {
        let mut allocator = IdAllocator::new(StdRng::seed_from_u64(4));
        let ids = allocator
            .allocate(&[FALLBACK_USER_ID, 0, 2].into_iter().collect())
            .unwrap();
        assert_eq!(rewrite_acting_user("The user with id '2' created the course.", &ids), None);
        assert_eq!(rewrite_acting_user("The user with id '0' logged in.", &ids), None);
    }
}
