//! Month-assignment reconciliation for the client update path.
//!
//! The edit form submits a checkbox per month plus a free-text person name.
//! The stored mapping is rebuilt month by month: a checked month takes the
//! submitted name, a checked month without a usable name loses its entry,
//! and an unchecked month keeps whatever was stored before.

use std::collections::{HashMap, HashSet};

/// Placeholder the form layer emits for an empty name input.
const EMPTY_PLACEHOLDER: &str = "None";

fn usable_person(person: Option<&String>) -> Option<&str> {
    match person {
        Some(p) if !p.is_empty() && p.as_str() != EMPTY_PLACEHOLDER => Some(p.as_str()),
        _ => None,
    }
}

/// Three-way merge of submitted checkbox state, submitted names, and the
/// previously stored mapping. The result fully replaces the stored map.
pub fn merge_month_assignments(
    previous: &HashMap<String, String>,
    checked_months: &HashSet<String>,
    submitted_persons: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = HashMap::new();
    for month_num in 1..=12u32 {
        let key = month_num.to_string();
        if checked_months.contains(&key) {
            if let Some(person) = usable_person(submitted_persons.get(&key)) {
                merged.insert(key, person.to_string());
            }
            // checked without a usable name: entry dropped
        } else if let Some(person) = previous.get(&key) {
            merged.insert(key, person.clone());
        }
    }
    merged
}

/// Add-path collector: store every month with a non-empty submitted name.
/// No merge happens on create since there is no prior mapping.
pub fn collect_month_assignments(
    submitted_persons: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut months = HashMap::new();
    for month_num in 1..=12u32 {
        let key = month_num.to_string();
        if let Some(person) = submitted_persons.get(&key) {
            if !person.is_empty() {
                months.insert(key, person.clone());
            }
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn set(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn checked_month_with_name_takes_submitted_value() {
        let previous = map(&[("1", "ALICE")]);
        let merged =
            merge_month_assignments(&previous, &set(&["1"]), &map(&[("1", "BOB")]));
        assert_eq!(merged, map(&[("1", "BOB")]));
    }

    #[test]
    fn checked_month_without_name_clears_prior_assignment() {
        let previous = map(&[("3", "ALICE")]);
        let merged = merge_month_assignments(&previous, &set(&["3"]), &HashMap::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn checked_month_with_placeholder_none_clears_prior_assignment() {
        let previous = map(&[("3", "ALICE")]);
        let merged =
            merge_month_assignments(&previous, &set(&["3"]), &map(&[("3", "None")]));
        assert!(merged.is_empty());
    }

    #[test]
    fn checked_month_with_empty_name_clears_prior_assignment() {
        let previous = map(&[("3", "ALICE")]);
        let merged =
            merge_month_assignments(&previous, &set(&["3"]), &map(&[("3", "")]));
        assert!(merged.is_empty());
    }

    #[test]
    fn unchecked_months_carry_forward_unchanged() {
        let previous = map(&[("2", "ALICE"), ("7", "BOB")]);
        let merged = merge_month_assignments(
            &previous,
            &set(&["5"]),
            &map(&[("5", "CAROL")]),
        );
        assert_eq!(merged, map(&[("2", "ALICE"), ("5", "CAROL"), ("7", "BOB")]));
    }

    #[test]
    fn merge_is_idempotent_for_identical_resubmission() {
        let previous = map(&[("1", "ALICE"), ("4", "BOB")]);
        let checked = set(&["1", "4"]);
        let submitted = map(&[("1", "ALICE"), ("4", "BOB")]);

        let first = merge_month_assignments(&previous, &checked, &submitted);
        let second = merge_month_assignments(&first, &checked, &submitted);
        assert_eq!(first, second);
        assert_eq!(second, previous);
    }

    #[test]
    fn rechecking_without_name_never_resurrects_a_cleared_entry() {
        let previous = map(&[("6", "ALICE")]);

        // Uncheck+clear: checkbox ticked, no name submitted.
        let cleared = merge_month_assignments(&previous, &set(&["6"]), &HashMap::new());
        assert!(cleared.is_empty());

        // Re-check later, still no name: entry stays absent.
        let again = merge_month_assignments(&cleared, &set(&["6"]), &HashMap::new());
        assert!(again.is_empty());
    }

    #[test]
    fn keys_outside_1_to_12_are_never_produced() {
        let previous = map(&[("13", "GHOST"), ("0", "GHOST")]);
        let merged = merge_month_assignments(&previous, &HashSet::new(), &HashMap::new());
        assert!(merged.is_empty());
    }

    #[test]
    fn collect_keeps_any_non_empty_name_including_placeholder() {
        // The add path has no checkbox merge and does not filter "None".
        let submitted = map(&[("1", "ALICE"), ("2", ""), ("3", "None")]);
        let collected = collect_month_assignments(&submitted);
        assert_eq!(collected, map(&[("1", "ALICE"), ("3", "None")]));
    }
}
