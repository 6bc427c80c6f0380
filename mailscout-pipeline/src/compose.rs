//! Candidate address composition.
//!
//! Pure string permutation over employee names, no I/O. A name that
//! normalizes to nothing contributes zero addresses and is skipped rather
//! than failing the call.

use std::collections::BTreeSet;

use mailscout_common::Employee;
use tracing::trace;

/// Derives the deduplicated set of plausible addresses for `employees`
/// at `domain`.
///
/// For a name with tokens `first [middle…] last` the emitted local parts
/// are `first`, `first.last`, `firstlast`, `first_last`, `f.last` (first
/// initial), `firstl` (last initial), and with three or more tokens also
/// `first.middle.last` where `middle` concatenates the interior tokens.
///
/// Output is a set: duplicates across employees or permutation rules
/// collapse, and the result is independent of employee order.
#[must_use]
pub fn compose(employees: &[Employee], domain: &str) -> BTreeSet<String> {
    let mut addresses = BTreeSet::new();

    for employee in employees {
        let tokens = normalize(&employee.name);
        let Some(first) = tokens.first() else {
            trace!(name = %employee.name, "skipping employee with empty normalized name");
            continue;
        };

        addresses.insert(format!("{first}@{domain}"));

        if tokens.len() >= 2 {
            let last = &tokens[tokens.len() - 1];

            addresses.insert(format!("{first}.{last}@{domain}"));
            addresses.insert(format!("{first}{last}@{domain}"));
            addresses.insert(format!("{first}_{last}@{domain}"));

            if let Some(initial) = first.chars().next() {
                addresses.insert(format!("{initial}.{last}@{domain}"));
            }
            if let Some(initial) = last.chars().next() {
                addresses.insert(format!("{first}{initial}@{domain}"));
            }

            if tokens.len() >= 3 {
                let middle = tokens[1..tokens.len() - 1].concat();
                addresses.insert(format!("{first}.{middle}.{last}@{domain}"));
            }
        }
    }

    addresses
}

/// Trim, lowercase, strip punctuation (keeping alphanumerics, underscores
/// and whitespace), then split on whitespace.
fn normalize(name: &str) -> Vec<String> {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
