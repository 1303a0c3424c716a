// Each person may use each bank once over the lifetime of the ledger.

use std::collections::HashSet;

use crate::bank::Bank;
use crate::entry::Entry;

/// Known banks `person` has already submitted, canonical order
pub fn used_banks(entries: &[Entry], person: &str) -> Vec<Bank> {
    let used = used_set(entries, person);
    Bank::ALL.iter().copied().filter(|bank| used.contains(bank)).collect()
}

/// Known banks `person` has not submitted yet, canonical order
pub fn available_banks(entries: &[Entry], person: &str) -> Vec<Bank> {
    let used = used_set(entries, person);
    Bank::ALL.iter().copied().filter(|bank| !used.contains(bank)).collect()
}

fn used_set(entries: &[Entry], person: &str) -> HashSet<Bank> {
    entries
        .iter()
        .filter(|entry| entry.belongs_to(person))
        .filter_map(Entry::bank)
        .collect()
}
