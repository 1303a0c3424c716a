// 📊 Aggregation - per-bank counts and face value totals
//
// count grows by the number of sub-entries (3) per matching entry, not by 1.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::warn;

use crate::bank::{Bank, BANK_COUNT};
use crate::dates::DateRange;
use crate::entry::{Entry, SUB_ENTRIES_PER_ENTRY};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct BankTotals {
    pub count: i64,
    pub total_value: i64,
}

/// Totals for every known bank, zero rows included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    totals: [BankTotals; BANK_COUNT],
}

impl Summary {
    pub fn empty() -> Self {
        Summary {
            totals: [BankTotals::default(); BANK_COUNT],
        }
    }

    pub fn get(&self, bank: Bank) -> BankTotals {
        self.totals[bank.index()]
    }

    /// Rows in canonical bank order
    pub fn iter(&self) -> impl Iterator<Item = (Bank, BankTotals)> + '_ {
        Bank::ALL.iter().map(move |bank| (*bank, self.totals[bank.index()]))
    }

    pub fn grand_total(&self) -> BankTotals {
        self.totals.iter().fold(BankTotals::default(), |acc, t| BankTotals {
            count: acc.count + t.count,
            total_value: acc.total_value + t.total_value,
        })
    }

    fn add(&mut self, bank: Bank, entry: &Entry) {
        let row = &mut self.totals[bank.index()];
        row.count += SUB_ENTRIES_PER_ENTRY as i64;
        row.total_value += entry.total_value();
    }
}

// Serialized as `{bank name: {count, total_value}}` in canonical order
impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(BANK_COUNT))?;
        for (bank, totals) in self.iter() {
            map.serialize_entry(bank.as_str(), &totals)?;
        }
        map.end()
    }
}

/// Aggregate `entries` by bank.
///
/// `person` restricts to one person's entries; `range` restricts to dates
/// inside it (inclusive). Entries with an unknown bank are skipped with a
/// warning.
pub fn summarize(entries: &[Entry], person: Option<&str>, range: Option<DateRange>) -> Summary {
    let mut summary = Summary::empty();

    for entry in entries {
        if let Some(range) = range {
            if !range.contains(entry.date) {
                continue;
            }
        }

        if let Some(person) = person {
            if !entry.belongs_to(person) {
                continue;
            }
        }

        match entry.bank() {
            Some(bank) => summary.add(bank, entry),
            None => warn!(bank = entry.bank_name(), id = %entry.id, "unknown bank, ignored"),
        }
    }

    summary
}
