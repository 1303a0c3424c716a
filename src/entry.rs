use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bank::Bank;

/// Number of sub-entries every submission carries
pub const SUB_ENTRIES_PER_ENTRY: usize = 3;

/// One `{bank, value}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubEntry {
    pub bank: String,
    pub value: i64,
}

/// One submission: a date, an optional person and three sub-entries.
///
/// The three sub-entries share a bank. That is guaranteed when an entry is
/// built through `Entry::new`, and not re-checked when reading from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Stable identity, independent of the entry's position in the list.
    /// Records written before ids existed get one assigned on load.
    #[serde(default = "default_uuid")]
    pub id: String,

    pub date: NaiveDate,

    /// Absent in single-user data
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,

    pub entries: [SubEntry; SUB_ENTRIES_PER_ENTRY],
}

fn default_uuid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Entry {
    /// Build an entry whose three sub-entries all use `bank`
    pub fn new(date: NaiveDate, person: Option<String>, bank: Bank, values: [i64; 3]) -> Self {
        let entries = values.map(|value| SubEntry {
            bank: bank.as_str().to_string(),
            value,
        });

        Entry {
            id: default_uuid(),
            date,
            person,
            entries,
        }
    }

    /// Bank name of the first sub-entry, which stands for the whole entry
    pub fn bank_name(&self) -> &str {
        &self.entries[0].bank
    }

    /// None when the stored bank name is not one of the known banks
    pub fn bank(&self) -> Option<Bank> {
        Bank::from_name(self.bank_name())
    }

    pub fn total_value(&self) -> i64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    pub fn belongs_to(&self, person: &str) -> bool {
        self.person.as_deref() == Some(person)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_new_entry_shares_bank() {
        let entry = Entry::new(date("2025-03-31"), Some("牙珍".into()), Bank::Mpay, [10, 20, 50]);

        assert!(entry.entries.iter().all(|e| e.bank == "Mpay"));
        assert_eq!(entry.bank(), Some(Bank::Mpay));
        assert_eq!(entry.total_value(), 80);
        assert!(entry.belongs_to("牙珍"));
        assert!(!entry.belongs_to("志強"));
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_reads_legacy_record_without_id_or_person() {
        let json = r#"{"date": "2025-04-01", "entries": [
            {"bank": "中國銀行", "value": 10},
            {"bank": "中國銀行", "value": 20},
            {"bank": "中國銀行", "value": 0}
        ]}"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.date, date("2025-04-01"));
        assert_eq!(entry.person, None);
        assert!(!entry.id.is_empty());
        assert_eq!(entry.total_value(), 30);
    }

    #[test]
    fn test_rejects_wrong_sub_entry_count() {
        let json = r#"{"date": "2025-04-01", "entries": [
            {"bank": "中國銀行", "value": 10}
        ]}"#;

        assert!(serde_json::from_str::<Entry>(json).is_err());
    }

    #[test]
    fn test_rejects_bad_date() {
        let json = r#"{"date": "01/04/2025", "entries": [
            {"bank": "Mpay", "value": 10},
            {"bank": "Mpay", "value": 10},
            {"bank": "Mpay", "value": 10}
        ]}"#;

        assert!(serde_json::from_str::<Entry>(json).is_err());
    }

    #[test]
    fn test_unknown_bank_reads_but_has_no_bank() {
        let json = r#"{"date": "2025-04-01", "entries": [
            {"bank": "滙豐銀行", "value": 10},
            {"bank": "滙豐銀行", "value": 10},
            {"bank": "滙豐銀行", "value": 10}
        ]}"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.bank_name(), "滙豐銀行");
        assert_eq!(entry.bank(), None);
    }

    #[test]
    fn test_serialized_shape() {
        let mut entry = Entry::new(date("2025-03-31"), None, Bank::Uepay, [0, 0, 100]);
        entry.id = "fixed".into();

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["date"], "2025-03-31");
        assert_eq!(value["id"], "fixed");
        assert!(value.get("person").is_none());
        assert_eq!(value["entries"][2]["value"], 100);
        assert_eq!(value["entries"][0]["bank"], "UEPAY");
    }
}
