// 📝 Submission validation - form fields to a new Entry

use serde::Deserialize;

use crate::availability::available_banks;
use crate::bank::{is_face_value, Bank};
use crate::dates::parse_date;
use crate::entry::Entry;
use crate::error::LedgerError;
use crate::registry::UserRegistry;

/// Raw submission as posted by the entry form. Every field is optional so
/// that a missing one is reported by name instead of rejected wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryForm {
    pub person: Option<String>,
    pub date: Option<String>,
    pub bank: Option<String>,
    pub value1: Option<String>,
    pub value2: Option<String>,
    pub value3: Option<String>,
}

fn required<'a>(field: &'a Option<String>, name: &'static str) -> Result<&'a str, LedgerError> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(LedgerError::MissingField(name))
}

fn parse_value(raw: &str) -> Result<i64, LedgerError> {
    match raw.parse::<i64>() {
        Ok(value) if is_face_value(value) => Ok(value),
        _ => Err(LedgerError::InvalidValue(raw.to_string())),
    }
}

/// Validate `form` against the registry and the existing entries.
///
/// Checks run in a fixed order: presence, person, date, bank, bank reuse,
/// face values. The first failure is returned.
pub fn create_entry(form: &EntryForm, registry: &UserRegistry, entries: &[Entry]) -> Result<Entry, LedgerError> {
    let person = required(&form.person, "person")?;
    let date = required(&form.date, "date")?;
    let bank = required(&form.bank, "bank")?;
    let raw_values = [
        required(&form.value1, "value1")?,
        required(&form.value2, "value2")?,
        required(&form.value3, "value3")?,
    ];

    if !registry.contains(person) {
        return Err(LedgerError::InvalidUser(person.to_string()));
    }

    let date = parse_date(date)?;

    let bank = Bank::from_name(bank).ok_or_else(|| LedgerError::UnknownBank(bank.to_string()))?;

    if !available_banks(entries, person).contains(&bank) {
        return Err(LedgerError::BankAlreadyUsed {
            person: person.to_string(),
            bank: bank.to_string(),
        });
    }

    let mut values = [0i64; 3];
    for (slot, raw) in values.iter_mut().zip(raw_values) {
        *slot = parse_value(raw)?;
    }

    Ok(Entry::new(date, Some(person.to_string()), bank, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(person: &str, bank: &str, values: [&str; 3]) -> EntryForm {
        EntryForm {
            person: Some(person.to_string()),
            date: Some("2025-04-01".to_string()),
            bank: Some(bank.to_string()),
            value1: Some(values[0].to_string()),
            value2: Some(values[1].to_string()),
            value3: Some(values[2].to_string()),
        }
    }

    #[test]
    fn test_valid_submission() {
        let registry = UserRegistry::default();
        let entry = create_entry(&form("牙珍", "中國銀行", ["10", "20", "0"]), &registry, &[]).unwrap();

        assert_eq!(entry.person.as_deref(), Some("牙珍"));
        assert_eq!(entry.bank(), Some(Bank::BankOfChina));
        assert_eq!(entry.total_value(), 30);
        assert_eq!(entry.date.to_string(), "2025-04-01");
    }

    #[test]
    fn test_missing_field_is_named() {
        let registry = UserRegistry::default();
        let mut f = form("牙珍", "Mpay", ["10", "10", "10"]);
        f.value2 = None;

        match create_entry(&f, &registry, &[]) {
            Err(LedgerError::MissingField(name)) => assert_eq!(name, "value2"),
            other => panic!("expected MissingField, got {other:?}"),
        }

        let mut f = form("牙珍", "Mpay", ["10", "10", "10"]);
        f.bank = Some("  ".to_string());
        assert!(matches!(create_entry(&f, &registry, &[]), Err(LedgerError::MissingField("bank"))));
    }

    #[test]
    fn test_unregistered_person() {
        let registry = UserRegistry::default();
        let result = create_entry(&form("陌生人", "Mpay", ["10", "10", "10"]), &registry, &[]);
        assert!(matches!(result, Err(LedgerError::InvalidUser(_))));
    }

    #[test]
    fn test_bad_date() {
        let registry = UserRegistry::default();
        let mut f = form("牙珍", "Mpay", ["10", "10", "10"]);
        f.date = Some("2025-13-01".to_string());
        assert!(matches!(create_entry(&f, &registry, &[]), Err(LedgerError::DateFormat(_))));
    }

    #[test]
    fn test_unknown_bank() {
        let registry = UserRegistry::default();
        let result = create_entry(&form("牙珍", "滙豐銀行", ["10", "10", "10"]), &registry, &[]);
        assert!(matches!(result, Err(LedgerError::UnknownBank(_))));
    }

    #[test]
    fn test_bank_reuse_is_per_person() {
        let registry = UserRegistry::default();
        let first = create_entry(&form("牙珍", "Mpay", ["10", "10", "10"]), &registry, &[]).unwrap();
        let entries = vec![first];

        let again = create_entry(&form("牙珍", "Mpay", ["20", "20", "20"]), &registry, &entries);
        assert!(matches!(again, Err(LedgerError::BankAlreadyUsed { .. })));

        let other = create_entry(&form("志強", "Mpay", ["20", "20", "20"]), &registry, &entries);
        assert!(other.is_ok());
    }

    #[test]
    fn test_values_must_be_face_values() {
        let registry = UserRegistry::default();

        let not_a_number = create_entry(&form("牙珍", "Mpay", ["10", "abc", "10"]), &registry, &[]);
        assert!(matches!(not_a_number, Err(LedgerError::InvalidValue(v)) if v == "abc"));

        let off_menu = create_entry(&form("牙珍", "Mpay", ["10", "10", "15"]), &registry, &[]);
        assert!(matches!(off_menu, Err(LedgerError::InvalidValue(v)) if v == "15"));
    }
}
