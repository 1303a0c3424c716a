// 📒 Ledger service - what request handlers and the terminal view talk to
//
// Reads for display never fail: storage trouble is logged and shows up as
// empty data. Writes hold `write_lock` across load + save and report storage
// failures to the caller.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::availability::available_banks;
use crate::bank::Bank;
use crate::dates::{current_week_range, resolve_range, DateRange};
use crate::entry::Entry;
use crate::error::LedgerError;
use crate::form::{create_entry, EntryForm};
use crate::registry::UserRegistry;
use crate::store::LedgerStore;
use crate::summary::{summarize, Summary};

/// Entries whose first sub-entry uses `bank` (when given) and that belong to
/// `person` (when given), paired with their position in the full list.
pub fn filter_history<'a>(entries: &'a [Entry], bank: Option<&str>, person: Option<&str>) -> Vec<(usize, &'a Entry)> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, e)| bank.map_or(true, |b| e.bank_name() == b))
        .filter(|(_, e)| person.map_or(true, |p| e.belongs_to(p)))
        .collect()
}

/// Parameters of the main page
#[derive(Debug, Clone, Default)]
pub struct OverviewQuery {
    pub selected_bank: Option<String>,
    /// Person the entry form is prepared for
    pub person: Option<String>,
    /// Person the summary is computed for
    pub summary_user: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Everything the main page shows
#[derive(Debug)]
pub struct Overview {
    pub today: NaiveDate,
    pub users: Vec<String>,
    pub person: Option<String>,
    pub available_banks: Vec<Bank>,
    pub selected_bank: Option<String>,
    pub history: Vec<(usize, Entry)>,
    pub summary_user: Option<String>,
    pub summary: Summary,
    /// None when the summary covers all data
    pub range: Option<DateRange>,
    pub week: DateRange,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
    write_lock: Arc<Mutex<()>>,
}

impl Ledger {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Ledger {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // ========================================================================
    // READS
    // ========================================================================

    pub fn entries(&self) -> Vec<Entry> {
        self.store.load_entries().unwrap_or_else(|e| {
            warn!("Failed to load entries, showing none: {e:#}");
            Vec::new()
        })
    }

    /// Entries without the empty fallback, for callers that copy data out
    pub fn load_entries(&self) -> Result<Vec<Entry>, LedgerError> {
        Ok(self.store.load_entries()?)
    }

    pub fn registry(&self) -> UserRegistry {
        match self.store.load_users() {
            Ok(stored) => UserRegistry::from_stored(stored),
            Err(e) => {
                warn!("Failed to load users, using defaults: {e:#}");
                UserRegistry::default()
            }
        }
    }

    pub fn summary(&self, person: Option<&str>, range: Option<DateRange>) -> Summary {
        summarize(&self.entries(), person, range)
    }

    pub fn available_banks(&self, person: &str) -> Vec<Bank> {
        available_banks(&self.entries(), person)
    }

    pub fn overview(&self, query: &OverviewQuery, today: NaiveDate) -> Overview {
        let entries = self.entries();
        let registry = self.registry();
        let users = registry.names().to_vec();

        let person = non_empty(&query.person)
            .filter(|p| registry.contains(p))
            .or_else(|| users.first().map(String::as_str))
            .map(str::to_string);
        let available = person
            .as_deref()
            .map(|p| available_banks(&entries, p))
            .unwrap_or_default();

        let summary_user = non_empty(&query.summary_user).map(str::to_string).or_else(|| person.clone());
        let resolution = resolve_range(query.start_date.as_deref(), query.end_date.as_deref(), today);
        let summary = summarize(&entries, summary_user.as_deref(), resolution.range);

        let selected_bank = non_empty(&query.selected_bank).map(str::to_string);
        let history = filter_history(&entries, selected_bank.as_deref(), None)
            .into_iter()
            .map(|(i, e)| (i, e.clone()))
            .collect();

        Overview {
            today,
            users,
            person,
            available_banks: available,
            selected_bank,
            history,
            summary_user,
            summary,
            range: resolution.range,
            week: current_week_range(today),
            start_date: query.start_date.clone(),
            end_date: query.end_date.clone(),
            error: resolution.error.map(|e| e.to_string()),
        }
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Validate and append a submission, then persist the whole list
    pub fn submit(&self, form: &EntryForm) -> Result<Entry, LedgerError> {
        let _guard = self.lock()?;

        let mut entries = self.store.load_entries()?;
        let registry = UserRegistry::from_stored(self.store.load_users()?);

        let entry = create_entry(form, &registry, &entries)?;
        entries.push(entry.clone());
        self.store.save_entries(&entries)?;

        info!(id = %entry.id, person = ?entry.person, bank = entry.bank_name(), "entry added");
        Ok(entry)
    }

    /// Remove the entry at `index`. Out of range is a no-op returning false.
    pub fn delete_at(&self, index: usize) -> Result<bool, LedgerError> {
        let _guard = self.lock()?;

        let mut entries = self.store.load_entries()?;
        if index >= entries.len() {
            return Ok(false);
        }

        let removed = entries.remove(index);
        self.store.save_entries(&entries)?;

        info!(index, id = %removed.id, "entry deleted");
        Ok(true)
    }

    pub fn delete_by_id(&self, id: &str) -> Result<bool, LedgerError> {
        let _guard = self.lock()?;

        let mut entries = self.store.load_entries()?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }

        self.store.save_entries(&entries)?;
        info!(id, "entry deleted");
        Ok(true)
    }

    pub fn add_user(&self, name: &str) -> Result<(), LedgerError> {
        let _guard = self.lock()?;

        let mut registry = UserRegistry::from_stored(self.store.load_users()?);
        registry.add(name)?;
        self.store.save_users(registry.names())?;

        info!(user = name.trim(), "user added");
        Ok(())
    }

    pub fn remove_user(&self, name: &str) -> Result<(), LedgerError> {
        let _guard = self.lock()?;

        let mut registry = UserRegistry::from_stored(self.store.load_users()?);
        registry.remove(name)?;
        self.store.save_users(registry.names())?;

        info!(user = name.trim(), "user removed");
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, LedgerError> {
        self.write_lock
            .lock()
            .map_err(|_| LedgerError::Storage(anyhow::anyhow!("write lock poisoned")))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
