// 💾 Persistence - the entry list and user registry as JSON documents
//
// The whole list is read and written in one piece. Nothing here caches
// between calls; callers reload on every request.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

use crate::entry::Entry;

/// Backing store for entries and registry members
pub trait LedgerStore: Send + Sync {
    /// Full entry list in submission order. A store that has never been
    /// written returns an empty list.
    fn load_entries(&self) -> Result<Vec<Entry>>;

    fn save_entries(&self, entries: &[Entry]) -> Result<()>;

    /// None when no registry has been saved yet
    fn load_users(&self) -> Result<Option<Vec<String>>>;

    fn save_users(&self, users: &[String]) -> Result<()>;
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

pub struct JsonFileStore {
    data_path: PathBuf,
    users_path: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_path: impl Into<PathBuf>, users_path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            data_path: data_path.into(),
            users_path: users_path.into(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }
}

impl LedgerStore for JsonFileStore {
    fn load_entries(&self) -> Result<Vec<Entry>> {
        Ok(read_json(&self.data_path)?.unwrap_or_default())
    }

    fn save_entries(&self, entries: &[Entry]) -> Result<()> {
        write_json(&self.data_path, entries)
    }

    fn load_users(&self) -> Result<Option<Vec<String>>> {
        read_json(&self.users_path)
    }

    fn save_users(&self, users: &[String]) -> Result<()> {
        write_json(&self.users_path, users)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no file yet");
            return Ok(None);
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };

    let value = serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}

/// Write to a sibling temp file, then rename over the target
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;

    debug!(path = %path.display(), "saved");
    Ok(())
}

// ============================================================================
// MEMORY STORE
// ============================================================================

/// In-process store, used by tests and throwaway runs
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
    users: Mutex<Option<Vec<String>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Entry>) -> Self {
        MemoryStore {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("memory store is read-only");
        }
        Ok(())
    }
}

impl LedgerStore for MemoryStore {
    fn load_entries(&self) -> Result<Vec<Entry>> {
        let entries = self.entries.lock().map_err(|_| anyhow::anyhow!("entries lock poisoned"))?;
        Ok(entries.clone())
    }

    fn save_entries(&self, entries: &[Entry]) -> Result<()> {
        self.check_writable()?;
        let mut stored = self.entries.lock().map_err(|_| anyhow::anyhow!("entries lock poisoned"))?;
        *stored = entries.to_vec();
        Ok(())
    }

    fn load_users(&self) -> Result<Option<Vec<String>>> {
        let users = self.users.lock().map_err(|_| anyhow::anyhow!("users lock poisoned"))?;
        Ok(users.clone())
    }

    fn save_users(&self, users: &[String]) -> Result<()> {
        self.check_writable()?;
        let mut stored = self.users.lock().map_err(|_| anyhow::anyhow!("users lock poisoned"))?;
        *stored = Some(users.to_vec());
        Ok(())
    }
}
