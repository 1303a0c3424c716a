// 👥 User registry - the people allowed to submit entries

use crate::error::LedgerError;

/// Seeded when no registry has been saved, or the saved one is empty
pub const DEFAULT_USERS: [&str; 2] = ["牙珍", "志強"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRegistry {
    users: Vec<String>,
}

impl UserRegistry {
    /// Registry from what the store returned, falling back to the defaults
    pub fn from_stored(stored: Option<Vec<String>>) -> Self {
        match stored {
            Some(users) if !users.is_empty() => UserRegistry { users },
            _ => Self::default(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.users
    }

    pub fn contains(&self, name: &str) -> bool {
        self.users.iter().any(|u| u == name)
    }

    pub fn add(&mut self, name: &str) -> Result<(), LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::MissingField("new_user"));
        }
        if self.contains(name) {
            return Err(LedgerError::DuplicateUser(name.to_string()));
        }

        self.users.push(name.to_string());
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<(), LedgerError> {
        let name = name.trim();
        let before = self.users.len();
        self.users.retain(|u| u != name);

        if self.users.len() == before {
            return Err(LedgerError::InvalidUser(name.to_string()));
        }
        Ok(())
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        UserRegistry {
            users: DEFAULT_USERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
