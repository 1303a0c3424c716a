use std::{env, fmt::Debug, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub data_path: PathBuf,
    pub users_path: PathBuf,
    pub port: u16,
}

impl Config {
    pub fn load() -> Self {
        Self {
            data_path: try_load("LEDGER_DATA_PATH", PathBuf::from("lottery_data.json")),
            users_path: try_load("LEDGER_USERS_PATH", PathBuf::from("users.json")),
            port: try_load("LEDGER_PORT", 5000u16),
        }
    }
}

fn try_load<T: FromStr + Debug>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    parse_or_default(key, env::var(key).ok(), default)
}

fn parse_or_default<T: FromStr + Debug>(key: &str, raw: Option<String>, default: T) -> T
where
    T::Err: Display,
{
    let Some(raw) = raw else {
        info!("{key} not set, using default: {default:?}");
        return default;
    };

    match raw.parse() {
        Ok(value) => value,
        Err(e) => {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default:?}");
            default
        }
    }
}
