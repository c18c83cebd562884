mod config;
pub mod database;
mod memory;
pub mod migrations;
pub mod record;

pub use config::{CalendarConfig, Config, TrackerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use record::TrackerRecord;

use std::path::PathBuf;

use crate::error::{Result, StorageError};

/// String key-value storage the tracker persists into.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<T: KvStore + ?Sized> KvStore for &mut T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Returns `~/.config/learning-journey[-dev]/` based on JOURNEY_ENV.
///
/// Set JOURNEY_ENV=dev to use development data directory, or
/// JOURNEY_DATA_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("JOURNEY_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("JOURNEY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("learning-journey-dev")
    } else {
        base_dir.join("learning-journey")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
