//! Versioned migrations for the persisted tracker record.
//!
//! Migrations are applied automatically on load. The
//! `activity.schemaVersion` key tracks the current version; stores written
//! before versioning existed have no key and start at 0.

use super::record::{decode_timestamp, keys};
use super::KvStore;
use crate::error::StorageError;
use crate::tracker::DurationUnit;

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: u32 = 2;

/// Apply all pending migrations to bring the store to the current schema version.
///
/// # Errors
/// Returns the store error if the version cannot be read, or
/// [`StorageError::MigrationFailed`] naming the step that could not be applied.
pub fn migrate<S: KvStore>(store: &mut S) -> Result<u32, StorageError> {
    let current_version = schema_version(store)?;

    if current_version < 1 {
        migrate_v1(store).map_err(|e| step_failed(1, e))?;
    }
    if current_version < 2 {
        migrate_v2(store).map_err(|e| step_failed(2, e))?;
    }

    Ok(current_version.max(CURRENT_VERSION))
}

/// Get the current schema version from the store.
///
/// Returns 0 if no version is set (unversioned store).
pub fn schema_version<S: KvStore>(store: &S) -> Result<u32, StorageError> {
    let Some(raw) = store.get(keys::SCHEMA_VERSION)? else {
        return Ok(0);
    };
    match raw.trim().parse::<u32>() {
        Ok(version) => Ok(version),
        Err(_) => {
            tracing::warn!(raw = raw.as_str(), "unreadable schema version; re-running migrations");
            Ok(0)
        }
    }
}

fn step_failed(version: u32, err: StorageError) -> StorageError {
    StorageError::MigrationFailed(format!("v{version}: {err}"))
}

fn set_schema_version<S: KvStore>(store: &mut S, version: u32) -> Result<(), StorageError> {
    store.set(keys::SCHEMA_VERSION, &version.to_string())
}

/// Migration v1: baseline.
///
/// The key layout predates versioning, so there is nothing to rewrite.
fn migrate_v1<S: KvStore>(store: &mut S) -> Result<(), StorageError> {
    set_schema_version(store, 1)
}

/// Migration v2: normalize stored labels and timestamps.
///
/// - `activity.duration` is rewritten in lowercase (`"Week"` -> `"week"`);
///   values that name no known unit are removed.
/// - Timestamp keys holding zero or garbage are removed, so "absent" has a
///   single representation.
fn migrate_v2<S: KvStore>(store: &mut S) -> Result<(), StorageError> {
    if let Some(raw) = store.get(keys::DURATION)? {
        match raw.parse::<DurationUnit>() {
            Ok(unit) if unit.as_str() != raw => store.set(keys::DURATION, unit.as_str())?,
            Ok(_) => {}
            Err(_) => {
                tracing::warn!(raw = raw.as_str(), "removing unknown goal duration");
                store.remove(keys::DURATION)?;
            }
        }
    }

    for key in [keys::LAST_LOG_AT, keys::GOAL_CREATED_AT, keys::GOAL_START_AT] {
        if let Some(raw) = store.get(key)? {
            if decode_timestamp(&raw).is_none() {
                store.remove(key)?;
            }
        }
    }

    set_schema_version(store, 2)
}
