//! Typed view of the tracker's persisted keys.
//!
//! | Key | Value |
//! |---|---|
//! | `activity.goalTitle` | goal text |
//! | `activity.duration` | `week` / `month` / `year` |
//! | `activity.logs` | JSON object, day key to day state |
//! | `activity.lastLogAt` | seconds since epoch |
//! | `activity.goalCreatedAt` | seconds since epoch |
//! | `activity.goalStartAt` | seconds since epoch |
//! | `activity.schemaVersion` | integer, see [`super::migrations`] |
//!
//! Loading never fails as a whole: a key that cannot be read or parsed is
//! treated as absent, and a malformed log entry is dropped on its own.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::{migrations, KvStore};
use crate::error::StorageError;
use crate::tracker::{ActivityLog, DurationUnit, Goal};

/// Persisted key names.
pub mod keys {
    pub const GOAL_TITLE: &str = "activity.goalTitle";
    pub const DURATION: &str = "activity.duration";
    pub const LOGS: &str = "activity.logs";
    pub const LAST_LOG_AT: &str = "activity.lastLogAt";
    pub const GOAL_CREATED_AT: &str = "activity.goalCreatedAt";
    pub const GOAL_START_AT: &str = "activity.goalStartAt";
    pub const SCHEMA_VERSION: &str = "activity.schemaVersion";
}

/// Everything the tracker persists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerRecord {
    pub goal: Goal,
    pub log: ActivityLog,
    pub last_log_at: Option<DateTime<Utc>>,
    pub goal_created_at: Option<DateTime<Utc>>,
    pub goal_start_at: Option<DateTime<Utc>>,
}

/// What a load had to throw away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub schema_version: u32,
    pub dropped_entries: usize,
}

impl TrackerRecord {
    /// Migrate the store to the current schema, then read the record.
    pub fn load<S: KvStore>(store: &mut S) -> (Self, LoadReport) {
        let schema_version = match migrations::migrate(store) {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!(error = %e, "record migration failed; loading as-is");
                0
            }
        };

        let title = read(store, keys::GOAL_TITLE).unwrap_or_default();
        let duration = read(store, keys::DURATION)
            .and_then(|raw| raw.parse::<DurationUnit>().ok())
            .unwrap_or_default();

        let (log, dropped_entries) = match read(store, keys::LOGS) {
            Some(raw) => decode_log(&raw),
            None => (ActivityLog::new(), 0),
        };

        let record = Self {
            goal: Goal::new(title, duration),
            log,
            last_log_at: read(store, keys::LAST_LOG_AT).and_then(|raw| decode_timestamp(&raw)),
            goal_created_at: read(store, keys::GOAL_CREATED_AT)
                .and_then(|raw| decode_timestamp(&raw)),
            goal_start_at: read(store, keys::GOAL_START_AT).and_then(|raw| decode_timestamp(&raw)),
        };

        (
            record,
            LoadReport {
                schema_version,
                dropped_entries,
            },
        )
    }

    /// Write the log and `lastLogAt`.
    pub fn save_log<S: KvStore>(&self, store: &mut S) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.log.to_raw())
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        store.set(keys::LOGS, &raw)?;
        write_timestamp(store, keys::LAST_LOG_AT, self.last_log_at)
    }

    /// Write goal title and duration.
    pub fn save_goal<S: KvStore>(&self, store: &mut S) -> Result<(), StorageError> {
        store.set(keys::GOAL_TITLE, &self.goal.title)?;
        store.set(keys::DURATION, self.goal.duration.as_str())
    }

    /// Write the goal creation and start markers.
    pub fn save_markers<S: KvStore>(&self, store: &mut S) -> Result<(), StorageError> {
        write_timestamp(store, keys::GOAL_CREATED_AT, self.goal_created_at)?;
        write_timestamp(store, keys::GOAL_START_AT, self.goal_start_at)
    }

    pub fn save<S: KvStore>(&self, store: &mut S) -> Result<(), StorageError> {
        self.save_goal(store)?;
        self.save_log(store)?;
        self.save_markers(store)
    }
}

fn read<S: KvStore>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read persisted key");
            None
        }
    }
}

fn decode_log(raw: &str) -> (ActivityLog, usize) {
    let entries: BTreeMap<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(error = %e, "activity log is not a JSON object; starting empty");
            return (ActivityLog::new(), 0);
        }
    };

    let mut non_string = 0;
    let pairs: Vec<(&str, &str)> = entries
        .iter()
        .filter_map(|(key, value)| match value.as_str() {
            Some(state) => Some((key.as_str(), state)),
            None => {
                tracing::warn!(key = key.as_str(), "dropping non-string activity log value");
                non_string += 1;
                None
            }
        })
        .collect();

    let (log, dropped) = ActivityLog::from_raw(pairs);
    (log, dropped + non_string)
}

/// Seconds since the epoch, fractional part allowed. Zero, negative or
/// unparseable values mean "not set".
pub(crate) fn decode_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let secs: f64 = raw.trim().parse().ok()?;
    if !secs.is_finite() || secs <= 0.0 {
        return None;
    }
    DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64)
}

pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    let micros = at.timestamp_micros();
    if micros % 1_000_000 == 0 {
        (micros / 1_000_000).to_string()
    } else {
        (micros as f64 / 1_000_000.0).to_string()
    }
}

fn write_timestamp<S: KvStore>(
    store: &mut S,
    key: &str,
    at: Option<DateTime<Utc>>,
) -> Result<(), StorageError> {
    match at {
        Some(at) => store.set(key, &encode_timestamp(at)),
        None => store.remove(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::tracker::DayState;
    use chrono::{NaiveDate, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_store_loads_default_record() {
        let mut store = MemoryStore::new();
        let (record, report) = TrackerRecord::load(&mut store);
        assert_eq!(record, TrackerRecord::default());
        assert_eq!(report.dropped_entries, 0);
        assert_eq!(report.schema_version, migrations::CURRENT_VERSION);
    }

    #[test]
    fn save_then_load_is_a_fixed_point() {
        let mut store = MemoryStore::new();
        let mut record = TrackerRecord {
            goal: Goal::new("Rust", DurationUnit::Year),
            last_log_at: Some(Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()),
            goal_created_at: Some(Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        record.log.set(date(2026, 10, 19), DayState::Learned);
        record.log.set(date(2026, 10, 18), DayState::Frozen);
        record.save(&mut store).unwrap();

        let (loaded, report) = TrackerRecord::load(&mut store);
        assert_eq!(loaded, record);
        assert_eq!(report.dropped_entries, 0);
    }

    #[test]
    fn malformed_log_entries_are_dropped_individually() {
        let mut store = MemoryStore::new();
        store
            .set(
                keys::LOGS,
                r#"{"2026-10-19":"learned","2026-10-32":"learned","2026-10-18":"asleep","2026-10-17":3}"#,
            )
            .unwrap();
        let (record, report) = TrackerRecord::load(&mut store);
        assert_eq!(report.dropped_entries, 3);
        assert_eq!(record.log.len(), 1);
        assert_eq!(record.log.state_of(date(2026, 10, 19)), DayState::Learned);
    }

    #[test]
    fn unparseable_log_blob_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(keys::LOGS, "not json").unwrap();
        let (record, _) = TrackerRecord::load(&mut store);
        assert!(record.log.is_empty());
    }

    #[test]
    fn clearing_last_log_at_removes_the_key() {
        let mut store = MemoryStore::new();
        store.set(keys::LAST_LOG_AT, "1760000000").unwrap();
        TrackerRecord::default().save_log(&mut store).unwrap();
        assert!(store.get(keys::LAST_LOG_AT).unwrap().is_none());
    }

    #[test]
    fn timestamps_decode_seconds_and_reject_zero() {
        assert_eq!(
            decode_timestamp("1760000000"),
            Utc.timestamp_opt(1_760_000_000, 0).single()
        );
        assert!(decode_timestamp("1760000000.25").is_some());
        assert!(decode_timestamp("0").is_none());
        assert!(decode_timestamp("-5").is_none());
        assert!(decode_timestamp("soon").is_none());
    }

    #[test]
    fn fractional_timestamps_round_trip() {
        let at = Utc.timestamp_opt(1_760_000_000, 250_000_000).unwrap();
        assert_eq!(decode_timestamp(&encode_timestamp(at)), Some(at));
    }

    #[test]
    fn unknown_duration_falls_back_to_week() {
        let mut store = MemoryStore::new();
        store.set(keys::GOAL_TITLE, "Rust").unwrap();
        store.set(keys::DURATION, "decade").unwrap();
        let (record, _) = TrackerRecord::load(&mut store);
        assert_eq!(record.goal, Goal::new("Rust", DurationUnit::Week));
    }
}
