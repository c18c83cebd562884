//! # Learning Journey Core Library
//!
//! This library provides the streak and calendar engine behind the Learning
//! Journey habit tracker. Everything the app can do is available through the
//! `journey-cli` binary; any GUI is a thin layer over the same engine.
//!
//! ## Architecture
//!
//! - **Tracker**: Owns the goal, the per-day log and the selection. The caller
//!   polls `tick()` (every 60 seconds in the app) to follow midnight rollover
//! - **Calendar**: Day normalization, week/period ranges, month grids and the
//!   scrollable month span
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Events**: Synchronous observer notifications for every state change
//!
//! ## Key Components
//!
//! - [`ActivityTracker`]: The engine
//! - [`Calendar`]: Week start and time zone policy
//! - [`Database`]: Key-value persistence
//! - [`Config`]: Application configuration management

pub mod calendar;
pub mod clock;
pub mod error;
pub mod events;
pub mod storage;
pub mod tracker;

pub use calendar::{Calendar, PeriodRange, SpanSettings, TimeZonePolicy, MAX_SPAN_MONTHS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StorageError};
pub use events::{Event, EventBus, SubscriptionId};
pub use storage::{Config, Database, KvStore, MemoryStore, TrackerRecord};
pub use tracker::{
    ActivityLog, ActivityTracker, DayState, DurationUnit, Goal, GoalCommit, TrackerSettings,
    TrackerState, TrackerSummary, FREEZES_PER_WEEK,
};
