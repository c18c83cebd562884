//! Goal, day log and the tracker engine that owns them.

mod day;
mod engine;
mod goal;

pub use day::{ActivityLog, DayState};
pub use engine::{ActivityTracker, TrackerSettings, FREEZES_PER_WEEK, TrackerState, TrackerSummary};
pub use goal::{DurationUnit, Goal, GoalCommit};
