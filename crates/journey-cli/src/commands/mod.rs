pub mod calendar;
pub mod config;
pub mod goal;
pub mod log;
pub mod reset;
pub mod status;
pub mod week;

use journey_core::{ActivityTracker, Config, Database, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub type Tracker = ActivityTracker<Database, SystemClock>;

/// Open the tracker the way the app does at launch: settings from the
/// config file, state from the database, then first-goal normalization.
pub fn open_tracker() -> Result<Tracker, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut tracker = ActivityTracker::load(db, SystemClock, config.tracker_settings());
    if tracker.ensure_fresh_after_first_goal() {
        tracing::debug!("cleared activity logged before the first goal was stamped");
    }
    Ok(tracker)
}
