use clap::Subcommand;
use journey_core::calendar::day_key;

use super::{open_tracker, CliResult};

#[derive(Subcommand)]
pub enum LogAction {
    /// Mark today as learned
    Learned,
    /// Spend a freeze on today
    Frozen,
}

pub fn run(action: LogAction) -> CliResult {
    let mut tracker = open_tracker()?;
    let today = day_key(tracker.selected_day());

    match action {
        LogAction::Learned => tracker.log_learned(),
        LogAction::Frozen => {
            if !tracker.log_frozen() {
                println!("no freezes left this week; {today} unchanged");
                return Ok(());
            }
        }
    }

    println!(
        "{today}: {} (streak {}, {} freezes left)",
        tracker.state_of(tracker.selected_day()),
        tracker.streak_count(),
        tracker.freezes_left()
    );
    Ok(())
}
