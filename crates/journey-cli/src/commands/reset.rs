use super::{open_tracker, CliResult};

pub fn run() -> CliResult {
    let mut tracker = open_tracker()?;
    tracker.reset_for_new_goal();
    println!("activity log cleared");
    Ok(())
}
