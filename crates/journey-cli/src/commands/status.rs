use super::{open_tracker, CliResult};

pub fn run() -> CliResult {
    let tracker = open_tracker()?;
    println!("{}", serde_json::to_string_pretty(&tracker.summary())?);
    Ok(())
}
