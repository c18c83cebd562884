use journey_core::calendar::day_key;

use super::{open_tracker, CliResult};

pub fn run(offset: i64) -> CliResult {
    let mut tracker = open_tracker()?;
    let days = offset
        .checked_mul(7)
        .ok_or_else(|| format!("week offset out of range: {offset}"))?;
    tracker.shift_selection(days);

    let week: Vec<_> = tracker
        .selected_week()
        .iter()
        .map(|day| {
            serde_json::json!({
                "day": day_key(*day),
                "weekday": day.format("%a").to_string(),
                "state": tracker.state_of(*day),
                "today": tracker.is_today(*day),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&week)?);
    Ok(())
}
