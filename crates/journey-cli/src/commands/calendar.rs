use clap::{Args, Subcommand};
use journey_core::calendar::day_key;

use super::{open_tracker, CliResult};

#[derive(Args)]
pub struct CalendarArgs {
    /// Month to show as YYYY-MM (defaults to the current month)
    #[arg(long)]
    month: Option<String>,

    #[command(subcommand)]
    action: Option<CalendarAction>,
}

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Months the history view covers
    Span,
}

pub fn run(args: CalendarArgs) -> CliResult {
    let mut tracker = open_tracker()?;

    if let Some(CalendarAction::Span) = args.action {
        let months: Vec<String> = tracker
            .month_span()
            .iter()
            .map(|month| month.format("%Y-%m").to_string())
            .collect();
        println!("{}", serde_json::to_string_pretty(&months)?);
        return Ok(());
    }

    if let Some(raw) = args.month {
        let (year, month) =
            parse_month(&raw).ok_or_else(|| format!("invalid month: {raw} (expected YYYY-MM)"))?;
        if !tracker.jump_to_month(year, month) {
            return Err(format!("invalid month: {raw}").into());
        }
    }

    let grid = tracker.month_grid(tracker.month());
    let weeks: Vec<Vec<serde_json::Value>> = grid
        .chunks(7)
        .map(|week| {
            week.iter()
                .map(|cell| match cell {
                    Some(day) => serde_json::json!({
                        "day": day_key(*day),
                        "state": tracker.state_of(*day),
                        "today": tracker.is_today(*day),
                    }),
                    None => serde_json::Value::Null,
                })
                .collect()
        })
        .collect();

    let json = serde_json::json!({
        "title": tracker.month_title(),
        "week_start": tracker.calendar().week_start().to_string(),
        "learned": tracker.learned_count_in_month(),
        "frozen": tracker.frozen_count_in_month(),
        "weeks": weeks,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn parse_month(raw: &str) -> Option<(i32, u32)> {
    let (year, month) = raw.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    Some((year.parse().ok()?, month.parse().ok()?))
}
