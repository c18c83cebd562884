use clap::Subcommand;
use journey_core::calendar::{day_key, parse_day_key};
use journey_core::{DurationUnit, GoalCommit};

use super::{open_tracker, CliResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Set the learning goal. A different goal clears the activity log.
    Set {
        /// Goal title (e.g. "Rust")
        title: String,
        /// week, month or year
        #[arg(long, default_value = "week")]
        duration: DurationUnit,
    },
    /// Show the current goal
    Show,
    /// Set or clear the day the goal started (for the history span)
    Start {
        /// Start day as YYYY-MM-DD
        #[arg(required_unless_present = "clear")]
        day: Option<String>,
        /// Forget the start day
        #[arg(long, conflicts_with = "day")]
        clear: bool,
    },
}

pub fn run(action: GoalAction) -> CliResult {
    let mut tracker = open_tracker()?;

    match action {
        GoalAction::Set { title, duration } => match tracker.commit_goal(&title, duration) {
            GoalCommit::Changed => {
                println!("goal set: {title} ({duration}); activity log cleared");
            }
            GoalCommit::Unchanged => println!("goal unchanged"),
            GoalCommit::Rejected => return Err("goal title must not be blank".into()),
        },
        GoalAction::Show => {
            let goal = tracker.goal();
            let start = tracker.goal_start_at().map(|at| day_key(tracker.calendar().day_of(at)));
            let json = serde_json::json!({
                "title": goal.title,
                "duration": goal.duration,
                "created_at": tracker.goal_created_at(),
                "start": start,
                "start_estimate": day_key(tracker.goal_start_estimate()),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        GoalAction::Start { day, clear } => {
            if clear {
                tracker.set_goal_start(None);
                println!("goal start cleared");
            } else if let Some(raw) = day {
                let day = parse_day_key(&raw)
                    .ok_or_else(|| format!("invalid day: {raw} (expected YYYY-MM-DD)"))?;
                let start = tracker.calendar().start_of_day(day);
                tracker.set_goal_start(Some(start));
                println!("goal start: {}", day_key(day));
            }
        }
    }
    Ok(())
}
