//! Month span for the historical calendar view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::months::{add_months, first_of_month, months_between};

/// Longest padding or cap [`month_span`] honours; larger settings are clamped.
pub const MAX_SPAN_MONTHS: u32 = 1200;

fn clamped(months: u32) -> i32 {
    // MAX_SPAN_MONTHS fits in i32.
    months.min(MAX_SPAN_MONTHS) as i32
}

/// Padding and cap for [`month_span`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanSettings {
    #[serde(default = "default_padding")]
    pub months_before: u32,
    #[serde(default = "default_padding")]
    pub months_after: u32,
    #[serde(default = "default_max_months")]
    pub max_months: u32,
}

fn default_padding() -> u32 {
    5
}
fn default_max_months() -> u32 {
    36
}

impl Default for SpanSettings {
    fn default() -> Self {
        Self {
            months_before: default_padding(),
            months_after: default_padding(),
            max_months: default_max_months(),
        }
    }
}

/// First-of-month dates to render, oldest first.
///
/// Runs from `months_before` months ahead of the goal's start month through
/// `months_after` months past its end month (`start + goal_months`), widened
/// to include `today`'s month. When that exceeds `max_months` the window is
/// cut down to `max_months`, keeping the earliest months unless that would
/// drop the current month.
pub fn month_span(
    goal_start: NaiveDate,
    goal_months: u32,
    today: NaiveDate,
    settings: &SpanSettings,
) -> Vec<NaiveDate> {
    let start = first_of_month(goal_start);
    let end = add_months(start, clamped(goal_months)).unwrap_or(start);
    let this_month = first_of_month(today);

    let mut visible_start = add_months(start, -clamped(settings.months_before)).unwrap_or(start);
    let mut visible_end = add_months(end, clamped(settings.months_after)).unwrap_or(end);
    if this_month < visible_start {
        visible_start = this_month;
    }
    if this_month > visible_end {
        visible_end = this_month;
    }

    let cap = i64::from(clamped(settings.max_months.max(1)));
    let total = months_between(visible_start, visible_end) + 1;
    if total > cap {
        let overshoot = months_between(visible_start, this_month) - (cap - 1);
        if overshoot > 0 {
            visible_start = add_months(visible_start, overshoot as i32).unwrap_or(this_month);
        }
    }

    (0..cap)
        .map_while(|offset| add_months(visible_start, offset as i32))
        .take_while(|month| *month <= visible_end)
        .collect()
}
