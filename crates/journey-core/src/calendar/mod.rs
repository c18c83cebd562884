//! Calendar policy and date arithmetic.
//!
//! Every question the tracker asks about dates goes through [`Calendar`]:
//! which local day an instant falls on, where a week starts, how months are
//! laid out. Changing the week-start day or time zone is a matter of building
//! a different `Calendar`; the tracker logic itself never touches the host
//! locale.
//!
//! Calendar days are plain [`NaiveDate`]s. A `NaiveDate` carries no time of
//! day, so "normalized to local midnight" holds by construction once an
//! instant has gone through [`Calendar::day_of`].

mod months;
mod span;

pub use months::{add_months, first_of_month, months_between};
pub use span::{month_span, SpanSettings, MAX_SPAN_MONTHS};

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};

/// Which offset turns an instant into a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeZonePolicy {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed UTC offset, independent of the host.
    Fixed(FixedOffset),
}

impl TimeZonePolicy {
    /// Parse `"local"` or an offset like `"+03:00"` / `"-05:30"` / `"utc"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("local") {
            return Some(Self::Local);
        }
        if raw.eq_ignore_ascii_case("utc") || raw.eq_ignore_ascii_case("z") {
            return FixedOffset::east_opt(0).map(Self::Fixed);
        }
        parse_offset(raw).map(Self::Fixed)
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// The current period window, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
}

impl PeriodRange {
    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day < self.end
    }
}

/// Week-start and time-zone policy plus the date helpers built on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    week_start: Weekday,
    timezone: TimeZonePolicy,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(Weekday::Sun, TimeZonePolicy::Local)
    }
}

impl Calendar {
    pub fn new(week_start: Weekday, timezone: TimeZonePolicy) -> Self {
        Self {
            week_start,
            timezone,
        }
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    pub fn timezone(&self) -> TimeZonePolicy {
        self.timezone
    }

    /// The calendar day an instant falls on under this policy.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        match self.timezone {
            TimeZonePolicy::Local => at.with_timezone(&Local).date_naive(),
            TimeZonePolicy::Fixed(offset) => at.with_timezone(&offset).date_naive(),
        }
    }

    /// First instant of `day` under this policy.
    pub fn start_of_day(&self, day: NaiveDate) -> DateTime<Utc> {
        let midnight = day.and_time(NaiveTime::MIN);
        match self.timezone {
            TimeZonePolicy::Local => Local
                .from_local_datetime(&midnight)
                .earliest()
                // Midnight can fall in a DST gap.
                .or_else(|| {
                    Local
                        .from_local_datetime(&(midnight + Duration::hours(1)))
                        .earliest()
                })
                .map(|at| at.with_timezone(&Utc))
                .unwrap_or_else(|| midnight.and_utc()),
            TimeZonePolicy::Fixed(offset) => {
                (midnight - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
            }
        }
    }

    pub fn is_same_day(&self, day: NaiveDate, at: DateTime<Utc>) -> bool {
        self.day_of(at) == day
    }

    /// Position of `day` within its week, 0 for the week-start day.
    pub fn weekday_index(&self, day: NaiveDate) -> u32 {
        let day_idx = day.weekday().num_days_from_monday();
        let start_idx = self.week_start.num_days_from_monday();
        (7 + day_idx - start_idx) % 7
    }

    /// First day of the week containing `day`.
    pub fn start_of_week(&self, day: NaiveDate) -> NaiveDate {
        day - Duration::days(i64::from(self.weekday_index(day)))
    }

    /// The seven consecutive days of the week containing `day`.
    pub fn week_days(&self, day: NaiveDate) -> [NaiveDate; 7] {
        let start = self.start_of_week(day);
        std::array::from_fn(|i| start + Duration::days(i as i64))
    }

    /// The week containing `now`, as `[start, start + 7 days)`.
    pub fn period_range(&self, now: DateTime<Utc>) -> PeriodRange {
        let start = self.start_of_week(self.day_of(now));
        PeriodRange {
            start,
            end: start + Duration::days(7),
        }
    }

    /// Leading blanks then every day of `month`'s month, aligned to the
    /// week-start column.
    pub fn month_grid(&self, month: NaiveDate) -> Vec<Option<NaiveDate>> {
        let first = first_of_month(month);
        let blanks = self.weekday_index(first) as usize;
        let days = first
            .iter_days()
            .take_while(|d| d.month() == first.month());

        std::iter::repeat(None)
            .take(blanks)
            .chain(days.map(Some))
            .collect()
    }

    /// Every day of `month`'s month.
    pub fn month_days(&self, month: NaiveDate) -> Vec<NaiveDate> {
        let first = first_of_month(month);
        first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .collect()
    }
}

/// `"October 2026"`.
pub fn month_title(day: NaiveDate) -> String {
    day.format("%B %Y").to_string()
}

/// `yyyy-MM-dd`, ASCII digits, zero-padded.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Strict inverse of [`day_key`]. Anything other than exactly
/// `dddd-dd-dd` naming a real date is rejected.
pub fn parse_day_key(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !digits_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parse a weekday name (`"sunday"`, `"Mon"`, ...).
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    raw.trim().parse::<Weekday>().ok()
}
