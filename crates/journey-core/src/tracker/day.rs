use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::{day_key, parse_day_key, PeriodRange};

/// Logged outcome of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayState {
    #[default]
    None,
    Learned,
    Frozen,
}

impl DayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayState::None => "none",
            DayState::Learned => "learned",
            DayState::Frozen => "frozen",
        }
    }

    /// Learned and frozen days both keep a streak alive.
    pub fn is_logged(&self) -> bool {
        !matches!(self, DayState::None)
    }
}

impl fmt::Display for DayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(DayState::None),
            "learned" => Ok(DayState::Learned),
            "frozen" => Ok(DayState::Frozen),
            other => Err(format!("unknown day state: {other}")),
        }
    }
}

/// Day-by-day log for the current goal.
///
/// Holds at most one state per day. Unlogged days are simply absent, so
/// writing [`DayState::None`] removes the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityLog {
    days: BTreeMap<NaiveDate, DayState>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state_of(&self, day: NaiveDate) -> DayState {
        self.days.get(&day).copied().unwrap_or_default()
    }

    pub fn set(&mut self, day: NaiveDate, state: DayState) {
        if state.is_logged() {
            self.days.insert(day, state);
        } else {
            self.days.remove(&day);
        }
    }

    pub fn clear(&mut self) {
        self.days.clear();
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, DayState)> + '_ {
        self.days.iter().map(|(day, state)| (*day, *state))
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    /// Entries inside `range` with the given state.
    pub fn count_in(&self, range: &PeriodRange, state: DayState) -> usize {
        self.days
            .range(range.start..range.end)
            .filter(|(_, s)| **s == state)
            .count()
    }

    /// Entries among `days` with the given state.
    pub fn count_among(&self, days: &[NaiveDate], state: DayState) -> usize {
        days.iter().filter(|d| self.state_of(**d) == state).count()
    }

    /// Persisted form: day key to raw state value.
    pub fn to_raw(&self) -> BTreeMap<String, String> {
        self.days
            .iter()
            .map(|(day, state)| (day_key(*day), state.as_str().to_string()))
            .collect()
    }

    /// Rebuild from the persisted form, skipping entries whose key or value
    /// does not parse. Returns the log and the number of skipped entries.
    pub fn from_raw<'a, I>(raw: I) -> (Self, usize)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut log = Self::new();
        let mut dropped = 0;
        for (key, value) in raw {
            match (parse_day_key(key), value.parse::<DayState>()) {
                (Some(day), Ok(state)) => log.set(day, state),
                _ => {
                    tracing::warn!(key, value, "dropping malformed activity log entry");
                    dropped += 1;
                }
            }
        }
        (log, dropped)
    }
}
