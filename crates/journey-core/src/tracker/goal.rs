use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target duration the user picked for the goal.
///
/// Only a label: quota and period rules are the same for every unit. It does
/// size the historical calendar (see [`DurationUnit::span_months`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Week,
    Month,
    Year,
}

impl DurationUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationUnit::Week => "week",
            DurationUnit::Month => "month",
            DurationUnit::Year => "year",
        }
    }

    /// Goal length in months for the calendar span.
    pub fn span_months(&self) -> u32 {
        match self {
            DurationUnit::Week | DurationUnit::Month => 1,
            DurationUnit::Year => 12,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DurationUnit {
    type Err = String;

    /// Case-insensitive; `"Week"` and `"week"` are the same unit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(DurationUnit::Week),
            "month" => Ok(DurationUnit::Month),
            "year" => Ok(DurationUnit::Year),
            other => Err(format!("unknown duration: {other}")),
        }
    }
}

/// The learning goal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Goal {
    pub title: String,
    pub duration: DurationUnit,
}

impl Goal {
    pub fn new(title: impl Into<String>, duration: DurationUnit) -> Self {
        Self {
            title: title.into(),
            duration,
        }
    }

    /// A goal exists once a non-blank title has been stored.
    pub fn is_set(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Outcome of committing an edited goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCommit {
    /// Same title and duration; the log is kept.
    Unchanged,
    /// Title or duration differs; the log was cleared.
    Changed,
    /// Blank title; nothing was stored.
    Rejected,
}
