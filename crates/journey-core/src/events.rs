use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::{DayState, DurationUnit};

/// Every state change in the tracker produces an Event.
/// A UI subscribes to them to know when to re-render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    DayLogged {
        day: NaiveDate,
        state: DayState,
        at: DateTime<Utc>,
    },
    /// `log_frozen` was refused because the period quota is used up.
    FreezeRejected {
        day: NaiveDate,
        at: DateTime<Utc>,
    },
    SelectionChanged {
        from: NaiveDate,
        to: NaiveDate,
        at: DateTime<Utc>,
    },
    /// The wall-clock date moved on and the selection followed it.
    DayRolledOver {
        from: NaiveDate,
        to: NaiveDate,
        at: DateTime<Utc>,
    },
    GoalChanged {
        title: String,
        duration: DurationUnit,
        at: DateTime<Utc>,
    },
    /// Log and last-log marker were cleared.
    LogReset {
        cleared_days: usize,
        at: DateTime<Utc>,
    },
    /// First goal detected without a creation marker; log cleared and marker stamped.
    FirstGoalNormalized {
        at: DateTime<Utc>,
    },
    GoalStartChanged {
        start: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Event)>;

/// Synchronous observer list. Observers run in subscription order, on the
/// caller's thread, before the publishing command returns.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Event) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn publish(&mut self, event: &Event) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("observers", &self.observers.len())
            .finish()
    }
}
