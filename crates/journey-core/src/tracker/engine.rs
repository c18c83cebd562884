//! Activity tracker engine.
//!
//! The tracker owns the goal, the day log and the selection, and is the only
//! thing allowed to change them. Every command is synchronous and returns
//! after the in-memory state, the best-effort write and the observer
//! notifications are done.
//!
//! ## Usage
//!
//! ```ignore
//! let mut tracker = ActivityTracker::load(Database::open()?, SystemClock, settings);
//! tracker.ensure_fresh_after_first_goal();
//! tracker.log_learned();
//! println!("{}", tracker.streak_count());
//! // Every 60 seconds:
//! tracker.tick();
//! ```
//!
//! Denied commands (freezing over quota, selecting a day that is not today)
//! are silent no-ops. A failed write is logged and otherwise ignored; the
//! next successful write catches the store up.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::day::DayState;
use super::goal::{DurationUnit, Goal, GoalCommit};
use crate::calendar::{self, first_of_month, month_span, Calendar, PeriodRange, SpanSettings};
use crate::clock::{Clock, SystemClock};
use crate::events::{Event, EventBus, SubscriptionId};
use crate::storage::{KvStore, TrackerRecord};

/// Freezes a learner gets each week. Settings may override it, but the
/// product rule is two.
pub const FREEZES_PER_WEEK: u32 = 2;

/// Tunable policy for the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Freezes allowed per period (week). Defaults to [`FREEZES_PER_WEEK`].
    pub freeze_limit: u32,
    /// How long after the last log a streak still counts.
    pub streak_grace: Duration,
    pub calendar: Calendar,
    pub span: SpanSettings,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            freeze_limit: FREEZES_PER_WEEK,
            streak_grace: Duration::hours(32),
            calendar: Calendar::default(),
            span: SpanSettings::default(),
        }
    }
}

/// Everything the tracker knows: the persisted record plus the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerState {
    pub record: TrackerRecord,
    /// The day the UI is focused on.
    pub selected_day: NaiveDate,
    /// First day of the month the month grid shows.
    pub month: NaiveDate,
}

/// Read-only snapshot of every query, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSummary {
    pub today: NaiveDate,
    pub selected_day: NaiveDate,
    pub selected_state: DayState,
    pub goal_title: String,
    pub duration: DurationUnit,
    pub streak: u32,
    pub period: PeriodRange,
    pub learned_in_period: u32,
    pub frozen_in_period: u32,
    pub freeze_limit: u32,
    pub freezes_left: u32,
    pub freezes_used: u32,
    pub can_log_learned: bool,
    pub can_log_frozen: bool,
    pub last_log_at: Option<DateTime<Utc>>,
}

/// The streak/calendar engine.
pub struct ActivityTracker<S: KvStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
    settings: TrackerSettings,
    state: TrackerState,
    events: EventBus,
}

impl<S: KvStore, C: Clock> ActivityTracker<S, C> {
    /// Restore the tracker from `store`, migrating it first.
    ///
    /// Never fails: unreadable keys load as absent and malformed log entries
    /// are dropped. The selection starts on today.
    pub fn load(mut store: S, clock: C, settings: TrackerSettings) -> Self {
        let (record, report) = TrackerRecord::load(&mut store);
        if report.dropped_entries > 0 {
            tracing::warn!(
                dropped = report.dropped_entries,
                "dropped malformed activity log entries on load"
            );
        }
        let today = settings.calendar.day_of(clock.now());
        tracing::debug!(
            days = record.log.len(),
            goal = record.goal.title.as_str(),
            schema_version = report.schema_version,
            "tracker loaded"
        );

        Self {
            store,
            clock,
            settings,
            state: TrackerState {
                record,
                selected_day: today,
                month: first_of_month(today),
            },
            events: EventBus::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    pub fn calendar(&self) -> &Calendar {
        &self.settings.calendar
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn goal(&self) -> &Goal {
        &self.state.record.goal
    }

    pub fn last_log_at(&self) -> Option<DateTime<Utc>> {
        self.state.record.last_log_at
    }

    pub fn goal_created_at(&self) -> Option<DateTime<Utc>> {
        self.state.record.goal_created_at
    }

    pub fn goal_start_at(&self) -> Option<DateTime<Utc>> {
        self.state.record.goal_start_at
    }

    pub fn selected_day(&self) -> NaiveDate {
        self.state.selected_day
    }

    pub fn month(&self) -> NaiveDate {
        self.state.month
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.events.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn today(&self) -> NaiveDate {
        self.settings.calendar.day_of(self.clock.now())
    }

    pub fn is_today(&self, day: NaiveDate) -> bool {
        day == self.today()
    }

    pub fn state_of(&self, day: NaiveDate) -> DayState {
        self.state.record.log.state_of(day)
    }

    /// The current week, from now. Ignores the selection and the goal.
    pub fn period_range(&self) -> PeriodRange {
        self.settings.calendar.period_range(self.clock.now())
    }

    pub fn freeze_limit(&self) -> u32 {
        self.settings.freeze_limit
    }

    pub fn frozen_count_in_period(&self) -> u32 {
        self.count_in_period(DayState::Frozen)
    }

    pub fn learned_count_in_period(&self) -> u32 {
        self.count_in_period(DayState::Learned)
    }

    fn count_in_period(&self, state: DayState) -> u32 {
        self.state.record.log.count_in(&self.period_range(), state) as u32
    }

    pub fn freezes_left(&self) -> u32 {
        self.settings
            .freeze_limit
            .saturating_sub(self.frozen_count_in_period())
    }

    pub fn freezes_used(&self) -> u32 {
        self.settings.freeze_limit - self.freezes_left()
    }

    pub fn learned_count_in_month(&self) -> u32 {
        self.count_in_month(DayState::Learned)
    }

    pub fn frozen_count_in_month(&self) -> u32 {
        self.count_in_month(DayState::Frozen)
    }

    fn count_in_month(&self, state: DayState) -> u32 {
        let days = self.settings.calendar.month_days(self.state.month);
        self.state.record.log.count_among(&days, state) as u32
    }

    /// Unbroken run of logged days ending today.
    ///
    /// Zero when nothing was ever logged or the last log is older than the
    /// grace window, whatever the log says.
    pub fn streak_count(&self) -> u32 {
        let now = self.clock.now();
        let Some(last) = self.state.record.last_log_at else {
            return 0;
        };
        if now - last > self.settings.streak_grace {
            return 0;
        }

        let log = &self.state.record.log;
        let mut count = 0;
        let mut cursor = self.settings.calendar.day_of(now);
        while log.state_of(cursor).is_logged() {
            count += 1;
            match cursor.pred_opt() {
                Some(prev) => cursor = prev,
                None => break,
            }
        }
        count
    }

    /// Whether the "log as learned" affordance should be enabled.
    pub fn can_log_learned(&self) -> bool {
        self.is_today(self.state.selected_day) && !self.state_of(self.state.selected_day).is_logged()
    }

    /// Whether the "log as frozen" affordance should be enabled.
    pub fn can_log_frozen(&self) -> bool {
        self.can_log_learned() && self.freezes_left() > 0
    }

    pub fn week_days(&self, containing: NaiveDate) -> [NaiveDate; 7] {
        self.settings.calendar.week_days(containing)
    }

    /// Week strip around the selection.
    pub fn selected_week(&self) -> [NaiveDate; 7] {
        self.week_days(self.state.selected_day)
    }

    pub fn month_grid(&self, month: NaiveDate) -> Vec<Option<NaiveDate>> {
        self.settings.calendar.month_grid(month)
    }

    /// Title for the month header, taken from the selection.
    pub fn month_title(&self) -> String {
        calendar::month_title(self.state.selected_day)
    }

    /// Best guess at when the goal began: the explicit override, else the
    /// earliest logged day, else today.
    pub fn goal_start_estimate(&self) -> NaiveDate {
        let record = &self.state.record;
        record
            .goal_start_at
            .map(|at| self.settings.calendar.day_of(at))
            .or_else(|| record.log.earliest())
            .unwrap_or_else(|| self.today())
    }

    /// Months for the historical calendar, oldest first.
    pub fn month_span(&self) -> Vec<NaiveDate> {
        month_span(
            self.goal_start_estimate(),
            self.state.record.goal.duration.span_months(),
            self.today(),
            &self.settings.span,
        )
    }

    pub fn summary(&self) -> TrackerSummary {
        let selected = self.state.selected_day;
        TrackerSummary {
            today: self.today(),
            selected_day: selected,
            selected_state: self.state_of(selected),
            goal_title: self.state.record.goal.title.clone(),
            duration: self.state.record.goal.duration,
            streak: self.streak_count(),
            period: self.period_range(),
            learned_in_period: self.learned_count_in_period(),
            frozen_in_period: self.frozen_count_in_period(),
            freeze_limit: self.settings.freeze_limit,
            freezes_left: self.freezes_left(),
            freezes_used: self.freezes_used(),
            can_log_learned: self.can_log_learned(),
            can_log_frozen: self.can_log_frozen(),
            last_log_at: self.state.record.last_log_at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Focus `day`, but only if it is today. Anything else is ignored.
    pub fn select(&mut self, day: NaiveDate) {
        if !self.is_today(day) {
            tracing::debug!(%day, "ignoring selection of a day other than today");
            return;
        }
        if day != self.state.selected_day {
            let from = self.move_selection(day);
            self.emit(Event::SelectionChanged {
                from,
                to: day,
                at: self.clock.now(),
            });
        }
    }

    /// Move the selection by whole days. Navigation only, so any day is fine.
    pub fn shift_selection(&mut self, delta_days: i64) {
        let Some(to) = Duration::try_days(delta_days)
            .and_then(|delta| self.state.selected_day.checked_add_signed(delta))
        else {
            return;
        };
        let from = self.move_selection(to);
        self.emit(Event::SelectionChanged {
            from,
            to,
            at: self.clock.now(),
        });
    }

    pub fn prev_week(&mut self) {
        self.shift_selection(-7);
    }

    pub fn next_week(&mut self) {
        self.shift_selection(7);
    }

    /// Jump the selection and month grid to the first day of `year`/`month`.
    ///
    /// Returns false (and changes nothing) if the month does not exist.
    pub fn jump_to_month(&mut self, year: i32, month: u32) -> bool {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return false;
        };
        let from = self.move_selection(first);
        self.emit(Event::SelectionChanged {
            from,
            to: first,
            at: self.clock.now(),
        });
        true
    }

    /// Mark the selected day learned. Overwrites whatever was there.
    pub fn log_learned(&mut self) {
        self.write_day(DayState::Learned);
    }

    /// Mark the selected day frozen, if the period still has a freeze left.
    ///
    /// Returns whether the freeze was recorded.
    pub fn log_frozen(&mut self) -> bool {
        if self.freezes_left() == 0 {
            let day = self.state.selected_day;
            tracing::debug!(%day, "freeze quota used up; ignoring");
            self.emit(Event::FreezeRejected {
                day,
                at: self.clock.now(),
            });
            return false;
        }
        self.write_day(DayState::Frozen);
        true
    }

    /// Clear the whole log and the last-log marker.
    pub fn reset_for_new_goal(&mut self) {
        let record = &mut self.state.record;
        let cleared_days = record.log.len();
        record.log.clear();
        record.last_log_at = None;
        self.persist();
        tracing::info!(cleared_days, "activity log reset");
        self.emit(Event::LogReset {
            cleared_days,
            at: self.clock.now(),
        });
    }

    /// Store an edited goal, clearing the log if it differs from the stored one.
    ///
    /// A blank title is rejected. The first goal that causes a reset also
    /// gets its creation marker stamped.
    pub fn commit_goal(&mut self, title: &str, duration: DurationUnit) -> GoalCommit {
        if title.trim().is_empty() {
            tracing::debug!("ignoring goal with blank title");
            return GoalCommit::Rejected;
        }

        let goal = Goal::new(title, duration);
        let outcome = if self.state.record.goal == goal {
            GoalCommit::Unchanged
        } else {
            self.reset_for_new_goal();
            GoalCommit::Changed
        };

        self.state.record.goal = goal;
        if outcome == GoalCommit::Changed && self.state.record.goal_created_at.is_none() {
            self.state.record.goal_created_at = Some(self.clock.now());
        }
        self.persist();

        if outcome == GoalCommit::Changed {
            tracing::info!(title, %duration, "goal changed");
            self.emit(Event::GoalChanged {
                title: title.to_string(),
                duration,
                at: self.clock.now(),
            });
        }
        outcome
    }

    /// Start-up normalization: a goal that has never been stamped gets a
    /// clean log and a creation marker.
    ///
    /// Returns whether a reset happened.
    pub fn ensure_fresh_after_first_goal(&mut self) -> bool {
        if !self.state.record.goal.is_set() || self.state.record.goal_created_at.is_some() {
            return false;
        }
        self.reset_for_new_goal();
        let now = self.clock.now();
        self.state.record.goal_created_at = Some(now);
        self.persist();
        tracing::info!("first goal normalized");
        self.emit(Event::FirstGoalNormalized { at: now });
        true
    }

    /// Set or clear the explicit goal start used by [`Self::month_span`].
    pub fn set_goal_start(&mut self, start: Option<DateTime<Utc>>) {
        self.state.record.goal_start_at = start;
        self.persist();
        self.emit(Event::GoalStartChanged {
            start,
            at: self.clock.now(),
        });
    }

    /// The periodic poll: first-goal normalization, then snap the selection
    /// back to today if the date has rolled over (or the user navigated away).
    pub fn tick(&mut self) {
        self.ensure_fresh_after_first_goal();

        let today = self.today();
        if self.state.selected_day != today {
            let from = self.move_selection(today);
            tracing::debug!(%from, to = %today, "selection rolled over to today");
            self.emit(Event::DayRolledOver {
                from,
                to: today,
                at: self.clock.now(),
            });
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Set selection and month cursor together; returns the previous selection.
    fn move_selection(&mut self, to: NaiveDate) -> NaiveDate {
        let from = self.state.selected_day;
        self.state.selected_day = to;
        self.state.month = first_of_month(to);
        from
    }

    fn write_day(&mut self, state: DayState) {
        let now = self.clock.now();
        let day = self.state.selected_day;
        let record = &mut self.state.record;
        record.log.set(day, state);
        // Never let the marker move backwards, even if the clock does.
        record.last_log_at = Some(record.last_log_at.map_or(now, |last| last.max(now)));
        self.persist();
        tracing::debug!(%day, %state, "day logged");
        self.emit(Event::DayLogged { day, state, at: now });
    }

    /// Write the whole record so one successful save catches up any
    /// earlier failed ones.
    fn persist(&mut self) {
        if let Err(e) = self.state.record.save(&mut self.store) {
            tracing::warn!(error = %e, "failed to persist tracker state; in-memory state kept");
        }
    }

    fn emit(&mut self, event: Event) {
        self.events.publish(&event);
    }
}

impl<S: KvStore + std::fmt::Debug, C: Clock + std::fmt::Debug> std::fmt::Debug
    for ActivityTracker<S, C>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityTracker")
            .field("store", &self.store)
            .field("clock", &self.clock)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::TimeZonePolicy;
    use crate::clock::ManualClock;
    use crate::error::StorageError;
    use crate::storage::record::keys;
    use crate::storage::MemoryStore;
    use chrono::{FixedOffset, TimeZone, Weekday};
    use std::cell::RefCell;
    use std::rc::Rc;

    type TestTracker = ActivityTracker<MemoryStore, ManualClock>;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn utc_settings() -> TrackerSettings {
        TrackerSettings {
            calendar: Calendar::new(
                Weekday::Sun,
                TimeZonePolicy::Fixed(FixedOffset::east_opt(0).unwrap()),
            ),
            ..Default::default()
        }
    }

    /// Tracker over `record`, with "now" at 2026-10-19 (a Monday) 09:00 UTC.
    fn tracker_with(record: TrackerRecord) -> (TestTracker, ManualClock) {
        let mut store = MemoryStore::new();
        record.save(&mut store).unwrap();
        let clock = ManualClock::new(at(2026, 10, 19, 9));
        let tracker = ActivityTracker::load(store, clock.clone(), utc_settings());
        (tracker, clock)
    }

    fn record_with(days: &[(NaiveDate, DayState)]) -> TrackerRecord {
        let mut record = TrackerRecord {
            goal: Goal::new("Swift", DurationUnit::Week),
            last_log_at: Some(at(2026, 10, 19, 8)),
            goal_created_at: Some(at(2026, 10, 1, 12)),
            ..Default::default()
        };
        for (day, state) in days {
            record.log.set(*day, *state);
        }
        record
    }

    fn recorded_events(tracker: &mut TestTracker) -> Rc<RefCell<Vec<Event>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        tracker.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[derive(Debug, Default)]
    struct ReadOnlyStore;

    impl KvStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Locked)
        }
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let (tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 19), DayState::Learned),
            (date(2026, 10, 18), DayState::Learned),
            (date(2026, 10, 16), DayState::Learned),
        ]));
        assert_eq!(tracker.streak_count(), 2);
    }

    #[test]
    fn frozen_days_keep_the_streak_alive() {
        let (tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 19), DayState::Learned),
            (date(2026, 10, 18), DayState::Frozen),
            (date(2026, 10, 17), DayState::Learned),
        ]));
        assert_eq!(tracker.streak_count(), 3);
    }

    #[test]
    fn streak_is_zero_without_last_log_marker() {
        let mut record = record_with(&[(date(2026, 10, 19), DayState::Learned)]);
        record.last_log_at = None;
        let (tracker, _) = tracker_with(record);
        assert_eq!(tracker.streak_count(), 0);
    }

    #[test]
    fn streak_expires_after_grace_window() {
        let days = [
            (date(2026, 10, 19), DayState::Learned),
            (date(2026, 10, 18), DayState::Learned),
        ];

        let mut stale = record_with(&days);
        stale.last_log_at = Some(at(2026, 10, 18, 0));
        let (tracker, _) = tracker_with(stale);
        assert_eq!(tracker.streak_count(), 0);

        let mut recent = record_with(&days);
        recent.last_log_at = Some(at(2026, 10, 18, 2));
        let (tracker, _) = tracker_with(recent);
        assert_eq!(tracker.streak_count(), 2);
    }

    #[test]
    fn grace_window_boundary_is_inclusive() {
        let (tracker, clock) = tracker_with(record_with(&[(date(2026, 10, 20), DayState::Learned)]));
        clock.set(at(2026, 10, 19, 8) + Duration::hours(32));
        assert_eq!(tracker.streak_count(), 1);
        clock.advance(Duration::seconds(1));
        assert_eq!(tracker.streak_count(), 0);
    }

    #[test]
    fn streak_is_zero_when_today_is_unlogged() {
        let (tracker, _) = tracker_with(record_with(&[(date(2026, 10, 18), DayState::Learned)]));
        assert_eq!(tracker.streak_count(), 0);
    }

    #[test]
    fn log_learned_writes_selected_day_and_persists() {
        let (mut tracker, clock) = tracker_with(TrackerRecord::default());
        let events = recorded_events(&mut tracker);

        tracker.log_learned();

        assert_eq!(tracker.state_of(date(2026, 10, 19)), DayState::Learned);
        assert_eq!(tracker.last_log_at(), Some(clock.now()));
        assert_eq!(tracker.streak_count(), 1);
        assert_eq!(
            tracker.store().get(keys::LOGS).unwrap().as_deref(),
            Some(r#"{"2026-10-19":"learned"}"#)
        );
        assert!(matches!(
            events.borrow().as_slice(),
            [Event::DayLogged { state: DayState::Learned, .. }]
        ));
    }

    #[test]
    fn logging_overwrites_previous_state() {
        let (mut tracker, _) = tracker_with(record_with(&[(date(2026, 10, 19), DayState::Frozen)]));
        tracker.log_learned();
        assert_eq!(tracker.state_of(date(2026, 10, 19)), DayState::Learned);
        assert_eq!(tracker.frozen_count_in_period(), 0);
    }

    #[test]
    fn freeze_quota_caps_frozen_days_per_week() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        let events = recorded_events(&mut tracker);

        assert!(tracker.log_frozen());
        tracker.shift_selection(-1);
        assert!(tracker.log_frozen());
        assert_eq!(tracker.freezes_left(), 0);
        assert_eq!(tracker.freezes_used(), 2);

        tracker.select(date(2026, 10, 19));
        tracker.shift_selection(1);
        let before = tracker.state().record.clone();
        assert!(!tracker.log_frozen());
        assert_eq!(tracker.state().record, before);
        assert_eq!(tracker.frozen_count_in_period(), 2);
        assert!(matches!(
            events.borrow().last(),
            Some(Event::FreezeRejected { .. })
        ));
    }

    #[test]
    fn freezes_left_never_goes_negative() {
        let (tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 18), DayState::Frozen),
            (date(2026, 10, 19), DayState::Frozen),
            (date(2026, 10, 20), DayState::Frozen),
        ]));
        assert_eq!(tracker.frozen_count_in_period(), 3);
        assert_eq!(tracker.freezes_left(), 0);
        assert_eq!(tracker.freezes_used(), 2);
    }

    #[test]
    fn freezes_from_last_week_do_not_count() {
        let (tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 16), DayState::Frozen),
            (date(2026, 10, 17), DayState::Frozen),
        ]));
        assert_eq!(tracker.freezes_left(), 2);
    }

    #[test]
    fn period_range_ignores_selection() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        let period = tracker.period_range();
        assert_eq!(period.start, date(2026, 10, 18));
        assert_eq!(period.end, date(2026, 10, 25));

        tracker.shift_selection(-30);
        assert_eq!(tracker.period_range(), period);
    }

    #[test]
    fn select_only_accepts_today() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        tracker.shift_selection(-3);
        assert_eq!(tracker.selected_day(), date(2026, 10, 16));

        tracker.select(date(2026, 10, 17));
        assert_eq!(tracker.selected_day(), date(2026, 10, 16));

        tracker.select(date(2026, 10, 19));
        assert_eq!(tracker.selected_day(), date(2026, 10, 19));
    }

    #[test]
    fn week_navigation_moves_seven_days_and_month_cursor() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        tracker.next_week();
        tracker.next_week();
        assert_eq!(tracker.selected_day(), date(2026, 11, 2));
        assert_eq!(tracker.month(), date(2026, 11, 1));
        tracker.prev_week();
        assert_eq!(tracker.selected_day(), date(2026, 10, 26));
        assert_eq!(tracker.month_title(), "October 2026");
    }

    #[test]
    fn jump_to_month_rejects_invalid_months() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        assert!(!tracker.jump_to_month(2026, 13));
        assert_eq!(tracker.selected_day(), date(2026, 10, 19));

        assert!(tracker.jump_to_month(2027, 2));
        assert_eq!(tracker.selected_day(), date(2027, 2, 1));
        assert_eq!(tracker.month(), date(2027, 2, 1));
    }

    #[test]
    fn month_counts_follow_the_month_cursor() {
        let (mut tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 2), DayState::Learned),
            (date(2026, 10, 19), DayState::Learned),
            (date(2026, 10, 5), DayState::Frozen),
            (date(2026, 9, 30), DayState::Learned),
        ]));
        assert_eq!(tracker.learned_count_in_month(), 2);
        assert_eq!(tracker.frozen_count_in_month(), 1);

        tracker.jump_to_month(2026, 9);
        assert_eq!(tracker.learned_count_in_month(), 1);
        assert_eq!(tracker.frozen_count_in_month(), 0);
    }

    #[test]
    fn changing_goal_clears_history() {
        let (mut tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 19), DayState::Learned),
            (date(2026, 10, 18), DayState::Learned),
        ]));

        assert_eq!(
            tracker.commit_goal("Rust", DurationUnit::Week),
            GoalCommit::Changed
        );
        assert!(tracker.state().record.log.is_empty());
        assert_eq!(tracker.last_log_at(), None);
        assert_eq!(tracker.streak_count(), 0);
        assert_eq!(
            tracker.store().get(keys::GOAL_TITLE).unwrap().as_deref(),
            Some("Rust")
        );
        assert!(tracker.store().get(keys::LAST_LOG_AT).unwrap().is_none());
    }

    #[test]
    fn changing_only_duration_also_clears_history() {
        let (mut tracker, _) = tracker_with(record_with(&[(date(2026, 10, 19), DayState::Learned)]));
        assert_eq!(
            tracker.commit_goal("Swift", DurationUnit::Year),
            GoalCommit::Changed
        );
        assert!(tracker.state().record.log.is_empty());
        assert_eq!(tracker.goal().duration, DurationUnit::Year);
    }

    #[test]
    fn recommitting_same_goal_keeps_history() {
        let (mut tracker, _) = tracker_with(record_with(&[(date(2026, 10, 19), DayState::Learned)]));
        assert_eq!(
            tracker.commit_goal("Swift", DurationUnit::Week),
            GoalCommit::Unchanged
        );
        assert_eq!(tracker.state_of(date(2026, 10, 19)), DayState::Learned);
    }

    #[test]
    fn blank_goal_is_rejected() {
        let (mut tracker, _) = tracker_with(record_with(&[(date(2026, 10, 19), DayState::Learned)]));
        assert_eq!(
            tracker.commit_goal("   ", DurationUnit::Month),
            GoalCommit::Rejected
        );
        assert_eq!(tracker.goal().title, "Swift");
        assert_eq!(tracker.state_of(date(2026, 10, 19)), DayState::Learned);
    }

    #[test]
    fn first_commit_stamps_creation_marker() {
        let (mut tracker, clock) = tracker_with(TrackerRecord::default());
        assert_eq!(
            tracker.commit_goal("Rust", DurationUnit::Month),
            GoalCommit::Changed
        );
        assert_eq!(tracker.goal_created_at(), Some(clock.now()));

        tracker.log_learned();
        assert!(!tracker.ensure_fresh_after_first_goal());
        assert_eq!(tracker.state_of(date(2026, 10, 19)), DayState::Learned);
    }

    #[test]
    fn ensure_fresh_resets_unstamped_goal_once() {
        let mut record = record_with(&[(date(2026, 10, 19), DayState::Learned)]);
        record.goal_created_at = None;
        let (mut tracker, clock) = tracker_with(record);
        let events = recorded_events(&mut tracker);

        assert!(tracker.ensure_fresh_after_first_goal());
        assert!(tracker.state().record.log.is_empty());
        assert_eq!(tracker.last_log_at(), None);
        assert_eq!(tracker.goal_created_at(), Some(clock.now()));
        assert!(matches!(
            events.borrow().as_slice(),
            [Event::LogReset { cleared_days: 1, .. }, Event::FirstGoalNormalized { .. }]
        ));

        tracker.log_learned();
        assert!(!tracker.ensure_fresh_after_first_goal());
        assert_eq!(tracker.state_of(date(2026, 10, 19)), DayState::Learned);
    }

    #[test]
    fn ensure_fresh_ignores_blank_goal() {
        let mut record = record_with(&[(date(2026, 10, 19), DayState::Learned)]);
        record.goal = Goal::default();
        record.goal_created_at = None;
        let (mut tracker, _) = tracker_with(record);
        assert!(!tracker.ensure_fresh_after_first_goal());
        assert_eq!(tracker.state().record.log.len(), 1);
    }

    #[test]
    fn tick_follows_midnight_rollover() {
        let (mut tracker, clock) = tracker_with(TrackerRecord::default());
        let events = recorded_events(&mut tracker);

        tracker.tick();
        assert!(events.borrow().is_empty());

        clock.set(at(2026, 11, 1, 0) + Duration::minutes(1));
        tracker.tick();
        assert_eq!(tracker.selected_day(), date(2026, 11, 1));
        assert_eq!(tracker.month(), date(2026, 11, 1));
        assert!(matches!(
            events.borrow().as_slice(),
            [Event::DayRolledOver { .. }]
        ));
    }

    #[test]
    fn tick_snaps_navigation_back_to_today() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        tracker.prev_week();
        tracker.tick();
        assert_eq!(tracker.selected_day(), date(2026, 10, 19));
    }

    #[test]
    fn last_log_marker_never_moves_backwards() {
        let (mut tracker, clock) = tracker_with(TrackerRecord::default());
        tracker.log_learned();
        let first = tracker.last_log_at();

        clock.advance(Duration::hours(-2));
        tracker.log_learned();
        assert_eq!(tracker.last_log_at(), first);
    }

    #[test]
    fn failed_writes_keep_in_memory_state() {
        let clock = ManualClock::new(at(2026, 10, 19, 9));
        let mut tracker = ActivityTracker::load(ReadOnlyStore, clock, utc_settings());

        tracker.log_learned();
        assert_eq!(tracker.state_of(date(2026, 10, 19)), DayState::Learned);
        assert_eq!(
            tracker.commit_goal("Rust", DurationUnit::Week),
            GoalCommit::Changed
        );
        assert_eq!(tracker.goal().title, "Rust");
    }

    #[test]
    fn affordances_require_today_and_an_empty_day() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        assert!(tracker.can_log_learned());
        assert!(tracker.can_log_frozen());

        tracker.shift_selection(-1);
        assert!(!tracker.can_log_learned());

        tracker.select(date(2026, 10, 19));
        tracker.log_learned();
        assert!(!tracker.can_log_learned());
        assert!(!tracker.can_log_frozen());
    }

    #[test]
    fn frozen_affordance_requires_quota() {
        let (tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 18), DayState::Frozen),
            (date(2026, 10, 20), DayState::Frozen),
        ]));
        assert!(tracker.can_log_learned());
        assert!(!tracker.can_log_frozen());
    }

    #[test]
    fn month_span_prefers_explicit_goal_start() {
        let mut record = record_with(&[(date(2026, 9, 3), DayState::Learned)]);
        record.goal_start_at = Some(at(2026, 10, 5, 12));
        let (mut tracker, _) = tracker_with(record);

        assert_eq!(tracker.goal_start_estimate(), date(2026, 10, 5));
        let span = tracker.month_span();
        assert_eq!(span.first(), Some(&date(2026, 5, 1)));
        assert_eq!(span.last(), Some(&date(2027, 4, 1)));

        tracker.set_goal_start(None);
        assert_eq!(tracker.goal_start_estimate(), date(2026, 9, 3));
        assert!(tracker.store().get(keys::GOAL_START_AT).unwrap().is_none());
    }

    #[test]
    fn goal_start_defaults_to_today() {
        let (tracker, _) = tracker_with(TrackerRecord::default());
        assert_eq!(tracker.goal_start_estimate(), date(2026, 10, 19));
        assert!(tracker.month_span().contains(&date(2026, 10, 1)));
    }

    #[test]
    fn summary_reflects_queries() {
        let (tracker, _) = tracker_with(record_with(&[
            (date(2026, 10, 19), DayState::Learned),
            (date(2026, 10, 18), DayState::Frozen),
        ]));
        let summary = tracker.summary();
        assert_eq!(summary.streak, 2);
        assert_eq!(summary.learned_in_period, 1);
        assert_eq!(summary.frozen_in_period, 1);
        assert_eq!(summary.freezes_left, 1);
        assert_eq!(summary.selected_state, DayState::Learned);
        assert!(!summary.can_log_learned);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["goal_title"], "Swift");
        assert_eq!(json["duration"], "week");
    }

    #[test]
    fn unsubscribed_observer_is_not_called() {
        let (mut tracker, _) = tracker_with(TrackerRecord::default());
        let count = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&count);
        let id = tracker.subscribe(move |_| *counter.borrow_mut() += 1);
        tracker.log_learned();
        assert!(tracker.unsubscribe(id));
        tracker.log_learned();
        assert_eq!(*count.borrow(), 1);
    }
}
