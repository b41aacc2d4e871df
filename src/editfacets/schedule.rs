//! # Time and Deferred Work
//!
//! The engine never sleeps and never spawns. Deferred work is a deadline stored
//! in a [`Scheduler`], and the host calls `Engine::tick` to run whatever is due.
//! Time comes from a [`Clock`], so tests drive it with a [`ManualClock`].
//!
//! Each [`TimerKey`] holds at most one deadline. Scheduling a key that is already
//! pending replaces its deadline, which is exactly the coalescing rule for
//! structural-change notifications: only the last one in a burst fires.

use chrono::{Local, NaiveDateTime, TimeDelta};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance_ms(&self, millis: u64) {
        self.now.set(after_ms(self.now.get(), millis));
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

/// Adds `millis` to `at`, saturating at the largest representable time.
pub fn after_ms(at: NaiveDateTime, millis: u64) -> NaiveDateTime {
    i64::try_from(millis)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| at.checked_add_signed(delta))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Kinds of deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    /// Coalesced filter-and-reconcile pass.
    Pass,
    /// Next attempt at locating the record source.
    SearchRetry,
    /// Removal of the go-to highlight.
    HighlightExpiry,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    deadlines: HashMap<TimerKey, NaiveDateTime>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `key` to fire at `deadline`, replacing any pending deadline.
    pub fn schedule(&mut self, key: TimerKey, deadline: NaiveDateTime) {
        self.deadlines.insert(key, deadline);
    }

    /// Returns whether `key` was pending.
    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    pub fn deadline(&self, key: TimerKey) -> Option<NaiveDateTime> {
        self.deadlines.get(&key).copied()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.deadlines.values().min().copied()
    }

    /// Removes and returns the keys due at `now`, earliest first.
    pub fn take_due(&mut self, now: NaiveDateTime) -> Vec<TimerKey> {
        let mut due: Vec<(NaiveDateTime, TimerKey)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (*deadline, *key))
            .collect();
        due.sort();
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(start());
        let other = clock.clone();
        clock.advance_ms(1500);
        assert_eq!(other.now(), after_ms(start(), 1500));
    }

    #[test]
    fn rescheduling_replaces_the_deadline() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TimerKey::Pass, after_ms(start(), 100));
        scheduler.schedule(TimerKey::Pass, after_ms(start(), 250));

        assert!(scheduler.take_due(after_ms(start(), 100)).is_empty());
        assert_eq!(
            scheduler.take_due(after_ms(start(), 250)),
            vec![TimerKey::Pass]
        );
        assert!(!scheduler.is_pending(TimerKey::Pass));
    }

    #[test]
    fn due_keys_come_out_in_deadline_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TimerKey::HighlightExpiry, after_ms(start(), 10));
        scheduler.schedule(TimerKey::Pass, after_ms(start(), 30));
        scheduler.schedule(TimerKey::SearchRetry, after_ms(start(), 20));

        assert_eq!(scheduler.next_deadline(), Some(after_ms(start(), 10)));
        assert_eq!(
            scheduler.take_due(after_ms(start(), 30)),
            vec![
                TimerKey::HighlightExpiry,
                TimerKey::SearchRetry,
                TimerKey::Pass
            ]
        );
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn cancel_reports_pending() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(TimerKey::SearchRetry, start());
        assert!(scheduler.cancel(TimerKey::SearchRetry));
        assert!(!scheduler.cancel(TimerKey::SearchRetry));

        scheduler.schedule(TimerKey::Pass, start());
        scheduler.schedule(TimerKey::HighlightExpiry, start());
        scheduler.cancel_all();
        assert!(scheduler.take_due(after_ms(start(), 1)).is_empty());
    }
}
