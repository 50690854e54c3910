//! Consecutive-work-day counter.
//!
//! `status()` is read-and-advance: the first query of a calendar day moves
//! the counter (or resets it after a gap) and stamps `last_work_day`; every
//! later query that day short-circuits.

use std::sync::Arc;

use anyhow::Result;
use time::{Date, Duration};
use watchtower_core::clock::{format_date, parse_date};
use watchtower_core::config::SprintThresholds;
use watchtower_core::{Clock, SprintHealth, SprintState, SprintStatus};
use watchtower_store::{modify_with, DocStore};

#[derive(Clone)]
pub struct SprintTracker {
    doc: Arc<dyn DocStore<SprintState>>,
    thresholds: SprintThresholds,
    clock: Arc<dyn Clock>,
}

impl SprintTracker {
    /// `thresholds` are assumed valid (`warning_day < danger_day`).
    pub fn new(
        doc: Arc<dyn DocStore<SprintState>>,
        thresholds: SprintThresholds,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            doc,
            thresholds,
            clock,
        }
    }

    /// Persisted state without advancing it.
    pub fn peek(&self) -> SprintState {
        self.doc
            .try_load()
            .unwrap_or_else(|| SprintState::starting(&format_date(self.clock.today())))
    }

    /// Advance the counter for today if needed and classify it.
    pub fn status(&self) -> Result<SprintStatus> {
        let today = self.clock.today();
        let state = {
            let _guard = self.doc.lock()?;
            let (mut state, fresh) = match self.doc.try_load() {
                Some(s) => (s, false),
                None => (SprintState::starting(&format_date(today)), true),
            };
            if advance(&mut state, today) || fresh {
                self.doc.save(&state)?;
            }
            state
        };
        Ok(SprintStatus {
            current_day: state.current_day,
            start_date: state.start_date,
            status: classify(state.current_day, &self.thresholds),
            last_rest_day: state.rest_days.last().cloned(),
        })
    }

    /// Record today as a rest day: the counter drops to 0 and the next
    /// sprint starts tomorrow. Today also counts as handled, so a same-day
    /// `status()` reports day 0 and tomorrow's first query starts day 1.
    pub fn record_rest_day(&self) -> Result<SprintState> {
        let today = self.clock.today();
        let today_s = format_date(today);
        let tomorrow = format_date(today + Duration::days(1));
        let state = modify_with(
            &*self.doc,
            || SprintState::starting(&today_s),
            |state: &mut SprintState| {
                if state.rest_days.last() != Some(&today_s) {
                    state.rest_days.push(today_s.clone());
                }
                state.current_day = 0;
                state.start_date = tomorrow;
                state.last_work_day = today_s.clone();
                state.clone()
            },
        )?;
        tracing::debug!(date = %today_s, "rest day recorded");
        Ok(state)
    }
}

/// Move `state` forward to `today`. Returns whether anything changed.
fn advance(state: &mut SprintState, today: Date) -> bool {
    let today_s = format_date(today);
    if state.last_work_day == today_s {
        return false;
    }
    let gap = match parse_date(&state.last_work_day) {
        Some(last) => (today - last).whole_days(),
        None => {
            tracing::warn!(last_work_day = %state.last_work_day, "unparsable last_work_day, restarting sprint");
            i64::MAX
        }
    };
    if gap < 1 {
        // Clock moved backwards; keep the counter as is.
        return false;
    }
    if gap > 1 {
        tracing::debug!(gap, previous_day = state.current_day, "rest gap, sprint reset");
        state.current_day = 1;
        state.start_date = today_s.clone();
    } else {
        state.current_day = state.current_day.saturating_add(1);
        tracing::debug!(day = state.current_day, "sprint advanced");
    }
    state.last_work_day = today_s;
    true
}

pub fn classify(current_day: u32, thresholds: &SprintThresholds) -> SprintHealth {
    if current_day >= thresholds.danger_day {
        SprintHealth::Danger
    } else if current_day >= thresholds.warning_day {
        SprintHealth::Warning
    } else {
        SprintHealth::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use watchtower_core::FixedClock;
    use watchtower_store::{JsonFile, MemoryDoc};

    fn tracker(doc: Arc<dyn DocStore<SprintState>>) -> (SprintTracker, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(datetime!(2026-03-02 08:00 UTC)));
        (
            SprintTracker::new(doc, SprintThresholds::default(), clock.clone()),
            clock,
        )
    }

    fn seeded(day: u32, last: &str) -> Arc<dyn DocStore<SprintState>> {
        Arc::new(MemoryDoc::with(SprintState {
            current_day: day,
            start_date: last.to_string(),
            last_work_day: last.to_string(),
            rest_days: Vec::new(),
        }))
    }

    #[test]
    fn consecutive_day_advances_then_gap_resets() {
        // Day 1 on D0 (03-01); queried on D1 (03-02).
        let (sprint, clock) = tracker(seeded(1, "2026-03-01"));
        assert_eq!(sprint.status().unwrap().current_day, 2);
        assert_eq!(sprint.status().unwrap().current_day, 2);

        clock.advance_days(2);
        let s = sprint.status().unwrap();
        assert_eq!(s.current_day, 1);
        assert_eq!(s.start_date, "2026-03-04");
    }

    #[test]
    fn same_day_is_idempotent_through_the_day() {
        let (sprint, clock) = tracker(seeded(5, "2026-03-01"));
        let first = sprint.status().unwrap();
        clock.advance(Duration::hours(12));
        let second = sprint.status().unwrap();
        assert_eq!(first, second);
        assert_eq!(second.current_day, 6);
    }

    #[test]
    fn missing_state_starts_at_day_one_and_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sprint.json");
        let (sprint, clock) = tracker(Arc::new(JsonFile::<SprintState>::new(&path)));
        let s = sprint.status().unwrap();
        assert_eq!(s.current_day, 1);
        assert_eq!(s.status, SprintHealth::Healthy);
        assert!(path.exists());

        clock.advance_days(1);
        assert_eq!(sprint.status().unwrap().current_day, 2);
    }

    #[test]
    fn thresholds_classify_status() {
        let t = SprintThresholds::default();
        assert_eq!(classify(13, &t), SprintHealth::Healthy);
        assert_eq!(classify(14, &t), SprintHealth::Warning);
        assert_eq!(classify(20, &t), SprintHealth::Warning);
        assert_eq!(classify(21, &t), SprintHealth::Danger);
        assert_eq!(classify(40, &t), SprintHealth::Danger);
    }

    #[test]
    fn long_streak_reaches_danger() {
        let (sprint, _) = tracker(seeded(20, "2026-03-01"));
        let s = sprint.status().unwrap();
        assert_eq!(s.current_day, 21);
        assert_eq!(s.status, SprintHealth::Danger);
    }

    #[test]
    fn rest_day_holds_for_today_and_restarts_tomorrow() {
        let (sprint, clock) = tracker(seeded(9, "2026-03-01"));
        assert_eq!(sprint.status().unwrap().current_day, 10);

        let state = sprint.record_rest_day().unwrap();
        assert_eq!(state.current_day, 0);
        assert_eq!(state.start_date, "2026-03-03");
        assert_eq!(state.rest_days, vec!["2026-03-02"]);

        let same_day = sprint.status().unwrap();
        assert_eq!(same_day.current_day, 0);
        assert_eq!(same_day.last_rest_day.as_deref(), Some("2026-03-02"));

        clock.advance_days(1);
        let next = sprint.status().unwrap();
        assert_eq!(next.current_day, 1);
        assert_eq!(next.start_date, "2026-03-03");
    }

    #[test]
    fn rest_day_before_any_state_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sprint.json");
        let (sprint, clock) = tracker(Arc::new(JsonFile::<SprintState>::new(&path)));

        let state = sprint.record_rest_day().unwrap();
        assert_eq!(state.rest_days, vec!["2026-03-02"]);
        assert_eq!(state.current_day, 0);
        assert_eq!(state.start_date, "2026-03-03");
        assert!(path.exists());
        assert_eq!(sprint.status().unwrap().current_day, 0);

        clock.advance_days(1);
        let next = sprint.status().unwrap();
        assert_eq!(next.current_day, 1);
        assert_eq!(next.start_date, "2026-03-03");
        assert_eq!(next.last_rest_day.as_deref(), Some("2026-03-02"));
    }

    #[test]
    fn rest_day_twice_records_once() {
        let (sprint, _) = tracker(seeded(3, "2026-03-02"));
        sprint.record_rest_day().unwrap();
        let state = sprint.record_rest_day().unwrap();
        assert_eq!(state.rest_days.len(), 1);
    }

    #[test]
    fn clock_going_backwards_keeps_counter() {
        let (sprint, _) = tracker(seeded(4, "2026-03-05"));
        let s = sprint.status().unwrap();
        assert_eq!(s.current_day, 4);
        assert_eq!(sprint.peek().last_work_day, "2026-03-05");
    }
}
