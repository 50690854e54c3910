use anyhow::Result;
use watchtower_core::{DataSummary, AVOIDANCE_THRESHOLD};
use watchtower_state::Watchtower;

use crate::patterns::analyze_patterns;

/// Headline counts plus the sprint and burnout picture.
pub fn data_summary(wt: &Watchtower) -> Result<DataSummary> {
    let analysis = analyze_patterns(wt)?;
    let sprint = wt.sprint().status()?;
    let tasks = wt.tasks().all();
    let completed = tasks.iter().filter(|t| t.is_completed()).count();

    Ok(DataSummary {
        total_tasks: tasks.len(),
        active_tasks: tasks.len() - completed,
        completed_tasks: completed,
        avoided_tasks: tasks
            .iter()
            .filter(|t| t.is_avoided(AVOIDANCE_THRESHOLD))
            .count(),
        daily_entries: wt.daily().all().len(),
        sprint_day: sprint.current_day,
        sprint_status: sprint.status,
        burnout_risk: analysis.burnout_risk,
        completion_rate: format!("{:.1}%", analysis.completion_rate * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::macros::datetime;
    use watchtower_core::{BurnoutRisk, Category, FixedClock, SprintHealth, WatchConfig};

    #[test]
    fn empty_store_summary() {
        let clock = Arc::new(FixedClock::new(datetime!(2026-03-02 09:00 UTC)));
        let wt = Watchtower::in_memory(WatchConfig::default(), clock);
        let s = data_summary(&wt).unwrap();
        assert_eq!(s.total_tasks, 0);
        assert_eq!(s.daily_entries, 0);
        assert_eq!(s.sprint_day, 1);
        assert_eq!(s.sprint_status, SprintHealth::Healthy);
        // No energy logged yet reads as a mean of 0.
        assert_eq!(s.burnout_risk, BurnoutRisk::High);
        assert_eq!(s.completion_rate, "0.0%");
    }

    #[test]
    fn counts_and_rate() {
        let clock = Arc::new(FixedClock::new(datetime!(2026-03-02 09:00 UTC)));
        let wt = Watchtower::in_memory(WatchConfig::default(), clock.clone());
        wt.tasks().add("Inbox zero", Category::Light).unwrap();
        wt.tasks().add("Deck", Category::Deep).unwrap();
        wt.tasks().add("Expenses", Category::Standard).unwrap();
        wt.complete("inbox").unwrap();
        wt.complete("deck").unwrap();
        for _ in 0..3 {
            wt.roll_forward("expenses").unwrap();
            clock.advance_days(1);
        }

        let s = data_summary(&wt).unwrap();
        assert_eq!(s.total_tasks, 3);
        assert_eq!(s.completed_tasks, 2);
        assert_eq!(s.active_tasks, 1);
        assert_eq!(s.avoided_tasks, 1);
        assert_eq!(s.daily_entries, 3);
        assert_eq!(s.completion_rate, "40.0%");
    }
}
