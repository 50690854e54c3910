//! Derived analytics. Nothing here is persisted: every call recomputes from
//! the current tasks, daily entries and sprint status.

use anyhow::Result;
use watchtower_core::clock::{format_date, parse_ts};
use watchtower_core::{
    AvoidancePattern, BurnoutRisk, CategoryBalance, DailyEntry, DayPeriod, EnergyReading,
    EnergyTrend, PatternAnalysis, SprintHealth, SprintStatus, Task, AVOIDANCE_THRESHOLD,
};
use watchtower_state::Watchtower;

/// Trailing window (days) for energy, completion and burnout figures.
pub const ANALYSIS_WINDOW_DAYS: i64 = 7;

/// Mean energy below this is high burnout risk.
const HIGH_RISK_ENERGY: f64 = 2.5;
/// Mean energy below this is medium burnout risk.
const MEDIUM_RISK_ENERGY: f64 = 3.5;

/// Run the full analysis against the current stores.
pub fn analyze_patterns(wt: &Watchtower) -> Result<PatternAnalysis> {
    let sprint = wt.sprint().status()?;
    let tasks = wt.tasks().all();
    let entries = wt.daily().recent_entries(ANALYSIS_WINDOW_DAYS);
    let readings = wt.daily().recent_energy_readings(ANALYSIS_WINDOW_DAYS);
    let analysis = analyze(&tasks, &entries, &readings, &sprint);
    tracing::debug!(
        avoided = analysis.avoidance_patterns.len(),
        risk = %analysis.burnout_risk,
        "patterns analyzed"
    );
    Ok(analysis)
}

/// Pure analysis over already-windowed entries and readings.
pub fn analyze(
    tasks: &[Task],
    recent_entries: &[DailyEntry],
    recent_readings: &[EnergyReading],
    sprint: &SprintStatus,
) -> PatternAnalysis {
    PatternAnalysis {
        avoidance_patterns: avoidance_patterns(tasks),
        energy_trends: energy_trends(recent_readings),
        completion_rate: completion_rate(recent_entries),
        category_balance: category_balance(tasks),
        burnout_risk: burnout_risk(sprint.status, recent_readings),
    }
}

pub fn avoidance_patterns(tasks: &[Task]) -> Vec<AvoidancePattern> {
    tasks
        .iter()
        .filter(|t| t.is_avoided(AVOIDANCE_THRESHOLD))
        .map(|t| AvoidancePattern {
            task_id: t.id.clone(),
            task_content: t.content.clone(),
            roll_count: t.roll_forward_count,
            first_rolled: first_rolled(t),
            category: t.category,
        })
        .collect()
}

fn first_rolled(task: &Task) -> String {
    if let Some(date) = task.first_rolled_date() {
        return date.to_string();
    }
    parse_ts(&task.created_at)
        .map(|ts| format_date(ts.date()))
        .unwrap_or_else(|| task.created_at.clone())
}

/// Mean of the fixed level weights; 0.0 for no readings.
pub fn average_energy<'a>(readings: impl IntoIterator<Item = &'a EnergyReading>) -> f64 {
    let (sum, n) = readings
        .into_iter()
        .fold((0u32, 0u32), |(sum, n), r| (sum + u32::from(r.level.weight()), n + 1));
    if n == 0 {
        0.0
    } else {
        f64::from(sum) / f64::from(n)
    }
}

/// Morning, afternoon and evening buckets by the reading's local hour.
/// Readings with an unparsable timestamp fall in no bucket.
pub fn energy_trends(readings: &[EnergyReading]) -> Vec<EnergyTrend> {
    let with_period: Vec<(DayPeriod, &EnergyReading)> = readings
        .iter()
        .filter_map(|r| parse_ts(&r.timestamp).map(|ts| (DayPeriod::of_hour(ts.hour()), r)))
        .collect();
    DayPeriod::ALL
        .iter()
        .map(|&period| {
            let bucket: Vec<&EnergyReading> = with_period
                .iter()
                .filter(|(p, _)| *p == period)
                .map(|(_, r)| *r)
                .collect();
            EnergyTrend {
                period,
                average_level: average_energy(bucket.iter().copied()),
                sample_count: bucket.len(),
            }
        })
        .collect()
}

/// completed / (completed + rolled) across the entries; 0.0 if both are 0.
pub fn completion_rate(entries: &[DailyEntry]) -> f64 {
    let completed: usize = entries.iter().map(|e| e.tasks_completed.len()).sum();
    let rolled: usize = entries.iter().map(|e| e.tasks_rolled_forward.len()).sum();
    let total = completed + rolled;
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

pub fn category_balance(tasks: &[Task]) -> CategoryBalance {
    let mut balance = CategoryBalance::default();
    for t in tasks.iter().filter(|t| t.is_active()) {
        balance.bump(t.category);
    }
    balance
}

/// High tier first: sprint danger or low mean energy; then warning or
/// middling energy. No readings means a mean of 0.
pub fn burnout_risk(sprint: SprintHealth, recent_readings: &[EnergyReading]) -> BurnoutRisk {
    let energy = average_energy(recent_readings);

    if sprint == SprintHealth::Danger || energy < HIGH_RISK_ENERGY {
        BurnoutRisk::High
    } else if sprint == SprintHealth::Warning || energy < MEDIUM_RISK_ENERGY {
        BurnoutRisk::Medium
    } else {
        BurnoutRisk::Low
    }
}
