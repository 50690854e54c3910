//! Result types produced by the pattern analyzer.

use serde::{Deserialize, Serialize};

use crate::types::{Category, SprintHealth};

/// An active task rolled forward at least the avoidance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvoidancePattern {
    pub task_id: String,
    pub task_content: String,
    pub roll_count: u32,
    /// `YYYY-MM-DD` of the first roll-forward, or the creation date.
    pub first_rolled: String,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    /// `[06:00, 12:00)`
    Morning,
    /// `[12:00, 18:00)`
    Afternoon,
    /// `[18:00, 24:00) ∪ [00:00, 06:00)`
    Evening,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 3] = [DayPeriod::Morning, DayPeriod::Afternoon, DayPeriod::Evening];

    pub fn of_hour(hour: u8) -> Self {
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            _ => DayPeriod::Evening,
        }
    }
}

impl std::fmt::Display for DayPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayPeriod::Morning => write!(f, "morning"),
            DayPeriod::Afternoon => write!(f, "afternoon"),
            DayPeriod::Evening => write!(f, "evening"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyTrend {
    pub period: DayPeriod,
    /// Mean energy weight; exactly 0.0 when `sample_count == 0`.
    pub average_level: f64,
    pub sample_count: usize,
}

/// Active task counts per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBalance {
    pub deep: usize,
    pub standard: usize,
    pub light: usize,
    pub someday: usize,
}

impl CategoryBalance {
    pub fn bump(&mut self, category: Category) {
        match category {
            Category::Deep => self.deep += 1,
            Category::Standard => self.standard += 1,
            Category::Light => self.light += 1,
            Category::Someday => self.someday += 1,
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Deep => self.deep,
            Category::Standard => self.standard,
            Category::Light => self.light,
            Category::Someday => self.someday,
        }
    }

    pub fn total(&self) -> usize {
        self.deep + self.standard + self.light + self.someday
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnoutRisk {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for BurnoutRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BurnoutRisk::Low => write!(f, "low"),
            BurnoutRisk::Medium => write!(f, "medium"),
            BurnoutRisk::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub avoidance_patterns: Vec<AvoidancePattern>,
    pub energy_trends: Vec<EnergyTrend>,
    /// In `[0, 1]`; 0 when nothing was completed or rolled in the window.
    pub completion_rate: f64,
    pub category_balance: CategoryBalance,
    pub burnout_risk: BurnoutRisk,
}

/// Headline numbers across all stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_tasks: usize,
    pub active_tasks: usize,
    pub completed_tasks: usize,
    pub avoided_tasks: usize,
    pub daily_entries: usize,
    pub sprint_day: u32,
    pub sprint_status: SprintHealth,
    pub burnout_risk: BurnoutRisk,
    /// e.g. `"75.0%"`
    pub completion_rate: String,
}
