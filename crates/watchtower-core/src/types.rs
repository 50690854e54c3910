use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

// ── Categories ──

/// Task category, ordered by the energy a task demands (not by priority).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Deep,
    #[default]
    Standard,
    Light,
    Someday,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Deep,
        Category::Standard,
        Category::Light,
        Category::Someday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Deep => "deep",
            Category::Standard => "standard",
            Category::Light => "light",
            Category::Someday => "someday",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deep" => Ok(Category::Deep),
            "standard" => Ok(Category::Standard),
            "light" => Ok(Category::Light),
            "someday" => Ok(Category::Someday),
            _ => Err(ConfigError::UnknownCategory(s.to_string())),
        }
    }
}

// ── Tasks ──

/// Note prefix written by every roll-forward; followed by `YYYY-MM-DD`.
pub const ROLL_NOTE_PREFIX: &str = "Rolled forward on ";

/// Default roll count at which an active task counts as avoided.
pub const AVOIDANCE_THRESHOLD: u32 = 3;

/// A unit of work written on an index card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub category: Category,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub roll_forward_count: u32,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        !self.is_completed()
    }

    /// Active and rolled forward at least `min_roll_count` times.
    pub fn is_avoided(&self, min_roll_count: u32) -> bool {
        self.is_active() && self.roll_forward_count >= min_roll_count
    }

    /// Date of the earliest roll-forward note, if any.
    pub fn first_rolled_date(&self) -> Option<&str> {
        self.notes
            .iter()
            .find_map(|n| n.strip_prefix(ROLL_NOTE_PREFIX))
            .map(str::trim)
    }
}

/// On-disk shape of `tasks.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskFile {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

// ── Energy ──

/// Self-assessed capacity. Weights are fixed: high=5 … recovery=1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyLevel {
    High,
    Medium,
    Low,
    Depleted,
    Recovery,
}

impl EnergyLevel {
    pub fn weight(self) -> u8 {
        match self {
            EnergyLevel::High => 5,
            EnergyLevel::Medium => 4,
            EnergyLevel::Low => 3,
            EnergyLevel::Depleted => 2,
            EnergyLevel::Recovery => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnergyLevel::High => "high",
            EnergyLevel::Medium => "medium",
            EnergyLevel::Low => "low",
            EnergyLevel::Depleted => "depleted",
            EnergyLevel::Recovery => "recovery",
        }
    }
}

impl std::fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnergyLevel {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(EnergyLevel::High),
            "medium" => Ok(EnergyLevel::Medium),
            "low" => Ok(EnergyLevel::Low),
            "depleted" => Ok(EnergyLevel::Depleted),
            "recovery" => Ok(EnergyLevel::Recovery),
            _ => Err(ConfigError::UnknownEnergyLevel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    pub timestamp: String,
    pub level: EnergyLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

// ── Daily entries ──

/// One record per local calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    pub date: String,
    /// Sprint counter as of the entry's creation. Never updated afterwards.
    pub sprint_day: u32,
    #[serde(default)]
    pub energy_readings: Vec<EnergyReading>,
    #[serde(default)]
    pub tasks_completed: Vec<String>,
    #[serde(default)]
    pub tasks_rolled_forward: Vec<String>,
    #[serde(default)]
    pub field_reports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub briefing: Option<String>,
}

impl DailyEntry {
    pub fn new(date: impl Into<String>, sprint_day: u32) -> Self {
        Self {
            date: date.into(),
            sprint_day,
            energy_readings: Vec::new(),
            tasks_completed: Vec::new(),
            tasks_rolled_forward: Vec::new(),
            field_reports: Vec::new(),
            briefing: None,
        }
    }
}

/// Partial update merged into an entry field by field.
/// `date` and `sprint_day` are not updatable.
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub energy_readings: Option<Vec<EnergyReading>>,
    pub tasks_completed: Option<Vec<String>>,
    pub tasks_rolled_forward: Option<Vec<String>>,
    pub field_reports: Option<Vec<String>>,
    pub briefing: Option<Option<String>>,
}

impl EntryUpdate {
    pub fn apply(self, entry: &mut DailyEntry) {
        if let Some(v) = self.energy_readings {
            entry.energy_readings = v;
        }
        if let Some(v) = self.tasks_completed {
            entry.tasks_completed = v;
        }
        if let Some(v) = self.tasks_rolled_forward {
            entry.tasks_rolled_forward = v;
        }
        if let Some(v) = self.field_reports {
            entry.field_reports = v;
        }
        if let Some(v) = self.briefing {
            entry.briefing = v;
        }
    }
}

/// On-disk shape of `daily.json`, keyed by `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyFile {
    #[serde(default)]
    pub entries: BTreeMap<String, DailyEntry>,
}

// ── Sprint ──

/// Persisted sprint counter (`sprint.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintState {
    pub current_day: u32,
    pub start_date: String,
    pub last_work_day: String,
    #[serde(default)]
    pub rest_days: Vec<String>,
}

impl SprintState {
    /// A fresh sprint starting on `today`.
    pub fn starting(today: &str) -> Self {
        Self {
            current_day: 1,
            start_date: today.to_string(),
            last_work_day: today.to_string(),
            rest_days: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SprintHealth {
    Healthy,
    Warning,
    Danger,
}

impl std::fmt::Display for SprintHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SprintHealth::Healthy => write!(f, "healthy"),
            SprintHealth::Warning => write!(f, "warning"),
            SprintHealth::Danger => write!(f, "danger"),
        }
    }
}

/// Derived sprint view returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SprintStatus {
    pub current_day: u32,
    pub start_date: String,
    pub status: SprintHealth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_rest_day: Option<String>,
}

// ── Sessions ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    Briefing,
    Card,
    Energy,
    Accountability,
    General,
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::Briefing => write!(f, "briefing"),
            SessionType::Card => write!(f, "card"),
            SessionType::Energy => write!(f, "energy"),
            SessionType::Accountability => write!(f, "accountability"),
            SessionType::General => write!(f, "general"),
        }
    }
}

impl std::str::FromStr for SessionType {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "briefing" => Ok(SessionType::Briefing),
            "card" => Ok(SessionType::Card),
            "energy" => Ok(SessionType::Energy),
            "accountability" => Ok(SessionType::Accountability),
            "general" => Ok(SessionType::General),
            _ => Err(ConfigError::UnknownSessionType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub started_at: String,
    pub last_activity: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Map<String, serde_json::Value>>,
}

/// On-disk shape of `sessions.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_session: Option<Session>,
    #[serde(default)]
    pub history: Vec<Session>,
}
