//! User configuration. File I/O lives in `watchtower-store`; this module holds
//! the schema, defaults, validation and the JSON deep merge used by partial
//! updates.

use serde::{Deserialize, Serialize};

use crate::types::Category;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sprint.warning_day ({warning}) must be below sprint.danger_day ({danger})")]
    ThresholdOrder { warning: u32, danger: u32 },
    #[error("sprint thresholds must be at least 1 (warning_day={warning}, danger_day={danger})")]
    ThresholdZero { warning: u32, danger: u32 },
    #[error("energy window {start}-{end} must satisfy start < end <= 23")]
    WindowHour { start: u8, end: u8 },
    #[error("unknown category: {0}. Expected: deep, standard, light, someday")]
    UnknownCategory(String),
    #[error("unknown energy level: {0}. Expected: high, medium, low, depleted, recovery")]
    UnknownEnergyLevel(String),
    #[error("unknown session type: {0}. Expected: briefing, card, energy, accountability, general")]
    UnknownSessionType(String),
}

// ── Sections ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SprintThresholds {
    pub warning_day: u32,
    pub danger_day: u32,
}

impl Default for SprintThresholds {
    fn default() -> Self {
        Self {
            warning_day: 14,
            danger_day: 21,
        }
    }
}

/// Display labels per category. Presentation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryNames {
    pub deep: String,
    pub standard: String,
    pub light: String,
    pub someday: String,
}

impl Default for CategoryNames {
    fn default() -> Self {
        Self {
            deep: "Deep Work Forging".into(),
            standard: "Standard Forge Work".into(),
            light: "Light Smithing".into(),
            someday: "The Anvil Awaits".into(),
        }
    }
}

/// Names of the synced documents (daily hub, task pool, journey tracker).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentNames {
    pub daily: String,
    pub tasks: String,
    pub journey: String,
}

impl Default for DocumentNames {
    fn default() -> Self {
        Self {
            daily: "The Watchtower".into(),
            tasks: "The Forge".into(),
            journey: "The Long Road".into(),
        }
    }
}

/// A peak-productivity window, `start <= hour < end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyWindow {
    pub start: u8,
    pub end: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl EnergyWindow {
    fn new(start: u8, end: u8, label: &str) -> Self {
        Self {
            start,
            end,
            label: Some(label.to_string()),
        }
    }

    pub fn contains(&self, hour: u8) -> bool {
        self.start <= hour && hour < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleSettings {
    pub health: bool,
    pub weekly_review: bool,
    pub deep_work_sessions: bool,
}

impl Default for ModuleSettings {
    fn default() -> Self {
        Self {
            health: false,
            weekly_review: true,
            deep_work_sessions: true,
        }
    }
}

fn default_energy_windows() -> Vec<EnergyWindow> {
    vec![
        EnergyWindow::new(9, 13, "Morning Focus"),
        EnergyWindow::new(15, 18, "Afternoon Drive"),
        EnergyWindow::new(20, 22, "Evening Flow"),
    ]
}

// ── Top level ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub documents: DocumentNames,
    pub energy_windows: Vec<EnergyWindow>,
    pub categories: CategoryNames,
    pub sprint: SprintThresholds,
    pub modules: ModuleSettings,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            documents: DocumentNames::default(),
            energy_windows: default_energy_windows(),
            categories: CategoryNames::default(),
            sprint: SprintThresholds::default(),
            modules: ModuleSettings::default(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let SprintThresholds {
            warning_day,
            danger_day,
        } = self.sprint;
        if warning_day == 0 || danger_day == 0 {
            return Err(ConfigError::ThresholdZero {
                warning: warning_day,
                danger: danger_day,
            });
        }
        if warning_day >= danger_day {
            return Err(ConfigError::ThresholdOrder {
                warning: warning_day,
                danger: danger_day,
            });
        }
        for w in &self.energy_windows {
            if w.start >= w.end || w.end > 23 {
                return Err(ConfigError::WindowHour {
                    start: w.start,
                    end: w.end,
                });
            }
        }
        Ok(())
    }

    pub fn category_label(&self, category: Category) -> &str {
        match category {
            Category::Deep => &self.categories.deep,
            Category::Standard => &self.categories.standard,
            Category::Light => &self.categories.light,
            Category::Someday => &self.categories.someday,
        }
    }

    /// First configured energy window containing `hour`.
    pub fn peak_window(&self, hour: u8) -> Option<&EnergyWindow> {
        self.energy_windows.iter().find(|w| w.contains(hour))
    }

    /// Deep-merge a partial JSON object into this config and validate the result.
    pub fn merged(&self, updates: &serde_json::Value) -> anyhow::Result<Self> {
        let mut base = serde_json::to_value(self)?;
        deep_merge(&mut base, updates);
        let merged: WatchConfig = serde_json::from_value(base)?;
        merged.validate()?;
        Ok(merged)
    }
}

/// Objects merge key by key; any other value replaces the target.
pub fn deep_merge(base: &mut serde_json::Value, updates: &serde_json::Value) {
    match (base, updates) {
        (serde_json::Value::Object(b), serde_json::Value::Object(u)) => {
            for (k, v) in u {
                if let Some(slot) = b.get_mut(k) {
                    if slot.is_object() && v.is_object() {
                        deep_merge(slot, v);
                        continue;
                    }
                }
                b.insert(k.clone(), v.clone());
            }
        }
        (b, u) => *b = u.clone(),
    }
}
