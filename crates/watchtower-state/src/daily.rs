use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use watchtower_core::clock::{date_in_window, format_date, format_hhmm, format_ts, parse_date, parse_ts};
use watchtower_core::{Clock, DailyEntry, DailyFile, EnergyLevel, EnergyReading, EntryUpdate};
use watchtower_store::{modify, DocStore};

use crate::sprint::SprintTracker;

/// One entry per local calendar day in `daily.json`, created on first touch.
#[derive(Clone)]
pub struct DailyStore {
    doc: Arc<dyn DocStore<DailyFile>>,
    sprint: SprintTracker,
    clock: Arc<dyn Clock>,
}

impl DailyStore {
    pub fn new(
        doc: Arc<dyn DocStore<DailyFile>>,
        sprint: SprintTracker,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { doc, sprint, clock }
    }

    pub fn today_key(&self) -> String {
        format_date(self.clock.today())
    }

    pub fn all(&self) -> BTreeMap<String, DailyEntry> {
        self.doc.load().entries
    }

    pub fn entry(&self, date: &str) -> Option<DailyEntry> {
        self.doc.load().entries.remove(date)
    }

    /// Entries whose date falls in the trailing `days` window ending now.
    pub fn recent_entries(&self, days: i64) -> Vec<DailyEntry> {
        let now = self.clock.now();
        self.all()
            .into_values()
            .filter(|e| parse_date(&e.date).is_some_and(|d| date_in_window(d, now, days)))
            .collect()
    }

    /// Today's entry, created with a sprint-day snapshot if absent.
    pub fn get_or_create_today(&self) -> Result<DailyEntry> {
        if let Some(entry) = self.entry(&self.today_key()) {
            return Ok(entry);
        }
        self.with_today(|entry| entry.clone())
    }

    /// Shallow-merge `update` into today's entry.
    pub fn update_today(&self, update: EntryUpdate) -> Result<DailyEntry> {
        self.with_today(|entry| {
            update.apply(entry);
            entry.clone()
        })
    }

    /// Append `[HH:MM] text` to today's field reports. Returns the stored line.
    pub fn add_field_report(&self, text: &str) -> Result<String> {
        let line = format!("[{}] {}", format_hhmm(self.clock.now()), text);
        let stored = line.clone();
        self.with_today(|entry| entry.field_reports.push(line))?;
        Ok(stored)
    }

    pub fn log_energy(&self, level: EnergyLevel, context: Option<String>) -> Result<EnergyReading> {
        let reading = EnergyReading {
            timestamp: format_ts(self.clock.now()),
            level,
            context,
        };
        let logged = reading.clone();
        self.with_today(|entry| entry.energy_readings.push(reading))?;
        tracing::debug!(level = %level, "energy logged");
        Ok(logged)
    }

    /// Readings from entries in the trailing `days` window, oldest first.
    pub fn recent_energy_readings(&self, days: i64) -> Vec<EnergyReading> {
        let mut readings: Vec<EnergyReading> = self
            .recent_entries(days)
            .into_iter()
            .flat_map(|e| e.energy_readings)
            .collect();
        readings.sort_by_cached_key(|r| parse_ts(&r.timestamp));
        readings
    }

    pub fn record_completion(&self, task_id: &str) -> Result<DailyEntry> {
        self.with_today(|entry| {
            entry.tasks_completed.push(task_id.to_string());
            entry.clone()
        })
    }

    pub fn record_roll_forward(&self, task_id: &str) -> Result<DailyEntry> {
        self.with_today(|entry| {
            entry.tasks_rolled_forward.push(task_id.to_string());
            entry.clone()
        })
    }

    /// Locked read-modify-write of today's entry, creating it first if needed.
    fn with_today<R>(&self, f: impl FnOnce(&mut DailyEntry) -> R) -> Result<R> {
        let today = self.today_key();
        // Lock order is daily -> sprint, so query the sprint before taking
        // our own lock only when the entry is still missing.
        let sprint_day = if self.doc.load().entries.contains_key(&today) {
            None
        } else {
            Some(self.sprint.status()?.current_day)
        };
        modify(&*self.doc, |file: &mut DailyFile| {
            let entry = file.entries.entry(today.clone()).or_insert_with(|| {
                tracing::debug!(date = %today, "daily entry created");
                // Entries are never deleted, so `None` only means it existed at the check.
                DailyEntry::new(today.clone(), sprint_day.unwrap_or_default())
            });
            f(entry)
        })
    }
}
