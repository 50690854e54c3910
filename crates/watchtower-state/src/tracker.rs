//! Wires the stores to one data directory and composes the operations
//! callers actually perform: completing or rolling a card also records it
//! against today's entry.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use watchtower_core::{
    Clock, DailyFile, SessionFile, SprintState, SystemClock, Task, TaskFile, WatchConfig,
    AVOIDANCE_THRESHOLD,
};
use watchtower_store::{load_config, DocStore, JsonFile, MemoryDoc, WatchPaths};

use crate::{DailyStore, SessionTracker, SprintTracker, TaskStore};

#[derive(Debug, Clone, PartialEq)]
pub enum CompleteOutcome {
    Completed(Task),
    AlreadyCompleted(Task),
    NotFound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RollOutcome {
    /// `avoided` is set once the task reaches the avoidance threshold.
    Rolled { task: Task, avoided: bool },
    AlreadyCompleted(Task),
    NotFound,
}

#[derive(Clone)]
pub struct Watchtower {
    config: WatchConfig,
    clock: Arc<dyn Clock>,
    tasks: TaskStore,
    daily: DailyStore,
    sprint: SprintTracker,
    sessions: SessionTracker,
}

impl Watchtower {
    /// Open file-backed stores under `root`. `config` is assumed validated.
    pub fn open(root: impl Into<PathBuf>, config: WatchConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let paths = WatchPaths::discover(root);
        paths.ensure_layout()?;
        Ok(Self::assemble(
            config,
            clock,
            Arc::new(JsonFile::<TaskFile>::new(&paths.tasks_json)),
            Arc::new(JsonFile::<DailyFile>::new(&paths.daily_json)),
            Arc::new(JsonFile::<SprintState>::new(&paths.sprint_json)),
            Arc::new(JsonFile::<SessionFile>::new(&paths.sessions_json)),
        ))
    }

    /// Open the per-user data dir with its `config.json` and the system clock.
    pub fn open_default() -> Result<Self> {
        let paths = WatchPaths::default_root();
        paths.ensure_layout()?;
        let config = load_config(&paths.config_json)?;
        Self::open(paths.root, config, Arc::new(SystemClock))
    }

    /// Stores kept in process memory only.
    pub fn in_memory(config: WatchConfig, clock: Arc<dyn Clock>) -> Self {
        Self::assemble(
            config,
            clock,
            Arc::new(MemoryDoc::<TaskFile>::new()),
            Arc::new(MemoryDoc::<DailyFile>::new()),
            Arc::new(MemoryDoc::<SprintState>::new()),
            Arc::new(MemoryDoc::<SessionFile>::new()),
        )
    }

    fn assemble(
        config: WatchConfig,
        clock: Arc<dyn Clock>,
        tasks: Arc<dyn DocStore<TaskFile>>,
        daily: Arc<dyn DocStore<DailyFile>>,
        sprint: Arc<dyn DocStore<SprintState>>,
        sessions: Arc<dyn DocStore<SessionFile>>,
    ) -> Self {
        let sprint = SprintTracker::new(sprint, config.sprint.clone(), clock.clone());
        Self {
            tasks: TaskStore::new(tasks, clock.clone()),
            daily: DailyStore::new(daily, sprint.clone(), clock.clone()),
            sessions: SessionTracker::new(sessions, clock.clone()),
            sprint,
            config,
            clock,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn daily(&self) -> &DailyStore {
        &self.daily
    }

    pub fn sprint(&self) -> &SprintTracker {
        &self.sprint
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// Complete the task matching `identifier` (id or content) and record it
    /// on today's entry.
    pub fn complete(&self, identifier: &str) -> Result<CompleteOutcome> {
        let Some(task) = self.tasks.find(identifier) else {
            return Ok(CompleteOutcome::NotFound);
        };
        if task.is_completed() {
            return Ok(CompleteOutcome::AlreadyCompleted(task));
        }
        let Some(done) = self.tasks.complete(&task.id)? else {
            return Ok(CompleteOutcome::NotFound);
        };
        self.daily.record_completion(&done.id)?;
        Ok(CompleteOutcome::Completed(done))
    }

    /// Roll the task matching `identifier` forward and record it on today's
    /// entry.
    pub fn roll_forward(&self, identifier: &str) -> Result<RollOutcome> {
        let Some(task) = self.tasks.find(identifier) else {
            return Ok(RollOutcome::NotFound);
        };
        if task.is_completed() {
            return Ok(RollOutcome::AlreadyCompleted(task));
        }
        let Some(rolled) = self.tasks.roll_forward(&task.id)? else {
            return Ok(RollOutcome::NotFound);
        };
        self.daily.record_roll_forward(&rolled.id)?;
        let avoided = rolled.roll_forward_count >= AVOIDANCE_THRESHOLD;
        if avoided {
            tracing::debug!(task_id = %rolled.id, rolls = rolled.roll_forward_count, "avoidance pattern");
        }
        Ok(RollOutcome::Rolled {
            task: rolled,
            avoided,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use watchtower_core::{Category, FixedClock};

    fn wt() -> (Watchtower, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(datetime!(2026-03-02 10:00 UTC)));
        (Watchtower::in_memory(WatchConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn complete_by_content_records_on_today() {
        let (wt, _) = wt();
        let t = wt.tasks().add("Write report", Category::Deep).unwrap();
        match wt.complete("write REPORT").unwrap() {
            CompleteOutcome::Completed(done) => assert_eq!(done.id, t.id),
            other => panic!("unexpected {other:?}"),
        }
        let entry = wt.daily().get_or_create_today().unwrap();
        assert_eq!(entry.tasks_completed, vec![t.id.clone()]);

        assert!(matches!(
            wt.complete(&t.id).unwrap(),
            CompleteOutcome::AlreadyCompleted(_)
        ));
        assert_eq!(wt.daily().get_or_create_today().unwrap().tasks_completed.len(), 1);
    }

    #[test]
    fn roll_forward_flags_avoidance_on_third_day() {
        let (wt, clock) = wt();
        let t = wt.tasks().add("Taxes", Category::Deep).unwrap();
        let mut flags = Vec::new();
        for _ in 0..3 {
            match wt.roll_forward("taxes").unwrap() {
                RollOutcome::Rolled { avoided, .. } => flags.push(avoided),
                other => panic!("unexpected {other:?}"),
            }
            clock.advance_days(1);
        }
        assert_eq!(flags, vec![false, false, true]);
        assert_eq!(wt.daily().all().len(), 3);
        assert_eq!(wt.tasks().get(&t.id).unwrap().roll_forward_count, 3);
    }

    #[test]
    fn unknown_identifier_is_not_found() {
        let (wt, _) = wt();
        assert_eq!(wt.complete("nope").unwrap(), CompleteOutcome::NotFound);
        assert_eq!(wt.roll_forward("nope").unwrap(), RollOutcome::NotFound);
        assert!(wt.daily().all().is_empty());
    }

    #[test]
    fn open_lays_out_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(datetime!(2026-03-02 10:00 UTC)));
        let root = tmp.path().join("wt");
        let wt = Watchtower::open(&root, WatchConfig::default(), clock).unwrap();
        wt.tasks().add("Plan", Category::Light).unwrap();
        wt.daily().log_energy(watchtower_core::EnergyLevel::High, None).unwrap();
        assert!(root.join("tasks.json").is_file());
        assert!(root.join("daily.json").is_file());
        assert!(root.join("sprint.json").is_file());
        assert!(root.join("sessions").is_dir());
    }
}
