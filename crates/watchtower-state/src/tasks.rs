use std::sync::Arc;

use anyhow::Result;
use watchtower_core::clock::{format_date, format_ts};
use watchtower_core::id::new_task_id;
use watchtower_core::{Category, Clock, Task, TaskFile, ROLL_NOTE_PREFIX};
use watchtower_store::{modify, DocStore};

/// CRUD over `tasks.json`. Tasks are never deleted, only completed.
#[derive(Clone)]
pub struct TaskStore {
    doc: Arc<dyn DocStore<TaskFile>>,
    clock: Arc<dyn Clock>,
}

impl TaskStore {
    pub fn new(doc: Arc<dyn DocStore<TaskFile>>, clock: Arc<dyn Clock>) -> Self {
        Self { doc, clock }
    }

    pub fn all(&self) -> Vec<Task> {
        self.doc.load().tasks
    }

    pub fn active(&self) -> Vec<Task> {
        self.all().into_iter().filter(Task::is_active).collect()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.all().into_iter().find(|t| t.id == id)
    }

    /// Exact id match first, then the first task whose content contains
    /// `identifier` (case-insensitive).
    pub fn find(&self, identifier: &str) -> Option<Task> {
        let tasks = self.all();
        if let Some(t) = tasks.iter().find(|t| t.id == identifier) {
            return Some(t.clone());
        }
        let needle = identifier.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        tasks
            .into_iter()
            .find(|t| t.content.to_lowercase().contains(&needle))
    }

    pub fn add(&self, content: &str, category: Category) -> Result<Task> {
        self.add_with_notes(content, category, Vec::new())
    }

    pub fn add_with_notes(
        &self,
        content: &str,
        category: Category,
        notes: Vec<String>,
    ) -> Result<Task> {
        let now = format_ts(self.clock.now());
        let task = Task {
            id: new_task_id(),
            content: content.to_string(),
            category,
            created_at: now.clone(),
            completed_at: None,
            roll_forward_count: 0,
            notes,
        };
        let created = task.clone();
        modify(&*self.doc, |file: &mut TaskFile| {
            file.tasks.push(task);
            file.last_updated = Some(now);
        })?;
        tracing::debug!(task_id = %created.id, category = %category, "task added");
        Ok(created)
    }

    /// Mark a task completed. Completion is terminal: a second call returns
    /// the task unchanged, keeping the first `completed_at`.
    pub fn complete(&self, id: &str) -> Result<Option<Task>> {
        let now = format_ts(self.clock.now());
        self.mutate(id, |task| {
            if task.is_completed() {
                return false;
            }
            task.completed_at = Some(now.clone());
            true
        })
    }

    /// Count one more day carried forward and note the date.
    /// Completed tasks are returned unchanged.
    pub fn roll_forward(&self, id: &str) -> Result<Option<Task>> {
        let today = format_date(self.clock.today());
        self.mutate(id, |task| {
            if task.is_completed() {
                tracing::warn!(task_id = %task.id, "refusing to roll forward a completed task");
                return false;
            }
            task.roll_forward_count += 1;
            task.notes.push(format!("{ROLL_NOTE_PREFIX}{today}"));
            true
        })
    }

    /// Active tasks in `category`.
    pub fn by_category(&self, category: Category) -> Vec<Task> {
        self.all()
            .into_iter()
            .filter(|t| t.is_active() && t.category == category)
            .collect()
    }

    /// Active tasks rolled forward at least `min_roll_count` times.
    pub fn avoided(&self, min_roll_count: u32) -> Vec<Task> {
        self.all()
            .into_iter()
            .filter(|t| t.is_avoided(min_roll_count))
            .collect()
    }

    /// Apply `f` to the task with `id` under the document lock.
    /// `f` returns whether it changed anything.
    fn mutate(&self, id: &str, f: impl FnOnce(&mut Task) -> bool) -> Result<Option<Task>> {
        let now = format_ts(self.clock.now());
        modify(&*self.doc, |file: &mut TaskFile| {
            let task = file.tasks.iter_mut().find(|t| t.id == id)?;
            if f(task) {
                let out = task.clone();
                file.last_updated = Some(now);
                Some(out)
            } else {
                Some(task.clone())
            }
        })
    }
}
