use std::path::{Path, PathBuf};

/// All well-known files under the data directory.
#[derive(Debug, Clone)]
pub struct WatchPaths {
    pub root: PathBuf,
    pub tasks_json: PathBuf,
    pub daily_json: PathBuf,
    pub sprint_json: PathBuf,
    pub sessions_json: PathBuf,
    pub config_json: PathBuf,
    pub sessions_dir: PathBuf,
}

impl WatchPaths {
    /// Derive all paths from a data directory. Pure computation, no I/O.
    pub fn discover(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            tasks_json: root.join("tasks.json"),
            daily_json: root.join("daily.json"),
            sprint_json: root.join("sprint.json"),
            sessions_json: root.join("sessions.json"),
            config_json: root.join("config.json"),
            sessions_dir: root.join("sessions"),
            root,
        }
    }

    /// Paths under [`crate::store_root`].
    pub fn default_root() -> Self {
        Self::discover(crate::store_root())
    }

    /// Create the data and sessions directories. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        for dir in [&self.root, &self.sessions_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_dir()
    }

    /// Lock file guarding a document: `<file>.lock` next to it.
    pub fn lock_path_for(doc: &Path) -> PathBuf {
        let mut name = doc
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".lock");
        doc.with_file_name(name)
    }
}
