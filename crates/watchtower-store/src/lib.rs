pub mod config_file;
pub mod doc;
pub mod paths;

pub use config_file::{load_config, reset_config, save_config, update_config};
pub use doc::{modify, modify_with, DocGuard, DocStore, JsonFile, MemoryDoc};
pub use paths::WatchPaths;

use fs2::FileExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "WATCHTOWER_HOME";

/// Return the per-user data root.
/// `$WATCHTOWER_HOME` if set, else `~/.watchtower/`.
/// Windows: `%APPDATA%\.watchtower\` (falls back to `%USERPROFILE%\.watchtower\`)
pub fn store_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    #[cfg(windows)]
    let base = dirs::data_dir().or_else(dirs::home_dir);
    #[cfg(not(windows))]
    let base = dirs::home_dir();
    match base {
        Some(dir) => dir.join(".watchtower"),
        None => PathBuf::from(".watchtower"),
    }
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// File-based exclusive lock guard. Released on drop.
#[derive(Debug)]
pub struct LockGuard {
    _file: fs::File,
}

/// Acquire an exclusive file lock, blocking until it is free.
/// Creates the lock file if needed.
pub fn lock_file(path: &Path) -> anyhow::Result<LockGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(LockGuard { _file: file })
}
