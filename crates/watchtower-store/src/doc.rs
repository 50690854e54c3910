//! Whole-document persistence.
//!
//! Every store keeps one JSON document and rewrites it in full on each
//! mutation. [`modify`] holds the document's exclusive lock across the
//! load → mutate → save cycle so concurrent writers serialize instead of
//! losing updates.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::paths::WatchPaths;
use crate::{lock_file, write_atomic, LockGuard};

/// Guard returned by [`DocStore::lock`]; the document is exclusively held
/// until it drops.
#[derive(Debug)]
pub enum DocGuard<'a> {
    File(LockGuard),
    Memory(MutexGuard<'a, ()>),
}

/// Injectable persistence for a single document.
pub trait DocStore<T>: Send + Sync {
    /// Current document, or `None` when it is missing or unreadable.
    /// Never errors: callers substitute their default structure.
    fn try_load(&self) -> Option<T>;

    fn save(&self, doc: &T) -> anyhow::Result<()>;

    /// Exclusive access for a read-modify-write cycle.
    fn lock(&self) -> anyhow::Result<DocGuard<'_>>;

    fn load(&self) -> T
    where
        T: Default,
    {
        self.try_load().unwrap_or_default()
    }
}

/// Locked read-modify-write, starting from `init()` when the document is
/// missing or unreadable.
pub fn modify_with<T, R, S: DocStore<T> + ?Sized>(
    store: &S,
    init: impl FnOnce() -> T,
    f: impl FnOnce(&mut T) -> R,
) -> anyhow::Result<R> {
    let _guard = store.lock()?;
    let mut doc = store.try_load().unwrap_or_else(init);
    let out = f(&mut doc);
    store.save(&doc)?;
    Ok(out)
}

/// [`modify_with`] starting from `T::default()`.
pub fn modify<T: Default, R, S: DocStore<T> + ?Sized>(
    store: &S,
    f: impl FnOnce(&mut T) -> R,
) -> anyhow::Result<R> {
    modify_with(store, T::default, f)
}

// ── JSON file ──

/// A document stored as pretty JSON at `path`, locked via `<path>.lock`.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    lock_path: PathBuf,
    _doc: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            lock_path: WatchPaths::lock_path_for(&path),
            path,
            _doc: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T: Serialize + DeserializeOwned> DocStore<T> for JsonFile<T> {
    fn try_load(&self) -> Option<T> {
        if !self.path.exists() {
            return None;
        }
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable document, starting fresh");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt document, starting fresh");
                None
            }
        }
    }

    fn save(&self, doc: &T) -> anyhow::Result<()> {
        let data = serde_json::to_string_pretty(doc)?;
        write_atomic(&self.path, data.as_bytes())
            .with_context(|| format!("saving {}", self.path.display()))
    }

    fn lock(&self) -> anyhow::Result<DocGuard<'_>> {
        let guard = lock_file(&self.lock_path)
            .with_context(|| format!("locking {}", self.lock_path.display()))?;
        Ok(DocGuard::File(guard))
    }
}

// ── In memory ──

/// An in-process document. Cloned on load and save.
#[derive(Debug, Default)]
pub struct MemoryDoc<T> {
    doc: Mutex<Option<T>>,
    write: Mutex<()>,
}

impl<T> MemoryDoc<T> {
    pub fn new() -> Self {
        Self {
            doc: Mutex::new(None),
            write: Mutex::new(()),
        }
    }

    pub fn with(doc: T) -> Self {
        Self {
            doc: Mutex::new(Some(doc)),
            write: Mutex::new(()),
        }
    }
}

impl<T: Clone + Send> DocStore<T> for MemoryDoc<T> {
    fn try_load(&self) -> Option<T> {
        self.doc.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn save(&self, doc: &T) -> anyhow::Result<()> {
        *self.doc.lock().unwrap_or_else(|e| e.into_inner()) = Some(doc.clone());
        Ok(())
    }

    fn lock(&self) -> anyhow::Result<DocGuard<'_>> {
        Ok(DocGuard::Memory(
            self.write.lock().unwrap_or_else(|e| e.into_inner()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Counter {
        n: u32,
    }

    #[test]
    fn missing_file_loads_default() {
        let tmp = tempfile::tempdir().unwrap();
        let doc: JsonFile<Counter> = JsonFile::new(tmp.path().join("counter.json"));
        assert!(doc.try_load().is_none());
        assert_eq!(doc.load(), Counter::default());
    }

    #[test]
    fn corrupt_file_fails_open() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("counter.json");
        std::fs::write(&path, "{ not json").unwrap();
        let doc: JsonFile<Counter> = JsonFile::new(&path);
        assert!(doc.try_load().is_none());
        assert_eq!(doc.load(), Counter::default());
    }

    #[test]
    fn modify_persists_changes() {
        let tmp = tempfile::tempdir().unwrap();
        let doc: JsonFile<Counter> = JsonFile::new(tmp.path().join("counter.json"));
        let n = modify(&doc, |c: &mut Counter| {
            c.n += 1;
            c.n
        })
        .unwrap();
        assert_eq!(n, 1);
        modify(&doc, |c: &mut Counter| c.n += 1).unwrap();
        assert_eq!(doc.load().n, 2);
        assert!(tmp.path().join("counter.json.lock").exists());
    }

    #[test]
    fn modify_with_uses_init_when_missing() {
        let doc: MemoryDoc<Counter> = MemoryDoc::new();
        modify_with(&doc, || Counter { n: 10 }, |c: &mut Counter| c.n += 1).unwrap();
        assert_eq!(doc.try_load(), Some(Counter { n: 11 }));
    }

    #[test]
    fn concurrent_modify_loses_no_updates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("counter.json");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let doc: JsonFile<Counter> = JsonFile::new(path);
                    for _ in 0..10 {
                        modify(&doc, |c: &mut Counter| c.n += 1).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let doc: JsonFile<Counter> = JsonFile::new(&path);
        assert_eq!(doc.load().n, 40);
    }
}
