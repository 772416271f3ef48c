use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use notify_debouncer_mini::notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use notify_debouncer_mini::notify::RecommendedWatcher;

use super::Handler;

/// Durable key-value capability: one shared mailbox slot per key. Only the
/// presenter writes; audience mirrors read. Writes are whole-value
/// overwrites, so readers never need a lock against partial updates. The
/// last written value doubles as recovery state for late joiners.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Invoke `handler` with the new value whenever `key` changes.
    fn watch(&self, key: &str, handler: Handler) -> Result<()>;
}

/// In-memory store with synchronous change notification. Test fake and
/// single-process default.
#[derive(Default, Clone)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    values: HashMap<String, String>,
    watchers: HashMap<String, Vec<Handler>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        Ok(inner.values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Watchers run inline; same re-entrancy constraint as the bus.
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        inner.values.insert(key.to_string(), value.to_string());
        if let Some(watchers) = inner.watchers.get(key) {
            for watcher in watchers {
                watcher(value);
            }
        }
        Ok(())
    }

    fn watch(&self, key: &str, handler: Handler) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("Store lock poisoned"))?;
        inner.watchers.entry(key.to_string()).or_default().push(handler);
        Ok(())
    }
}

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(250);

/// File-backed store: one JSON file per key under a session directory.
/// Cross-process siblings see writes via filesystem watching. Writes go
/// through a temp file plus rename so a watcher never reads a half-written
/// snapshot.
pub struct FileStore {
    dir: PathBuf,
    // Dropping a debouncer stops its watch thread, so they live here.
    debouncers: Mutex<Vec<Debouncer<RecommendedWatcher>>>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;
        Ok(Self {
            dir,
            debouncers: Mutex::new(Vec::new()),
        })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    fn watch(&self, key: &str, handler: Handler) -> Result<()> {
        let path = self.key_path(key);
        let watched = path.clone();
        let mut debouncer = new_debouncer(DEBOUNCE_WINDOW, move |result: DebounceEventResult| {
            let Ok(events) = result else { return };
            if events.iter().any(|e| e.path == watched) {
                if let Ok(contents) = fs::read_to_string(&watched) {
                    handler(&contents);
                }
            }
        })?;
        // Watch the directory: the key's file may not exist yet when an
        // audience window mounts before the presenter's first publish.
        debouncer
            .watcher()
            .watch(&self.dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", self.dir.display()))?;
        self.debouncers
            .lock()
            .map_err(|_| anyhow::anyhow!("Watcher lock poisoned"))?
            .push(debouncer);
        Ok(())
    }
}
