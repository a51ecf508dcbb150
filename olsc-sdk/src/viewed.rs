//! Viewer-side notification dedup cache.
//!
//! Decides, once per viewer, whether a candidate event animation has
//! already been surfaced. State is a per-match set of event identifiers
//! persisted through an injected [`KeyValueStore`]; nothing else in the
//! system reads or writes it. Entries untouched for
//! [`VIEWED_RETENTION`] are purged opportunistically on each access.
//!
//! Two concurrent writers over the same store (two tabs of one viewer)
//! may lose an update; showing an animation twice in that case is an
//! accepted degraded outcome.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

/// Events older than this are never surfaced, even when unseen.
pub const DEDUP_WINDOW: time::Duration = time::Duration::minutes(5);

/// Viewed-set entries untouched for this long are garbage collected.
pub const VIEWED_RETENTION: time::Duration = time::Duration::days(7);

/// Key under which the viewed set is persisted in the backing store.
const STORAGE_KEY: &str = "olsc_viewed_animations";

/// Errors from the backing key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Narrow persistence interface the cache is built on.
///
/// Implementations are viewer-local (a file next to the app, an
/// in-memory map in tests); there is no cross-viewer contention.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct MatchEntry {
    identifiers: Vec<String>,
    /// Unix seconds of the last write, used for garbage collection.
    updated_at: i64,
}

type ViewedMap = BTreeMap<String, MatchEntry>;

/// The per-viewer record of already-shown event notifications.
pub struct ViewedAnimations<S> {
    store: S,
}

impl<S: KeyValueStore> ViewedAnimations<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Build a stable identifier for a candidate notification.
    ///
    /// The timestamp is floored to the enclosing minute so the same
    /// logical event recorded near-simultaneously by two code paths
    /// collapses to one identifier. Match scoping happens through the
    /// per-match set, not the identifier string.
    pub fn identifier_for(event_type: &str, score_total: u32, timestamp_millis: i64) -> String {
        let rounded = (timestamp_millis / 60_000) * 60_000;
        format!("{event_type}-{score_total}-{rounded}")
    }

    /// Whether `identifier` has already been surfaced for `match_id`.
    pub fn has_been_shown(&self, match_id: &str, identifier: &str) -> bool {
        let map = self.load_and_gc(now_unix());
        map.get(match_id)
            .is_some_and(|entry| entry.identifiers.iter().any(|id| id == identifier))
    }

    /// Record that `identifier` was surfaced for `match_id`.
    ///
    /// Idempotent; always stamps the match entry's `updated_at`.
    pub fn mark_shown(&self, match_id: &str, identifier: &str) -> Result<(), StorageError> {
        let now = now_unix();
        let mut map = self.load_and_gc(now);
        let entry = map.entry(match_id.to_string()).or_default();
        if !entry.identifiers.iter().any(|id| id == identifier) {
            entry.identifiers.push(identifier.to_string());
        }
        entry.updated_at = now;
        self.persist(&map)
    }

    /// Whether an event timestamp falls inside the surfacing window.
    pub fn is_within_window(event_timestamp_millis: i64, window: time::Duration) -> bool {
        Self::is_within_window_at(event_timestamp_millis, window, now_millis())
    }

    /// Window check against an explicit `now`, in milliseconds.
    pub fn is_within_window_at(
        event_timestamp_millis: i64,
        window: time::Duration,
        now_millis: i64,
    ) -> bool {
        now_millis - event_timestamp_millis <= window.whole_milliseconds() as i64
    }

    /// Load the persisted map, dropping entries past retention.
    ///
    /// A corrupt or unreadable document degrades to an empty set rather
    /// than an error; worst case the viewer sees an animation again.
    fn load_and_gc(&self, now: i64) -> ViewedMap {
        let mut map: ViewedMap = match self.store.get(STORAGE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => ViewedMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read viewed-animation store");
                ViewedMap::new()
            }
        };

        let before = map.len();
        map.retain(|_, entry| now - entry.updated_at <= VIEWED_RETENTION.whole_seconds());
        if map.len() != before {
            if let Err(e) = self.persist(&map) {
                tracing::warn!(error = %e, "failed to persist viewed-animation GC");
            }
        }
        map
    }

    fn persist(&self, map: &ViewedMap) -> Result<(), StorageError> {
        let raw = serde_json::to_string(map)
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        self.store.set(STORAGE_KEY, &raw)
    }
}

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

// ---------------------------------------------------------------------------
// Store implementations
// ---------------------------------------------------------------------------

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    inner: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self
            .inner
            .lock()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self
            .inner
            .lock()
            .map_err(|_| StorageError::Unavailable("lock poisoned".to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store persisting one JSON document per key.
///
/// Writes go to a temp file first and are moved into place, so a crash
/// mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Unavailable(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        std::fs::rename(&temp, &path).map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
