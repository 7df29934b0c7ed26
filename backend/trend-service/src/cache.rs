/// Cache Manager
///
/// One cache slot with a TTL and a calendar-day freshness key. The clock and
/// the storage backend are injected so freshness logic is testable without
/// real timers or disk. Absent or corrupt state is a miss, never a crash;
/// persistence failures are the caller's to log and swallow.
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::models::RankedKeyword;

pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
    /// Coarse period identifier forcing at least daily recomputation
    fn today_key(&self) -> String;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today_key(&self) -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub written_at_ms: i64,
    pub freshness_key: String,
    pub payload: Vec<RankedKeyword>,
}

pub trait CacheStore: Send + Sync {
    /// `None` covers absent, unreadable and corrupt state alike.
    fn load(&self) -> Option<CacheEntry>;
    fn store(&self, entry: &CacheEntry) -> std::result::Result<(), String>;
}

/// Durable single-slot store, one JSON file (serverless tmp-style).
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> Option<CacheEntry> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Corrupt cache file {:?}, treating as miss: {}", self.path, e);
                None
            }
        }
    }

    fn store(&self, entry: &CacheEntry) -> std::result::Result<(), String> {
        let json = serde_json::to_string(entry).map_err(|e| e.to_string())?;
        std::fs::write(&self.path, json).map_err(|e| e.to_string())
    }
}

/// In-memory store for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryCacheStore {
    slot: Mutex<Option<CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> Option<CacheEntry> {
        self.slot.lock().ok()?.clone()
    }

    fn store(&self, entry: &CacheEntry) -> std::result::Result<(), String> {
        *self.slot.lock().map_err(|e| e.to_string())? = Some(entry.clone());
        Ok(())
    }
}

pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>, ttl_ms: i64) -> Self {
        Self {
            store,
            clock,
            ttl_ms,
        }
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    /// The cached payload, only while within TTL and written today.
    pub fn read_fresh(&self) -> Option<CacheEntry> {
        let entry = self.store.load()?;
        let age = self.clock.now_millis() - entry.written_at_ms;

        if age < self.ttl_ms && entry.freshness_key == self.clock.today_key() {
            debug!("Cache hit (age {} ms)", age);
            Some(entry)
        } else {
            debug!("Cache stale (age {} ms, key {})", age, entry.freshness_key);
            None
        }
    }

    /// The last persisted payload regardless of freshness (degraded path).
    pub fn read_any(&self) -> Option<CacheEntry> {
        self.store.load()
    }

    /// Write-through after a successful pipeline run.
    pub fn write(&self, payload: Vec<RankedKeyword>) -> Result<CacheEntry> {
        let entry = CacheEntry {
            written_at_ms: self.clock.now_millis(),
            freshness_key: self.clock.today_key(),
            payload,
        };
        self.store
            .store(&entry)
            .map_err(AppError::CachePersistence)?;
        Ok(entry)
    }
}
