//! Two-tier result cache with per-entry TTL and checksum invalidation.
//!
//! Entries live in an in-memory map and are written behind to the SQLite
//! `simplecache` table. A missing, unready or corrupt store is always a miss,
//! never an error: failures are logged and the caller goes to the provider.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use artutils_core::record::is_empty_value;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::CacheError;
use crate::repo::{entries, meta};

const SECS_PER_DAY: i64 = 86_400;

/// Dirty entries that trigger a write-behind flush.
pub const FLUSH_THRESHOLD: usize = 32;

/// Minimum spacing between two housekeeping runs.
pub const CLEANUP_INTERVAL_HOURS: i64 = 4;

type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires: i64,
    checksum: Option<String>,
}

impl CacheEntry {
    fn is_live(&self, now: i64, checksum: Option<&str>) -> bool {
        now <= self.expires && checksum.is_none_or(|c| self.checksum.as_deref() == Some(c))
    }
}

/// How a single call site uses the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl_days: u32,
    /// Out-of-band validity tag; a different tag on lookup is a miss.
    pub checksum: Option<String>,
    /// Skip the lookup and overwrite the entry with a fresh result.
    pub ignore_cache: bool,
}

impl CachePolicy {
    pub fn days(ttl_days: u32) -> Self {
        Self {
            ttl_days,
            ..Default::default()
        }
    }

    pub fn checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn ignore_cache(mut self, ignore_cache: bool) -> Self {
        self.ignore_cache = ignore_cache;
        self
    }
}

pub struct SimpleCache {
    mem: RwLock<HashMap<String, CacheEntry>>,
    /// Keys written since their last successful store.
    dirty: Mutex<HashSet<String>>,
    pool: Option<SqlitePool>,
    closed: AtomicBool,
    clock: Clock,
}

impl SimpleCache {
    /// A cache without a persistent tier.
    pub fn in_memory() -> Self {
        Self {
            mem: RwLock::new(HashMap::new()),
            dirty: Mutex::new(HashSet::new()),
            pool: None,
            closed: AtomicBool::new(false),
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
        }
    }

    /// A cache persisted to an already-migrated pool.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self {
            pool: Some(pool),
            ..Self::in_memory()
        }
    }

    /// Replace the wall clock (unix seconds).
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Open the SQLite-backed cache at `db_path`, falling back to a memory-only
    /// cache when the database cannot be opened.
    pub async fn open(db_path: &str) -> Self {
        match Self::try_open(db_path).await {
            Ok(cache) => cache,
            Err(err) => {
                warn!(db_path = %db_path, error = %err, "persistent cache unavailable, using memory only");
                Self::in_memory()
            }
        }
    }

    async fn try_open(db_path: &str) -> Result<Self, CacheError> {
        let pool = crate::connect(db_path).await?;
        crate::migrate::run(&pool).await?;
        let cache = Self::with_pool(pool);
        cache.maybe_cleanup().await;
        info!(db_path = %db_path, "cache opened");
        Ok(cache)
    }

    pub fn is_persistent(&self) -> bool {
        self.pool.is_some()
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Typed lookup. An entry that no longer decodes as `T` is a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, checksum: Option<&str>) -> Option<T> {
        let value = self.get_value(key, checksum).await?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(err) => {
                warn!(key, error = %err, "discarding undecodable cache entry");
                None
            }
        }
    }

    pub async fn get_value(&self, key: &str, checksum: Option<&str>) -> Option<Value> {
        if self.is_closed() {
            return None;
        }
        let now = self.now();

        let cached = self
            .mem
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned();
        if let Some(entry) = cached {
            return entry.is_live(now, checksum).then_some(entry.value);
        }

        let pool = self.pool.as_ref()?;
        let row = match entries::load(pool, key).await {
            Ok(row) => row?,
            Err(err) => {
                warn!(key, error = %err, "cache read failed");
                return None;
            }
        };
        let entry = match decode_row(&row) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(key, error = %err, "corrupt cache row");
                return None;
            }
        };

        let hit = entry.is_live(now, checksum).then(|| entry.value.clone());
        if now <= entry.expires {
            self.mem
                .write()
                .unwrap_or_else(|e| e.into_inner())
                .entry(key.to_string())
                .or_insert(entry);
        }
        hit
    }

    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_days: u32,
        checksum: Option<&str>,
    ) {
        match serde_json::to_value(value) {
            Ok(value) => self.set_value(key, value, ttl_days, checksum).await,
            Err(err) => warn!(key, error = %err, "value not serializable, not cached"),
        }
    }

    pub async fn set_value(&self, key: &str, value: Value, ttl_days: u32, checksum: Option<&str>) {
        if self.is_closed() {
            debug!(key, "cache closed, dropping write");
            return;
        }
        let entry = CacheEntry {
            value,
            expires: self.now() + i64::from(ttl_days) * SECS_PER_DAY,
            checksum: checksum.map(str::to_string),
        };
        self.mem
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), entry);
        if self.pool.is_none() {
            return;
        }
        let dirty = {
            let mut dirty = self.dirty.lock().unwrap_or_else(|e| e.into_inner());
            dirty.insert(key.to_string());
            dirty.len()
        };
        if dirty >= FLUSH_THRESHOLD {
            self.flush().await;
        }
    }

    /// Look `key` up and, on a miss (or when the policy ignores the cache),
    /// run `fetch` and store its result. Empty results are returned but not
    /// stored.
    pub async fn cached<T, F, Fut>(&self, key: &str, policy: CachePolicy, fetch: F) -> T
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if !policy.ignore_cache {
            if let Some(hit) = self.get::<T>(key, policy.checksum.as_deref()).await {
                debug!(key, "cache hit");
                return hit;
            }
        }

        let fresh = fetch().await;
        match serde_json::to_value(&fresh) {
            Ok(value) if is_empty_value(&value) => debug!(key, "empty result not cached"),
            Ok(value) => {
                self.set_value(key, value, policy.ttl_days, policy.checksum.as_deref())
                    .await
            }
            Err(err) => warn!(key, error = %err, "value not serializable, not cached"),
        }
        fresh
    }

    /// Write dirty entries to SQLite. Returns how many rows were written.
    ///
    /// Rows that fail to store stay dirty and are retried by the next flush.
    pub async fn flush(&self) -> usize {
        let Some(pool) = self.pool.as_ref() else {
            return 0;
        };
        let keys = std::mem::take(&mut *self.dirty.lock().unwrap_or_else(|e| e.into_inner()));
        if keys.is_empty() {
            return 0;
        }
        let pending: Vec<entries::EntryRow> = {
            let mem = self.mem.read().unwrap_or_else(|e| e.into_inner());
            keys.into_iter()
                .filter_map(|key| {
                    // evicted by cleanup since it was written
                    let e = mem.get(&key)?;
                    Some(entries::EntryRow {
                        expires: e.expires,
                        data: e.value.to_string(),
                        checksum: e.checksum.clone(),
                        id: key,
                    })
                })
                .collect()
        };

        let mut written = 0;
        let mut failed = Vec::new();
        for row in pending {
            match entries::store(pool, &row).await {
                Ok(()) => written += 1,
                Err(err) => {
                    warn!(key = %row.id, error = %err, "cache write failed, will retry");
                    failed.push(row.id);
                }
            }
        }
        if !failed.is_empty() {
            self.dirty
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .extend(failed);
        }
        if written > 0 {
            debug!(written, "flushed cache entries");
        }
        written
    }

    /// Drop expired entries from both tiers. Returns the SQLite rows removed.
    pub async fn cleanup(&self) -> u64 {
        let now = self.now();
        self.mem
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|_, e| e.expires >= now);

        let Some(pool) = self.pool.as_ref() else {
            return 0;
        };
        let removed = match entries::delete_expired(pool, now).await {
            Ok(n) => n,
            Err(err) => {
                warn!(error = %err, "cache cleanup failed");
                return 0;
            }
        };
        if let Err(err) = meta::set(pool, meta::LAST_CLEANUP, &now.to_string()).await {
            warn!(error = %err, "failed to record cache cleanup time");
        }
        info!(removed, "cache housekeeping done");
        removed
    }

    /// Run [`cleanup`](Self::cleanup) unless one ran within the last
    /// [`CLEANUP_INTERVAL_HOURS`].
    pub async fn maybe_cleanup(&self) -> Option<u64> {
        if self.is_closed() {
            return None;
        }
        let pool = self.pool.as_ref()?;
        let last = match meta::get(pool, meta::LAST_CLEANUP).await {
            Ok(value) => value.and_then(|v| v.parse::<i64>().ok()).unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "failed to read cache cleanup time");
                return None;
            }
        };
        if self.now() - last < CLEANUP_INTERVAL_HOURS * 3600 {
            return None;
        }
        Some(self.cleanup().await)
    }

    /// Flush pending writes and release the database. Later reads miss and
    /// later writes are dropped; closing twice is a no-op.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let written = self.flush().await;
        if let Some(pool) = self.pool.as_ref() {
            pool.close().await;
        }
        info!(written, "cache closed");
    }
}

fn decode_row(row: &entries::EntryRow) -> Result<CacheEntry, CacheError> {
    Ok(CacheEntry {
        value: serde_json::from_str(&row.data)?,
        expires: row.expires,
        checksum: row.checksum.clone(),
    })
}
