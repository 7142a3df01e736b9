//! Backlinks signature cache.
//!
//! The backlinks overview endpoint hands out a signed grant
//! (`signature` + `validUntil`) together with the overview payload. While the
//! grant is valid it authorizes `stGetFreeBacklinksList` on its own, so a hit
//! here lets a repeat lookup skip the overview call. A token is still
//! acquired for every lookup. Entries upstream rejects are dropped with
//! [`SignatureCache::invalidate`].
//!
//! Entries live in `{cache_dir}/signature_cache.json` keyed by domain, fronted
//! by an in-memory moka cache. An entry expires at its `validUntil`; when that
//! value can't be read as a timestamp, one hour after it was saved.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CACHE_FILE_NAME: &str = "signature_cache.json";

/// Fallback lifetime for entries with an unreadable `validUntil`.
const FALLBACK_TTL_SECS: i64 = 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedSignature {
    pub signature: String,
    pub valid_until: Value,
    pub overview: Value,
    /// Unix seconds.
    pub saved_at: i64,
}

impl CachedSignature {
    pub fn new(signature: String, valid_until: Value, overview: Value) -> Self {
        Self {
            signature,
            valid_until,
            overview,
            saved_at: Utc::now().timestamp(),
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        parse_valid_until(&self.valid_until)
            .or_else(|| Utc.timestamp_opt(self.saved_at + FALLBACK_TTL_SECS, 0).single())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| exp > now)
    }
}

/// Read `validUntil` as RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (UTC), or epoch
/// seconds/milliseconds.
pub fn parse_valid_until(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            s.parse::<i64>().ok().and_then(epoch_to_utc)
        }
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(epoch_to_utc),
        _ => None,
    }
}

fn epoch_to_utc(raw: i64) -> Option<DateTime<Utc>> {
    // Anything past year 2286 in seconds is really milliseconds.
    if raw > 9_999_999_999 {
        Utc.timestamp_millis_opt(raw).single()
    } else {
        Utc.timestamp_opt(raw, 0).single()
    }
}

fn domain_key(domain: &str) -> String {
    domain.trim().trim_end_matches('/').to_ascii_lowercase()
}

pub struct SignatureCache {
    dir: Option<PathBuf>,
    memory: moka::future::Cache<String, CachedSignature>,
    file_lock: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for SignatureCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureCache")
            .field("dir", &self.dir)
            .field("entries_in_memory", &self.memory.entry_count())
            .finish()
    }
}

impl SignatureCache {
    /// `None` disables caching altogether.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            memory: moka::future::Cache::builder()
                .max_capacity(1_000)
                .time_to_live(Duration::from_secs(60 * 60 * 24))
                .build(),
            file_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.dir.is_some()
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.dir.as_ref().map(|d| d.join(CACHE_FILE_NAME))
    }

    /// A still-valid entry for `domain`, from memory first, then disk.
    pub async fn load(&self, domain: &str) -> Option<CachedSignature> {
        self.dir.as_ref()?;
        let key = domain_key(domain);
        let now = Utc::now();

        if let Some(entry) = self.memory.get(&key).await {
            if entry.is_valid_at(now) {
                debug!("signature_cache: memory hit for '{}'", key);
                return Some(entry);
            }
            self.memory.invalidate(&key).await;
        }

        let _guard = self.file_lock.lock().await;
        let entry = self.read_file().await.remove(&key)?;
        if !entry.is_valid_at(now) {
            debug!("signature_cache: stale entry for '{}' ignored", key);
            return None;
        }
        info!("signature_cache: loaded signature for '{}' from disk", key);
        self.memory.insert(key, entry.clone()).await;
        Some(entry)
    }

    /// Save an entry and prune expired ones from the file.
    pub async fn store(&self, domain: &str, entry: CachedSignature) {
        let Some(path) = self.file_path() else {
            return;
        };
        let key = domain_key(domain);
        self.memory.insert(key.clone(), entry.clone()).await;

        let _guard = self.file_lock.lock().await;
        let mut all = self.read_file().await;
        let now = Utc::now();
        all.retain(|_, e| e.is_valid_at(now));
        all.insert(key.clone(), entry);

        if let Err(e) = write_atomic(&path, &all).await {
            warn!(
                "signature_cache: failed to write {}: {}",
                path.display(),
                e
            );
        } else {
            debug!("signature_cache: stored signature for '{}'", key);
        }
    }

    /// Drop `domain` from memory and disk, e.g. after upstream rejected its signature.
    pub async fn invalidate(&self, domain: &str) {
        let Some(path) = self.file_path() else {
            return;
        };
        let key = domain_key(domain);
        self.memory.invalidate(&key).await;

        let _guard = self.file_lock.lock().await;
        let mut all = self.read_file().await;
        if all.remove(&key).is_none() {
            return;
        }
        if let Err(e) = write_atomic(&path, &all).await {
            warn!(
                "signature_cache: failed to rewrite {}: {}",
                path.display(),
                e
            );
        } else {
            info!("signature_cache: dropped signature for '{}'", key);
        }
    }

    async fn read_file(&self) -> HashMap<String, CachedSignature> {
        let Some(path) = self.file_path() else {
            return HashMap::new();
        };
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                warn!("signature_cache: failed to read {}: {}", path.display(), e);
                return HashMap::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(
                "signature_cache: {} is not valid JSON ({}); starting fresh",
                path.display(),
                e
            );
            HashMap::new()
        })
    }
}

async fn write_atomic(
    path: &std::path::Path,
    entries: &HashMap<String, CachedSignature>,
) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_vec_pretty(entries)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, path).await
}
