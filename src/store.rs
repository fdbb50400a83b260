use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use crate::models::SeenSet;
use crate::utils::error::{AppError, Result};

/// Per-site persistence for seen-product ids, with an exclusive advisory
/// lock guarding the whole load-process-save critical section.
///
/// Lock discipline is non-blocking: if another run holds the lock the
/// caller gets `LockTimeout` and skips the site rather than waiting.
/// Lock files older than the staleness window are reclaimed so a crashed
/// run cannot wedge a site forever.
#[derive(Debug, Clone)]
pub struct SeenStore {
    seen_dir: PathBuf,
    lock_stale: Duration,
}

impl SeenStore {
    pub fn open(data_dir: &Path, lock_stale_secs: u64) -> Result<Self> {
        let seen_dir = data_dir.join("seen");
        fs::create_dir_all(&seen_dir)?;
        Ok(Self {
            seen_dir,
            lock_stale: Duration::from_secs(lock_stale_secs),
        })
    }

    /// Acquire the exclusive per-site lock. The returned guard releases
    /// on drop, on every exit path.
    pub fn lock(&self, site: &str) -> Result<SiteLock> {
        let path = self.lock_path(site);

        match self.try_create_lock(&path) {
            Ok(lock) => Ok(lock),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                if self.lock_is_stale(&path) {
                    warn!(site, "reclaiming stale lock file");
                    fs::remove_file(&path)?;
                    self.try_create_lock(&path).map_err(|_| AppError::LockTimeout {
                        site: site.to_string(),
                    })
                } else {
                    Err(AppError::LockTimeout {
                        site: site.to_string(),
                    })
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    fn try_create_lock(&self, path: &Path) -> std::io::Result<SiteLock> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        // Contents are informational only; existence is what locks.
        let _ = writeln!(file, "pid {} at {}", std::process::id(), Utc::now().to_rfc3339());
        Ok(SiteLock {
            path: path.to_path_buf(),
        })
    }

    fn lock_is_stale(&self, path: &Path) -> bool {
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|mtime| mtime.elapsed().ok())
            .map(|age| age > self.lock_stale)
            .unwrap_or(false)
    }

    /// Load the seen set for a site. Missing or unreadable files yield an
    /// empty set; a corrupt file must not block future runs.
    pub fn load(&self, site: &str) -> SeenSet {
        let path = self.seen_path(site);
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!(site, %err, "seen file is corrupt, starting from empty");
                SeenSet::new()
            }),
            Err(_) => SeenSet::new(),
        }
    }

    /// Persist the seen set atomically: write a temp file, then rename it
    /// over the target so a reader never observes a partial write.
    pub fn save(&self, site: &str, set: &SeenSet) -> Result<()> {
        let path = self.seen_path(site);
        let contents = serde_json::to_string_pretty(set)?;
        self.write_atomic(&path, &contents)
    }

    /// Last-alerted unix timestamps for site-specific restock cooldowns,
    /// keyed by product id. Kept separate from the seen set.
    pub fn load_stamp_map(&self, site: &str) -> HashMap<String, i64> {
        let path = self.stamp_path(site);
        fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    pub fn save_stamp_map(&self, site: &str, map: &HashMap<String, i64>) -> Result<()> {
        let path = self.stamp_path(site);
        let contents = serde_json::to_string_pretty(map)?;
        self.write_atomic(&path, &contents)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn seen_path(&self, site: &str) -> PathBuf {
        self.seen_dir.join(format!("{site}_seen.json"))
    }

    fn stamp_path(&self, site: &str) -> PathBuf {
        self.seen_dir.join(format!("{site}_signed_seen.json"))
    }

    fn lock_path(&self, site: &str) -> PathBuf {
        self.seen_dir.join(format!("{site}.lock"))
    }
}

/// RAII guard for the per-site lock file.
#[derive(Debug)]
pub struct SiteLock {
    path: PathBuf,
}

impl Drop for SiteLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), %err, "failed to remove lock file");
        }
    }
}
