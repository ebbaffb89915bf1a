use crate::error::{LimitsError, Result};
use crate::models::Usage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// rwx------ for the cache directory
pub const DIR_MODE: u32 = 0o700;
/// rw------- for the cache file, which holds account data
pub const FILE_MODE: u32 = 0o600;

const CACHE_DIR_NAME: &str = "claudelimits";
const CACHE_FILE_NAME: &str = "usage.json";

#[derive(Debug, Serialize, Deserialize)]
struct CachedUsage {
    timestamp: DateTime<Utc>,
    usage: Usage,
}

/// Single-entry TTL cache for the last usage response.
pub struct UsageCache {
    dir: PathBuf,
    file: PathBuf,
}

impl Default for UsageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageCache {
    /// Cache in the platform cache directory (`~/.cache` on Linux,
    /// `~/Library/Caches` on macOS, `%LocalAppData%` on Windows).
    pub fn new() -> Self {
        let dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(CACHE_DIR_NAME);
        Self::in_dir(dir)
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let file = dir.join(CACHE_FILE_NAME);
        Self { dir, file }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Returns the cached usage if it was written less than `ttl` ago.
    pub fn read(&self, ttl: Duration) -> Result<Usage> {
        let data = fs::read(&self.file).map_err(|e| LimitsError::cache("read", &self.file, e))?;
        let cached: CachedUsage =
            serde_json::from_slice(&data).map_err(|e| LimitsError::cache("parse", &self.file, e))?;

        let age = Utc::now().signed_duration_since(cached.timestamp);
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        if age > ttl {
            return Err(LimitsError::CacheExpired);
        }

        Ok(cached.usage)
    }

    pub fn write(&self, usage: &Usage) -> Result<()> {
        let cached = CachedUsage {
            timestamp: Utc::now(),
            usage: usage.clone(),
        };
        let data =
            serde_json::to_vec(&cached).map_err(|e| LimitsError::cache("marshal", &self.file, e))?;

        create_private_dir(&self.dir).map_err(|e| LimitsError::cache("mkdir", &self.dir, e))?;
        write_private_file(&self.file, &data)
            .map_err(|e| LimitsError::cache("write", &self.file, e))?;

        Ok(())
    }
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(unix)]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(FILE_MODE))?;
    file.write_all(data)
}

#[cfg(not(unix))]
fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(path, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_usage() -> Usage {
        Usage::new(json!({ "five_hour_utilization": 75.5 }))
    }

    #[test]
    fn test_cache_read_write() {
        let temp_dir = TempDir::new().unwrap();
        let cache = UsageCache::in_dir(temp_dir.path().join("claudelimits"));

        cache.write(&sample_usage()).unwrap();
        assert!(cache.file().exists());

        let cached = cache.read(Duration::from_secs(60)).unwrap();
        assert_eq!(cached, sample_usage());
    }

    #[cfg(unix)]
    #[test]
    fn test_cache_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let cache = UsageCache::in_dir(temp_dir.path().join("claudelimits"));
        cache.write(&sample_usage()).unwrap();

        let file_mode = fs::metadata(cache.file()).unwrap().permissions().mode() & 0o777;
        assert_eq!(file_mode, FILE_MODE);
        let dir_mode = fs::metadata(cache.dir()).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, DIR_MODE);
    }

    #[test]
    fn test_cache_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let cache = UsageCache::in_dir(temp_dir.path());

        let stale = json!({
            "timestamp": (Utc::now() - chrono::Duration::seconds(120)).to_rfc3339(),
            "usage": { "five_hour_utilization": 75.5 }
        });
        fs::write(cache.file(), serde_json::to_vec(&stale).unwrap()).unwrap();

        assert!(matches!(
            cache.read(Duration::from_secs(60)),
            Err(LimitsError::CacheExpired)
        ));
        assert!(cache.read(Duration::from_secs(300)).is_ok());
    }

    #[test]
    fn test_cache_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache = UsageCache::in_dir(temp_dir.path());
        match cache.read(Duration::from_secs(60)) {
            Err(LimitsError::Cache { operation, .. }) => assert_eq!(operation, "read"),
            other => panic!("Expected Cache read error, got {:?}", other),
        }
    }

    #[test]
    fn test_cache_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let cache = UsageCache::in_dir(temp_dir.path());
        fs::write(cache.file(), "{not json").unwrap();
        match cache.read(Duration::from_secs(60)) {
            Err(LimitsError::Cache { operation, .. }) => assert_eq!(operation, "parse"),
            other => panic!("Expected Cache parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_default_cache_location() {
        let cache = UsageCache::new();
        assert!(cache.dir().ends_with("claudelimits"));
        assert!(cache.file().ends_with("claudelimits/usage.json"));
    }
}
