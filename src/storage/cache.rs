//! Raw response cache on the local filesystem.
//!
//! ## Layout
//!
//! ```text
//! {dir}/
//! └── {sha256(url)}.body    # raw response bytes, never expires
//! ```

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};
use crate::models::CacheConfig;
use crate::storage::ResponseCache;

/// Cache key for a URL: lowercase hex SHA-256 of the full URL string.
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Build the cache described by the configuration.
pub fn from_config(config: &CacheConfig) -> Box<dyn ResponseCache> {
    if config.enabled {
        Box::new(FileCache::new(&config.dir))
    } else {
        Box::new(DisabledCache)
    }
}

/// Permanent content-addressed cache, one file per URL.
#[derive(Debug, Clone)]
pub struct FileCache {
    root_dir: PathBuf,
}

impl FileCache {
    /// Create a cache rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Path of the file holding the payload for a URL.
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root_dir.join(format!("{}.body", cache_key(url)))
    }
}

impl ResponseCache for FileCache {
    fn get(&self, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(url);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write bytes atomically (write to temp, then rename).
    fn put(&self, url: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root_dir)?;

        let path = self.path_for(url);
        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(bytes)?;
        file.flush()?;
        drop(file);

        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Cache that never hits and never stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

impl ResponseCache for DisabledCache {
    fn get(&self, _url: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn put(&self, _url: &str, _bytes: &[u8]) -> Result<()> {
        Ok(())
    }
}
