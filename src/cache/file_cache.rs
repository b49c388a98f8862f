use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::codec::{Codec, DocumentCodec, ObjectCodec, RawCodec};
use super::traits::Cache;
use super::types::Expiry;
use crate::config::CacheConfig;
use crate::constants::VERSION_FILE;
use crate::utils::CacheError;

/// A file-based cache: one file per entry, named `<prefix>-<id>.<suffix>`
/// directly under the cache location
///
/// Entries older than the configured duration are deleted when read. A
/// `version` marker next to the entries ties them to the owner's format
/// token; on a mismatch at construction every prefixed entry is dropped.
#[derive(Debug)]
pub struct FileCache<C> {
    location: PathBuf,
    prefix: String,
    version: String,
    duration: Expiry,
    codec: C,
}

/// Cache of raw bytes
pub type ByteCache = FileCache<RawCodec>;

/// Cache of parsed markup documents
pub type DocumentCache = FileCache<DocumentCodec>;

/// Cache of serde values
pub type ObjectCache<T> = FileCache<ObjectCodec<T>>;

impl<C: Codec> FileCache<C> {
    /// Create a cache, wiping its directory if written by another version
    ///
    /// Only an invalid configuration is an error; storage problems during
    /// the version check are logged.
    pub fn new(config: CacheConfig, codec: C) -> Result<Self, CacheError> {
        config.validate()?;
        let cache = Self {
            location: config.root(),
            prefix: config.prefix,
            version: config.version,
            duration: config.duration,
            codec,
        };
        cache.check_version();
        Ok(cache)
    }

    pub fn open(config: CacheConfig) -> Result<Self, CacheError>
    where
        C: Default,
    {
        Self::new(config, C::default())
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn duration(&self) -> Expiry {
        self.duration
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Path of the entry for `id`. The id is used verbatim.
    pub fn filename(&self, id: &str) -> PathBuf {
        let name = format!("{}-{}.{}", self.prefix, id, self.codec.suffix());
        self.location.join(name)
    }

    /// Whether a live entry exists for `id`, without decoding it
    ///
    /// Expired entries are removed as a side effect, as on `get`.
    pub fn contains(&self, id: &str) -> bool {
        let path = self.filename(id);
        match self.remove_if_expired(&path, Utc::now()) {
            Ok(()) => path.is_file(),
            Err(_) => false,
        }
    }

    /// Raw bytes of a live entry as of `now`
    fn read_at(&self, id: &str, now: DateTime<Utc>) -> Option<Vec<u8>> {
        let path = self.filename(id);
        let result = self
            .remove_if_expired(&path, now)
            .and_then(|()| fs::read(&path));
        match result {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read cache entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn write(&self, id: &str, bytes: &[u8]) {
        let path = self.filename(id);
        self.mktmp();
        match fs::write(&path, bytes) {
            Ok(()) => debug!("cached: {}", path.display()),
            Err(e) => warn!("Failed to write cache entry {}: {}", path.display(), e),
        }
    }

    fn remove(&self, id: &str) {
        let path = self.filename(id);
        match fs::remove_file(&path) {
            Ok(()) => debug!("purged: {}", path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => debug!("Failed to purge {}: {}", path.display(), e),
        }
    }

    /// Delete every non-directory entry whose name starts with the prefix
    fn clear_entries(&self) -> Result<(), CacheError> {
        let list_error = |source: io::Error| CacheError::ListError {
            path: self.location.clone(),
            source,
        };
        let entries = match fs::read_dir(&self.location) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(list_error(e)),
        };

        for entry in entries {
            let entry = entry.map_err(list_error)?;
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            if !entry.file_name().to_string_lossy().starts_with(&self.prefix) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => debug!("deleted: {}", path.display()),
                Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
            }
        }
        Ok(())
    }

    /// Create the cache location if it does not exist yet
    fn mktmp(&self) {
        if self.location.is_dir() {
            return;
        }
        if let Err(e) = fs::create_dir_all(&self.location) {
            warn!(
                "Failed to create cache directory {}: {}",
                self.location.display(),
                e
            );
        }
    }

    /// Entries are aged from their last write
    fn remove_if_expired(&self, path: &Path, now: DateTime<Utc>) -> io::Result<()> {
        if self.duration.is_never() {
            return Ok(());
        }
        let written = fs::metadata(path)?.modified()?;
        if self.duration.is_expired(DateTime::<Utc>::from(written), now) {
            fs::remove_file(path)?;
            debug!("{} expired, deleted", path.display());
        }
        Ok(())
    }

    fn check_version(&self) {
        let marker = self.location.join(VERSION_FILE);
        self.mktmp();

        match fs::read_to_string(&marker) {
            Ok(found) if found == self.version => return,
            Ok(found) => debug!(
                "Cache version changed ({} -> {}), clearing {}",
                found,
                self.version,
                self.location.display()
            ),
            Err(e) => debug!(
                "No readable version marker in {} ({}), clearing",
                self.location.display(),
                e
            ),
        }

        if let Err(e) = self.clear_entries() {
            warn!("Failed to clear stale cache: {}", e);
        }
        if let Err(e) = fs::write(&marker, &self.version) {
            warn!("Failed to write {}: {}", marker.display(), e);
        }
    }
}

impl<C: Codec> Cache for FileCache<C> {
    type Value = C::Value;

    /// Decode failures mean the entry is corrupt or from an incompatible
    /// writer; it is purged and reported absent
    fn get(&self, id: &str) -> Option<C::Value> {
        let bytes = self.read_at(id, Utc::now())?;
        match self.codec.decode(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Discarding unreadable cache entry '{}': {}", id, e);
                self.remove(id);
                None
            }
        }
    }

    fn put(&self, id: &str, value: C::Value) -> C::Value {
        match self.codec.encode(&value) {
            Ok(bytes) => self.write(id, &bytes),
            Err(e) => warn!("Failed to encode cache entry '{}': {}", id, e),
        }
        value
    }

    fn purge(&self, id: &str) {
        self.remove(id);
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.clear_entries()
    }
}
