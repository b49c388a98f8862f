//! Disk-backed, time-expiring cache for fetched documents and deserialized
//! objects.
//!
//! ```no_run
//! use artifact_cache::{Cache, CacheConfig, Expiry, ObjectCache};
//!
//! let config = CacheConfig::new("my-app-3").with_duration(Expiry::days(1));
//! let cache = ObjectCache::<Vec<String>>::open(config)?;
//!
//! cache.put("operations", vec!["GetQuote".to_string()]);
//! assert!(cache.get("operations").is_some());
//! # Ok::<(), artifact_cache::CacheError>(())
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod document;
pub mod utils;

pub use cache::{
    ByteCache, Cache, Codec, DocumentCache, DocumentCodec, Expiry, FileCache, NoCache,
    ObjectCache, ObjectCodec, RawCodec, TimeUnit,
};
pub use config::{load_config, CacheConfig};
pub use document::{Element, Node};
pub use utils::{cache_id, init_logger, CacheError, CodecError, DocumentError};
