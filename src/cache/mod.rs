// Gateway module for cache - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod codec;
mod file_cache;
mod traits;
mod types;

// Public re-exports - the ONLY way to access cache functionality
pub use codec::{Codec, DocumentCodec, ObjectCodec, RawCodec};
pub use file_cache::{ByteCache, DocumentCache, FileCache, ObjectCache};
pub use traits::{Cache, NoCache};
pub use types::{Expiry, TimeUnit};

/// Open a cache using the layered configuration (files and environment)
pub fn init<C: Codec + Default>() -> anyhow::Result<FileCache<C>> {
    let config = crate::config::load_config()?;
    Ok(FileCache::open(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_init_uses_layered_config() {
        Jail::expect_with(|jail| {
            let location = jail.directory().join("entries");
            jail.set_env("ARTIFACT_CACHE_LOCATION", location.display());
            jail.set_env("ARTIFACT_CACHE_VERSION", "jail-1");

            let cache = init::<RawCodec>().unwrap();
            assert_eq!(cache.location(), location.as_path());
            assert_eq!(cache.version(), "jail-1");
            assert!(location.join("version").exists());
            Ok(())
        });
    }
}
