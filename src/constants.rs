/// Constants module to avoid magic numbers in the codebase

// Layout
pub const DEFAULT_PREFIX: &str = "artifact";
pub const DEFAULT_DIR_NAME: &str = "artifact-cache";
pub const VERSION_FILE: &str = "version";

// Entry suffixes, one per codec family
pub const RAW_SUFFIX: &str = "gcf";
pub const DOCUMENT_SUFFIX: &str = "xml";
pub const OBJECT_SUFFIX: &str = "px";

// Object codec wire protocol, bumped whenever the payload layout changes
pub const OBJECT_PROTOCOL: u8 = 2;

// Configuration
pub const CONFIG_FILE_NAME: &str = "cache.toml";
pub const LOCAL_CONFIG_FILE: &str = ".artifact-cache.toml";
pub const ENV_PREFIX: &str = "ARTIFACT_CACHE_";

/// Version token written to the marker when the owner does not supply one
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");
