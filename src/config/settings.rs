use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cache::Expiry;
use crate::constants::{
    CONFIG_FILE_NAME, CRATE_VERSION, DEFAULT_DIR_NAME, DEFAULT_PREFIX, ENV_PREFIX,
    LOCAL_CONFIG_FILE,
};
use crate::utils::CacheError;

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the entries (defaults to a folder in the temp dir)
    pub location: Option<PathBuf>,
    /// Filename prefix shared by every entry of this cache family
    pub prefix: String,
    /// Format token of the owner; a different token on disk wipes the cache
    pub version: String,
    /// Time-to-live, at most one unit, e.g. `{ days = 1 }`; across config
    /// layers the last table set replaces earlier ones
    pub duration: Expiry,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            location: None,
            prefix: DEFAULT_PREFIX.to_string(),
            version: CRATE_VERSION.to_string(),
            duration: Expiry::NEVER,
        }
    }
}

impl CacheConfig {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_duration(mut self, duration: Expiry) -> Self {
        self.duration = duration;
        self
    }

    /// The cache directory, falling back to the platform temp dir
    pub fn root(&self) -> PathBuf {
        self.location
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DIR_NAME))
    }

    pub fn validate(&self) -> Result<(), CacheError> {
        if self.prefix.is_empty() {
            return Err(CacheError::ConfigError("prefix must not be empty".into()));
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(CacheError::ConfigError(format!(
                "prefix '{}' must not contain path separators",
                self.prefix
            )));
        }
        if self.version.is_empty() {
            return Err(CacheError::ConfigError("version must not be empty".into()));
        }
        Ok(())
    }
}

/// Everything but `duration`, which does not merge key by key
#[derive(Deserialize)]
struct SharedSettings {
    location: Option<PathBuf>,
    prefix: String,
    version: String,
}

/// Merge the layers, lowest priority first
///
/// A duration table is taken whole from the highest layer that sets one, so
/// a later layer can switch the unit instead of adding a second key.
fn extract(layers: Vec<Figment>) -> Result<CacheConfig> {
    let duration = match layers.iter().rev().find(|layer| layer.contains("duration")) {
        Some(layer) => layer
            .extract_inner::<Expiry>("duration")
            .context("Failed to load cache duration")?,
        None => Expiry::NEVER,
    };

    let merged = layers
        .into_iter()
        .fold(Figment::new(), |figment, layer| figment.merge(layer));
    let shared: SharedSettings = merged
        .extract()
        .context("Failed to load cache configuration")?;

    let config = CacheConfig {
        location: shared.location,
        prefix: shared.prefix,
        version: shared.version,
        duration,
    };
    config.validate()?;
    Ok(config)
}

fn defaults() -> Figment {
    Figment::from(Serialized::defaults(CacheConfig::default()))
}

/// Load configuration from defaults, the global and local files, and the
/// environment (`ARTIFACT_CACHE_` prefix), later sources winning
pub fn load_config() -> Result<CacheConfig> {
    let mut layers = vec![defaults()];

    if let Some(config_dir) = get_config_dir() {
        let global_config = config_dir.join(CONFIG_FILE_NAME);
        if global_config.exists() {
            layers.push(Figment::from(Toml::file(&global_config)));
        }
    }

    let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
    if local_config.exists() {
        layers.push(Figment::from(Toml::file(&local_config)));
    }

    layers.push(Figment::from(Env::prefixed(ENV_PREFIX)));
    extract(layers)
}

/// Load configuration from an explicit file, still honoring the environment
pub fn load_config_from(path: &Path) -> Result<CacheConfig> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    extract(vec![
        defaults(),
        Figment::from(Toml::file(path)),
        Figment::from(Env::prefixed(ENV_PREFIX)),
    ])
}

/// Platform configuration directory (`~/.config/artifact-cache` on Linux)
pub fn get_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", DEFAULT_DIR_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Save configuration to file, by default the global config file
pub fn save_config(config: &CacheConfig, path: Option<PathBuf>) -> Result<()> {
    let path = match path {
        Some(p) => p,
        None => get_config_dir()
            .context("Could not determine configuration directory")?
            .join(CONFIG_FILE_NAME),
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml_string = toml::to_string_pretty(config)?;
    std::fs::write(&path, toml_string)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    Ok(())
}
