// Gateway module for config - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod settings;

// Public re-exports - the ONLY way to access config functionality
pub use settings::{get_config_dir, load_config, load_config_from, save_config, CacheConfig};
