//! Resolver configuration.
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Configuration types and validation
mod types;

pub use loader::{
    CONFIG_FILE_NAME,
    LANGUAGE_CODE_KEY_ENV,
    apply_env_overrides,
};
pub use manager::ConfigManager;
pub use types::{
    ConfigError,
    DEFAULT_LEVEL,
    ResolverConfig,
    TranslationKeySet,
    ValidationError,
};
