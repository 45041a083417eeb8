//! Holds the active, validated resolver configuration.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    ResolverConfig,
    loader,
};
use crate::LocalizationResolver;

/// Configuration manager
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Current settings
    current_settings: ResolverConfig,

    /// File the current settings were read from
    source: Option<PathBuf>,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: ResolverConfig::default(), source: None }
    }

    /// Load settings from the configuration file of `dir`, with environment
    /// overrides taken from the process environment.
    ///
    /// # Errors
    /// - File read error
    /// - Parse error
    /// - Validation error
    pub fn load_settings(&mut self, dir: Option<&Path>) -> Result<(), ConfigError> {
        self.load_settings_with(dir, |name| std::env::var(name).ok())
    }

    /// Same as [`load_settings`](Self::load_settings), reading environment
    /// variables through `lookup`.
    pub fn load_settings_with<F>(&mut self, dir: Option<&Path>, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::debug!("Loading settings for directory: {:?}", dir);

        let loaded = match dir {
            Some(dir) => loader::load_from_dir(dir)?,
            None => None,
        };
        let source = loaded.as_ref().and(dir).map(|dir| dir.join(super::CONFIG_FILE_NAME));
        let mut settings = loaded.unwrap_or_default();

        super::apply_env_overrides(&mut settings, lookup);
        self.install(settings, source)
    }

    /// Load settings from an explicit file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.load_file_with(path, |name| std::env::var(name).ok())
    }

    pub fn load_file_with<F>(&mut self, path: &Path, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = loader::load_from_path(path)?;

        super::apply_env_overrides(&mut settings, lookup);
        self.install(settings, Some(path.to_path_buf()))
    }

    /// Replace the settings, e.g. with request-level overrides applied.
    pub fn update_settings(&mut self, new_settings: ResolverConfig) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings...");

        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated successfully");

        Ok(())
    }

    /// Validate and store `settings` with the file they came from.
    fn install(
        &mut self,
        settings: ResolverConfig,
        source: Option<PathBuf>,
    ) -> Result<(), ConfigError> {
        if let Err(errors) = settings.validate() {
            tracing::warn!("Rejected configuration from {:?}: {:?}", source, errors);
            return Err(ConfigError::ValidationErrors(errors));
        }

        self.current_settings = settings;
        self.source = source;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &ResolverConfig {
        &self.current_settings
    }

    /// Configuration file backing the current settings, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Resolver for the current settings.
    #[must_use]
    pub fn resolver(&self) -> LocalizationResolver {
        LocalizationResolver::new(self.current_settings.clone())
    }
}
