//! Configuration file loading.
//!
//! Files are JSON with comments and trailing commas allowed.

use std::path::Path;

use jsonc_parser::ParseOptions;

use super::{
    ConfigError,
    ResolverConfig,
};

/// File looked up in a directory by [`load_from_dir`].
pub const CONFIG_FILE_NAME: &str = ".l10n-resolver.json";

/// Deployment-level override of the language code field name.
pub const LANGUAGE_CODE_KEY_ENV: &str = "TN_LANGUAGE_CODE_KEY";

/// Load the configuration file of a directory.
///
/// # Returns
/// - `Ok(Some(config))`: the file exists and was parsed
/// - `Ok(None)`: no configuration file in `dir`
/// - `Err(ConfigError)`: read or parse failure
pub(super) fn load_from_dir(dir: &Path) -> Result<Option<ResolverConfig>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!("Configuration file not found: {:?}", config_path);
        return Ok(None);
    }

    load_from_path(&config_path).map(Some)
}

/// Load an explicit configuration file.
pub(super) fn load_from_path(path: &Path) -> Result<ResolverConfig, ConfigError> {
    tracing::debug!("Loading configuration from: {:?}", path);

    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// An empty document yields the default configuration.
fn parse_config(content: &str) -> Result<ResolverConfig, ConfigError> {
    let parse_options = ParseOptions::default();
    let Some(value) = jsonc_parser::parse_to_serde_value(content, &parse_options)? else {
        return Ok(ResolverConfig::default());
    };

    Ok(serde_json::from_value(value)?)
}

/// Apply environment overrides, reading variables through `lookup`.
///
/// An empty variable is ignored.
pub fn apply_env_overrides<F>(config: &mut ResolverConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup(LANGUAGE_CODE_KEY_ENV).filter(|key| !key.is_empty()) {
        tracing::debug!("Language code key overridden by {}: {:?}", LANGUAGE_CODE_KEY_ENV, key);
        config.language_code_key = key;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn test_load_from_dir_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"locale": "fr-FR", "fallbackLocale": "en-US"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let result = load_from_dir(temp_dir.path());

        assert!(result.is_ok());
        let config = result.unwrap().unwrap();
        assert_eq!(config.locale, "fr-FR");
        assert_eq!(config.fallback_locale.as_deref(), Some("en-US"));
    }

    #[rstest]
    fn test_load_from_dir_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_dir(temp_dir.path());

        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[rstest]
    fn test_load_from_dir_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "{ invalid json").unwrap();

        let result = load_from_dir(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[rstest]
    fn test_load_from_path_wrong_type() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("resolver.json");
        fs::write(&path, r#"{"keepJoinIdField": "yes"}"#).unwrap();

        let result = load_from_path(&path);

        assert!(matches!(result, Err(ConfigError::DeserializeError(_))));
    }

    #[rstest]
    fn test_load_from_path_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_path(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[rstest]
    fn test_parse_config_with_comments() {
        let content = r#"{
            // per-level translation fields
            "translationKeySet": {
                "default": ["translations"],
                "posts": ["content_translations"], /* nested posts */
            },
            "useGenericLocaleMatch": true,
        }"#;

        let config = parse_config(content).unwrap();

        assert!(config.use_generic_locale_match);
        assert_eq!(
            config.translation_fields_for("posts").unwrap().to_vec(),
            vec!["content_translations".to_string()]
        );
    }

    #[rstest]
    #[case("")]
    #[case("   \n")]
    #[case("// nothing but a comment")]
    fn test_parse_config_empty_document(#[case] content: &str) {
        let config = parse_config(content).unwrap();

        assert_eq!(config, ResolverConfig::default());
    }

    #[rstest]
    #[case(Some("lang"), "lang")]
    #[case(Some(""), "languages_code")]
    #[case(None, "languages_code")]
    fn test_apply_env_overrides(#[case] env_value: Option<&str>, #[case] expected: &str) {
        let mut config = ResolverConfig::default();

        apply_env_overrides(&mut config, |name| {
            (name == "TN_LANGUAGE_CODE_KEY").then(|| env_value.map(str::to_string)).flatten()
        });

        assert_eq!(config.language_code_key, expected);
    }
}
