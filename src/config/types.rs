use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

/// Level name used for the root of a payload and for levels without an entry.
pub const DEFAULT_LEVEL: &str = "default";

/// Descent level -> ordered translation field names.
pub type TranslationKeySet = HashMap<String, Vec<String>>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "translationKeySet.posts[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] jsonc_parser::errors::ParseError),

    #[error("Invalid configuration value: {0}")]
    DeserializeError(#[from] serde_json::Error),
}

/// One numbered line per error.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Settings of a [`LocalizationResolver`](crate::LocalizationResolver).
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration. Values are never mutated in place by the resolver; the
/// `with_*` methods return an updated copy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverConfig {
    /// Locale matched against each variant's language code.
    pub locale: String,

    /// Locale used when no variant matches `locale`. Compared exactly.
    pub fallback_locale: Option<String>,

    /// Field of a locale variant holding its language code.
    pub language_code_key: String,

    /// Translation fields per descent level.
    pub translation_key_set: TranslationKeySet,

    /// Join row id field of a locale variant.
    pub join_id_key: String,

    /// Merge the variant's join id into the parent record.
    pub keep_join_id_field: bool,

    /// Drop parent fields whose name is a substring of the translation field name.
    pub replace_fields_overlapping_key_name: bool,

    /// Drop the translation field once a variant has been merged.
    ///
    /// Unresolved translation fields are always dropped.
    pub remove_source_collection_field: bool,

    /// Compare language prefixes only (`en-GB` matches `en-US`).
    pub use_generic_locale_match: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".to_string(),
            fallback_locale: None,
            language_code_key: "languages_code".to_string(),
            translation_key_set: HashMap::from([(
                DEFAULT_LEVEL.to_string(),
                vec!["translations".to_string()],
            )]),
            join_id_key: "id".to_string(),
            keep_join_id_field: true,
            replace_fields_overlapping_key_name: false,
            remove_source_collection_field: true,
            use_generic_locale_match: false,
        }
    }
}

impl ResolverConfig {
    /// Translation fields active at `level`, falling back to the `"default"` entry.
    #[must_use]
    pub fn translation_fields_for(&self, level: &str) -> Option<&[String]> {
        self.translation_key_set
            .get(level)
            .or_else(|| self.translation_key_set.get(DEFAULT_LEVEL))
            .map(Vec::as_slice)
    }

    #[must_use]
    pub fn with_locale(self, locale: impl Into<String>) -> Self {
        Self { locale: locale.into(), ..self }
    }

    #[must_use]
    pub fn with_fallback_locale(self, fallback_locale: impl Into<String>) -> Self {
        Self { fallback_locale: Some(fallback_locale.into()), ..self }
    }

    #[must_use]
    pub fn without_fallback_locale(self) -> Self {
        Self { fallback_locale: None, ..self }
    }

    #[must_use]
    pub fn with_language_code_key(self, language_code_key: impl Into<String>) -> Self {
        Self { language_code_key: language_code_key.into(), ..self }
    }

    #[must_use]
    pub fn with_translation_key_set(self, translation_key_set: TranslationKeySet) -> Self {
        Self { translation_key_set, ..self }
    }

    /// Sets the translation fields of a single level.
    #[must_use]
    pub fn with_translation_fields<I, S>(mut self, level: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.translation_key_set.insert(level.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_join_id_key(self, join_id_key: impl Into<String>) -> Self {
        Self { join_id_key: join_id_key.into(), ..self }
    }

    #[must_use]
    pub fn with_keep_join_id_field(self, keep_join_id_field: bool) -> Self {
        Self { keep_join_id_field, ..self }
    }

    #[must_use]
    pub fn with_replace_fields_overlapping_key_name(self, replace: bool) -> Self {
        Self { replace_fields_overlapping_key_name: replace, ..self }
    }

    #[must_use]
    pub fn with_remove_source_collection_field(self, remove: bool) -> Self {
        Self { remove_source_collection_field: remove, ..self }
    }

    #[must_use]
    pub fn with_generic_locale_match(self, generic: bool) -> Self {
        Self { use_generic_locale_match: generic, ..self }
    }

    /// # Errors
    /// - Locale, language code key or join id key is empty
    /// - Fallback locale is present but empty
    /// - A level name or translation field name is empty
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.locale.is_empty() {
            errors.push(ValidationError::new(
                "locale",
                "The locale cannot be empty. Example: \"en-US\"",
            ));
        }

        if let Some(fallback) = &self.fallback_locale
            && fallback.is_empty()
        {
            errors.push(ValidationError::new(
                "fallbackLocale",
                "The fallback locale cannot be empty. Remove this field to disable the fallback",
            ));
        }

        if self.language_code_key.is_empty() {
            errors.push(ValidationError::new(
                "languageCodeKey",
                "The key cannot be empty. Example: \"languages_code\"",
            ));
        }

        if self.join_id_key.is_empty() {
            errors.push(ValidationError::new(
                "joinIdKey",
                "The key cannot be empty. Example: \"id\"",
            ));
        }

        let mut levels: Vec<_> = self.translation_key_set.iter().collect();
        levels.sort_by(|a, b| a.0.cmp(b.0));

        for (level, fields) in levels {
            if level.is_empty() {
                errors.push(ValidationError::new(
                    "translationKeySet",
                    "Level names cannot be empty. Use \"default\" for the root level",
                ));
                continue;
            }

            for (index, field) in fields.iter().enumerate() {
                if field.is_empty() {
                    errors.push(ValidationError::new(
                        format!("translationKeySet.{level}[{index}]"),
                        "The translation field name cannot be empty. Example: \"translations\"",
                    ));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
