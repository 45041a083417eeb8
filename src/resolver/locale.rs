//! Locale variant matching.

use crate::config::ResolverConfig;
use crate::node::{
    Node,
    Record,
};

/// Reduces a language code to its comparable form.
///
/// Drops everything but ASCII letters and digits and lowercases the rest.
/// With `generic`, the result is cut to a language prefix: 3 characters for
/// 5-character codes (`kok-IN`), 2 otherwise (`en-US`).
///
/// # Examples
/// ```
/// use l10n_resolver::resolver::normalize_locale;
///
/// assert_eq!(normalize_locale("en-US", false), "enus");
/// assert_eq!(normalize_locale("en_GB", true), "en");
/// assert_eq!(normalize_locale("kok-IN", true), "kok");
/// ```
#[must_use]
pub fn normalize_locale(code: &str, generic: bool) -> String {
    let normalized: String =
        code.chars().filter(char::is_ascii_alphanumeric).map(|c| c.to_ascii_lowercase()).collect();

    if !generic {
        return normalized;
    }

    let width = if normalized.len() == 5 { 3 } else { 2 };
    normalized.chars().take(width).collect()
}

/// Variant chosen for a translation collection.
#[derive(Debug, Clone)]
pub(crate) enum LocaleMatch {
    /// Matched the requested locale.
    Primary(Record),
    /// Matched the fallback locale.
    Fallback(Record),
}

impl LocaleMatch {
    /// The chosen variant record.
    pub(crate) const fn variant(&self) -> &Record {
        match self {
            Self::Primary(variant) | Self::Fallback(variant) => variant,
        }
    }
}

/// Picks locale variants out of translation collections.
#[derive(Debug, Clone)]
pub(crate) struct LocaleMatcher<'a> {
    /// Field of a variant holding its language code.
    language_code_key: &'a str,
    /// Requested locale, already normalized.
    locale: String,
    /// Exact code of the fallback variant. An empty fallback means none.
    fallback_locale: Option<&'a str>,
    /// Compare language prefixes only.
    generic: bool,
}

impl<'a> LocaleMatcher<'a> {
    /// Matcher for the locales and language code key of `config`.
    pub(crate) fn new(config: &'a ResolverConfig) -> Self {
        Self {
            language_code_key: &config.language_code_key,
            locale: normalize_locale(&config.locale, config.use_generic_locale_match),
            fallback_locale: config.fallback_locale.as_deref().filter(|f| !f.is_empty()),
            generic: config.use_generic_locale_match,
        }
    }

    /// Whether the language code of `variant` satisfies `accept`.
    ///
    /// Variants with a missing or non-string code never match.
    fn code_matches(&self, variant: &Record, accept: impl FnOnce(&str) -> bool) -> bool {
        variant.with_field(self.language_code_key, |code| {
            code.and_then(Node::as_str).is_some_and(accept)
        })
    }

    /// First variant matching the locale, else the first one whose code equals
    /// the fallback locale exactly.
    ///
    /// Elements that are not records never match.
    pub(crate) fn find_best_match(&self, translations: &[Node]) -> Option<LocaleMatch> {
        let variants = || translations.iter().filter_map(Node::as_record);

        if let Some(primary) = variants().find(|variant| {
            self.code_matches(variant, |code| normalize_locale(code, self.generic) == self.locale)
        }) {
            return Some(LocaleMatch::Primary(primary.clone()));
        }

        let fallback_locale = self.fallback_locale?;
        variants()
            .find(|variant| self.code_matches(variant, |code| code == fallback_locale))
            .map(|variant| LocaleMatch::Fallback(variant.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn title_of(found: &LocaleMatch) -> String {
        found.variant().get("title").and_then(|t| t.as_str().map(str::to_string)).unwrap()
    }

    fn variants(value: serde_json::Value) -> Vec<Node> {
        Node::from(value).as_sequence().unwrap().items()
    }

    #[rstest]
    #[case("en-US", false, "enus")]
    #[case("EN_us", false, "enus")]
    #[case("zh-Hant-TW", false, "zhhanttw")]
    #[case(" fr.FR! ", false, "frfr")]
    #[case("", false, "")]
    #[case("en-US", true, "en")]
    #[case("en-GB", true, "en")]
    #[case("en", true, "en")]
    #[case("kok-IN", true, "kok")]
    #[case("zh-Hant-TW", true, "zh")]
    #[case("é-fr", true, "fr")]
    fn normalize_locale_cases(#[case] code: &str, #[case] generic: bool, #[case] expected: &str) {
        assert_eq!(normalize_locale(code, generic), expected);
    }

    #[rstest]
    fn primary_match_ignores_separator_and_case() {
        let config = ResolverConfig::default().with_locale("fr_fr");
        let matcher = LocaleMatcher::new(&config);
        let translations = variants(json!([
            { "languages_code": "en-US", "title": "Hi" },
            { "languages_code": "fr-FR", "title": "Salut" }
        ]));

        let found = matcher.find_best_match(&translations).unwrap();

        assert!(matches!(found, LocaleMatch::Primary(_)));
        assert_that!(title_of(&found), eq("Salut"));
    }

    #[rstest]
    fn first_matching_variant_wins() {
        let config = ResolverConfig::default().with_locale("en-US");
        let matcher = LocaleMatcher::new(&config);
        let translations = variants(json!([
            { "languages_code": "en_us", "title": "First" },
            { "languages_code": "en-US", "title": "Second" }
        ]));

        let found = matcher.find_best_match(&translations).unwrap();

        assert_that!(title_of(&found), eq("First"));
    }

    #[rstest]
    fn fallback_requires_exact_code() {
        let config = ResolverConfig::default().with_locale("de-DE").with_fallback_locale("en-US");
        let matcher = LocaleMatcher::new(&config);
        let translations = variants(json!([
            { "languages_code": "en_us", "title": "Loose" },
            { "languages_code": "en-US", "title": "Exact" }
        ]));

        let found = matcher.find_best_match(&translations).unwrap();

        assert!(matches!(found, LocaleMatch::Fallback(_)));
        assert_that!(title_of(&found), eq("Exact"));
    }

    #[rstest]
    fn fallback_is_not_generic() {
        let config = ResolverConfig::default()
            .with_locale("de-DE")
            .with_fallback_locale("en")
            .with_generic_locale_match(true);
        let matcher = LocaleMatcher::new(&config);
        let translations = variants(json!([{ "languages_code": "en-US", "title": "Hi" }]));

        assert!(matcher.find_best_match(&translations).is_none());
    }

    #[rstest]
    fn generic_match_collapses_regions() {
        let config = ResolverConfig::default().with_locale("en-GB").with_generic_locale_match(true);
        let matcher = LocaleMatcher::new(&config);
        let translations = variants(json!([
            { "languages_code": "fr-FR", "title": "Salut" },
            { "languages_code": "en-US", "title": "Hi" }
        ]));

        let found = matcher.find_best_match(&translations).unwrap();

        assert_that!(title_of(&found), eq("Hi"));
    }

    #[rstest]
    #[case(json!([{ "title": "No code" }]))]
    #[case(json!([{ "languages_code": null, "title": "Null code" }]))]
    #[case(json!([{ "languages_code": 42, "title": "Numeric code" }]))]
    #[case(json!(["en-US", null, 1]))]
    #[case(json!([]))]
    fn unusable_variants_never_match(#[case] value: serde_json::Value) {
        let config = ResolverConfig::default();
        let matcher = LocaleMatcher::new(&config);

        assert!(matcher.find_best_match(&variants(value)).is_none());
    }

    #[rstest]
    #[case(json!([{ "title": "No code" }]))]
    #[case(json!([{ "languages_code": null, "title": "Null code" }]))]
    #[case(json!([{ "languages_code": "", "title": "Empty code" }]))]
    fn empty_fallback_locale_disables_fallback(#[case] value: serde_json::Value) {
        let config = ResolverConfig::default().with_locale("de-DE").with_fallback_locale("");
        let matcher = LocaleMatcher::new(&config);

        assert!(matcher.find_best_match(&variants(value)).is_none());
    }

    #[rstest]
    fn missing_code_never_matches_empty_normalized_locale() {
        let config = ResolverConfig::default().with_locale("--");
        let matcher = LocaleMatcher::new(&config);
        let translations = variants(json!([
            { "title": "No code" },
            { "languages_code": "_", "title": "Separator only" }
        ]));

        let found = matcher.find_best_match(&translations).unwrap();

        assert_that!(title_of(&found), eq("Separator only"));
    }

    #[rstest]
    fn custom_language_code_key() {
        let config = ResolverConfig::default().with_language_code_key("lang");
        let matcher = LocaleMatcher::new(&config);
        let translations = variants(json!([
            { "languages_code": "en-US", "title": "Wrong key" },
            { "lang": "en-US", "title": "Right key" }
        ]));

        let found = matcher.find_best_match(&translations).unwrap();

        assert_that!(title_of(&found), eq("Right key"));
    }
}
