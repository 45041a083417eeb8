//! Localization resolver.
//!
//! Rewrites a payload tree so that every record carrying a translation
//! collection is merged with its best-matching locale variant.
//!
//! ```
//! use l10n_resolver::{LocalizationResolver, ResolverConfig};
//! use serde_json::json;
//!
//! let resolver = LocalizationResolver::new(ResolverConfig::default().with_locale("fr-FR"));
//! let payload = json!({
//!     "id": 1,
//!     "translations": [
//!         { "languages_code": "en-US", "title": "Hi" },
//!         { "languages_code": "fr-FR", "title": "Salut" }
//!     ]
//! });
//!
//! let resolved = resolver.process_json(payload).unwrap();
//! assert_eq!(resolved, json!({ "id": 1, "languages_code": "fr-FR", "title": "Salut" }));
//! ```

mod locale;
mod walk;

pub use locale::normalize_locale;
use serde_json::Value;

use crate::config::{
    DEFAULT_LEVEL,
    ResolverConfig,
};
use crate::node::{
    Node,
    NodeError,
};

/// Counters collected during one `process` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Distinct records visited.
    pub records: usize,
    /// Distinct sequences visited.
    pub sequences: usize,
    /// References answered from the cache.
    pub cache_hits: usize,
    /// Translation fields resolved with the requested locale.
    pub primary: usize,
    /// Translation fields resolved with the fallback locale.
    pub fallback: usize,
    /// Translation fields present without a usable variant.
    pub unresolved: usize,
}

/// Resolves translation collections in payload trees.
///
/// The configuration is fixed at construction. Every call to
/// [`process`](Self::process) walks the tree with its own cache, so calls do
/// not observe each other.
#[derive(Debug, Clone, Default)]
pub struct LocalizationResolver {
    config: ResolverConfig,
}

impl LocalizationResolver {
    #[must_use]
    pub const fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolver with a configuration derived from this one.
    #[must_use]
    pub fn reconfigure<F>(&self, update: F) -> Self
    where
        F: FnOnce(ResolverConfig) -> ResolverConfig,
    {
        Self::new(update(self.config.clone()))
    }

    /// Resolves `root`, starting at the `"default"` level.
    #[must_use]
    pub fn process(&self, root: &Node) -> Node {
        self.process_with_stats(root).0
    }

    #[must_use]
    pub fn process_with_stats(&self, root: &Node) -> (Node, ResolveStats) {
        let mut walker = walk::Walker::new(&self.config);
        let resolved = walker.walk(root, DEFAULT_LEVEL);
        let stats = walker.stats();

        tracing::debug!(
            "Resolved payload for locale '{}' (fallback: {:?}): {:?}",
            self.config.locale,
            self.config.fallback_locale,
            stats
        );

        (resolved, stats)
    }

    /// Resolves a decoded JSON payload.
    ///
    /// # Errors
    /// Only fails if the resolved tree contains a cycle, which a value decoded
    /// from JSON cannot produce.
    pub fn process_json(&self, payload: Value) -> Result<Value, NodeError> {
        self.process(&Node::from(payload)).to_json()
    }
}
