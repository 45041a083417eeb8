//! l10n-resolver
//!
//! Resolves translation collections embedded in nested payloads (records
//! carrying arrays of per-locale variants) down to a single locale.

pub mod config;
pub mod node;
pub mod resolver;
mod test_utils;

pub use config::{
    ConfigError,
    ConfigManager,
    ResolverConfig,
};
pub use node::{
    Node,
    NodeError,
    Record,
    Sequence,
};
pub use resolver::{
    LocalizationResolver,
    ResolveStats,
};
