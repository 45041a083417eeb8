//! Recursive tree walk with a per-call identity cache.

use std::collections::HashMap;

use super::ResolveStats;
use super::locale::{
    LocaleMatch,
    LocaleMatcher,
};
use crate::config::ResolverConfig;
use crate::node::{
    Fields,
    Node,
    NodeId,
    Record,
    Sequence,
};

/// State of a single `process` call.
///
/// The cache maps input records and sequences (by allocation) to their
/// output. Outputs are cached before their children are walked, so a
/// reference back to an ancestor resolves to the ancestor's output.
#[derive(Debug)]
pub(super) struct Walker<'a> {
    /// Settings of the resolver running this walk.
    config: &'a ResolverConfig,
    /// Locale matcher built from `config`.
    matcher: LocaleMatcher<'a>,
    /// Input allocation -> output node.
    cache: HashMap<NodeId, Node>,
    /// Counters reported once the walk is done.
    stats: ResolveStats,
}

impl<'a> Walker<'a> {
    /// Walker with an empty cache.
    pub(super) fn new(config: &'a ResolverConfig) -> Self {
        Self {
            config,
            matcher: LocaleMatcher::new(config),
            cache: HashMap::new(),
            stats: ResolveStats::default(),
        }
    }

    /// Counters collected so far.
    pub(super) const fn stats(&self) -> ResolveStats {
        self.stats
    }

    /// Resolves `node`, reached under the descent `level`.
    pub(super) fn walk(&mut self, node: &Node, level: &str) -> Node {
        if let Some(id) = node.id()
            && let Some(cached) = self.cache.get(&id)
        {
            self.stats.cache_hits += 1;
            return cached.clone();
        }

        match node {
            Node::Sequence(sequence) => self.walk_sequence(sequence, level),
            Node::Record(record) => self.walk_record(record, level),
            Node::Null | Node::Bool(_) | Node::Number(_) | Node::String(_) => node.clone(),
        }
    }

    /// Walks every item of `sequence` at the same level.
    fn walk_sequence(&mut self, sequence: &Sequence, level: &str) -> Node {
        let output = Sequence::new();
        self.cache.insert(sequence.id(), Node::Sequence(output.clone()));
        self.stats.sequences += 1;

        let items = sequence.items().iter().map(|item| self.walk(item, level)).collect();
        output.replace_items(items);

        Node::Sequence(output)
    }

    /// Resolves the translations of `record`, then walks its fields.
    fn walk_record(&mut self, record: &Record, level: &str) -> Node {
        let output = Record::new();
        self.cache.insert(record.id(), Node::Record(output.clone()));
        self.stats.records += 1;

        let mut result = record.fields();
        self.resolve_translations(record, level, &mut result);

        // Each field name becomes the descent level of its value.
        let fields: Fields = result
            .into_iter()
            .map(|(field, value)| {
                let resolved = self.walk(&value, &field);
                (field, resolved)
            })
            .collect();
        output.replace_fields(fields);

        Node::Record(output)
    }

    /// Merges the chosen variant of every translation field active at `level`
    /// into `result` and drops the fields marked for removal.
    fn resolve_translations(&mut self, record: &Record, level: &str, result: &mut Fields) {
        let config = self.config;
        let Some(translation_fields) = config.translation_fields_for(level) else {
            return;
        };

        let mut keys_to_remove: Vec<String> = Vec::new();

        for key in translation_fields {
            let translations = record.get(key);
            let chosen = translations
                .as_ref()
                .and_then(Node::as_sequence)
                .and_then(|sequence| self.matcher.find_best_match(&sequence.items()));

            let Some(chosen) = chosen else {
                if translations.is_some() {
                    tracing::trace!("No variant of '{}' matches at level '{}'", key, level);
                    self.stats.unresolved += 1;
                }
                keys_to_remove.push(key.clone());
                continue;
            };

            match &chosen {
                LocaleMatch::Primary(_) => self.stats.primary += 1,
                LocaleMatch::Fallback(_) => {
                    tracing::trace!("Using fallback variant of '{}' at level '{}'", key, level);
                    self.stats.fallback += 1;
                }
            }

            self.merge_variant(chosen.variant(), result);

            if config.replace_fields_overlapping_key_name {
                // Substring match: every field whose name occurs inside `key` is dropped.
                keys_to_remove
                    .extend(result.keys().filter(|field| key.contains(field.as_str())).cloned());
            }

            if config.remove_source_collection_field {
                keys_to_remove.push(key.clone());
            }
        }

        for key in &keys_to_remove {
            result.shift_remove(key);
        }
    }

    /// Copies the variant's fields into `result`, overwriting existing ones.
    /// The join id is skipped unless `keep_join_id_field` is set.
    fn merge_variant(&self, variant: &Record, result: &mut Fields) {
        for (field, value) in variant.fields() {
            if !self.config.keep_join_id_field && field == self.config.join_id_key {
                continue;
            }
            result.insert(field, value);
        }
    }
}
