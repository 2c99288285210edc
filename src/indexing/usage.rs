//! Dual-keyed usage graph: registry entry × importing file → import location.

use std::collections::{HashMap, HashSet};

use crate::types::SourceLocation;

/// Edges from importing files to one kind of registry entry.
///
/// `by_importer` mirrors `edges` so that all edges of one importer can be dropped
/// in one step before a rescan adds its new ones.
#[derive(Debug, Default, Clone)]
pub struct UsageGraph {
    edges: HashMap<String, HashMap<String, SourceLocation>>,
    by_importer: HashMap<String, HashSet<String>>,
}

impl UsageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `importer` imports `entry` at `location`.
    ///
    /// When a file imports the same entry twice, the first location is kept.
    pub fn add_edge(&mut self, entry: &str, importer: &str, location: SourceLocation) {
        self.edges
            .entry(entry.to_string())
            .or_default()
            .entry(importer.to_string())
            .or_insert(location);
        self.by_importer
            .entry(importer.to_string())
            .or_default()
            .insert(entry.to_string());
    }

    /// Drop every outgoing edge of `importer`; returns the entries it pointed to.
    pub fn clear_importer(&mut self, importer: &str) -> Vec<String> {
        let Some(entries) = self.by_importer.remove(importer) else {
            return Vec::new();
        };
        for entry in &entries {
            if let Some(importers) = self.edges.get_mut(entry) {
                importers.remove(importer);
                if importers.is_empty() {
                    self.edges.remove(entry);
                }
            }
        }
        let mut entries: Vec<String> = entries.into_iter().collect();
        entries.sort();
        entries
    }

    pub fn has_edge(&self, entry: &str, importer: &str) -> bool {
        self.edges
            .get(entry)
            .is_some_and(|importers| importers.contains_key(importer))
    }

    pub fn location(&self, entry: &str, importer: &str) -> Option<SourceLocation> {
        self.edges.get(entry)?.get(importer).copied()
    }

    pub fn incoming_count(&self, entry: &str) -> usize {
        self.edges.get(entry).map_or(0, HashMap::len)
    }

    /// Importers of `entry` with their locations, sorted by importer.
    pub fn importers_of(&self, entry: &str) -> Vec<(String, SourceLocation)> {
        let mut importers: Vec<_> = self
            .edges
            .get(entry)
            .map(|importers| {
                importers
                    .iter()
                    .map(|(importer, location)| (importer.clone(), *location))
                    .collect()
            })
            .unwrap_or_default();
        importers.sort_by(|a, b| a.0.cmp(&b.0));
        importers
    }

    /// Entries imported by `importer`, sorted.
    pub fn entries_of(&self, importer: &str) -> Vec<String> {
        let mut entries: Vec<String> = self
            .by_importer
            .get(importer)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default();
        entries.sort();
        entries
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(HashMap::len).sum()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.by_importer.clear();
    }
}
