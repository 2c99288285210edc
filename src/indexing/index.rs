//! In-memory project index
//!
//! Four registries (source files, external modules, whole-module import patterns,
//! symbol import patterns) and one usage graph per registry. A file's outgoing
//! edges are always replaced as a whole: `scan_module_for_imports` clears every
//! edge the file contributed before adding the edges of its new content.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, trace};

use super::file_info::FileInfo;
use super::modules::{
    NodeModule, ProjectModule, SourceModule, SourceModuleImport, SourceSymbolImport,
};
use super::usage::UsageGraph;
use crate::parsing::{ImportKind, ImportParser};
use crate::project_resolver::path::{normalize, parent, to_slash};
use crate::project_resolver::{ModuleLookup, ModuleResolver, Resolution};
use crate::types::{ScanOutcome, SourceLocation};

/// Registry sizes and edge totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub source_modules: usize,
    pub node_modules: usize,
    pub module_imports: usize,
    pub symbol_imports: usize,
    pub edges: usize,
}

#[derive(Debug, Default)]
pub struct ProjectIndex {
    source_modules: HashMap<String, SourceModule>,
    node_modules: HashMap<String, NodeModule>,
    module_imports: HashMap<String, SourceModuleImport>,
    symbol_imports: HashMap<String, SourceSymbolImport>,

    source_usage: UsageGraph,
    node_usage: UsageGraph,
    module_import_usage: UsageGraph,
    symbol_import_usage: UsageGraph,

    files: HashMap<String, FileInfo>,
    /// Files that lost their key to a higher-quality sibling
    shadowed: HashMap<String, Vec<SourceModule>>,
}

impl ModuleLookup for ProjectIndex {
    fn contains_module(&self, key: &str) -> bool {
        self.source_modules.contains_key(key)
    }
}

/// Identity of an importing file in the usage graphs.
pub fn importer_key(path: &Path) -> String {
    normalize(&to_slash(path))
}

impl ProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an in-project file.
    ///
    /// Returns false when the key is already held by a file of equal or higher quality.
    /// The losing file is remembered and takes the key over if the winner is deleted.
    pub fn register_source_module(&mut self, path: &Path) -> bool {
        let module = SourceModule::new(path);
        let key = module.key();
        let holder = self
            .source_modules
            .get(&key)
            .map(|existing| (existing.specifier.clone(), existing.symbol_quality()));
        if let Some((specifier, quality)) = holder {
            if specifier == module.specifier {
                return false;
            }
            if quality >= module.symbol_quality() {
                trace!("keeping {specifier} over {}", module.specifier);
                self.shadow(key, module);
                return false;
            }
        }

        if let Some(candidates) = self.shadowed.get_mut(&key) {
            candidates.retain(|candidate| candidate.specifier != module.specifier);
        }
        if let Some(previous) = self.source_modules.insert(key.clone(), module) {
            self.shadow(key, previous);
        }
        true
    }

    fn shadow(&mut self, key: String, module: SourceModule) {
        let candidates = self.shadowed.entry(key).or_default();
        if !candidates
            .iter()
            .any(|candidate| candidate.specifier == module.specifier)
        {
            candidates.push(module);
        }
    }

    /// Best remaining sibling for `key`, removed from the shadow list.
    fn take_shadowed(&mut self, key: &str) -> Option<SourceModule> {
        let candidates = self.shadowed.get_mut(key)?;
        let best = (0..candidates.len()).max_by_key(|&i| candidates[i].symbol_quality())?;
        let module = candidates.swap_remove(best);
        if candidates.is_empty() {
            self.shadowed.remove(key);
        }
        Some(module)
    }

    /// Forget a deleted file: its outgoing edges, scan record, and registry entry.
    ///
    /// When the file held its key, the best shadowed sibling takes the key over.
    /// Edges pointing at the file stay; they are replaced when the importers are rescanned.
    pub fn unregister_source_module(&mut self, path: &Path) -> bool {
        let importer = importer_key(path);
        self.clear_importer(&importer);
        self.files.remove(&importer);

        let key = SourceModule::new(path).key();
        if let Some(candidates) = self.shadowed.get_mut(&key) {
            candidates.retain(|candidate| candidate.specifier != importer);
        }
        let owned = self
            .source_modules
            .get(&key)
            .is_some_and(|module| module.specifier == importer);
        if !owned {
            return false;
        }
        self.source_modules.remove(&key);
        if let Some(sibling) = self.take_shadowed(&key) {
            debug!("{} takes over {key}", sibling.specifier);
            self.source_modules.insert(key, sibling);
        }
        true
    }

    /// Re-read the import statements of one file.
    ///
    /// Unless `force` is set, content identical to the last scan is skipped.
    pub fn scan_module_for_imports(
        &mut self,
        path: &Path,
        content: &str,
        resolver: &ModuleResolver,
        force: bool,
    ) -> ScanOutcome {
        let importer = importer_key(path);
        if !force {
            if let Some(info) = self.files.get(&importer) {
                if !info.has_changed(content) {
                    return ScanOutcome::Unchanged;
                }
            }
        }

        self.clear_importer(&importer);

        let importing_dir = parent(&importer);
        let mut parser = ImportParser::new();
        let statements = parser.parse(content);
        let mut edges = 0;

        for statement in &statements {
            let location = statement.start;
            let universal = match resolver.resolve(&importing_dir, &statement.specifier, &*self) {
                Resolution::Source(key) => {
                    self.source_usage.add_edge(&key, &importer, location);
                    key
                }
                Resolution::External(specifier) => {
                    self.node_modules
                        .entry(specifier.clone())
                        .or_insert_with(|| NodeModule::new(specifier.clone()));
                    self.node_usage.add_edge(&specifier, &importer, location);
                    specifier
                }
                Resolution::Unresolved => {
                    debug!(
                        "unresolved import '{}' in {importer} at {location}",
                        statement.specifier
                    );
                    continue;
                }
            };
            edges += 1;

            let module_patterns = [
                (statement.default_alias.clone(), ImportKind::DefaultAlias),
                (statement.all_alias.clone(), ImportKind::AllAlias),
            ];
            for (alias, kind) in module_patterns {
                if alias.is_some() {
                    let pattern = SourceModuleImport::new(&universal, alias, kind);
                    self.add_module_pattern(pattern, &importer, location);
                }
            }
            if statement.kind == ImportKind::ModuleOnly {
                self.add_module_pattern(
                    SourceModuleImport::new(&universal, None, ImportKind::ModuleOnly),
                    &importer,
                    location,
                );
            }
            for symbol in &statement.symbols {
                let pattern =
                    SourceSymbolImport::new(&universal, &symbol.name, symbol.alias.clone());
                let key = pattern.key();
                self.symbol_imports.entry(key.clone()).or_insert(pattern);
                self.symbol_import_usage.add_edge(&key, &importer, location);
            }
        }

        debug!(
            "scanned {importer}: {} statements, {edges} resolved, {} skipped",
            statements.len(),
            parser.skipped()
        );
        self.files.insert(
            importer,
            FileInfo::new(path.to_path_buf(), content, statements.len()),
        );
        ScanOutcome::Scanned {
            statements: statements.len(),
        }
    }

    fn add_module_pattern(
        &mut self,
        pattern: SourceModuleImport,
        importer: &str,
        location: SourceLocation,
    ) {
        let key = pattern.key();
        self.module_imports.entry(key.clone()).or_insert(pattern);
        self.module_import_usage.add_edge(&key, importer, location);
    }

    /// Drop every outgoing edge of `importer` across all four graphs.
    fn clear_importer(&mut self, importer: &str) {
        self.source_usage.clear_importer(importer);
        self.node_usage.clear_importer(importer);
        self.module_import_usage.clear_importer(importer);
        self.symbol_import_usage.clear_importer(importer);
    }

    /// Remove import patterns nobody uses any more. Files and external modules stay.
    pub fn prune_unused_patterns(&mut self) -> usize {
        let before = self.module_imports.len() + self.symbol_imports.len();
        let module_usage = &self.module_import_usage;
        self.module_imports
            .retain(|key, _| module_usage.incoming_count(key) > 0);
        let symbol_usage = &self.symbol_import_usage;
        self.symbol_imports
            .retain(|key, _| symbol_usage.incoming_count(key) > 0);
        let pruned = before - (self.module_imports.len() + self.symbol_imports.len());
        if pruned > 0 {
            debug!("pruned {pruned} unused import patterns");
        }
        pruned
    }

    /// Drop everything; used before a full rebuild.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn source_module(&self, key: &str) -> Option<&SourceModule> {
        self.source_modules.get(key)
    }

    pub fn node_module(&self, specifier: &str) -> Option<&NodeModule> {
        self.node_modules.get(specifier)
    }

    pub fn source_modules(&self) -> impl Iterator<Item = &SourceModule> {
        self.source_modules.values()
    }

    pub fn node_modules(&self) -> impl Iterator<Item = &NodeModule> {
        self.node_modules.values()
    }

    /// Whole-module import patterns, sorted by key.
    pub fn module_imports(&self) -> Vec<&SourceModuleImport> {
        let mut patterns: Vec<_> = self.module_imports.values().collect();
        patterns.sort_by_key(|pattern| pattern.key());
        patterns
    }

    /// Symbol import patterns, sorted by key.
    pub fn symbol_imports(&self) -> Vec<&SourceSymbolImport> {
        let mut patterns: Vec<_> = self.symbol_imports.values().collect();
        patterns.sort_by_key(|pattern| pattern.key());
        patterns
    }

    /// Files importing the source module or external module `key`.
    pub fn importers_of(&self, key: &str) -> Vec<(String, SourceLocation)> {
        let mut importers = self.source_usage.importers_of(key);
        importers.extend(self.node_usage.importers_of(key));
        importers
    }

    pub fn incoming_count(&self, key: &str) -> usize {
        self.source_usage.incoming_count(key) + self.node_usage.incoming_count(key)
    }

    /// Number of files using an import pattern.
    pub fn pattern_usage(&self, pattern_key: &str) -> usize {
        self.module_import_usage.incoming_count(pattern_key)
            + self.symbol_import_usage.incoming_count(pattern_key)
    }

    /// Modules imported by the file at `path` (source keys and external specifiers).
    pub fn imports_of(&self, path: &Path) -> Vec<String> {
        let importer = importer_key(path);
        let mut entries = self.source_usage.entries_of(&importer);
        entries.extend(self.node_usage.entries_of(&importer));
        entries
    }

    /// Whether any usage graph holds an edge from `path` to `entry`.
    pub fn has_edge(&self, entry: &str, path: &Path) -> bool {
        let importer = importer_key(path);
        [
            &self.source_usage,
            &self.node_usage,
            &self.module_import_usage,
            &self.symbol_import_usage,
        ]
        .iter()
        .any(|graph| graph.has_edge(entry, &importer))
    }

    /// Source modules nobody imports, sorted by key.
    pub fn unused_source_modules(&self) -> Vec<&SourceModule> {
        let mut unused: Vec<_> = self
            .source_modules
            .iter()
            .filter(|(key, _)| self.source_usage.incoming_count(key) == 0)
            .map(|(_, module)| module)
            .collect();
        unused.sort_by(|a, b| a.specifier.cmp(&b.specifier));
        unused
    }

    /// External modules nobody imports any more, sorted by specifier.
    pub fn unused_node_modules(&self) -> Vec<&NodeModule> {
        let mut unused: Vec<_> = self
            .node_modules
            .iter()
            .filter(|(key, _)| self.node_usage.incoming_count(key) == 0)
            .map(|(_, module)| module)
            .collect();
        unused.sort_by(|a, b| a.specifier.cmp(&b.specifier));
        unused
    }

    /// Stamp the entry with `key` in whichever registry holds it.
    pub fn mark_used(&mut self, key: &str) -> bool {
        if let Some(module) = self.source_modules.get_mut(key) {
            module.mark_used();
        } else if let Some(module) = self.node_modules.get_mut(key) {
            module.mark_used();
        } else if let Some(pattern) = self.module_imports.get_mut(key) {
            pattern.mark_used();
        } else if let Some(pattern) = self.symbol_imports.get_mut(key) {
            pattern.mark_used();
        } else {
            return false;
        }
        true
    }

    pub fn is_scanned(&self, path: &Path) -> bool {
        self.files.contains_key(&importer_key(path))
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            source_modules: self.source_modules.len(),
            node_modules: self.node_modules.len(),
            module_imports: self.module_imports.len(),
            symbol_imports: self.symbol_imports.len(),
            edges: self.source_usage.edge_count()
                + self.node_usage.edge_count()
                + self.module_import_usage.edge_count()
                + self.symbol_import_usage.edge_count(),
        }
    }
}
