//! Registry entries of the project index
//!
//! Four kinds of importable things share one contract: a specifier from which
//! extension, code-ness, index-ness and quality rank are derived on demand.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::parsing::ImportKind;
use crate::project_resolver::path::{normalize, to_slash};
use crate::specifier::Specifier;

/// Shared contract of registry entries.
pub trait ProjectModule {
    /// Universal-path specifier the entry was registered with
    fn specifier(&self) -> &str;

    /// Registry identity
    fn key(&self) -> String;

    /// Milliseconds since UNIX_EPOCH of the last time the entry was picked
    fn last_used(&self) -> Option<i64>;

    fn set_last_used(&mut self, millis: i64);

    fn mark_used(&mut self) {
        self.set_last_used(Utc::now().timestamp_millis());
    }

    fn normalized(&self) -> Specifier {
        Specifier::parse(self.specifier())
    }

    fn shortened(&self) -> String {
        self.normalized().shortened
    }

    fn extension(&self) -> Option<String> {
        self.normalized().extension
    }

    fn is_code(&self) -> bool {
        self.normalized().is_code
    }

    fn has_index(&self) -> bool {
        self.normalized().has_index
    }

    fn symbol_quality(&self) -> u8 {
        self.normalized().symbol_quality()
    }
}

/// An importable file inside the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModule {
    pub path: PathBuf,
    /// Normalized `/` path, extension intact
    pub specifier: String,
    pub last_used: Option<i64>,
}

impl SourceModule {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            specifier: normalize(&to_slash(path)),
            last_used: None,
        }
    }
}

impl ProjectModule for SourceModule {
    fn specifier(&self) -> &str {
        &self.specifier
    }
    fn key(&self) -> String {
        self.shortened()
    }
    fn last_used(&self) -> Option<i64> {
        self.last_used
    }
    fn set_last_used(&mut self, millis: i64) {
        self.last_used = Some(millis);
    }
}

/// A package-style module known only by its specifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeModule {
    pub specifier: String,
    pub last_used: Option<i64>,
}

impl NodeModule {
    pub fn new(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            last_used: None,
        }
    }
}

impl ProjectModule for NodeModule {
    fn specifier(&self) -> &str {
        &self.specifier
    }
    fn key(&self) -> String {
        self.specifier.clone()
    }
    fn last_used(&self) -> Option<i64> {
        self.last_used
    }
    fn set_last_used(&mut self, millis: i64) {
        self.last_used = Some(millis);
    }
}

/// A whole-module import style seen somewhere in the project, e.g. `import React from 'react'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModuleImport {
    /// Universal-path specifier of the target
    pub specifier: String,
    pub alias: Option<String>,
    pub kind: ImportKind,
    pub last_used: Option<i64>,
}

impl SourceModuleImport {
    pub fn new(specifier: impl Into<String>, alias: Option<String>, kind: ImportKind) -> Self {
        Self {
            specifier: specifier.into(),
            alias,
            kind,
            last_used: None,
        }
    }
}

impl ProjectModule for SourceModuleImport {
    fn specifier(&self) -> &str {
        &self.specifier
    }
    fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.kind,
            self.alias.as_deref().unwrap_or(""),
            self.specifier
        )
    }
    fn last_used(&self) -> Option<i64> {
        self.last_used
    }
    fn set_last_used(&mut self, millis: i64) {
        self.last_used = Some(millis);
    }
}

/// A named-symbol import style, e.g. `import { useState as state } from 'react'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSymbolImport {
    /// Universal-path specifier of the target
    pub specifier: String,
    pub name: String,
    pub alias: Option<String>,
    pub last_used: Option<i64>,
}

impl SourceSymbolImport {
    pub fn new(
        specifier: impl Into<String>,
        name: impl Into<String>,
        alias: Option<String>,
    ) -> Self {
        Self {
            specifier: specifier.into(),
            name: name.into(),
            alias,
            last_used: None,
        }
    }
}

impl ProjectModule for SourceSymbolImport {
    fn specifier(&self) -> &str {
        &self.specifier
    }
    fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.name,
            self.alias.as_deref().unwrap_or(""),
            self.specifier
        )
    }
    fn last_used(&self) -> Option<i64> {
        self.last_used
    }
    fn set_last_used(&mut self, millis: i64) {
        self.last_used = Some(millis);
    }
}
