use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::facts::FileRecord;
use super::module_index::ModuleIndex;
use super::paths;
use crate::parsers::{AdapterRegistry, ModuleSyntax};

/// URL-like (`https://`, `node:fs`) and scoped-package (`@scope/pkg`) tokens.
static EXTERNAL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:|@)").expect("external token pattern is valid")
});

/// Outcome of resolving one raw import token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "target", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(String),
    /// Refers to a package outside the repository; never looked up.
    External,
    Unresolved,
}

impl Resolution {
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(path) => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    pub resolved: usize,
    pub external: usize,
    pub unresolved: usize,
}

impl ResolutionStats {
    pub fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Resolved(_) => self.resolved += 1,
            Resolution::External => self.external += 1,
            Resolution::Unresolved => self.unresolved += 1,
        }
    }

    pub fn merge(&mut self, other: &ResolutionStats) {
        self.resolved += other.resolved;
        self.external += other.external;
        self.unresolved += other.unresolved;
    }

    pub fn total(&self) -> usize {
        self.resolved + self.external + self.unresolved
    }
}

pub fn is_external(token: &str) -> bool {
    EXTERNAL_TOKEN.is_match(token)
}

/// Directory that a relative token with `markers` leading markers is
/// anchored at: the importing file's directory, walked up `markers - 1`
/// times. Climbing past the repository root stops at the root.
pub fn relative_base(importing_path: &str, markers: usize) -> String {
    let mut dir = paths::parent_dir(importing_path);
    for _ in 1..markers {
        dir = paths::parent_dir(dir);
    }
    dir.to_string()
}

/// Maps imports to files through a finished [`ModuleIndex`]. Holds no
/// mutable state, so one resolver can be shared across threads.
pub struct ImportResolver<'a> {
    index: &'a ModuleIndex,
    registry: &'a AdapterRegistry,
}

impl<'a> ImportResolver<'a> {
    pub fn new(index: &'a ModuleIndex, registry: &'a AdapterRegistry) -> Self {
        Self { index, registry }
    }

    pub fn index(&self) -> &ModuleIndex {
        self.index
    }

    pub fn resolve(&self, importing: &FileRecord, token: &str) -> Resolution {
        let token = token.trim();
        if token.is_empty() {
            return Resolution::Unresolved;
        }
        if is_external(token) {
            return Resolution::External;
        }

        let syntax = self
            .registry
            .get(&importing.language)
            .map(|adapter| adapter.module_syntax())
            .unwrap_or(ModuleSyntax::Slashed);

        let hit = match syntax.split_relative(token) {
            Some((markers, rest)) => self.resolve_relative(importing, markers, rest, syntax),
            None => self.resolve_absolute(importing, token, syntax),
        };

        match hit {
            Some(path) => Resolution::Resolved(path.to_string()),
            None => Resolution::Unresolved,
        }
    }

    fn resolve_relative(
        &self,
        importing: &FileRecord,
        markers: usize,
        rest: &str,
        syntax: ModuleSyntax,
    ) -> Option<&'a str> {
        let base = relative_base(&importing.path, markers);
        if rest.is_empty() {
            return self.index.package_entry(&base);
        }

        let candidate = paths::join(&base, &module_path(rest, syntax));
        self.index
            .lookup_path(&candidate)
            .or_else(|| self.short_name(importing, rest))
    }

    fn resolve_absolute(
        &self,
        importing: &FileRecord,
        token: &str,
        syntax: ModuleSyntax,
    ) -> Option<&'a str> {
        if let Some(hit) = self.short_name(importing, token) {
            return Some(hit);
        }

        let path = module_path(token, syntax);
        if let Some((first, rest)) = path.split_once('/') {
            if let Some(anchor) = self.index.lookup(first) {
                // A package entry anchors at its own directory, a plain
                // module at the sibling directory carrying its name.
                let base = if self.index.package_entry(paths::parent_dir(anchor)) == Some(anchor) {
                    paths::parent_dir(anchor)
                } else {
                    paths::strip_extension(anchor)
                };
                if let Some(hit) = self.index.lookup_path(&paths::join(base, rest)) {
                    return Some(hit);
                }
            }
        }

        self.index.lookup_path(&path)
    }

    /// Short-name table hit, ignoring hits on the importing file itself:
    /// `logging.py` importing `logging` means the external module.
    fn short_name(&self, importing: &FileRecord, name: &str) -> Option<&'a str> {
        self.index
            .lookup(name)
            .filter(|hit| *hit != importing.path)
    }
}

fn module_path(token: &str, syntax: ModuleSyntax) -> String {
    match syntax {
        ModuleSyntax::Dotted => token.replace('.', "/"),
        ModuleSyntax::Slashed => token.to_string(),
    }
}
