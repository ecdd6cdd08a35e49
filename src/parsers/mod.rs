pub mod common;
pub mod docs;
pub mod javascript;
pub mod python;
pub mod typescript;

use std::collections::BTreeMap;

use crate::core::{FactRecord, ParseFailure};

/// How a language spells module references inside import statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleSyntax {
    /// `pkg.sub.mod`, relative markers are leading dots (`..pkg`).
    Dotted,
    /// `pkg/sub/mod`, relative markers are `./` and `../` prefixes.
    Slashed,
}

impl ModuleSyntax {
    /// Splits a relative token into its marker count and the remainder.
    ///
    /// A marker count of `k` means the base directory is `k - 1` levels
    /// above the importing file's directory. Returns `None` for absolute
    /// tokens.
    pub fn split_relative(self, token: &str) -> Option<(usize, &str)> {
        match self {
            ModuleSyntax::Dotted => {
                let markers = token.chars().take_while(|c| *c == '.').count();
                if markers == 0 {
                    None
                } else {
                    Some((markers, &token[markers..]))
                }
            }
            ModuleSyntax::Slashed => {
                let mut rest = token;
                let mut ups = 0;
                let mut relative = false;
                loop {
                    if let Some(stripped) = rest.strip_prefix("./") {
                        rest = stripped;
                        relative = true;
                    } else if let Some(stripped) = rest.strip_prefix("../") {
                        rest = stripped;
                        ups += 1;
                        relative = true;
                    } else if rest == "." {
                        rest = "";
                        relative = true;
                        break;
                    } else if rest == ".." {
                        rest = "";
                        ups += 1;
                        relative = true;
                        break;
                    } else {
                        break;
                    }
                }
                relative.then_some((ups + 1, rest))
            }
        }
    }
}

/// A per-language fact extractor.
///
/// Implementations must never panic on malformed input; anything they
/// cannot interpret is reported as a [`ParseFailure`].
pub trait LanguageAdapter: Send + Sync {
    fn language_name(&self) -> &str;

    fn extract(&self, source: &str) -> Result<FactRecord, ParseFailure>;

    /// Whether `file_name` makes its directory importable by name
    /// (`__init__.py`, `index.ts`, ...).
    fn is_entry_point(&self, file_name: &str) -> bool;

    fn module_syntax(&self) -> ModuleSyntax;
}

/// Language tag -> adapter lookup. The set is open: callers may
/// register additional adapters without touching existing ones.
pub struct AdapterRegistry {
    adapters: BTreeMap<String, Box<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(python::PythonAdapter::new()));
        registry.register(Box::new(javascript::JavaScriptAdapter::new()));
        registry.register(Box::new(typescript::TypeScriptAdapter::new()));
        registry
    }

    pub fn register(&mut self, adapter: Box<dyn LanguageAdapter>) {
        self.adapters
            .insert(adapter.language_name().to_string(), adapter);
    }

    pub fn get(&self, language: &str) -> Option<&dyn LanguageAdapter> {
        let key = match language {
            "py" => "python",
            "js" => "javascript",
            "ts" => "typescript",
            other => other,
        };
        self.adapters.get(key).map(|adapter| adapter.as_ref())
    }

    pub fn supports(&self, language: &str) -> bool {
        self.get(language).is_some()
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
