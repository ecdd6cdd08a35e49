use std::collections::{HashMap, HashSet};

use super::facts::FileRecord;
use super::paths;
use crate::parsers::AdapterRegistry;

/// Whole-repository lookup tables from module names and paths to files.
///
/// Built once from the complete, ordered file list. When two files
/// produce the same key the later one in the list wins, so the result
/// is deterministic for a given input order.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    /// Short name (file stem, or directory name for entry points) -> file.
    names: HashMap<String, String>,
    /// Path without extension -> file.
    stems: HashMap<String, String>,
    /// Directory path -> its entry-point file.
    packages: HashMap<String, String>,
    files: HashSet<String>,
}

impl ModuleIndex {
    pub fn build(files: &[FileRecord], registry: &AdapterRegistry) -> Self {
        let mut index = Self {
            names: HashMap::with_capacity(files.len()),
            stems: HashMap::with_capacity(files.len()),
            packages: HashMap::new(),
            files: HashSet::with_capacity(files.len()),
        };

        for file in files {
            let path = file.path.as_str();
            index.files.insert(path.to_string());
            index
                .names
                .insert(paths::file_stem(path).to_string(), path.to_string());
            index
                .stems
                .insert(paths::strip_extension(path).to_string(), path.to_string());

            let is_entry = registry
                .get(&file.language)
                .map(|adapter| adapter.is_entry_point(paths::file_name(path)))
                .unwrap_or(false);
            let dir = paths::parent_dir(path);
            if is_entry && !dir.is_empty() {
                index
                    .names
                    .insert(paths::file_name(dir).to_string(), path.to_string());
                index.packages.insert(dir.to_string(), path.to_string());
            }
        }

        index
    }

    /// Short-name lookup (`utils`, `models`).
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// Resolves a repository-relative path written without (or with) an
    /// extension: exact file, then extensionless stem, then the stem with
    /// a trailing extension stripped (`./util.js` naming `util.ts`), then
    /// a package directory.
    pub fn lookup_path(&self, path: &str) -> Option<&str> {
        if path.is_empty() {
            return None;
        }
        if let Some(file) = self.files.get(path) {
            return Some(file.as_str());
        }
        if let Some(file) = self.stems.get(path) {
            return Some(file.as_str());
        }
        let stripped = paths::strip_extension(path);
        if stripped != path {
            if let Some(file) = self.stems.get(stripped) {
                return Some(file.as_str());
            }
        }
        self.package_entry(path)
    }

    pub fn package_entry(&self, dir: &str) -> Option<&str> {
        self.packages.get(dir).map(String::as_str)
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }
}
