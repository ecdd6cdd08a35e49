use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use super::config::AnalysisConfig;
use super::facts::FileRecord;

/// Walks a source tree and emits the files whose language was requested.
pub struct FileScanner {
    skip_dirs: HashSet<String>,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            skip_dirs: config.skip_dirs.iter().cloned().collect(),
            max_file_size: config.max_file_size,
        }
    }

    /// Files under `root_path`, sorted by their repository-relative path.
    pub fn scan_directory(&self, root_path: &Path, languages: &[String]) -> Result<Vec<FileRecord>> {
        if !root_path.is_dir() {
            anyhow::bail!("{} is not a directory", root_path.display());
        }
        let supported_extensions = extensions_for_languages(languages);

        // Collect all entries first for parallel processing
        let entries: Vec<DirEntry> = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_skipped(entry))
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();

        let mut files: Vec<FileRecord> = entries
            .par_iter()
            .filter_map(|entry| {
                let path = entry.path();
                let language = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(|ext| supported_extensions.get(ext))?;

                let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
                if size > self.max_file_size {
                    debug!(path = %path.display(), size, "skipping oversized file");
                    return None;
                }

                let relative = relative_path(root_path, path)?;
                Some(FileRecord::new(relative, *language, size))
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(root = %root_path.display(), files = files.len(), "scan finished");
        Ok(files)
    }

    fn is_skipped(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.skip_dirs.contains(name))
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Language tag for a file name, considering every supported language.
pub fn language_for_path(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?;
    EXTENSIONS
        .iter()
        .find(|(_, exts)| exts.contains(&ext))
        .map(|(language, _)| *language)
}

const EXTENSIONS: &[(&str, &[&str])] = &[
    ("python", &["py", "pyi", "pyx"]),
    ("javascript", &["js", "jsx", "mjs", "cjs"]),
    ("typescript", &["ts", "tsx"]),
];

fn extensions_for_languages(languages: &[String]) -> HashMap<&'static str, &'static str> {
    let mut extensions = HashMap::with_capacity(languages.len() * 4);
    for requested in languages {
        let requested = match requested.as_str() {
            "py" => "python",
            "js" => "javascript",
            "ts" => "typescript",
            other => other,
        };
        for (language, exts) in EXTENSIONS {
            if *language == requested {
                for ext in exts.iter() {
                    extensions.insert(*ext, *language);
                }
            }
        }
    }
    extensions
}

/// `root/a/b.py` -> `a/b.py`, always `/`-separated.
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let segments: Vec<&str> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

/// Loads the text of a scanned file, resolving its path against `root`.
pub fn load_source(root: &Path, file: &FileRecord) -> Result<String> {
    let full_path = root.join(&file.path);
    crate::parsers::common::read_source(&full_path)
        .with_context(|| format!("failed to read {}", full_path.display()))
}
