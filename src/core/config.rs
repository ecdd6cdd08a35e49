use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::error::AnalysisError;

pub const DEFAULT_LANGUAGES: &[&str] = &["python", "javascript", "typescript"];

const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    "venv",
    ".venv",
    "env",
    ".env",
    "virtualenv",
    ".git",
    ".svn",
    ".hg",
    ".idea",
    ".vscode",
    "dist",
    "build",
    "target",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    "vendor",
    "bower_components",
];

/// Tunables for one analysis run. Every field has a default, so a TOML
/// file only needs to name the values it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub languages: Vec<String>,
    /// Minimum dependents for a file to be reported as a key module.
    pub key_module_threshold: usize,
    /// Above this many files the visualization collapses to directories.
    pub max_visual_nodes: usize,
    pub max_cycles: usize,
    pub max_file_size: u64,
    pub skip_dirs: Vec<String>,
    pub parallel: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            key_module_threshold: 5,
            max_visual_nodes: 50,
            max_cycles: 100,
            max_file_size: 1024 * 1024,
            skip_dirs: DEFAULT_SKIP_DIRS.iter().map(|d| d.to_string()).collect(),
            parallel: true,
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.max_visual_nodes == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_visual_nodes must be at least 1".to_string(),
            ));
        }
        if self.max_cycles == 0 {
            return Err(AnalysisError::InvalidConfig(
                "max_cycles must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_languages(mut self, languages: Vec<String>) -> Self {
        self.languages = languages;
        self
    }

    pub fn with_key_module_threshold(mut self, threshold: usize) -> Self {
        self.key_module_threshold = threshold;
        self
    }

    pub fn with_max_visual_nodes(mut self, max_nodes: usize) -> Self {
        self.max_visual_nodes = max_nodes;
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
