use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

use super::analytics::{key_modules, KeyModule, Metrics};
use super::config::AnalysisConfig;
use super::cycles::{find_cycles, CycleReport};
use super::facts::{FileFacts, FileRecord, ParseFailure, UnreadableFile};
use super::graph::{DependencyGraph, GraphBuilder};
use super::module_index::ModuleIndex;
use super::resolver::{ImportResolver, ResolutionStats};
use super::scanner::{load_source, FileScanner};
use super::visual::VisualGraph;
use crate::parsers::AdapterRegistry;

/// Everything one run produces.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub files: Vec<FileRecord>,
    /// Keyed by path; present for every readable file with an adapter.
    pub facts: BTreeMap<String, FileFacts>,
    pub unreadable: Vec<UnreadableFile>,
    pub graph: DependencyGraph,
    pub resolution: ResolutionStats,
    pub key_modules: Vec<KeyModule>,
    pub cycles: CycleReport,
    pub metrics: Metrics,
    pub visualization: VisualGraph,
}

impl Analysis {
    pub fn parse_failures(&self) -> impl Iterator<Item = (&str, &ParseFailure)> {
        self.facts
            .iter()
            .filter_map(|(path, facts)| facts.failure().map(|failure| (path.as_str(), failure)))
    }

    pub fn parsed_count(&self) -> usize {
        self.facts.values().filter(|f| f.record().is_some()).count()
    }
}

enum Extracted {
    Facts(String, FileFacts),
    Unreadable(UnreadableFile),
    Unsupported,
}

pub struct CodebaseAnalyzer {
    file_scanner: FileScanner,
    registry: AdapterRegistry,
    config: AnalysisConfig,
}

impl CodebaseAnalyzer {
    pub fn new() -> Self {
        let config = AnalysisConfig::default();
        Self {
            file_scanner: FileScanner::from_config(&config),
            registry: AdapterRegistry::new(),
            config,
        }
    }

    pub fn with_config(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            file_scanner: FileScanner::from_config(&config),
            registry: AdapterRegistry::new(),
            config,
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn registry_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.registry
    }

    pub fn analyze(&self, root_path: &Path) -> Result<Analysis> {
        info!(root = %root_path.display(), "scanning files");
        let files = self
            .file_scanner
            .scan_directory(root_path, &self.config.languages)?;
        info!(files = files.len(), "found files to analyze");

        self.run(files, |file| load_source(root_path, file))
    }

    /// Runs the pipeline over in-memory sources. Files without an entry
    /// in `sources` are reported as unreadable.
    pub fn analyze_sources(
        &self,
        mut files: Vec<FileRecord>,
        sources: &HashMap<String, String>,
    ) -> Result<Analysis> {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        self.run(files, |file| {
            sources
                .get(&file.path)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("no source provided for {}", file.path))
        })
    }

    fn run<F>(&self, files: Vec<FileRecord>, load: F) -> Result<Analysis>
    where
        F: Fn(&FileRecord) -> Result<String> + Sync,
    {
        info!("extracting facts");
        let extracted: Vec<Extracted> = if self.config.parallel {
            files.par_iter().map(|file| self.extract(file, &load)).collect()
        } else {
            files.iter().map(|file| self.extract(file, &load)).collect()
        };

        let mut facts = BTreeMap::new();
        let mut unreadable = Vec::new();
        for outcome in extracted {
            match outcome {
                Extracted::Facts(path, file_facts) => {
                    facts.insert(path, file_facts);
                }
                Extracted::Unreadable(file) => unreadable.push(file),
                Extracted::Unsupported => {}
            }
        }

        // Barrier: the index needs the complete file list.
        let index = ModuleIndex::build(&files, &self.registry);
        debug!(names = index.name_count(), "module index built");

        info!("building dependency graph");
        let resolver = ImportResolver::new(&index, &self.registry);
        let (graph, resolution) = GraphBuilder::new(&resolver)
            .with_parallel(self.config.parallel)
            .build(&files, &facts);
        graph.validate()?;

        info!("computing graph analytics");
        let key_modules = key_modules(&graph, &files, &facts, self.config.key_module_threshold)?;
        let cycles = find_cycles(&graph, self.config.max_cycles)?;
        let metrics = Metrics::compute(&graph)?;
        let visualization = VisualGraph::build(&graph, &files, self.config.max_visual_nodes)?;

        let analysis = Analysis {
            files,
            facts,
            unreadable,
            graph,
            resolution,
            key_modules,
            cycles,
            metrics,
            visualization,
        };
        info!(
            files = analysis.files.len(),
            parsed = analysis.parsed_count(),
            failed = analysis.parse_failures().count(),
            unreadable = analysis.unreadable.len(),
            edges = analysis.graph.edge_count(),
            cycles = analysis.cycles.cycles.len(),
            "analysis complete"
        );
        Ok(analysis)
    }

    fn extract<F>(&self, file: &FileRecord, load: &F) -> Extracted
    where
        F: Fn(&FileRecord) -> Result<String> + Sync,
    {
        let Some(adapter) = self.registry.get(&file.language) else {
            debug!(path = %file.path, language = %file.language, "no adapter for language");
            return Extracted::Unsupported;
        };

        let source = match load(file) {
            Ok(source) => source,
            Err(err) => {
                warn!(path = %file.path, error = %err, "unreadable file");
                return Extracted::Unreadable(UnreadableFile {
                    path: file.path.clone(),
                    reason: format!("{err:#}"),
                });
            }
        };

        let result = adapter.extract(&source);
        if let Err(failure) = &result {
            warn!(path = %file.path, reason = %failure.reason, "parse failure");
        } else {
            debug!(path = %file.path, "extracted facts");
        }
        Extracted::Facts(file.path.clone(), FileFacts::from(result))
    }
}

impl Default for CodebaseAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
