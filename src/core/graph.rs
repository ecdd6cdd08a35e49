use petgraph::graph::{DiGraph, NodeIndex};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, trace};

use super::error::AnalysisError;
use super::facts::{FileFacts, FileRecord};
use super::resolver::{ImportResolver, Resolution, ResolutionStats};

/// `source` imports something that resolved to `target`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub source: String,
    pub target: String,
}

impl DependencyEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// File-level import graph.
///
/// `forward` only has keys for files with at least one dependency and
/// `reverse` only for files with at least one dependent; both are
/// derived from the same edge set and never edited independently.
/// Deserialization rebuilds both maps from `forward` and re-sorts `files`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GraphParts")]
pub struct DependencyGraph {
    files: Vec<String>,
    forward: BTreeMap<String, BTreeSet<String>>,
    reverse: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Deserialize)]
struct GraphParts {
    files: Vec<String>,
    #[serde(default)]
    forward: BTreeMap<String, BTreeSet<String>>,
}

impl From<GraphParts> for DependencyGraph {
    fn from(parts: GraphParts) -> Self {
        let edges = parts.forward.into_iter().flat_map(|(source, targets)| {
            targets
                .into_iter()
                .map(move |target| DependencyEdge::new(source.clone(), target))
        });
        DependencyGraph::from_edges(parts.files, edges)
    }
}

/// Petgraph view of a [`DependencyGraph`], one node per file in file order.
pub struct FileGraph {
    pub graph: DiGraph<String, ()>,
    pub nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn from_edges<I>(files: impl IntoIterator<Item = String>, edges: I) -> Self
    where
        I: IntoIterator<Item = DependencyEdge>,
    {
        let mut files: Vec<String> = files.into_iter().collect();
        files.sort();
        files.dedup();

        let mut graph = Self {
            files,
            forward: BTreeMap::new(),
            reverse: BTreeMap::new(),
        };
        for edge in edges {
            graph.insert(edge);
        }
        graph
    }

    fn insert(&mut self, edge: DependencyEdge) {
        self.reverse
            .entry(edge.target.clone())
            .or_default()
            .insert(edge.source.clone());
        self.forward.entry(edge.source).or_default().insert(edge.target);
    }

    /// Every file in the graph, sorted by path.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.binary_search_by(|f| f.as_str().cmp(path)).is_ok()
    }

    pub fn forward(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.forward
    }

    pub fn reverse(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.reverse
    }

    pub fn dependencies(&self, path: &str) -> impl Iterator<Item = &str> {
        self.forward
            .get(path)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    pub fn dependents(&self, path: &str) -> impl Iterator<Item = &str> {
        self.reverse
            .get(path)
            .into_iter()
            .flat_map(|sources| sources.iter().map(String::as_str))
    }

    pub fn out_degree(&self, path: &str) -> usize {
        self.forward.get(path).map_or(0, BTreeSet::len)
    }

    pub fn in_degree(&self, path: &str) -> usize {
        self.reverse.get(path).map_or(0, BTreeSet::len)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.forward
            .get(source)
            .is_some_and(|targets| targets.contains(target))
    }

    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.forward.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |target| DependencyEdge::new(source.clone(), target.clone()))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.forward.values().map(BTreeSet::len).sum()
    }

    /// Fails on the first edge whose endpoint is not a known file.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (source, targets) in &self.forward {
            for target in targets {
                if !self.contains(source) || !self.contains(target) {
                    return Err(AnalysisError::DanglingEdge {
                        source_file: source.clone(),
                        target_file: target.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn to_petgraph(&self) -> Result<FileGraph, AnalysisError> {
        let mut graph = DiGraph::with_capacity(self.files.len(), self.edge_count());
        let mut nodes = HashMap::with_capacity(self.files.len());
        for file in &self.files {
            nodes.insert(file.clone(), graph.add_node(file.clone()));
        }

        for (source, targets) in &self.forward {
            for target in targets {
                match (nodes.get(source), nodes.get(target)) {
                    (Some(&from), Some(&to)) => {
                        graph.add_edge(from, to, ());
                    }
                    _ => {
                        return Err(AnalysisError::DanglingEdge {
                            source_file: source.clone(),
                            target_file: target.clone(),
                        })
                    }
                }
            }
        }

        Ok(FileGraph { graph, nodes })
    }
}

/// Resolves every import of every parsed file into graph edges.
///
/// Per-file edge lists are computed independently (in parallel when
/// enabled) and folded into the graph afterwards, so input order has no
/// effect on the result.
pub struct GraphBuilder<'r> {
    resolver: &'r ImportResolver<'r>,
    parallel: bool,
}

impl<'r> GraphBuilder<'r> {
    pub fn new(resolver: &'r ImportResolver<'r>) -> Self {
        Self {
            resolver,
            parallel: true,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(
        &self,
        files: &[FileRecord],
        facts: &BTreeMap<String, FileFacts>,
    ) -> (DependencyGraph, ResolutionStats) {
        let per_file: Vec<(Vec<DependencyEdge>, ResolutionStats)> = if self.parallel {
            files
                .par_iter()
                .map(|file| self.file_edges(file, facts))
                .collect()
        } else {
            files.iter().map(|file| self.file_edges(file, facts)).collect()
        };

        let mut stats = ResolutionStats::default();
        let mut edges = Vec::new();
        for (file_edges, file_stats) in per_file {
            stats.merge(&file_stats);
            edges.extend(file_edges);
        }

        let graph = DependencyGraph::from_edges(files.iter().map(|f| f.path.clone()), edges);
        debug!(
            files = graph.file_count(),
            edges = graph.edge_count(),
            resolved = stats.resolved,
            external = stats.external,
            unresolved = stats.unresolved,
            "dependency graph built"
        );
        (graph, stats)
    }

    fn file_edges(
        &self,
        file: &FileRecord,
        facts: &BTreeMap<String, FileFacts>,
    ) -> (Vec<DependencyEdge>, ResolutionStats) {
        let mut stats = ResolutionStats::default();
        let Some(record) = facts.get(&file.path).and_then(FileFacts::record) else {
            return (Vec::new(), stats);
        };

        let mut edges = Vec::new();
        for import in &record.imports {
            let resolution = self.resolver.resolve(file, &import.target);
            stats.record(&resolution);
            match resolution {
                Resolution::Resolved(target) => edges.push(DependencyEdge::new(&file.path, target)),
                Resolution::External => {}
                Resolution::Unresolved => {
                    trace!(file = %file.path, target = %import.target, "unresolved import");
                }
            }
        }
        (edges, stats)
    }
}
