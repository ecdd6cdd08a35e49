use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::error::AnalysisError;
use super::facts::{FileFacts, FileRecord};
use super::graph::DependencyGraph;
use super::paths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyModule {
    pub path: String,
    pub dependents: usize,
    pub language: String,
    pub description: Option<String>,
}

/// Files with at least `threshold` dependents, most depended-on first.
/// Equal counts are ordered by path.
pub fn key_modules(
    graph: &DependencyGraph,
    files: &[FileRecord],
    facts: &BTreeMap<String, FileFacts>,
    threshold: usize,
) -> Result<Vec<KeyModule>, AnalysisError> {
    let languages: HashMap<&str, &str> = files
        .iter()
        .map(|file| (file.path.as_str(), file.language.as_str()))
        .collect();

    let mut ranked = Vec::new();
    for (path, dependents) in graph.reverse() {
        if dependents.len() < threshold {
            continue;
        }
        let language = languages
            .get(path.as_str())
            .ok_or_else(|| AnalysisError::UnknownFile(path.clone()))?;
        let description = facts.get(path).and_then(FileFacts::record).map(|record| {
            record
                .module_doc
                .clone()
                .unwrap_or_else(|| format!("A {} file", paths::file_name(path)))
        });
        ranked.push(KeyModule {
            path: path.clone(),
            dependents: dependents.len(),
            language: language.to_string(),
            description,
        });
    }

    ranked.sort_by(|a, b| {
        b.dependents
            .cmp(&a.dependents)
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(ranked)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeLeader {
    pub path: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_files: usize,
    pub files_with_dependencies: usize,
    pub files_with_dependents: usize,
    /// Files with neither dependencies nor dependents.
    pub isolated_files: usize,
    /// Files that import nothing, whether or not anything imports them.
    pub files_without_dependencies: usize,
    /// Files nothing depends on.
    pub leaf_files: usize,
    /// Edges per file that has at least one dependency.
    pub average_dependencies: f64,
    pub max_dependencies: Option<DegreeLeader>,
    pub max_dependents: Option<DegreeLeader>,
    /// Weakly connected components with more than one file.
    pub connected_components: usize,
    /// Sizes of those components, largest first.
    pub component_sizes: Vec<usize>,
    pub largest_component_size: usize,
}

impl Metrics {
    pub fn compute(graph: &DependencyGraph) -> Result<Self, AnalysisError> {
        graph.validate()?;

        let total_files = graph.file_count();
        let files_with_dependencies = graph.forward().len();
        let files_with_dependents = graph.reverse().len();

        let isolated_files = graph
            .files()
            .iter()
            .filter(|file| graph.out_degree(file) == 0 && graph.in_degree(file) == 0)
            .count();

        let average_dependencies = if files_with_dependencies == 0 {
            0.0
        } else {
            graph.edge_count() as f64 / files_with_dependencies as f64
        };

        let component_sizes = component_sizes(graph);

        Ok(Self {
            total_files,
            files_with_dependencies,
            files_with_dependents,
            isolated_files,
            files_without_dependencies: total_files - files_with_dependencies,
            leaf_files: total_files - files_with_dependents,
            average_dependencies,
            max_dependencies: degree_leader(graph, |file| graph.out_degree(file)),
            max_dependents: degree_leader(graph, |file| graph.in_degree(file)),
            connected_components: component_sizes.len(),
            largest_component_size: component_sizes.first().copied().unwrap_or(0),
            component_sizes,
        })
    }
}

/// Highest degree, keeping the first file in path order on ties.
fn degree_leader(graph: &DependencyGraph, degree: impl Fn(&str) -> usize) -> Option<DegreeLeader> {
    let mut leader: Option<DegreeLeader> = None;
    for file in graph.files() {
        let count = degree(file);
        if count == 0 {
            continue;
        }
        if leader.as_ref().map_or(true, |best| count > best.count) {
            leader = Some(DegreeLeader {
                path: file.clone(),
                count,
            });
        }
    }
    leader
}

fn component_sizes(graph: &DependencyGraph) -> Vec<usize> {
    let position: HashMap<&str, usize> = graph
        .files()
        .iter()
        .enumerate()
        .map(|(idx, file)| (file.as_str(), idx))
        .collect();

    let mut components = UnionFind::<usize>::new(graph.file_count());
    for edge in graph.edges() {
        if let (Some(&a), Some(&b)) = (
            position.get(edge.source.as_str()),
            position.get(edge.target.as_str()),
        ) {
            components.union(a, b);
        }
    }

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for idx in 0..graph.file_count() {
        *sizes.entry(components.find(idx)).or_default() += 1;
    }

    let mut sizes: Vec<usize> = sizes.into_values().filter(|&size| size > 1).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    sizes
}
