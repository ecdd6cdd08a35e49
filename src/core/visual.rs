use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::error::AnalysisError;
use super::facts::FileRecord;
use super::graph::{DependencyEdge, DependencyGraph};
use super::paths;

/// Directory name used for files at the repository root.
pub const ROOT_DIRECTORY: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualLevel {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    /// Language of the file, or the most common one in a directory.
    pub language: Option<String>,
    pub file_count: usize,
    pub dependencies: usize,
    pub dependents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualGraph {
    pub level: VisualLevel,
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<DependencyEdge>,
}

impl VisualGraph {
    /// Per-file graph when the file count fits `max_nodes`, otherwise a
    /// directory graph with one node per directory and an edge wherever a
    /// file in one directory imports a file in another.
    pub fn build(
        graph: &DependencyGraph,
        files: &[FileRecord],
        max_nodes: usize,
    ) -> Result<Self, AnalysisError> {
        let languages: HashMap<&str, &str> = files
            .iter()
            .map(|file| (file.path.as_str(), file.language.as_str()))
            .collect();

        if graph.file_count() <= max_nodes {
            file_level(graph, &languages)
        } else {
            directory_level(graph, &languages)
        }
    }

    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

fn file_level(
    graph: &DependencyGraph,
    languages: &HashMap<&str, &str>,
) -> Result<VisualGraph, AnalysisError> {
    let nodes = graph
        .files()
        .iter()
        .map(|path| {
            let language = languages
                .get(path.as_str())
                .ok_or_else(|| AnalysisError::UnknownFile(path.clone()))?;
            Ok(VisualNode {
                id: path.clone(),
                label: paths::file_name(path).to_string(),
                language: Some(language.to_string()),
                file_count: 1,
                dependencies: graph.out_degree(path),
                dependents: graph.in_degree(path),
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(VisualGraph {
        level: VisualLevel::File,
        nodes,
        edges: graph.edges().collect(),
    })
}

fn directory_of(path: &str) -> &str {
    match paths::parent_dir(path) {
        "" => ROOT_DIRECTORY,
        dir => dir,
    }
}

fn directory_level(
    graph: &DependencyGraph,
    languages: &HashMap<&str, &str>,
) -> Result<VisualGraph, AnalysisError> {
    let mut counts: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();
    for path in graph.files() {
        let language = languages
            .get(path.as_str())
            .ok_or_else(|| AnalysisError::UnknownFile(path.clone()))?;
        *counts
            .entry(directory_of(path))
            .or_default()
            .entry(*language)
            .or_default() += 1;
    }

    let mut edges: BTreeSet<(&str, &str)> = BTreeSet::new();
    for (source, targets) in graph.forward() {
        for target in targets {
            if !graph.contains(target) {
                return Err(AnalysisError::DanglingEdge {
                    source_file: source.clone(),
                    target_file: target.clone(),
                });
            }
            let (from, to) = (directory_of(source), directory_of(target));
            if from != to {
                edges.insert((from, to));
            }
        }
    }

    let nodes = counts
        .iter()
        .map(|(dir, by_language)| {
            // BTreeMap order makes the alphabetically first language win ties.
            let language = by_language
                .iter()
                .fold(None, |best: Option<(&str, usize)>, (&lang, &count)| match best {
                    Some((_, top)) if top >= count => best,
                    _ => Some((lang, count)),
                })
                .map(|(lang, _)| lang.to_string());
            VisualNode {
                id: dir.to_string(),
                label: dir.to_string(),
                language,
                file_count: by_language.values().sum(),
                dependencies: edges.iter().filter(|(from, _)| from == dir).count(),
                dependents: edges.iter().filter(|(_, to)| to == dir).count(),
            }
        })
        .collect();

    Ok(VisualGraph {
        level: VisualLevel::Directory,
        nodes,
        edges: edges
            .into_iter()
            .map(|(from, to)| DependencyEdge::new(from, to))
            .collect(),
    })
}
