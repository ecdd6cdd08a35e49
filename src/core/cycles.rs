//! Import cycle detection.
//!
//! Strongly connected components come from Tarjan's algorithm, so every
//! file taking part in a cycle is found no matter where traversal starts.
//! Elementary cycles are then enumerated inside each cyclic component
//! with Johnson's algorithm over path-sorted members. Each cycle starts
//! at its lexicographically smallest file and repeats it at the end.

use petgraph::algo::tarjan_scc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use super::error::AnalysisError;
use super::graph::DependencyGraph;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Elementary cycles, e.g. `[a, b, c, a]`; a self-import is `[a, a]`.
    pub cycles: Vec<Vec<String>>,
    /// Members of every component that contains a cycle, sorted.
    pub components: Vec<Vec<String>>,
    /// Set when enumeration stopped at the configured cycle limit.
    pub truncated: bool,
}

impl CycleReport {
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Files that take part in at least one cycle.
    pub fn files_in_cycles(&self) -> usize {
        self.components.iter().map(Vec::len).sum()
    }
}

pub fn find_cycles(graph: &DependencyGraph, max_cycles: usize) -> Result<CycleReport, AnalysisError> {
    let view = graph.to_petgraph()?;

    let mut components: Vec<Vec<String>> = tarjan_scc(&view.graph)
        .into_iter()
        .filter(|scc| match scc.as_slice() {
            [single] => view.graph.contains_edge(*single, *single),
            _ => true,
        })
        .map(|scc| {
            let mut members: Vec<String> =
                scc.iter().map(|idx| view.graph[*idx].clone()).collect();
            members.sort();
            members
        })
        .collect();
    components.sort();

    let mut report = CycleReport {
        cycles: Vec::new(),
        components,
        truncated: false,
    };

    for members in &report.components {
        let remaining = max_cycles.saturating_sub(report.cycles.len());
        if remaining == 0 {
            report.truncated = true;
            break;
        }
        let mut search = CycleSearch::new(graph, members, remaining);
        search.run();
        report.truncated |= search.truncated;
        report.cycles.extend(search.cycles);
    }

    debug!(
        components = report.components.len(),
        cycles = report.cycles.len(),
        truncated = report.truncated,
        "cycle detection finished"
    );
    Ok(report)
}

/// Johnson's circuit enumeration restricted to one component.
struct CycleSearch<'g> {
    members: &'g [String],
    adjacency: Vec<Vec<usize>>,
    blocked: Vec<bool>,
    blocked_by: Vec<Vec<usize>>,
    stack: Vec<usize>,
    cycles: Vec<Vec<String>>,
    limit: usize,
    truncated: bool,
}

impl<'g> CycleSearch<'g> {
    fn new(graph: &DependencyGraph, members: &'g [String], limit: usize) -> Self {
        let position: HashMap<&str, usize> = members
            .iter()
            .enumerate()
            .map(|(idx, path)| (path.as_str(), idx))
            .collect();

        let adjacency = members
            .iter()
            .map(|path| {
                let mut targets: Vec<usize> = graph
                    .dependencies(path)
                    .filter_map(|target| position.get(target).copied())
                    .collect();
                targets.sort_unstable();
                targets
            })
            .collect();

        Self {
            members,
            adjacency,
            blocked: vec![false; members.len()],
            blocked_by: vec![Vec::new(); members.len()],
            stack: Vec::new(),
            cycles: Vec::new(),
            limit,
            truncated: false,
        }
    }

    fn run(&mut self) {
        for start in 0..self.members.len() {
            if self.truncated {
                return;
            }
            for idx in start..self.members.len() {
                self.blocked[idx] = false;
                self.blocked_by[idx].clear();
            }
            self.circuit(start, start);
        }
    }

    fn circuit(&mut self, node: usize, start: usize) -> bool {
        let mut found = false;
        self.stack.push(node);
        self.blocked[node] = true;

        let successors = self.adjacency[node].clone();
        for &next in &successors {
            if self.truncated {
                break;
            }
            if next < start {
                continue;
            }
            if next == start {
                self.emit(start);
                found = true;
            } else if !self.blocked[next] && self.circuit(next, start) {
                found = true;
            }
        }

        if found {
            self.unblock(node);
        } else {
            for &next in successors.iter().filter(|&&next| next >= start) {
                if !self.blocked_by[next].contains(&node) {
                    self.blocked_by[next].push(node);
                }
            }
        }

        self.stack.pop();
        found
    }

    fn unblock(&mut self, node: usize) {
        let mut pending = vec![node];
        while let Some(current) = pending.pop() {
            if !self.blocked[current] {
                continue;
            }
            self.blocked[current] = false;
            pending.append(&mut self.blocked_by[current]);
        }
    }

    fn emit(&mut self, start: usize) {
        if self.cycles.len() >= self.limit {
            self.truncated = true;
            return;
        }
        let mut cycle: Vec<String> = self
            .stack
            .iter()
            .map(|&idx| self.members[idx].clone())
            .collect();
        cycle.push(self.members[start].clone());
        self.cycles.push(cycle);
    }
}
