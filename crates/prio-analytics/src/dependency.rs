//! Dependency graph of one task: cycle detection, topological order and the
//! effort-weighted critical path.
//!
//! Edges point from a task to the tasks it depends on. The graph is expanded
//! breadth-first from the root through a [`TaskLookup`] up to `max_depth`;
//! ids the lookup cannot resolve stay in the graph as leaves.

use std::collections::{HashMap, HashSet, VecDeque};

use prio_core::config::DependencyConfig;
use prio_core::entities::{Labels, Task};
use prio_core::enums::DependencyLabel;
use prio_core::lookup::TaskLookup;
use rustworkx_core::petgraph::algo::{is_cyclic_directed, tarjan_scc, toposort};
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

pub const LABEL: &str = "DEP_LABEL";

/// Node payload: the task id and its resolved effort, if the task is known.
#[derive(Debug, Clone)]
struct DepNode {
    id: String,
    effort: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyReport {
    /// `min(1, nodes / node_scale + critical_effort / effort_scale)`.
    pub score: f64,
    pub label: DependencyLabel,
    pub node_count: usize,
    pub edge_count: usize,
    pub has_cycle: bool,
    /// Members of every cycle, grouped by strongly connected component.
    pub cycles: Vec<Vec<String>>,
    /// Dependents before dependencies; empty when cyclic.
    pub topological_order: Vec<String>,
    /// Dependencies first; empty when cyclic.
    pub execution_order: Vec<String>,
    pub critical_effort: f64,
    pub critical_root: Option<String>,
    pub critical_path: Vec<String>,
    /// Ids referenced as dependencies that the lookup could not resolve.
    pub unresolved: Vec<String>,
}

impl DependencyReport {
    #[must_use]
    pub fn labels(&self) -> Labels {
        Labels::from([(LABEL.to_string(), self.label.as_str().to_string())])
    }
}

/// Directed dependency graph keyed by task id.
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<DepNode, ()>,
    id_to_index: HashMap<String, NodeIndex>,
    unresolved: Vec<String>,
}

impl DependencyGraph {
    /// Expand the graph from `root`. Without a lookup only the root's own
    /// dependencies are known.
    #[must_use]
    pub fn build(root: &Task, lookup: Option<&dyn TaskLookup>, cfg: &DependencyConfig) -> Self {
        let mut graph = DiGraph::new();
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::new();
        let mut adjacency: Vec<(String, Vec<String>)> = Vec::new();
        let mut unresolved = Vec::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(root.id.clone(), 0)]);

        while let Some((id, depth)) = queue.pop_front() {
            if id_to_index.contains_key(&id) {
                continue;
            }
            let task = if id == root.id {
                Some(root.clone())
            } else {
                lookup.and_then(|l| l.lookup(&id))
            };
            if task.is_none() {
                tracing::trace!(task_id = %id, "dependency not resolved");
                unresolved.push(id.clone());
            }
            let effort = task.as_ref().map(|t| {
                t.resolved_effort(cfg.use_effort_pert, cfg.default_effort)
                    .value
                    .max(0.0)
            });
            let deps = task.map(|t| t.dependencies).unwrap_or_default();
            let index = graph.add_node(DepNode {
                id: id.clone(),
                effort,
            });
            id_to_index.insert(id.clone(), index);
            if depth < cfg.max_depth {
                queue.extend(deps.iter().map(|d| (d.clone(), depth + 1)));
            }
            adjacency.push((id, deps));
        }

        // Edges only between expanded nodes; deps past max_depth are dropped.
        for (id, deps) in &adjacency {
            let from = id_to_index[id];
            for dep in deps {
                if let Some(&to) = id_to_index.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self {
            graph,
            id_to_index,
            unresolved,
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    #[must_use]
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Strongly connected components that form cycles (size > 1 or a self-loop).
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&n| self.graph.contains_edge(n, n))
            })
            .map(|component| {
                let mut ids: Vec<String> = component
                    .into_iter()
                    .map(|n| self.graph[n].id.clone())
                    .collect();
                ids.sort();
                ids
            })
            .collect()
    }

    /// Topological order for DAGs, empty otherwise.
    #[must_use]
    pub fn toposort(&self) -> Vec<String> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|n| self.graph[n].id.clone()).collect())
            .unwrap_or_default()
    }

    /// Longest path by summed effort starting at each node; returns the
    /// heaviest `(effort, path)`.
    ///
    /// Back edges found by a depth-first walk are ignored, which turns a
    /// cyclic graph into a DAG; the remaining edges are relaxed in
    /// post-order so every dependency is settled before its dependents.
    #[must_use]
    pub fn critical_path(&self) -> (f64, Vec<String>) {
        let (post_order, back_edges) = self.dfs_post_order();

        // node -> (effort of the heaviest path from node, next hop)
        let mut longest: HashMap<NodeIndex, (f64, Option<NodeIndex>)> = HashMap::new();
        for &node in &post_order {
            let mut next: Option<(f64, NodeIndex)> = None;
            for child in self.graph.neighbors(node) {
                if back_edges.contains(&(node, child)) {
                    continue;
                }
                if let Some(&(effort, _)) = longest.get(&child) {
                    if next.is_none_or(|(best, _)| effort > best) {
                        next = Some((effort, child));
                    }
                }
            }
            let own = self.graph[node].effort.unwrap_or(0.0);
            longest.insert(
                node,
                (own + next.map_or(0.0, |(e, _)| e), next.map(|(_, n)| n)),
            );
        }

        let mut best: Option<(f64, NodeIndex)> = None;
        for node in self.graph.node_indices() {
            let effort = longest.get(&node).map_or(0.0, |&(e, _)| e);
            if effort > best.map_or(0.0, |(e, _)| e) {
                best = Some((effort, node));
            }
        }
        let Some((effort, root)) = best else {
            return (0.0, Vec::new());
        };

        let mut path = Vec::new();
        let mut cursor = Some(root);
        while let Some(node) = cursor {
            path.push(self.graph[node].id.clone());
            cursor = longest.get(&node).and_then(|&(_, next)| next);
        }
        (effort, path)
    }

    /// Iterative depth-first walk over every node in index order. Returns the
    /// finish order and the edges that point back into the active path.
    fn dfs_post_order(&self) -> (Vec<NodeIndex>, HashSet<(NodeIndex, NodeIndex)>) {
        let mut post_order = Vec::with_capacity(self.graph.node_count());
        let mut back_edges = HashSet::new();
        let mut active: HashSet<NodeIndex> = HashSet::new();
        let mut done: HashSet<NodeIndex> = HashSet::new();

        for start in self.graph.node_indices() {
            if done.contains(&start) {
                continue;
            }
            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>)> =
                vec![(start, self.graph.neighbors(start).collect())];
            active.insert(start);
            while let Some((node, pending)) = stack.last_mut() {
                let node = *node;
                match pending.pop() {
                    Some(child) if active.contains(&child) => {
                        back_edges.insert((node, child));
                    }
                    Some(child) if done.contains(&child) => {}
                    Some(child) => {
                        active.insert(child);
                        stack.push((child, self.graph.neighbors(child).collect()));
                    }
                    None => {
                        active.remove(&node);
                        done.insert(node);
                        post_order.push(node);
                        stack.pop();
                    }
                }
            }
        }
        (post_order, back_edges)
    }
}

/// Build and analyze the dependency graph rooted at `task`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze(
    task: &Task,
    lookup: Option<&dyn TaskLookup>,
    cfg: &DependencyConfig,
) -> DependencyReport {
    let graph = DependencyGraph::build(task, lookup, cfg);
    let has_cycle = graph.has_cycle();
    let topological_order = if has_cycle {
        Vec::new()
    } else {
        graph.toposort()
    };
    let execution_order: Vec<String> = topological_order.iter().rev().cloned().collect();
    let (critical_effort, critical_path) = graph.critical_path();
    let node_count = graph.node_count();

    let label = if has_cycle {
        DependencyLabel::Cycle
    } else if node_count > cfg.complex_threshold {
        DependencyLabel::Complex
    } else {
        DependencyLabel::Simple
    };
    let node_term = if cfg.node_scale > 0.0 {
        node_count as f64 / cfg.node_scale
    } else {
        0.0
    };
    let effort_term = if cfg.effort_scale > 0.0 {
        critical_effort / cfg.effort_scale
    } else {
        0.0
    };

    DependencyReport {
        score: (node_term + effort_term).min(1.0),
        label,
        node_count,
        edge_count: graph.edge_count(),
        has_cycle,
        cycles: graph.cycles(),
        topological_order,
        execution_order,
        critical_effort,
        critical_root: critical_path.first().cloned(),
        critical_path,
        unresolved: graph.unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prio_core::lookup::TaskIndex;

    fn cfg() -> DependencyConfig {
        DependencyConfig::default()
    }

    #[test]
    fn two_node_cycle_has_no_topological_order() {
        let a = Task::new("A", "p", "a").with_dependencies(["B"]);
        let index = TaskIndex::new(&[a.clone(), Task::new("B", "p", "b").with_dependencies(["A"])]);
        let report = analyze(&a, Some(&index), &cfg());
        assert!(report.has_cycle);
        assert!(report.topological_order.is_empty());
        assert_eq!(report.cycles, vec![vec!["A".to_string(), "B".to_string()]]);
        assert_eq!(report.label, DependencyLabel::Cycle);
        assert_eq!(report.labels()[LABEL], "CYCLE");
    }

    #[test]
    fn cyclic_critical_path_drops_the_back_edge() {
        let a = Task::new("A", "p", "a").with_effort(1.0).with_dependencies(["B"]);
        let index = TaskIndex::new(&[
            a.clone(),
            Task::new("B", "p", "b").with_effort(2.0).with_dependencies(["A"]),
        ]);
        let graph = DependencyGraph::build(&a, Some(&index), &cfg());
        let (effort, path) = graph.critical_path();
        assert_eq!(effort, 3.0);
        assert_eq!(path, vec!["A", "B"]);
    }

    #[test]
    fn chain_orders_and_weighs_effort() {
        let root = Task::new("A", "p", "a").with_effort(1.0).with_dependencies(["B"]);
        let index = TaskIndex::new(&[
            Task::new("B", "p", "b").with_effort(2.0).with_dependencies(["C", "D"]),
            Task::new("C", "p", "c").with_effort(10.0),
            Task::new("D", "p", "d")
                .with_meta("effort_o", 1)
                .with_meta("effort_m", 2)
                .with_meta("effort_p", 3),
        ]);
        let report = analyze(&root, Some(&index), &cfg());
        assert!(!report.has_cycle);
        assert_eq!(report.node_count, 4);
        assert_eq!(report.edge_count, 3);
        assert_eq!(report.topological_order.first().map(String::as_str), Some("A"));
        assert_eq!(report.execution_order.last().map(String::as_str), Some("A"));
        assert_eq!(report.critical_effort, 13.0);
        assert_eq!(report.critical_path, vec!["A", "B", "C"]);
        assert_eq!(report.critical_root.as_deref(), Some("A"));
        assert_eq!(report.label, DependencyLabel::Simple);
        assert!((report.score - (4.0 / 20.0 + 13.0 / 100.0)).abs() < 1e-12);
    }

    #[test]
    fn unresolved_ids_stop_the_branch() {
        let root = Task::new("A", "p", "a").with_dependencies(["ghost", "B"]);
        let index = TaskIndex::new(&[Task::new("B", "p", "b")]);
        let report = analyze(&root, Some(&index), &cfg());
        assert_eq!(report.unresolved, vec!["ghost"]);
        assert_eq!(report.node_count, 3);
    }

    #[test]
    fn without_lookup_only_direct_deps_are_known() {
        let root = Task::new("A", "p", "a").with_effort(3.0).with_dependencies(["B", "C"]);
        let report = analyze(&root, None, &cfg());
        assert_eq!(report.node_count, 3);
        assert_eq!(report.unresolved.len(), 2);
        assert_eq!(report.critical_effort, 3.0);
    }

    #[test]
    fn depth_limit_and_complexity() {
        // Chain of 8: A0 -> A1 -> ... -> A7.
        let tasks: Vec<Task> = (0..8)
            .map(|i| {
                let t = Task::new(format!("A{i}"), "p", "x");
                if i < 7 { t.with_dependencies([format!("A{}", i + 1)]) } else { t }
            })
            .collect();
        let index = TaskIndex::new(&tasks);
        let report = analyze(&tasks[0], Some(&index), &cfg());
        // Depth 0..=5 expanded.
        assert_eq!(report.node_count, 6);
        assert_eq!(report.label, DependencyLabel::Complex);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let a = Task::new("A", "p", "a").with_dependencies(["A"]);
        let report = analyze(&a, None, &cfg());
        assert!(report.has_cycle);
        assert_eq!(report.cycles, vec![vec!["A".to_string()]]);
    }
}
