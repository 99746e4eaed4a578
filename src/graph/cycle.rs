//! Cycle detection and topological ordering.
//!
//! # Algorithm
//!
//! Kahn's in-degree algorithm with a min-heap ready queue. Because the
//! arena is sorted by ID, popping the smallest index yields the
//! lexicographically smallest topological order, so the result is fully
//! deterministic.
//!
//! Nodes Kahn cannot release all have at least one unreleased predecessor.
//! Walking unreleased predecessors from the smallest such node must revisit
//! a node, which closes one concrete cycle.
//!
//! An iterative DFS three-coloring provides an independent classification
//! that debug builds cross-check against Kahn's result.
//!
//! # Reference
//! - Kahn (1962), "Topological sorting of large networks"
//! - Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4

use log::{debug, warn};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::models::{Graph, GraphPhase, NodeIdx};

/// Outcome of cycle detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    /// The graph is not a DAG.
    pub has_cycles: bool,
    /// One concrete cycle as node IDs in edge order, starting at the
    /// smallest ID. Empty when acyclic.
    pub cycle: Vec<String>,
    /// Topological order of every node; partial when cyclic.
    pub order: Vec<NodeIdx>,
}

impl CycleReport {
    /// Whether the graph is a DAG.
    pub fn is_acyclic(&self) -> bool {
        !self.has_cycles
    }
}

/// Checks whether a graph is acyclic.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_cpm::graph::{build_graph, detect_cycles};
/// use u_cpm::models::{DependencyDeclaration, WorkItem};
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let e = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let items: Vec<_> = ["A", "B"].iter().map(|id| WorkItem::new(*id, d, e)).collect();
/// let deps = vec![
///     DependencyDeclaration::finish_to_start("A", "B"),
///     DependencyDeclaration::finish_to_start("B", "A"),
/// ];
///
/// let report = detect_cycles(&build_graph(&items, &deps).unwrap());
/// assert!(report.has_cycles);
/// assert_eq!(report.cycle, vec!["A", "B"]);
/// ```
pub fn detect_cycles(graph: &Graph) -> CycleReport {
    let n = graph.len();
    let mut indegree: Vec<usize> = (0..n).map(|i| graph.incoming(i).len()).collect();
    let mut ready: BinaryHeap<Reverse<NodeIdx>> = indegree
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d == 0)
        .map(|(i, _)| Reverse(i))
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for &e in graph.outgoing(node) {
            let (_, next) = graph.edge_ends(e);
            indegree[next] -= 1;
            if indegree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    let has_cycles = order.len() < n;
    debug_assert_eq!(has_cycles, has_cycle_dfs(graph));

    let cycle = if has_cycles {
        extract_cycle(graph, &indegree)
    } else {
        Vec::new()
    };

    if has_cycles {
        warn!(
            "event=cycle_check module=cycle status=cyclic unresolved={} cycle={}",
            n - order.len(),
            cycle.join("->")
        );
    } else {
        debug!("event=cycle_check module=cycle status=acyclic nodes={n}");
    }

    CycleReport {
        has_cycles,
        cycle,
        order,
    }
}

/// Records a cycle report on the graph.
///
/// Acyclic graphs keep their topological order; cyclic graphs move to
/// [`GraphPhase::CycleDetected`] with CPM data cleared.
pub(crate) fn apply_cycle_report(graph: &mut Graph, report: &CycleReport) {
    graph.stats.has_cycles = report.has_cycles;
    graph.stats.cycle_nodes = report.cycle.clone();
    if report.has_cycles {
        graph.topological_order = None;
        graph.phase = GraphPhase::CycleDetected;
        graph.critical_path.clear();
        graph.total_duration = None;
        graph.project_end = None;
        graph.stats.critical_actions = 0;
        for node in &mut graph.nodes {
            node.schedule = None;
            node.is_critical = false;
        }
        for edge in &mut graph.edges {
            edge.is_critical = false;
        }
    } else {
        graph.topological_order = Some(report.order.clone());
    }
}

/// Walks unreleased predecessors until a node repeats.
///
/// `indegree` is the residual in-degree after Kahn's algorithm: nonzero
/// exactly for unreleased nodes, counting only unreleased predecessors.
fn extract_cycle(graph: &Graph, indegree: &[usize]) -> Vec<String> {
    let Some(start) = (0..graph.len()).find(|&i| indegree[i] > 0) else {
        return Vec::new();
    };

    let mut position: HashMap<NodeIdx, usize> = HashMap::new();
    let mut path = Vec::new();
    let mut current = start;

    loop {
        if let Some(&at) = position.get(&current) {
            // path[at..] follows edges backwards.
            let mut cycle: Vec<NodeIdx> = path[at..].iter().rev().copied().collect();
            let min_pos = (0..cycle.len()).min_by_key(|&i| cycle[i]).unwrap_or(0);
            cycle.rotate_left(min_pos);
            return cycle
                .into_iter()
                .map(|i| graph.node_at(i).id.clone())
                .collect();
        }
        position.insert(current, path.len());
        path.push(current);

        let pred = graph
            .incoming(current)
            .iter()
            .map(|&e| graph.edge_ends(e).0)
            .filter(|&p| indegree[p] > 0)
            .min();
        match pred {
            Some(p) => current = p,
            // Unreachable for a residual Kahn graph.
            None => return Vec::new(),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Iterative DFS three-coloring: a gray→gray edge is a back edge.
pub(crate) fn has_cycle_dfs(graph: &Graph) -> bool {
    let mut color = vec![Color::White; graph.len()];

    for root in 0..graph.len() {
        if color[root] != Color::White {
            continue;
        }
        // (node, next outgoing edge position)
        let mut stack: Vec<(NodeIdx, usize)> = vec![(root, 0)];
        color[root] = Color::Gray;

        while let Some(frame) = stack.last_mut() {
            let (node, pos) = *frame;
            match graph.outgoing(node).get(pos) {
                Some(&e) => {
                    frame.1 += 1;
                    let next = graph.edge_ends(e).1;
                    match color[next] {
                        Color::Gray => return true,
                        Color::White => {
                            color[next] = Color::Gray;
                            stack.push((next, 0));
                        }
                        Color::Black => {}
                    }
                }
                None => {
                    color[node] = Color::Black;
                    stack.pop();
                }
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::models::{DependencyDeclaration, WorkItem};
    use chrono::NaiveDate;

    fn items(ids: &[&str]) -> Vec<WorkItem> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        ids.iter().map(|id| WorkItem::new(*id, start, end)).collect()
    }

    fn fs(a: &str, b: &str) -> DependencyDeclaration {
        DependencyDeclaration::finish_to_start(a, b)
    }

    fn ids(graph: &Graph, order: &[NodeIdx]) -> Vec<String> {
        order.iter().map(|&i| graph.node_at(i).id.clone()).collect()
    }

    #[test]
    fn test_chain_is_acyclic() {
        let graph = build_graph(&items(&["A", "B", "C"]), &[fs("A", "B"), fs("B", "C")]).unwrap();
        let report = detect_cycles(&graph);
        assert!(report.is_acyclic());
        assert!(report.cycle.is_empty());
        assert_eq!(ids(&graph, &report.order), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_order_breaks_ties_by_id() {
        // D and B both depend on A; C is independent.
        let graph = build_graph(&items(&["A", "B", "C", "D"]), &[fs("A", "D"), fs("A", "B")]).unwrap();
        let report = detect_cycles(&graph);
        assert_eq!(ids(&graph, &report.order), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_three_node_cycle() {
        let graph = build_graph(
            &items(&["A", "B", "C"]),
            &[fs("A", "B"), fs("B", "C"), fs("C", "A")],
        )
        .unwrap();
        let report = detect_cycles(&graph);
        assert!(report.has_cycles);
        assert_eq!(report.cycle, vec!["A", "B", "C"]);
        assert!(report.order.is_empty());
    }

    #[test]
    fn test_cycle_with_acyclic_prefix_and_tail() {
        // S -> X -> Y -> Z -> X, Z -> T
        let graph = build_graph(
            &items(&["S", "T", "X", "Y", "Z"]),
            &[fs("S", "X"), fs("X", "Y"), fs("Y", "Z"), fs("Z", "X"), fs("Z", "T")],
        )
        .unwrap();
        let report = detect_cycles(&graph);
        assert!(report.has_cycles);
        assert_eq!(report.cycle, vec!["X", "Y", "Z"]);
        assert_eq!(ids(&graph, &report.order), vec!["S"]);
    }

    #[test]
    fn test_dfs_agrees_with_kahn() {
        let acyclic = build_graph(&items(&["A", "B", "C"]), &[fs("A", "C"), fs("B", "C")]).unwrap();
        let cyclic = build_graph(&items(&["A", "B"]), &[fs("A", "B"), fs("B", "A")]).unwrap();
        assert!(!has_cycle_dfs(&acyclic));
        assert!(has_cycle_dfs(&cyclic));
        assert_eq!(detect_cycles(&acyclic).has_cycles, has_cycle_dfs(&acyclic));
        assert_eq!(detect_cycles(&cyclic).has_cycles, has_cycle_dfs(&cyclic));
    }

    #[test]
    fn test_apply_cycle_report_marks_graph() {
        let mut graph = build_graph(&items(&["A", "B"]), &[fs("A", "B"), fs("B", "A")]).unwrap();
        let report = detect_cycles(&graph);
        apply_cycle_report(&mut graph, &report);
        assert_eq!(graph.phase(), GraphPhase::CycleDetected);
        assert!(graph.stats().has_cycles);
        assert_eq!(graph.stats().cycle_nodes, vec!["A", "B"]);
        assert!(graph.topological_order().is_none());
    }

    #[test]
    fn test_empty_graph() {
        let graph = build_graph(&[], &[]).unwrap();
        let report = detect_cycles(&graph);
        assert!(report.is_acyclic());
        assert!(report.order.is_empty());
    }
}
