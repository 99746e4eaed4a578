//! Dependency graph (arena) model.
//!
//! Nodes live in a contiguous arena sorted by ascending ID and are
//! addressed by [`NodeIdx`]. Edges keep their endpoints as indices in a
//! parallel table, so every traversal is index based and cannot chase a
//! dangling or circular reference.
//!
//! # Lifecycle
//!
//! ```text
//! Unbuilt ──build──▶ Built ──check──▶ CycleDetected
//!                            └──────▶ Scheduled ──what-if──▶ (scenario)
//! ```
//!
//! "Unbuilt" is simply the absence of a `Graph`. A `CycleDetected` graph is
//! terminal; correct the dependencies and build again.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Edge, Node, Warning};

/// Index of a node in the graph arena.
pub type NodeIdx = usize;

/// Index of an edge in the graph's edge list.
pub type EdgeIdx = usize;

/// Lifecycle state of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphPhase {
    /// Nodes and edges exist; no CPM data.
    Built,
    /// A cycle was found; CPM data stays unset.
    CycleDetected,
    /// CPM data is present and consistent.
    Scheduled,
}

/// Summary counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of nodes.
    pub total_actions: usize,
    /// Number of edges after de-duplication.
    pub total_dependencies: usize,
    /// Nodes flagged as blocked.
    pub blocked_actions: usize,
    /// Zero-slack nodes.
    pub critical_actions: usize,
    /// The dependency set is not a DAG.
    pub has_cycles: bool,
    /// One concrete cycle, in edge order.
    pub cycle_nodes: Vec<String>,
}

/// A project dependency graph.
///
/// Owns its nodes and edges. Built by [`build_graph`](crate::graph::build_graph),
/// scheduled in place by the pipeline, then treated as immutable.
#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    #[serde(skip)]
    pub(crate) index: HashMap<String, NodeIdx>,
    pub(crate) edges: Vec<Edge>,
    #[serde(skip)]
    pub(crate) edge_ends: Vec<(NodeIdx, NodeIdx)>,
    #[serde(skip)]
    pub(crate) outgoing: Vec<Vec<EdgeIdx>>,
    #[serde(skip)]
    pub(crate) incoming: Vec<Vec<EdgeIdx>>,
    #[serde(skip)]
    pub(crate) topological_order: Option<Vec<NodeIdx>>,
    pub(crate) critical_path: Vec<String>,
    pub(crate) total_duration: Option<i64>,
    pub(crate) project_start: Option<NaiveDate>,
    pub(crate) project_end: Option<NaiveDate>,
    pub(crate) stats: GraphStats,
    pub(crate) phase: GraphPhase,
    pub(crate) warnings: Vec<Warning>,
}

impl Graph {
    /// Assembles a graph from validated parts.
    ///
    /// `nodes` must be sorted by ID and every `(edge, src, dst)` triple must
    /// carry valid arena indices.
    pub(crate) fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<(Edge, NodeIdx, NodeIdx)>,
        project_start: Option<NaiveDate>,
        warnings: Vec<Warning>,
    ) -> Self {
        let index: HashMap<String, NodeIdx> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        let mut edge_list = Vec::with_capacity(edges.len());
        let mut edge_ends = Vec::with_capacity(edges.len());

        for (e, (edge, src, dst)) in edges.into_iter().enumerate() {
            outgoing[src].push(e);
            incoming[dst].push(e);
            edge_list.push(edge);
            edge_ends.push((src, dst));
        }

        let stats = GraphStats {
            total_actions: nodes.len(),
            total_dependencies: edge_list.len(),
            ..GraphStats::default()
        };

        Self {
            nodes,
            index,
            edges: edge_list,
            edge_ends,
            outgoing,
            incoming,
            topological_order: None,
            critical_path: Vec::new(),
            total_duration: None,
            project_start,
            project_end: None,
            stats,
            phase: GraphPhase::Built,
            warnings,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes, ascending by ID.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in declaration order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Arena index of a node ID.
    pub fn node_index(&self, id: &str) -> Option<NodeIdx> {
        self.index.get(id).copied()
    }

    /// Node at an arena index.
    pub fn node_at(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx]
    }

    /// `(source, target)` arena indices of an edge.
    pub fn edge_ends(&self, edge: EdgeIdx) -> (NodeIdx, NodeIdx) {
        self.edge_ends[edge]
    }

    /// Indices of edges leaving a node.
    pub fn outgoing(&self, idx: NodeIdx) -> &[EdgeIdx] {
        &self.outgoing[idx]
    }

    /// Indices of edges entering a node.
    pub fn incoming(&self, idx: NodeIdx) -> &[EdgeIdx] {
        &self.incoming[idx]
    }

    /// Direct predecessors of a node (empty for unknown IDs).
    pub fn predecessors(&self, id: &str) -> Vec<&Node> {
        self.node_index(id)
            .map(|i| {
                self.incoming[i]
                    .iter()
                    .map(|&e| &self.nodes[self.edge_ends[e].0])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Direct successors of a node (empty for unknown IDs).
    pub fn successors(&self, id: &str) -> Vec<&Node> {
        self.node_index(id)
            .map(|i| {
                self.outgoing[i]
                    .iter()
                    .map(|&e| &self.nodes[self.edge_ends[e].1])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Topological order as node IDs (`None` unless the graph is acyclic).
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        self.topological_order
            .as_ref()
            .map(|order| order.iter().map(|&i| self.nodes[i].id.as_str()).collect())
    }

    /// Critical path as ordered node IDs (empty unless scheduled).
    pub fn critical_path(&self) -> &[String] {
        &self.critical_path
    }

    /// Project length in days (max EF). `None` unless scheduled.
    pub fn total_duration(&self) -> Option<i64> {
        self.total_duration
    }

    /// Day-0 anchor: earliest planned start.
    pub fn project_start(&self) -> Option<NaiveDate> {
        self.project_start
    }

    /// `project_start + total_duration`. `None` unless scheduled.
    pub fn project_end(&self) -> Option<NaiveDate> {
        self.project_end
    }

    /// Summary counters.
    pub fn stats(&self) -> &GraphStats {
        &self.stats
    }

    /// Lifecycle state.
    pub fn phase(&self) -> GraphPhase {
        self.phase
    }

    /// Whether CPM data can be trusted.
    pub fn is_scheduled(&self) -> bool {
        self.phase == GraphPhase::Scheduled
    }

    /// Data-quality warnings collected while building.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Nodes with zero slack, ascending by ID.
    pub fn critical_nodes(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_critical).collect()
    }

    /// Plain serializable snapshot keyed by node ID.
    pub fn to_record(&self) -> GraphRecord {
        GraphRecord {
            nodes: self
                .nodes
                .iter()
                .map(|n| (n.id.clone(), n.clone()))
                .collect(),
            edges: self.edges.clone(),
            critical_path: self.critical_path.clone(),
            total_duration: self.total_duration,
            project_start: self.project_start,
            project_end: self.project_end,
            stats: self.stats.clone(),
            phase: self.phase,
        }
    }
}

/// Engine-independent output record for rendering and reporting layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Nodes keyed by ID.
    pub nodes: BTreeMap<String, Node>,
    /// Edges in declaration order.
    pub edges: Vec<Edge>,
    /// Critical path IDs.
    pub critical_path: Vec<String>,
    /// Project length in days.
    pub total_duration: Option<i64>,
    /// Day-0 anchor.
    pub project_start: Option<NaiveDate>,
    /// Scheduled project end.
    pub project_end: Option<NaiveDate>,
    /// Summary counters.
    pub stats: GraphStats,
    /// Lifecycle state.
    pub phase: GraphPhase,
}
