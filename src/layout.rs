//! Layered layout for visualization.
//!
//! # Algorithm
//!
//! 1. **Layering**: longest-path layering. A node with no predecessors is
//!    on level 0; otherwise it sits one level past its deepest
//!    predecessor. Compared to BFS depth this keeps edges short.
//! 2. **Ordering**: within a level, nodes are ranked by ascending ID.
//! 3. **Coordinates**: `x` grows with the level, `y` with the rank.
//!
//! On a cyclic graph, nodes the topological sort could not release are
//! layered in DFS reverse postorder of the remaining subgraph.
//!
//! Crossing minimization is not attempted. The result depends only on
//! the graph and the config, so repeated runs are identical.
//!
//! # Reference
//! Sugiyama, Tagawa & Toda (1981), "Methods for Visual Understanding of
//! Hierarchical System Structures" (layer assignment step)

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::graph::detect_cycles;
use crate::models::{Graph, NodeIdx, NodeLayout};

/// Geometry settings for the layered layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Node box width.
    pub node_width: f64,
    /// Node box height.
    pub node_height: f64,
    /// Margin around the whole drawing.
    pub node_padding: f64,
    /// Horizontal gap between levels.
    pub level_spacing: f64,
    /// Vertical gap between nodes on a level.
    pub node_spacing: f64,
    /// X of level 0.
    pub origin_x: f64,
    /// Y of rank 0.
    pub origin_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 60.0,
            node_padding: 20.0,
            level_spacing: 80.0,
            node_spacing: 30.0,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

impl LayoutConfig {
    /// Sets the node box size.
    pub fn with_node_size(mut self, width: f64, height: f64) -> Self {
        self.node_width = width;
        self.node_height = height;
        self
    }

    /// Sets the gaps between levels and between nodes.
    pub fn with_spacing(mut self, level_spacing: f64, node_spacing: f64) -> Self {
        self.level_spacing = level_spacing;
        self.node_spacing = node_spacing;
        self
    }

    /// Sets the drawing origin.
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }

    /// Sets the outer padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.node_padding = padding;
        self
    }

    /// Distance between consecutive levels.
    fn level_step(&self) -> f64 {
        self.node_width + self.level_spacing
    }

    /// Distance between consecutive ranks.
    fn rank_step(&self) -> f64 {
        self.node_height + self.node_spacing
    }
}

/// Computed layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Coordinates keyed by node ID.
    pub positions: BTreeMap<String, NodeLayout>,
    /// Number of levels used.
    pub level_count: usize,
    /// Drawing width including padding.
    pub width: f64,
    /// Drawing height including padding.
    pub height: f64,
}

impl LayoutResult {
    /// Coordinates of a node.
    pub fn position(&self, id: &str) -> Option<&NodeLayout> {
        self.positions.get(id)
    }

    /// IDs on a level, top to bottom.
    pub fn level(&self, level: usize) -> Vec<&str> {
        let mut ids: Vec<(&str, f64)> = self
            .positions
            .iter()
            .filter(|(_, p)| p.level == level)
            .map(|(id, p)| (id.as_str(), p.y))
            .collect();
        ids.sort_by(|a, b| a.1.total_cmp(&b.1));
        ids.into_iter().map(|(id, _)| id).collect()
    }
}

/// Computes the layered layout of a graph.
///
/// Uses the graph's stored topological order when present. On a cyclic
/// graph, nodes outside the partial order follow it in DFS reverse
/// postorder (lowest ID first), so only edges that close a cycle point
/// to the left and the drawing still covers every node.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_cpm::graph::build_graph;
/// use u_cpm::layout::{compute_layout, LayoutConfig};
/// use u_cpm::models::{DependencyDeclaration, WorkItem};
///
/// let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let e = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let items: Vec<_> = ["A", "B", "C"].iter().map(|id| WorkItem::new(*id, d, e)).collect();
/// let deps = vec![
///     DependencyDeclaration::finish_to_start("A", "B"),
///     DependencyDeclaration::finish_to_start("A", "C"),
/// ];
/// let graph = build_graph(&items, &deps).unwrap();
///
/// let layout = compute_layout(&graph, &LayoutConfig::default());
/// assert_eq!(layout.level_count, 2);
/// assert_eq!(layout.level(1), vec!["B", "C"]);
/// ```
pub fn compute_layout(graph: &Graph, config: &LayoutConfig) -> LayoutResult {
    let levels = assign_levels(graph);

    let mut by_level: BTreeMap<usize, Vec<NodeIdx>> = BTreeMap::new();
    for (idx, &level) in levels.iter().enumerate() {
        // Arena order is ascending ID, so each bucket is already ranked.
        by_level.entry(level).or_default().push(idx);
    }

    let mut positions = BTreeMap::new();
    let mut max_rank = 0;
    for (&level, members) in &by_level {
        max_rank = max_rank.max(members.len());
        for (rank, &idx) in members.iter().enumerate() {
            let layout = NodeLayout {
                level,
                x: config.origin_x + level as f64 * config.level_step(),
                y: config.origin_y + rank as f64 * config.rank_step(),
            };
            positions.insert(graph.node_at(idx).id.clone(), layout);
        }
    }

    let level_count = by_level.len();
    let span = |count: usize, size: f64, gap: f64| {
        if count == 0 {
            0.0
        } else {
            count as f64 * size + (count - 1) as f64 * gap
        }
    };
    let width = span(level_count, config.node_width, config.level_spacing) + 2.0 * config.node_padding;
    let height = span(max_rank, config.node_height, config.node_spacing) + 2.0 * config.node_padding;

    debug!(
        "event=layout module=layout nodes={} levels={} width={} height={}",
        graph.len(),
        level_count,
        width,
        height
    );

    LayoutResult {
        positions,
        level_count,
        width,
        height,
    }
}

impl Graph {
    /// Writes layout coordinates onto the nodes. Touches nothing else.
    pub fn apply_layout(&mut self, layout: &LayoutResult) {
        for node in &mut self.nodes {
            node.layout = layout.positions.get(&node.id).copied();
        }
    }
}

/// Longest-path level for every node.
fn assign_levels(graph: &Graph) -> Vec<usize> {
    let order = match &graph.topological_order {
        Some(order) => order.clone(),
        None => detect_cycles(graph).order,
    };

    let mut levels = vec![0usize; graph.len()];
    let mut placed = vec![false; graph.len()];

    let place = |idx: NodeIdx, levels: &mut [usize], placed: &mut [bool]| {
        let level = graph
            .incoming(idx)
            .iter()
            .map(|&e| graph.edge_ends(e).0)
            .filter(|&p| placed[p])
            .map(|p| levels[p] + 1)
            .max()
            .unwrap_or(0);
        levels[idx] = level;
        placed[idx] = true;
    };

    for &idx in &order {
        place(idx, &mut levels, &mut placed);
    }
    // Nodes on or behind a cycle follow the partial order, arranged so
    // that only cycle-closing edges point back.
    for idx in residual_order(graph, &placed) {
        place(idx, &mut levels, &mut placed);
    }

    levels
}

/// Reverse DFS postorder of the nodes not yet placed, roots and
/// successors in ascending ID.
///
/// Every residual edge except a cycle-closing back edge goes from an
/// earlier to a later position.
fn residual_order(graph: &Graph, placed: &[bool]) -> Vec<NodeIdx> {
    let successors = |idx: NodeIdx| {
        let mut next: Vec<NodeIdx> = graph
            .outgoing(idx)
            .iter()
            .map(|&e| graph.edge_ends(e).1)
            .filter(|&d| !placed[d])
            .collect();
        next.sort_unstable();
        next.dedup();
        next
    };

    let mut visited = placed.to_vec();
    let mut postorder = Vec::new();
    for root in 0..graph.len() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        // (node, its successors, next successor position)
        let mut stack = vec![(root, successors(root), 0usize)];
        while let Some(top) = stack.len().checked_sub(1) {
            let (node, pos) = (stack[top].0, stack[top].2);
            match stack[top].1.get(pos).copied() {
                Some(next) => {
                    stack[top].2 += 1;
                    if !visited[next] {
                        visited[next] = true;
                        stack.push((next, successors(next), 0));
                    }
                }
                None => {
                    postorder.push(node);
                    stack.pop();
                }
            }
        }
    }
    postorder.reverse();
    postorder
}
