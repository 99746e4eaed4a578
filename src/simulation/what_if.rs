//! Delay propagation over a scheduled graph.
//!
//! # Algorithm
//!
//! 1. Collect the successor closure of the delayed node (BFS on outgoing
//!    edges).
//! 2. Shift the source's early window by the delay, clamping its start at
//!    day 0.
//! 3. Re-run the forward pass for the rest of the closure in topological
//!    order, reading early windows through a copy-on-write overlay.
//! 4. Re-run the backward pass against the new project length, extract
//!    the critical path over the overlay, and compare its node set with
//!    the base critical path.
//!
//! Nothing outside the closure can move, so the overlay only ever holds
//! closure nodes. The base graph is borrowed immutably throughout.

use std::collections::{BTreeSet, VecDeque};

use log::{debug, info};

use super::overlay::ScheduleOverlay;
use crate::error::{GraphError, GraphResult};
use crate::models::{Graph, ImpactedNode, NodeIdx, Span, Warning, WhatIfScenario};
use crate::scheduler::{
    backward_pass, critical_flags, critical_path, earliest_start, project_end, EarlyTimes,
};

/// Projects the effect of delaying `source_id` by `delay_days`.
///
/// A negative delay pulls the item earlier; its early start never drops
/// below day 0 (a [`Warning`] records the clamp).
///
/// # Errors
///
/// - [`GraphError::NotFound`] if `source_id` is not in the graph.
/// - [`GraphError::NotScheduled`] if the graph has no CPM results.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_cpm::graph::build_graph;
/// use u_cpm::models::{DependencyDeclaration, WorkItem};
/// use u_cpm::scheduler::schedule;
/// use u_cpm::simulation::simulate_delay;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let items = vec![WorkItem::new("A", d(1), d(3)), WorkItem::new("B", d(3), d(6))];
/// let deps = vec![DependencyDeclaration::finish_to_start("A", "B")];
/// let graph = schedule(build_graph(&items, &deps).unwrap());
///
/// let scenario = simulate_delay(&graph, "A", 2).unwrap();
/// assert_eq!(scenario.total_delay_days, 2);
/// assert_eq!(scenario.impact_for("B").unwrap().new_es, 4);
/// assert_eq!(graph.node("B").unwrap().es(), Some(2));
/// ```
pub fn simulate_delay(graph: &Graph, source_id: &str, delay_days: i64) -> GraphResult<WhatIfScenario> {
    let source = graph
        .node_index(source_id)
        .ok_or_else(|| GraphError::NotFound(source_id.to_string()))?;
    let (order, base_total) = match (&graph.topological_order, graph.total_duration()) {
        (Some(order), Some(total)) if graph.is_scheduled() => (order.as_slice(), total),
        _ => return Err(GraphError::NotScheduled(graph.phase())),
    };

    let closure = successor_closure(graph, source);
    let mut overlay = ScheduleOverlay::new(graph);
    let mut warnings = Vec::new();

    let base = graph.early(source);
    let requested = base.start + delay_days;
    let start = if requested < 0 {
        warnings.push(Warning::negative_start_clamped(source_id, requested));
        0
    } else {
        requested
    };
    overlay.set(source, Span::starting_at(start, graph.node_at(source).duration));

    for &idx in order {
        if idx == source || !closure[idx] {
            continue;
        }
        let es = earliest_start(graph, idx, &overlay);
        overlay.set(idx, Span::starting_at(es, graph.node_at(idx).duration));
    }

    let impacted_actions: Vec<ImpactedNode> = order
        .iter()
        .filter(|&&idx| overlay.is_changed(idx))
        .map(|&idx| {
            let node = graph.node_at(idx);
            ImpactedNode::new(node.id.clone(), graph.early(idx).start, overlay.early(idx).start)
        })
        .collect();
    let impacted_edges: Vec<(String, String)> = graph
        .edges()
        .iter()
        .enumerate()
        .filter(|&(e, _)| {
            let (src, dst) = graph.edge_ends(e);
            overlay.is_changed(src) && overlay.is_changed(dst)
        })
        .map(|(_, edge)| (edge.source_id.clone(), edge.target_id.clone()))
        .collect();

    let new_total = overlay.max_finish();
    let late = backward_pass(graph, order, new_total);
    let critical = critical_flags(&overlay, &late);
    let path: Vec<String> = critical_path(graph, order, &overlay, &critical, new_total)
        .into_iter()
        .map(|idx| graph.node_at(idx).id.clone())
        .collect();
    let before: BTreeSet<&str> = graph.critical_path().iter().map(String::as_str).collect();
    let after: BTreeSet<&str> = path.iter().map(String::as_str).collect();
    let critical_path_affected = before != after;
    let new_critical_path = critical_path_affected.then_some(path);

    for item in &impacted_actions {
        debug!(
            "event=what_if_shift module=simulation node={} es={} new_es={}",
            item.id, item.original_es, item.new_es
        );
    }
    info!(
        "event=what_if module=simulation source={} delay_days={} impacted={} total_delay={} critical_changed={}",
        source_id,
        delay_days,
        impacted_actions.len(),
        new_total - base_total,
        critical_path_affected
    );

    Ok(WhatIfScenario {
        source_action_id: source_id.to_string(),
        delay_days,
        impacted_actions,
        impacted_edges,
        new_total_duration: new_total,
        new_project_end: graph.project_start().and_then(|d| project_end(d, new_total)),
        total_delay_days: new_total - base_total,
        critical_path_affected,
        new_critical_path,
        warnings,
    })
}

/// Returns a copy of `graph` with the scenario's impacted edges flagged.
///
/// The input graph is left untouched; the copy is meant for rendering.
pub fn highlight_impact(graph: &Graph, scenario: &WhatIfScenario) -> Graph {
    let mut projected = graph.clone();
    for edge in &mut projected.edges {
        edge.is_impacted = scenario
            .impacted_edges
            .iter()
            .any(|(s, t)| *s == edge.source_id && *t == edge.target_id);
    }
    projected
}

/// Nodes reachable from `source` (inclusive).
fn successor_closure(graph: &Graph, source: NodeIdx) -> Vec<bool> {
    let mut seen = vec![false; graph.len()];
    let mut queue = VecDeque::from([source]);
    seen[source] = true;
    while let Some(idx) = queue.pop_front() {
        for &e in graph.outgoing(idx) {
            let (_, dst) = graph.edge_ends(e);
            if !seen[dst] {
                seen[dst] = true;
                queue.push_back(dst);
            }
        }
    }
    seen
}
