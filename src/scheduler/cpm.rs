//! Critical Path Method passes.
//!
//! # Algorithm
//!
//! 1. **Forward pass** (topological order): ES is the largest start any
//!    incoming relation permits, floored at day 0. EF = ES + duration.
//! 2. **Backward pass** (reverse order): LF is the smallest finish any
//!    outgoing relation permits, capped at the project length T.
//!    LS = LF − duration.
//! 3. **Float**: slack = LS − ES; zero-slack nodes are critical.
//! 4. **Critical path**: a chain of critical nodes linked by driving
//!    (tight) edges from a day-0 start to a node finishing at T. Ties go to
//!    the smallest ID at every step.
//!
//! Critical-set and path extraction read early windows through
//! [`EarlyTimes`], so the what-if simulator can run them over an overlay
//! without copying the base schedule.
//!
//! # Complexity
//! O(V + E) per pass.
//!
//! # Reference
//! Kelley & Walker (1959), "Critical-Path Planning and Scheduling"

use chrono::NaiveDate;
use log::{debug, info};

use crate::graph::{apply_cycle_report, detect_cycles};
use crate::models::{offset_date, Graph, GraphPhase, NodeIdx, NodeSchedule, Span};

/// Read access to early (forward-pass) windows by arena index.
pub(crate) trait EarlyTimes {
    /// Early window of a node.
    fn early(&self, idx: NodeIdx) -> Span;
}

impl EarlyTimes for [Span] {
    fn early(&self, idx: NodeIdx) -> Span {
        self[idx]
    }
}

impl EarlyTimes for Graph {
    fn early(&self, idx: NodeIdx) -> Span {
        self.node_at(idx)
            .schedule
            .map(|s| s.early)
            .unwrap_or_default()
    }
}

/// Runs cycle detection and, for a DAG, the full CPM computation.
///
/// Consumes the graph and returns it in
/// [`GraphPhase::Scheduled`] or [`GraphPhase::CycleDetected`]. A cyclic
/// graph keeps every CPM field unset and reports the cycle in
/// [`GraphStats`](crate::models::GraphStats).
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_cpm::graph::build_graph;
/// use u_cpm::models::{DependencyDeclaration, WorkItem};
/// use u_cpm::scheduler::schedule;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let items = vec![
///     WorkItem::new("A", d(1), d(3)),
///     WorkItem::new("B", d(3), d(6)),
///     WorkItem::new("C", d(7), d(8)),
/// ];
/// let deps = vec![
///     DependencyDeclaration::finish_to_start("A", "B"),
///     DependencyDeclaration::finish_to_start("B", "C").with_lag(1),
/// ];
///
/// let graph = schedule(build_graph(&items, &deps).unwrap());
/// assert_eq!(graph.total_duration(), Some(7));
/// assert_eq!(graph.critical_path(), ["A", "B", "C"]);
/// assert_eq!(graph.node("C").unwrap().es(), Some(6));
/// ```
pub fn schedule(mut graph: Graph) -> Graph {
    let report = detect_cycles(&graph);
    apply_cycle_report(&mut graph, &report);
    if report.has_cycles {
        info!(
            "event=cpm module=scheduler status=skipped reason=cycle cycle_len={}",
            report.cycle.len()
        );
        return graph;
    }

    let order = report.order;
    let early = forward_pass(&graph, &order);
    let total = early.iter().map(|s| s.finish).max().unwrap_or(0);
    let late = backward_pass(&graph, &order, total);

    for (idx, node) in graph.nodes.iter_mut().enumerate() {
        let (e, l) = (early[idx], late[idx]);
        let slack = l.start - e.start;
        debug_assert_eq!(slack, l.finish - e.finish, "slack mismatch on '{}'", node.id);
        debug_assert!(slack >= 0, "negative slack on '{}'", node.id);
        node.schedule = Some(NodeSchedule {
            early: e,
            late: l,
            slack,
            free_float: 0,
        });
        node.is_critical = slack == 0;
    }

    let critical: Vec<bool> = graph.nodes.iter().map(|n| n.is_critical).collect();
    for idx in 0..graph.len() {
        let ff = free_float(&graph, idx, early.as_slice(), total);
        if let Some(s) = graph.nodes[idx].schedule.as_mut() {
            s.free_float = ff;
        }
    }
    for e in 0..graph.edges.len() {
        let (src, dst) = graph.edge_ends(e);
        let tight = critical[src] && critical[dst] && is_driving(&graph, e, early.as_slice());
        graph.edges[e].is_critical = tight;
    }

    let path = critical_path(&graph, &order, early.as_slice(), &critical, total);
    graph.critical_path = path
        .iter()
        .map(|&i| graph.node_at(i).id.clone())
        .collect();
    graph.total_duration = Some(total);
    graph.project_end = graph.project_start.and_then(|d| project_end(d, total));
    graph.stats.critical_actions = critical.iter().filter(|&&c| c).count();
    graph.phase = GraphPhase::Scheduled;

    info!(
        "event=cpm module=scheduler status=ok nodes={} total_duration={} critical={} path_len={}",
        graph.len(),
        total,
        graph.stats.critical_actions,
        graph.critical_path.len()
    );
    graph
}

/// `start + total` days.
pub(crate) fn project_end(start: NaiveDate, total: i64) -> Option<NaiveDate> {
    offset_date(start, total)
}

/// Earliest start of `idx` given its predecessors' early windows.
pub(crate) fn earliest_start<E: EarlyTimes + ?Sized>(graph: &Graph, idx: NodeIdx, early: &E) -> i64 {
    let duration = graph.node_at(idx).duration;
    graph
        .incoming(idx)
        .iter()
        .map(|&e| {
            let edge = &graph.edges()[e];
            let (src, _) = graph.edge_ends(e);
            edge.relation
                .earliest_start(early.early(src), edge.lag_days, duration)
        })
        .fold(0, i64::max)
}

/// Forward pass over a full topological order.
pub(crate) fn forward_pass(graph: &Graph, order: &[NodeIdx]) -> Vec<Span> {
    let mut early = vec![Span::default(); graph.len()];
    for &idx in order {
        let es = earliest_start(graph, idx, early.as_slice());
        early[idx] = Span::starting_at(es, graph.node_at(idx).duration);
        debug!(
            "event=forward module=scheduler node={} es={} ef={}",
            graph.node_at(idx).id,
            early[idx].start,
            early[idx].finish
        );
    }
    early
}

/// Backward pass seeded with LF = `total` at terminal nodes.
pub(crate) fn backward_pass(graph: &Graph, order: &[NodeIdx], total: i64) -> Vec<Span> {
    let mut late = vec![Span::default(); graph.len()];
    for &idx in order.iter().rev() {
        let duration = graph.node_at(idx).duration;
        let lf = graph
            .outgoing(idx)
            .iter()
            .map(|&e| {
                let edge = &graph.edges()[e];
                let (_, dst) = graph.edge_ends(e);
                edge.relation.latest_finish(late[dst], edge.lag_days, duration)
            })
            .fold(total, i64::min);
        late[idx] = Span::new(lf - duration, lf);
    }
    late
}

/// Critical flags from early and late windows.
///
/// Negative slack (possible when an overlay pulls a node ahead of its
/// predecessors) counts as critical.
pub(crate) fn critical_flags<E: EarlyTimes + ?Sized>(early: &E, late: &[Span]) -> Vec<bool> {
    late.iter()
        .enumerate()
        .map(|(idx, l)| l.start - early.early(idx).start <= 0)
        .collect()
}

/// Whether edge `e` determines its target's early start.
pub(crate) fn is_driving<E: EarlyTimes + ?Sized>(graph: &Graph, e: usize, early: &E) -> bool {
    let edge = &graph.edges()[e];
    let (src, dst) = graph.edge_ends(e);
    let bound = edge
        .relation
        .earliest_start(early.early(src), edge.lag_days, graph.node_at(dst).duration);
    bound == early.early(dst).start
}

/// Smallest gap between this node's early finish and what its successors
/// need, capped at `total - EF`.
fn free_float(graph: &Graph, idx: NodeIdx, early: &[Span], total: i64) -> i64 {
    graph
        .outgoing(idx)
        .iter()
        .map(|&e| {
            let edge = &graph.edges()[e];
            let (_, dst) = graph.edge_ends(e);
            let bound =
                edge.relation
                    .earliest_start(early[idx], edge.lag_days, graph.node_at(dst).duration);
            early[dst].start - bound
        })
        .fold(total - early[idx].finish, i64::min)
        .max(0)
}

/// Extracts the critical path (ascending-ID tie-break).
///
/// The chain starts at a critical node no critical predecessor drives
/// (day 0 on a plain schedule) and follows driving edges to a node
/// finishing at `total`.
pub(crate) fn critical_path<E: EarlyTimes + ?Sized>(
    graph: &Graph,
    order: &[NodeIdx],
    early: &E,
    critical: &[bool],
    total: i64,
) -> Vec<NodeIdx> {
    let n = graph.len();
    let mut reaches_end = vec![false; n];
    let mut next: Vec<Option<NodeIdx>> = vec![None; n];

    for &idx in order.iter().rev() {
        if !critical[idx] {
            continue;
        }
        next[idx] = graph
            .outgoing(idx)
            .iter()
            .filter(|&&e| is_driving(graph, e, early))
            .map(|&e| graph.edge_ends(e).1)
            .filter(|&dst| critical[dst] && reaches_end[dst])
            .min();
        reaches_end[idx] = next[idx].is_some() || early.early(idx).finish == total;
    }

    let mut driven = vec![false; n];
    for e in 0..graph.edges().len() {
        let (src, dst) = graph.edge_ends(e);
        if critical[src] && critical[dst] && is_driving(graph, e, early) {
            driven[dst] = true;
        }
    }

    let start = (0..n).find(|&i| critical[i] && reaches_end[i] && !driven[i]);
    let mut path = Vec::new();
    let mut current = start;
    while let Some(idx) = current {
        path.push(idx);
        current = next[idx];
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::models::{DependencyDeclaration, RelationType, WorkItem};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    /// Work item lasting `duration` days from the project start.
    fn item(id: &str, duration: i64) -> WorkItem {
        WorkItem::new(id, day(0), day(duration))
    }

    fn dep(a: &str, b: &str, rel: RelationType, lag: i64) -> DependencyDeclaration {
        DependencyDeclaration::new(a, b, rel).with_lag(lag)
    }

    fn fs(a: &str, b: &str) -> DependencyDeclaration {
        DependencyDeclaration::finish_to_start(a, b)
    }

    fn sched(items: &[WorkItem], deps: &[DependencyDeclaration]) -> Graph {
        schedule(build_graph(items, deps).unwrap())
    }

    fn early(g: &Graph, id: &str) -> (i64, i64) {
        let n = g.node(id).unwrap();
        (n.es().unwrap(), n.ef().unwrap())
    }

    fn abc() -> Graph {
        sched(
            &[item("A", 2), item("B", 3), item("C", 1)],
            &[fs("A", "B"), fs("B", "C").with_lag(1)],
        )
    }

    #[test]
    fn test_three_task_chain() {
        let g = abc();
        assert_eq!(early(&g, "A"), (0, 2));
        assert_eq!(early(&g, "B"), (2, 5));
        assert_eq!(early(&g, "C"), (6, 7));
        assert_eq!(g.total_duration(), Some(7));
        assert_eq!(g.critical_path(), ["A", "B", "C"]);
        for n in g.nodes() {
            assert_eq!(n.slack(), Some(0));
            assert!(n.is_critical);
        }
        assert!(g.edges().iter().all(|e| e.is_critical));
        assert_eq!(g.phase(), GraphPhase::Scheduled);
        assert_eq!(g.stats().critical_actions, 3);
    }

    #[test]
    fn test_project_end_matches_duration() {
        let g = abc();
        let start = g.project_start().unwrap();
        let end = g.project_end().unwrap();
        assert_eq!((end - start).num_days(), g.total_duration().unwrap());
        let max_ef = g.nodes().iter().filter_map(|n| n.ef()).max().unwrap();
        assert_eq!(max_ef, g.total_duration().unwrap());
    }

    #[test]
    fn test_parallel_branch_slack() {
        // A(2) -> B(3) -> D(1); A -> C(1) -> D
        let g = sched(
            &[item("A", 2), item("B", 3), item("C", 1), item("D", 1)],
            &[fs("A", "B"), fs("A", "C"), fs("B", "D"), fs("C", "D")],
        );
        assert_eq!(g.total_duration(), Some(6));
        let c = g.node("C").unwrap();
        assert_eq!(c.es(), Some(2));
        assert_eq!(c.ls(), Some(4));
        assert_eq!(c.slack(), Some(2));
        assert_eq!(c.schedule.unwrap().free_float, 2);
        assert!(!c.is_critical);
        assert_eq!(g.critical_path(), ["A", "B", "D"]);

        let ac = g.edges().iter().find(|e| e.target_id == "C").unwrap();
        assert!(!ac.is_critical);
    }

    #[test]
    fn test_free_float_smaller_than_total_float() {
        // A(1) -> B(1) -> D(1); C(5) -> D. A and B share the float.
        let g = sched(
            &[item("A", 1), item("B", 1), item("C", 5), item("D", 1)],
            &[fs("A", "B"), fs("B", "D"), fs("C", "D")],
        );
        let a = g.node("A").unwrap().schedule.unwrap();
        let b = g.node("B").unwrap().schedule.unwrap();
        assert_eq!(a.slack, 3);
        assert_eq!(a.free_float, 0);
        assert_eq!(b.slack, 3);
        assert_eq!(b.free_float, 3);
    }

    #[test]
    fn test_start_to_start_relation() {
        let g = sched(
            &[item("A", 4), item("B", 2)],
            &[dep("A", "B", RelationType::StartToStart, 1)],
        );
        assert_eq!(early(&g, "B"), (1, 3));
        assert_eq!(g.total_duration(), Some(4));
        assert_eq!(g.node("B").unwrap().slack(), Some(1));
        assert_eq!(g.critical_path(), ["A"]);
    }

    #[test]
    fn test_finish_to_finish_relation() {
        let g = sched(
            &[item("A", 3), item("B", 1)],
            &[dep("A", "B", RelationType::FinishToFinish, 2)],
        );
        // EF(B) >= EF(A) + 2 = 5 → ES(B) = 4
        assert_eq!(early(&g, "B"), (4, 5));
        assert_eq!(g.total_duration(), Some(5));
        assert_eq!(g.critical_path(), ["A", "B"]);
    }

    #[test]
    fn test_start_to_finish_relation() {
        let g = sched(
            &[item("A", 2), item("B", 3)],
            &[dep("A", "B", RelationType::StartToFinish, 5)],
        );
        // EF(B) >= ES(A) + 5 = 5 → ES(B) = 2
        assert_eq!(early(&g, "B"), (2, 5));
        assert_eq!(g.node("A").unwrap().slack(), Some(0));
        assert_eq!(g.critical_path(), ["A", "B"]);
    }

    #[test]
    fn test_negative_lag_floors_at_zero() {
        let g = sched(
            &[item("A", 2), item("B", 2)],
            &[dep("A", "B", RelationType::StartToStart, -3)],
        );
        assert_eq!(early(&g, "B"), (0, 2));
        assert_eq!(g.total_duration(), Some(2));
    }

    #[test]
    fn test_lead_overlaps_tasks() {
        let g = sched(&[item("A", 4), item("B", 2)], &[fs("A", "B").with_lag(-2)]);
        assert_eq!(early(&g, "B"), (2, 4));
        assert_eq!(g.total_duration(), Some(4));
        assert_eq!(g.critical_path(), ["A", "B"]);
    }

    #[test]
    fn test_tie_break_by_smallest_id() {
        // Two equal critical branches: S -> X -> T and S -> Y -> T
        let g = sched(
            &[item("S", 1), item("T", 1), item("X", 2), item("Y", 2)],
            &[fs("S", "Y"), fs("S", "X"), fs("Y", "T"), fs("X", "T")],
        );
        assert_eq!(g.stats().critical_actions, 4);
        assert_eq!(g.critical_path(), ["S", "X", "T"]);
    }

    #[test]
    fn test_independent_items() {
        let g = sched(&[item("B", 3), item("A", 5)], &[]);
        assert_eq!(g.total_duration(), Some(5));
        assert_eq!(g.node("B").unwrap().slack(), Some(2));
        assert_eq!(g.critical_path(), ["A"]);
    }

    #[test]
    fn test_empty_graph_schedules() {
        let g = sched(&[], &[]);
        assert_eq!(g.phase(), GraphPhase::Scheduled);
        assert_eq!(g.total_duration(), Some(0));
        assert!(g.critical_path().is_empty());
        assert!(g.project_end().is_none());
    }

    #[test]
    fn test_cycle_leaves_cpm_unset() {
        let g = sched(
            &[item("A", 1), item("B", 1), item("C", 1), item("D", 1)],
            &[fs("A", "B"), fs("B", "C"), fs("C", "A"), fs("C", "D")],
        );
        assert_eq!(g.phase(), GraphPhase::CycleDetected);
        assert!(g.stats().has_cycles);
        for id in ["A", "B", "C"] {
            assert!(g.stats().cycle_nodes.iter().any(|c| c == id));
        }
        assert!(g.nodes().iter().all(|n| n.schedule.is_none() && !n.is_critical));
        assert!(g.total_duration().is_none());
        assert!(g.critical_path().is_empty());
    }

    #[test]
    fn test_lag_on_critical_edge_extends_project() {
        let base = abc();
        let base_total = base.total_duration().unwrap();
        let path = base.critical_path().to_vec();

        for pair in path.windows(2) {
            let deps: Vec<_> = base
                .edges()
                .iter()
                .map(|e| {
                    let extra = if e.source_id == pair[0] && e.target_id == pair[1] { 1 } else { 0 };
                    dep(&e.source_id, &e.target_id, e.relation, e.lag_days + extra)
                })
                .collect();
            let g = sched(&[item("A", 2), item("B", 3), item("C", 1)], &deps);
            assert!(g.total_duration().unwrap() > base_total);
        }
    }

    /// Random DAG: edges only go from lower to higher item number.
    fn random_project(rng: &mut StdRng, size: usize) -> (Vec<WorkItem>, Vec<DependencyDeclaration>) {
        let items: Vec<WorkItem> = (0..size)
            .map(|i| item(&format!("T{i:03}"), rng.random_range(0..6)))
            .collect();
        let relations = [
            RelationType::FinishToStart,
            RelationType::StartToStart,
            RelationType::FinishToFinish,
            RelationType::StartToFinish,
        ];
        let mut deps = Vec::new();
        for to in 1..size {
            for from in 0..to {
                if rng.random_bool(0.15) {
                    let rel = relations[rng.random_range(0..relations.len())];
                    deps.push(dep(&items[from].id, &items[to].id, rel, rng.random_range(-2..4)));
                }
            }
        }
        (items, deps)
    }

    #[test]
    fn test_random_dags_hold_cpm_invariants() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..40 {
            let (items, deps) = random_project(&mut rng, 25);
            let g = sched(&items, &deps);
            let total = g.total_duration().unwrap();

            for n in g.nodes() {
                let s = n.schedule.unwrap();
                assert_eq!(s.late.start - s.early.start, s.late.finish - s.early.finish);
                assert!(s.slack >= 0);
                assert!(s.free_float <= s.slack);
                assert!(s.early.start >= 0);
                assert!(s.late.finish <= total);
            }
            assert_eq!(g.nodes().iter().filter_map(|n| n.ef()).max().unwrap_or(0), total);

            let path = g.critical_path();
            assert!(!path.is_empty());
            let first = g.node(&path[0]).unwrap();
            let last = g.node(&path[path.len() - 1]).unwrap();
            assert_eq!(first.es(), Some(0));
            assert_eq!(last.ef(), Some(total));
            assert!(path.iter().all(|id| g.node(id).unwrap().slack() == Some(0)));
            for pair in path.windows(2) {
                assert!(g
                    .edges()
                    .iter()
                    .any(|e| e.source_id == pair[0] && e.target_id == pair[1] && e.is_critical));
            }
        }
    }
}
