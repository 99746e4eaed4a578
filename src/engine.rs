//! One-call pipeline: build, schedule, analyze blockage, lay out.
//!
//! # Flow
//!
//! 1. [`build_graph`]: validate input and index the arena.
//! 2. [`schedule`]: cycle gate, then CPM passes.
//! 3. [`analyze_blockage`]: flags as of the request date.
//! 4. [`compute_layout`]: level and coordinates per node.
//!
//! Steps 3 and 4 run on cyclic graphs too; only CPM is skipped.

use chrono::NaiveDate;
use log::info;

use crate::blockage::{analyze_blockage, BlockageConfig};
use crate::config::EngineConfig;
use crate::error::GraphResult;
use crate::graph::build_graph;
use crate::layout::{compute_layout, LayoutConfig};
use crate::models::{DependencyDeclaration, Graph, WorkItem};
use crate::scheduler::schedule;

/// Input container for [`compute`].
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Work items to schedule.
    pub work_items: Vec<WorkItem>,
    /// Declared dependencies between work items.
    pub dependencies: Vec<DependencyDeclaration>,
    /// Evaluation date for blockage.
    pub as_of: NaiveDate,
    /// Post-scheduling settings.
    pub config: EngineConfig,
}

impl ScheduleRequest {
    /// Creates a request with default settings.
    pub fn new(
        work_items: Vec<WorkItem>,
        dependencies: Vec<DependencyDeclaration>,
        as_of: NaiveDate,
    ) -> Self {
        Self {
            work_items,
            dependencies,
            as_of,
            config: EngineConfig::default(),
        }
    }

    /// Replaces all settings.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the layout geometry.
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.config.layout = layout;
        self
    }

    /// Sets the blockage settings.
    pub fn with_blockage(mut self, blockage: BlockageConfig) -> Self {
        self.config.blockage = blockage;
        self
    }
}

/// Runs the full pipeline and returns a fresh graph.
///
/// # Errors
///
/// [`GraphError::Validation`](crate::GraphError::Validation) when the input
/// has duplicate IDs, unknown references, self-loops, or out-of-range lags.
/// Cycles are not errors; they come back in
/// [`GraphStats`](crate::models::GraphStats).
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_cpm::engine::{compute, ScheduleRequest};
/// use u_cpm::models::{DependencyDeclaration, WorkItem};
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
/// let request = ScheduleRequest::new(
///     vec![WorkItem::new("A", d(1), d(3)), WorkItem::new("B", d(3), d(4))],
///     vec![DependencyDeclaration::finish_to_start("A", "B")],
///     d(10),
/// );
///
/// let graph = compute(&request).unwrap();
/// assert_eq!(graph.total_duration(), Some(3));
/// assert!(graph.node("B").unwrap().is_blocked);
/// ```
pub fn compute(request: &ScheduleRequest) -> GraphResult<Graph> {
    let built = build_graph(&request.work_items, &request.dependencies)?;
    let mut graph = schedule(built);

    let blockage = analyze_blockage(&graph, request.as_of, &request.config.blockage);
    graph.apply_blockage(&blockage);

    let layout = compute_layout(&graph, &request.config.layout);
    graph.apply_layout(&layout);

    info!(
        "event=compute module=engine status=ok phase={:?} nodes={} edges={} blocked={} warnings={}",
        graph.phase(),
        graph.len(),
        graph.edges().len(),
        graph.stats().blocked_actions,
        graph.warnings().len()
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::models::{GraphPhase, WorkItemStatus};
    use crate::validation::ValidationErrorKind;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn fs(a: &str, b: &str) -> DependencyDeclaration {
        DependencyDeclaration::finish_to_start(a, b)
    }

    fn request(as_of: NaiveDate) -> ScheduleRequest {
        ScheduleRequest::new(
            vec![
                WorkItem::new("A", day(1), day(3)).with_status(WorkItemStatus::Done),
                WorkItem::new("B", day(3), day(6)).with_status(WorkItemStatus::InProgress),
                WorkItem::new("C", day(7), day(8)),
            ],
            vec![fs("A", "B"), fs("B", "C").with_lag(1)],
            as_of,
        )
    }

    #[test]
    fn test_compute_end_to_end() {
        let graph = compute(&request(day(4))).unwrap();

        assert_eq!(graph.phase(), GraphPhase::Scheduled);
        assert_eq!(graph.total_duration(), Some(7));
        assert_eq!(graph.critical_path(), ["A", "B", "C"]);
        assert_eq!(graph.project_end(), Some(day(8)));
        assert_eq!(graph.stats().blocked_actions, 0);
        assert!(graph.nodes().iter().all(|n| n.layout.is_some()));
        assert_eq!(graph.node("C").unwrap().layout.unwrap().level, 2);
    }

    #[test]
    fn test_compute_flags_overdue_predecessor() {
        // B was due on day 6; as of day 7 C is still waiting on it.
        let graph = compute(&request(day(7))).unwrap();
        let c = graph.node("C").unwrap();
        assert!(c.is_blocked);
        assert_eq!(c.blocking_reason.as_deref(), Some("Waiting on B (finish-start)"));
        assert_eq!(graph.stats().blocked_actions, 1);
    }

    #[test]
    fn test_compute_with_cycle() {
        let req = ScheduleRequest::new(
            vec![
                WorkItem::new("A", day(1), day(2)),
                WorkItem::new("B", day(1), day(2)),
                WorkItem::new("C", day(1), day(2)),
            ],
            vec![fs("A", "B"), fs("B", "C"), fs("C", "A")],
            day(1),
        );
        let graph = compute(&req).unwrap();

        assert_eq!(graph.phase(), GraphPhase::CycleDetected);
        assert!(graph.stats().has_cycles);
        assert_eq!(graph.stats().cycle_nodes.len(), 3);
        assert!(graph.total_duration().is_none());
        assert!(graph.nodes().iter().all(|n| n.schedule.is_none()));
        assert!(graph.nodes().iter().all(|n| n.layout.is_some()));
    }

    #[test]
    fn test_compute_rejects_invalid_input() {
        let req = ScheduleRequest::new(
            vec![WorkItem::new("A", day(1), day(2))],
            vec![fs("A", "Z")],
            day(1),
        );
        let err = compute(&req).unwrap_err();
        let GraphError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::UnknownReference);
    }

    #[test]
    fn test_compute_rejects_huge_lag() {
        let req = ScheduleRequest::new(
            vec![WorkItem::new("A", day(1), day(2)), WorkItem::new("B", day(2), day(3))],
            vec![fs("A", "B").with_lag(1_000_000_000_000_000)],
            day(30),
        );
        let err = compute(&req).unwrap_err();
        assert_eq!(err.validation_errors().len(), 1);
        assert_eq!(
            err.validation_errors()[0].kind,
            ValidationErrorKind::LagOutOfRange
        );
    }

    #[test]
    fn test_request_config_flows_through() {
        let req = request(day(4)).with_layout(LayoutConfig::default().with_origin(10.0, 5.0));
        let graph = compute(&req).unwrap();
        let a = graph.node("A").unwrap().layout.unwrap();
        assert_eq!((a.x, a.y), (10.0, 5.0));
        assert_eq!(req.config.blockage, BlockageConfig::default());
    }
}
