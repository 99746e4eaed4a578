//! Graph construction from work items and dependency declarations.
//!
//! # Algorithm
//!
//! 1. Validate referential integrity (duplicate IDs, unknown references,
//!    self-loops, lag bounds). Any problem fails the whole build.
//! 2. Create one node per work item in ascending ID order, clamping
//!    degenerate durations to one day.
//! 3. Add edges in declaration order, dropping repeated
//!    (source, target, relation) triples.
//!
//! The build is a pure function of its inputs.

use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};

use crate::error::{GraphError, GraphResult};
use crate::models::{
    DependencyDeclaration, Edge, Graph, Node, NodeIdx, RelationType, Warning, WorkItem,
};
use crate::validation::validate_input;

/// Minimum scheduling duration (days).
pub const MIN_DURATION_DAYS: i64 = 1;

/// Builds an unscheduled graph.
///
/// The returned graph is in [`GraphPhase::Built`](crate::models::GraphPhase)
/// with all CPM fields unset. Non-fatal issues are available through
/// [`Graph::warnings`].
///
/// # Errors
/// [`GraphError::Validation`] with every problem found.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_cpm::graph::build_graph;
/// use u_cpm::models::{DependencyDeclaration, WorkItem};
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let items = vec![WorkItem::new("A", d(1), d(3)), WorkItem::new("B", d(3), d(6))];
/// let deps = vec![DependencyDeclaration::finish_to_start("A", "B")];
///
/// let graph = build_graph(&items, &deps).unwrap();
/// assert_eq!(graph.len(), 2);
/// assert_eq!(graph.node("B").unwrap().duration, 3);
/// assert!(graph.node("A").unwrap().es().is_none());
/// ```
pub fn build_graph(items: &[WorkItem], dependencies: &[DependencyDeclaration]) -> GraphResult<Graph> {
    if let Err(errors) = validate_input(items, dependencies) {
        warn!(
            "event=graph_build module=builder status=error items={} dependencies={} problems={}",
            items.len(),
            dependencies.len(),
            errors.len()
        );
        return Err(GraphError::Validation(errors));
    }

    let mut warnings = Vec::new();

    let mut sorted: Vec<&WorkItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let nodes: Vec<Node> = sorted
        .iter()
        .map(|item| {
            let span = item.planned_span_days();
            let duration = if span < MIN_DURATION_DAYS {
                warnings.push(Warning::degenerate_duration(&item.id, span));
                MIN_DURATION_DAYS
            } else {
                span
            };
            Node::from_work_item(item, duration)
        })
        .collect();

    let index: HashMap<&str, NodeIdx> = sorted
        .iter()
        .enumerate()
        .map(|(i, item)| (item.id.as_str(), i))
        .collect();

    let mut seen: HashSet<(&str, &str, RelationType)> = HashSet::new();
    let mut edges = Vec::with_capacity(dependencies.len());
    for dep in dependencies {
        if !seen.insert((dep.source_id.as_str(), dep.target_id.as_str(), dep.relation)) {
            warnings.push(Warning::duplicate_dependency(
                &dep.source_id,
                &dep.target_id,
                dep.relation.label(),
            ));
            continue;
        }
        // Validation guarantees both ends exist.
        if let (Some(&src), Some(&dst)) = (
            index.get(dep.source_id.as_str()),
            index.get(dep.target_id.as_str()),
        ) {
            let edge = Edge::new(&dep.source_id, &dep.target_id, dep.relation, dep.lag_days);
            edges.push((edge, src, dst));
        }
    }

    let project_start = items.iter().map(|i| i.planned_start).min();

    for w in &warnings {
        debug!(
            "event=graph_warning module=builder kind={:?} entity={} message={}",
            w.kind, w.entity_id, w.message
        );
    }
    info!(
        "event=graph_build module=builder status=ok nodes={} edges={} warnings={}",
        nodes.len(),
        edges.len(),
        warnings.len()
    );

    Ok(Graph::from_parts(nodes, edges, project_start, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GraphPhase, WarningKind};
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    fn item(id: &str, start: u32, end: u32) -> WorkItem {
        WorkItem::new(id, day(start), day(end))
    }

    #[test]
    fn test_build_sorted_arena() {
        let items = vec![item("C", 1, 2), item("A", 3, 5), item("B", 2, 4)];
        let graph = build_graph(&items, &[]).unwrap();

        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(graph.phase(), GraphPhase::Built);
        assert_eq!(graph.project_start(), Some(day(1)));
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn test_rejects_unknown_reference() {
        let items = vec![item("A", 1, 2)];
        let deps = vec![DependencyDeclaration::finish_to_start("A", "GHOST")];
        let err = build_graph(&items, &deps).unwrap_err();
        assert_eq!(
            err.validation_errors()[0].kind,
            ValidationErrorKind::UnknownReference
        );
    }

    #[test]
    fn test_rejects_self_loop() {
        let items = vec![item("A", 1, 2)];
        let deps = vec![DependencyDeclaration::finish_to_start("A", "A")];
        let err = build_graph(&items, &deps).unwrap_err();
        assert!(matches!(err, GraphError::Validation(ref e) if e[0].kind == ValidationErrorKind::SelfLoop));
    }

    #[test]
    fn test_duplicate_edges_deduplicated() {
        let items = vec![item("A", 1, 2), item("B", 2, 3)];
        let deps = vec![
            DependencyDeclaration::finish_to_start("A", "B").with_lag(1),
            DependencyDeclaration::finish_to_start("A", "B").with_lag(5),
            DependencyDeclaration::new("A", "B", RelationType::StartToStart),
        ];
        let graph = build_graph(&items, &deps).unwrap();

        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edges()[0].lag_days, 1);
        assert_eq!(graph.edges()[1].relation, RelationType::StartToStart);
        assert_eq!(graph.stats().total_dependencies, 2);
        assert_eq!(graph.warnings().len(), 1);
        assert_eq!(graph.warnings()[0].kind, WarningKind::DuplicateDependency);
    }

    #[test]
    fn test_degenerate_duration_clamped() {
        let items = vec![item("A", 5, 5), item("B", 6, 4), item("C", 1, 3)];
        let graph = build_graph(&items, &[]).unwrap();

        assert_eq!(graph.node("A").unwrap().duration, 1);
        assert_eq!(graph.node("B").unwrap().duration, 1);
        assert_eq!(graph.node("C").unwrap().duration, 2);

        let kinds: Vec<(&str, WarningKind)> = graph
            .warnings()
            .iter()
            .map(|w| (w.entity_id.as_str(), w.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("A", WarningKind::DegenerateDuration),
                ("B", WarningKind::DegenerateDuration)
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph(&[], &[]).unwrap();
        assert!(graph.is_empty());
        assert!(graph.project_start().is_none());
    }

    #[test]
    fn test_build_is_pure() {
        let items = vec![item("A", 1, 3), item("B", 3, 4)];
        let deps = vec![DependencyDeclaration::finish_to_start("A", "B")];
        let first = build_graph(&items, &deps).unwrap().to_record();
        let second = build_graph(&items, &deps).unwrap().to_record();
        assert_eq!(first, second);
    }
}
