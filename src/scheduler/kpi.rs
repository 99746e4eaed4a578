//! Schedule quality metrics (KPIs).
//!
//! Summarizes a scheduled graph for dashboards and reports.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Duration | max(EF) in days |
//! | Critical Ratio | critical nodes / all nodes |
//! | Average Slack | mean total float |
//! | Maximum Slack | largest total float |
//! | Blocked Ratio | blocked nodes / all nodes |
//! | Late Actions | early finish date after the planned end date |
//!
//! # Reference
//! PMI (2017), "PMBOK Guide", 6th ed., §6.5.2.2 (Critical Path Method)

use crate::models::Graph;

/// Schedule performance indicators.
///
/// All time values are in days.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleKpi {
    /// Project length (days).
    pub total_duration: i64,
    /// Fraction of nodes on zero slack (0.0..1.0).
    pub critical_ratio: f64,
    /// Mean total float (days).
    pub avg_slack: f64,
    /// Largest total float (days).
    pub max_slack: i64,
    /// Fraction of nodes flagged as blocked (0.0..1.0).
    pub blocked_ratio: f64,
    /// Nodes whose early finish date is past their planned end.
    pub late_actions: usize,
}

impl ScheduleKpi {
    /// Computes KPIs from a scheduled graph.
    ///
    /// Returns `None` unless the graph is
    /// [`Scheduled`](crate::models::GraphPhase::Scheduled).
    pub fn calculate(graph: &Graph) -> Option<Self> {
        if !graph.is_scheduled() {
            return None;
        }
        let total_duration = graph.total_duration()?;
        let count = graph.len();

        let slacks: Vec<i64> = graph.nodes().iter().filter_map(|n| n.slack()).collect();
        let max_slack = slacks.iter().copied().max().unwrap_or(0);
        let avg_slack = if slacks.is_empty() {
            0.0
        } else {
            slacks.iter().sum::<i64>() as f64 / slacks.len() as f64
        };

        let late_actions = match graph.project_start() {
            Some(start) => graph
                .nodes()
                .iter()
                .filter(|n| {
                    n.early_finish_date(start)
                        .is_some_and(|finish| finish > n.planned_end)
                })
                .count(),
            None => 0,
        };

        let ratio = |part: usize| {
            if count == 0 {
                0.0
            } else {
                part as f64 / count as f64
            }
        };

        Some(Self {
            total_duration,
            critical_ratio: ratio(graph.stats().critical_actions),
            avg_slack,
            max_slack,
            blocked_ratio: ratio(graph.stats().blocked_actions),
            late_actions,
        })
    }

    /// Whether the schedule meets the given thresholds.
    pub fn meets_thresholds(&self, max_duration: i64, max_late_actions: usize) -> bool {
        self.total_duration <= max_duration && self.late_actions <= max_late_actions
    }
}
