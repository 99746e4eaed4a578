//! What-if scenario (derived, disposable) model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Warning;

/// Projected effect of delaying one work item.
///
/// Produced by [`simulate_delay`](crate::simulation::simulate_delay); never
/// written back into the graph it was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhatIfScenario {
    /// Delayed work item.
    pub source_action_id: String,
    /// Requested delay (signed days).
    pub delay_days: i64,
    /// Nodes whose early start moved, in topological order.
    pub impacted_actions: Vec<ImpactedNode>,
    /// Edges whose both endpoints moved, as `(source, target)` IDs.
    pub impacted_edges: Vec<(String, String)>,
    /// Project length after the delay (days).
    pub new_total_duration: i64,
    /// Project end date after the delay.
    pub new_project_end: Option<NaiveDate>,
    /// `new_total_duration - original total duration`.
    pub total_delay_days: i64,
    /// The critical path now runs through a different set of nodes.
    pub critical_path_affected: bool,
    /// Recomputed critical path, when affected.
    pub new_critical_path: Option<Vec<String>>,
    /// Non-fatal issues (e.g. a start clamped at day 0).
    pub warnings: Vec<Warning>,
}

impl WhatIfScenario {
    /// Number of nodes whose early start moved.
    pub fn impacted_count(&self) -> usize {
        self.impacted_actions.len()
    }

    /// Impact entry for a node, if it moved.
    pub fn impact_for(&self, id: &str) -> Option<&ImpactedNode> {
        self.impacted_actions.iter().find(|i| i.id == id)
    }

    /// Whether the project end moves later.
    pub fn delays_project(&self) -> bool {
        self.total_delay_days > 0
    }
}

/// One node moved by a what-if delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactedNode {
    /// Node ID.
    pub id: String,
    /// Early start before the delay.
    pub original_es: i64,
    /// Early start after the delay.
    pub new_es: i64,
    /// `new_es - original_es`.
    pub delta: i64,
}

impl ImpactedNode {
    /// Creates an entry, deriving `delta`.
    pub fn new(id: impl Into<String>, original_es: i64, new_es: i64) -> Self {
        Self {
            id: id.into(),
            original_es,
            new_es,
            delta: new_es - original_es,
        }
    }
}
