//! Non-fatal data-quality warnings.
//!
//! Warnings travel alongside a successful result so callers (and tests)
//! can inspect input problems without treating them as failures.

use serde::{Deserialize, Serialize};

/// A non-fatal issue found while building or simulating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    /// Type of warning.
    pub kind: WarningKind,
    /// Related work item ID (the source ID for dependency warnings).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Zero or negative planned span, coerced to one day.
    DegenerateDuration,
    /// Repeated (source, target, relation) triple; later copies dropped.
    DuplicateDependency,
    /// A negative what-if delay pushed a start below day 0.
    NegativeStartClamped,
}

impl Warning {
    /// Creates a degenerate duration warning.
    pub fn degenerate_duration(item_id: impl Into<String>, span_days: i64) -> Self {
        let entity_id = item_id.into();
        Self {
            message: format!(
                "Work item '{entity_id}' has a planned span of {span_days} day(s); using 1 day"
            ),
            kind: WarningKind::DegenerateDuration,
            entity_id,
        }
    }

    /// Creates a duplicate dependency warning.
    pub fn duplicate_dependency(
        source_id: impl Into<String>,
        target_id: &str,
        relation: &str,
    ) -> Self {
        let entity_id = source_id.into();
        Self {
            message: format!(
                "Duplicate {relation} dependency '{entity_id}' -> '{target_id}' ignored"
            ),
            kind: WarningKind::DuplicateDependency,
            entity_id,
        }
    }

    /// Creates a negative start clamp warning.
    pub fn negative_start_clamped(item_id: impl Into<String>, requested_start: i64) -> Self {
        let entity_id = item_id.into();
        Self {
            message: format!(
                "Delay moves '{entity_id}' to day {requested_start}; clamped to day 0"
            ),
            kind: WarningKind::NegativeStartClamped,
            entity_id,
        }
    }
}
