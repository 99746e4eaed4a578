//! Dependency declarations and relation types.
//!
//! A dependency links a predecessor (`source_id`) to a successor
//! (`target_id`) with one of the four classic precedence relations and a
//! signed lag in days.
//!
//! | Relation | Constraint |
//! |----------|-----------|
//! | FS | start(succ) ≥ finish(pred) + lag |
//! | SS | start(succ) ≥ start(pred) + lag |
//! | FF | finish(succ) ≥ finish(pred) + lag |
//! | SF | finish(succ) ≥ start(pred) + lag |
//!
//! # Reference
//! PMI (2017), "PMBOK Guide", 6th ed., §6.3.2.1 (Precedence Diagramming Method)

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Span;

/// A declared precedence between two work items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyDeclaration {
    /// Predecessor work item ID.
    pub source_id: String,
    /// Successor work item ID.
    pub target_id: String,
    /// Relation type.
    #[serde(default)]
    pub relation: RelationType,
    /// Signed lag in days (negative = lead).
    #[serde(default)]
    pub lag_days: i64,
}

impl DependencyDeclaration {
    /// Creates a zero-lag dependency.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation: RelationType,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation,
            lag_days: 0,
        }
    }

    /// Creates a zero-lag finish-to-start dependency.
    pub fn finish_to_start(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::new(source_id, target_id, RelationType::FinishToStart)
    }

    /// Sets the lag (negative values model a lead).
    pub fn with_lag(mut self, lag_days: i64) -> Self {
        self.lag_days = lag_days;
        self
    }
}

/// Precedence relation between a predecessor and a successor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Successor starts after the predecessor finishes.
    #[default]
    #[serde(alias = "FS")]
    FinishToStart,
    /// Successor starts after the predecessor starts.
    #[serde(alias = "SS")]
    StartToStart,
    /// Successor finishes after the predecessor finishes.
    #[serde(alias = "FF")]
    FinishToFinish,
    /// Successor finishes after the predecessor starts.
    #[serde(alias = "SF")]
    StartToFinish,
}

impl RelationType {
    /// Two-letter code (FS, SS, FF, SF).
    pub fn code(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::FinishToStart => "finish-start",
            Self::StartToStart => "start-start",
            Self::FinishToFinish => "finish-finish",
            Self::StartToFinish => "start-finish",
        }
    }

    /// Earliest start this relation permits for a successor of `duration`
    /// days, given the predecessor's early window.
    pub fn earliest_start(self, pred: Span, lag: i64, duration: i64) -> i64 {
        match self {
            Self::FinishToStart => pred.finish + lag,
            Self::StartToStart => pred.start + lag,
            Self::FinishToFinish => pred.finish + lag - duration,
            Self::StartToFinish => pred.start + lag - duration,
        }
    }

    /// Latest finish this relation permits for a predecessor of `duration`
    /// days, given the successor's late window.
    pub fn latest_finish(self, succ: Span, lag: i64, duration: i64) -> i64 {
        match self {
            Self::FinishToStart => succ.start - lag,
            Self::StartToStart => succ.start - lag + duration,
            Self::FinishToFinish => succ.finish - lag,
            Self::StartToFinish => succ.finish - lag + duration,
        }
    }

    /// Whether an incomplete predecessor on this relation can block the
    /// successor from progressing.
    pub fn can_block(self) -> bool {
        match self {
            Self::FinishToStart | Self::StartToStart => true,
            Self::FinishToFinish | Self::StartToFinish => false,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
