//! Engine error type.
//!
//! Only conditions the caller must fix (or asked for something that does
//! not exist) are errors. Cycles are reported through
//! [`GraphStats::has_cycles`](crate::models::GraphStats) and data-quality
//! issues through [`Warning`](crate::models::Warning)s.

use thiserror::Error;

use crate::models::GraphPhase;
use crate::validation::ValidationError;

/// Result alias used across the crate.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors returned by engine entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// The input records are inconsistent; no graph can be built.
    #[error("invalid graph input ({} problem(s)): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationError>),
    /// A referenced work item is not in the graph.
    #[error("work item '{0}' not found in graph")]
    NotFound(String),
    /// The operation needs CPM data the graph does not have.
    #[error("graph is not scheduled (phase: {0:?})")]
    NotScheduled(GraphPhase),
}

impl GraphError {
    /// Validation problems, if this is a validation failure.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            Self::Validation(errors) => errors,
            Self::NotFound(_) | Self::NotScheduled(_) => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_validation_display() {
        let err = GraphError::Validation(vec![
            ValidationError::new(ValidationErrorKind::SelfLoop, "'A' depends on itself"),
            ValidationError::new(ValidationErrorKind::UnknownReference, "unknown 'Z'"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("invalid graph input (2 problem(s))"));
        assert!(text.contains("'A' depends on itself; unknown 'Z'"));
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn test_not_found_display() {
        let err = GraphError::NotFound("X".into());
        assert_eq!(err.to_string(), "work item 'X' not found in graph");
        assert!(err.validation_errors().is_empty());
    }
}
