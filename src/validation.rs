//! Input validation for dependency graphs.
//!
//! Checks referential integrity of work items and dependency declarations
//! before a graph is assembled. Detects:
//! - Duplicate work item IDs
//! - Dependencies naming unknown work items
//! - Self-loops (an item depending on itself)
//! - Lags beyond [`MAX_LAG_DAYS`] in either direction
//!
//! Cycles longer than one node are not validation errors; they are
//! reported by the [cycle detector](crate::graph::detect_cycles) so a
//! broken graph can still be drawn.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::{DependencyDeclaration, WorkItem};

/// Largest accepted lag or lead (days), about one century.
pub const MAX_LAG_DAYS: i64 = 36_525;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Two work items share the same ID.
    DuplicateId,
    /// A dependency references a work item that doesn't exist.
    UnknownReference,
    /// A dependency's source and target are the same item.
    SelfLoop,
    /// A dependency's lag is outside `±MAX_LAG_DAYS`.
    LagOutOfRange,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates work items and dependency declarations.
///
/// Checks:
/// 1. No duplicate work item IDs
/// 2. Every dependency source and target names a known work item
/// 3. No dependency links an item to itself
/// 4. Every lag is within `±MAX_LAG_DAYS`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(items: &[WorkItem], dependencies: &[DependencyDeclaration]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut item_ids = HashSet::new();
    for item in items {
        if !item_ids.insert(item.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate work item ID: {}", item.id),
            ));
        }
    }

    for dep in dependencies {
        for (role, id) in [("source", &dep.source_id), ("target", &dep.target_id)] {
            if !item_ids.contains(id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownReference,
                    format!(
                        "Dependency '{}' -> '{}' references unknown {role} '{id}'",
                        dep.source_id, dep.target_id
                    ),
                ));
            }
        }

        if dep.source_id == dep.target_id {
            errors.push(ValidationError::new(
                ValidationErrorKind::SelfLoop,
                format!("Work item '{}' depends on itself", dep.source_id),
            ));
        }

        if !(-MAX_LAG_DAYS..=MAX_LAG_DAYS).contains(&dep.lag_days) {
            errors.push(ValidationError::new(
                ValidationErrorKind::LagOutOfRange,
                format!(
                    "Dependency '{}' -> '{}' has lag {} outside ±{MAX_LAG_DAYS} days",
                    dep.source_id, dep.target_id, dep.lag_days
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
