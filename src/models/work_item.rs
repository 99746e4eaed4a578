//! Work item (action) model.
//!
//! A work item is the caller-owned record a graph node points back to.
//! The engine only reads it: status and planned/actual dates drive
//! duration, blockage, and the date anchor of the schedule.
//!
//! # Time Representation
//! Planned dates are calendar days (`NaiveDate`). Every day counts; there
//! are no workday calendars or holiday exclusions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A unit of project work supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique work item identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Current progress status.
    #[serde(default)]
    pub status: WorkItemStatus,
    /// Planned start date.
    pub planned_start: NaiveDate,
    /// Planned end date (exclusive day count: `end - start` = duration).
    pub planned_end: NaiveDate,
    /// Date work actually started, if recorded.
    #[serde(default)]
    pub actual_start: Option<NaiveDate>,
    /// Date work actually finished, if recorded.
    #[serde(default)]
    pub actual_end: Option<NaiveDate>,
}

impl WorkItem {
    /// Creates a not-started work item with the given planned window.
    pub fn new(id: impl Into<String>, planned_start: NaiveDate, planned_end: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            status: WorkItemStatus::NotStarted,
            planned_start,
            planned_end,
            actual_start: None,
            actual_end: None,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: WorkItemStatus) -> Self {
        self.status = status;
        self
    }

    /// Records the actual start date.
    pub fn with_actual_start(mut self, date: NaiveDate) -> Self {
        self.actual_start = Some(date);
        self
    }

    /// Records the actual end date.
    pub fn with_actual_end(mut self, date: NaiveDate) -> Self {
        self.actual_end = Some(date);
        self
    }

    /// Planned span in whole days (may be zero or negative for bad input).
    pub fn planned_span_days(&self) -> i64 {
        (self.planned_end - self.planned_start).num_days()
    }

    /// Whether the item no longer holds up its successors.
    ///
    /// A recorded actual end counts even if the status was not updated.
    pub fn is_complete(&self) -> bool {
        self.status.is_complete() || self.actual_end.is_some()
    }

    /// Whether work on the item has begun.
    pub fn has_started(&self) -> bool {
        self.actual_start.is_some() || self.is_complete() || self.status.is_started()
    }
}

/// Progress status of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemStatus {
    /// Work has not begun.
    #[default]
    NotStarted,
    /// Work is underway.
    InProgress,
    /// Manually flagged as blocked by the caller.
    Blocked,
    /// Paused.
    OnHold,
    /// Finished.
    Done,
    /// Dropped; treated as resolved for successors.
    Cancelled,
}

impl WorkItemStatus {
    /// `Done` and `Cancelled` count as complete.
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Done | Self::Cancelled)
    }

    /// Whether the status implies work has started.
    pub fn is_started(self) -> bool {
        matches!(self, Self::InProgress | Self::Done | Self::Cancelled)
    }
}
