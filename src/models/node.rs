//! Graph nodes and edges.
//!
//! Nodes carry a snapshot of the work item fields the engine reads
//! (status, planned dates) plus everything computed on top of them.
//! Computed sections are `Option`s: `None` means "not computed", which is
//! how a cyclic graph signals that its CPM data must not be trusted.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{RelationType, WorkItem, WorkItemStatus};

/// A start/finish pair in day offsets from the project start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Start offset (days).
    pub start: i64,
    /// Finish offset (days).
    pub finish: i64,
}

impl Span {
    /// Creates a span.
    pub fn new(start: i64, finish: i64) -> Self {
        Self { start, finish }
    }

    /// Span starting at `start` lasting `duration` days.
    pub fn starting_at(start: i64, duration: i64) -> Self {
        Self::new(start, start + duration)
    }

    /// Length in days.
    #[inline]
    pub fn len(&self) -> i64 {
        self.finish - self.start
    }

    /// Whether start and finish coincide.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// CPM results for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSchedule {
    /// Earliest start / earliest finish.
    pub early: Span,
    /// Latest start / latest finish.
    pub late: Span,
    /// Total float: LS − ES (= LF − EF).
    pub slack: i64,
    /// Slip allowed without moving any successor's early start.
    pub free_float: i64,
}

/// Visualization coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    /// Longest-path layer.
    pub level: usize,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

/// A node of the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// ID of the originating work item.
    pub id: String,
    /// Work item name.
    pub name: String,
    /// Work item status at build time.
    pub status: WorkItemStatus,
    /// Planned start date.
    pub planned_start: NaiveDate,
    /// Planned end date.
    pub planned_end: NaiveDate,
    /// Actual start date, if recorded.
    pub actual_start: Option<NaiveDate>,
    /// Actual end date, if recorded.
    pub actual_end: Option<NaiveDate>,
    /// Scheduling duration in days (at least 1).
    pub duration: i64,
    /// CPM results; `None` until scheduled.
    pub schedule: Option<NodeSchedule>,
    /// Layout coordinates; `None` until laid out.
    pub layout: Option<NodeLayout>,
    /// Zero-slack node.
    pub is_critical: bool,
    /// Held up by an incomplete predecessor.
    pub is_blocked: bool,
    /// Why the node is blocked.
    pub blocking_reason: Option<String>,
}

impl Node {
    /// Creates an unscheduled node from a work item.
    pub fn from_work_item(item: &WorkItem, duration: i64) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            status: item.status,
            planned_start: item.planned_start,
            planned_end: item.planned_end,
            actual_start: item.actual_start,
            actual_end: item.actual_end,
            duration,
            schedule: None,
            layout: None,
            is_critical: false,
            is_blocked: false,
            blocking_reason: None,
        }
    }

    /// Earliest start offset.
    pub fn es(&self) -> Option<i64> {
        self.schedule.map(|s| s.early.start)
    }

    /// Earliest finish offset.
    pub fn ef(&self) -> Option<i64> {
        self.schedule.map(|s| s.early.finish)
    }

    /// Latest start offset.
    pub fn ls(&self) -> Option<i64> {
        self.schedule.map(|s| s.late.start)
    }

    /// Latest finish offset.
    pub fn lf(&self) -> Option<i64> {
        self.schedule.map(|s| s.late.finish)
    }

    /// Total float.
    pub fn slack(&self) -> Option<i64> {
        self.schedule.map(|s| s.slack)
    }

    /// Whether the work item is complete (by status or a recorded end).
    pub fn is_complete(&self) -> bool {
        self.status.is_complete() || self.actual_end.is_some()
    }

    /// Whether work on the item has begun.
    pub fn has_started(&self) -> bool {
        self.actual_start.is_some() || self.is_complete() || self.status.is_started()
    }

    /// Earliest start as a calendar date.
    pub fn early_start_date(&self, project_start: NaiveDate) -> Option<NaiveDate> {
        self.es().and_then(|d| offset_date(project_start, d))
    }

    /// Earliest finish as a calendar date.
    pub fn early_finish_date(&self, project_start: NaiveDate) -> Option<NaiveDate> {
        self.ef().and_then(|d| offset_date(project_start, d))
    }
}

/// `base + days`, or `None` on overflow or a negative offset.
pub(crate) fn offset_date(base: NaiveDate, days: i64) -> Option<NaiveDate> {
    u64::try_from(days)
        .ok()
        .and_then(|d| base.checked_add_days(Days::new(d)))
}

/// A precedence edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Predecessor node ID.
    pub source_id: String,
    /// Successor node ID.
    pub target_id: String,
    /// Relation type.
    pub relation: RelationType,
    /// Signed lag in days.
    pub lag_days: i64,
    /// Both ends critical and the constraint is driving.
    pub is_critical: bool,
    /// Marked by a what-if projection.
    pub is_impacted: bool,
}

impl Edge {
    /// Creates an unflagged edge.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation: RelationType,
        lag_days: i64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation,
            lag_days,
            is_critical: false,
            is_impacted: false,
        }
    }
}
