//! Copy-on-write view of early windows.

use std::collections::HashMap;

use crate::models::{Graph, NodeIdx, Span};
use crate::scheduler::EarlyTimes;

/// Early windows of a scheduled graph with a sparse set of overrides.
///
/// Reads fall through to the base graph unless a node was overridden with
/// a different window. The base graph is only borrowed, never modified.
#[derive(Debug)]
pub(crate) struct ScheduleOverlay<'g> {
    base: &'g Graph,
    changed: HashMap<NodeIdx, Span>,
}

impl<'g> ScheduleOverlay<'g> {
    pub(crate) fn new(base: &'g Graph) -> Self {
        Self {
            base,
            changed: HashMap::new(),
        }
    }

    /// Overrides a node's early window. Setting it back to the base value
    /// drops the override.
    pub(crate) fn set(&mut self, idx: NodeIdx, span: Span) {
        if self.base.early(idx) == span {
            self.changed.remove(&idx);
        } else {
            self.changed.insert(idx, span);
        }
    }

    /// Whether a node's window differs from the base.
    pub(crate) fn is_changed(&self, idx: NodeIdx) -> bool {
        self.changed.contains_key(&idx)
    }

    /// Largest early finish across all nodes.
    pub(crate) fn max_finish(&self) -> i64 {
        (0..self.base.len())
            .map(|idx| self.early(idx).finish)
            .max()
            .unwrap_or(0)
    }
}

impl EarlyTimes for ScheduleOverlay<'_> {
    fn early(&self, idx: NodeIdx) -> Span {
        self.changed
            .get(&idx)
            .copied()
            .unwrap_or_else(|| self.base.early(idx))
    }
}
