//! Blockage analysis.
//!
//! Derives a per-node "blocked" flag from predecessor progress, without
//! looking at CPM float. A node is blocked when it is not complete and an
//! incomplete finish-start or start-start predecessor is overdue as of the
//! evaluation date:
//!
//! | Relation | Predecessor is overdue when |
//! |----------|-----------------------------|
//! | FS | `as_of >= planned_end + lag` and not complete |
//! | SS | `as_of >= planned_start + lag` and not started |
//!
//! Finish-finish and start-finish links constrain when a node may finish,
//! not whether it may proceed, so they never block.
//!
//! The evaluation date is always passed in; nothing here reads a clock.

use chrono::{Duration, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::models::{Graph, RelationType};

/// Default number of predecessors named in a blocking reason.
pub const DEFAULT_MAX_REASONS: usize = 3;

/// Blockage analysis settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockageConfig {
    /// Predecessors named in a reason before "and N more".
    pub max_reasons: usize,
}

impl Default for BlockageConfig {
    fn default() -> Self {
        Self {
            max_reasons: DEFAULT_MAX_REASONS,
        }
    }
}

impl BlockageConfig {
    /// Sets the reason length limit (at least 1).
    pub fn with_max_reasons(mut self, max_reasons: usize) -> Self {
        self.max_reasons = max_reasons.max(1);
        self
    }
}

/// An incomplete predecessor holding a node up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    /// Predecessor ID.
    pub id: String,
    /// Relation on the blocking edge.
    pub relation: RelationType,
}

/// Blockage state of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockageEntry {
    /// Node ID.
    pub id: String,
    /// Blocking predecessors in edge order.
    pub blockers: Vec<Blocker>,
    /// Bounded human-readable summary; `None` when not blocked.
    pub reason: Option<String>,
}

impl BlockageEntry {
    /// Whether any predecessor blocks this node.
    pub fn is_blocked(&self) -> bool {
        !self.blockers.is_empty()
    }
}

/// Blockage state of every node, in arena order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockageReport {
    /// Evaluation date.
    pub as_of: NaiveDate,
    /// One entry per node.
    pub entries: Vec<BlockageEntry>,
}

impl BlockageReport {
    /// Entry for a node ID.
    pub fn entry(&self, id: &str) -> Option<&BlockageEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Number of blocked nodes.
    pub fn blocked_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_blocked()).count()
    }

    /// IDs of blocked nodes, ascending.
    pub fn blocked_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_blocked())
            .map(|e| e.id.as_str())
            .collect()
    }

    /// Transitive upstream blockers of a node, nearest first.
    ///
    /// Follows blockers that are themselves blocked until reaching
    /// predecessors nothing blocks. Each ID appears once.
    pub fn blocking_chain(&self, id: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut queue: VecDeque<&str> = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            let Some(entry) = self.entry(current) else {
                continue;
            };
            for blocker in &entry.blockers {
                if seen.insert(blocker.id.as_str()) {
                    chain.push(blocker.id.clone());
                    queue.push_back(blocker.id.as_str());
                }
            }
        }
        chain
    }
}

/// Computes blockage for every node.
///
/// Works on any graph phase, including cyclic graphs.
pub fn analyze_blockage(graph: &Graph, as_of: NaiveDate, config: &BlockageConfig) -> BlockageReport {
    let entries: Vec<BlockageEntry> = (0..graph.len())
        .map(|idx| {
            let node = graph.node_at(idx);
            let blockers: Vec<Blocker> = if node.is_complete() {
                Vec::new()
            } else {
                graph
                    .incoming(idx)
                    .iter()
                    .filter_map(|&e| {
                        let edge = &graph.edges()[e];
                        let pred = graph.node_at(graph.edge_ends(e).0);
                        if !edge.relation.can_block() || pred.is_complete() {
                            return None;
                        }
                        let overdue = match edge.relation {
                            RelationType::StartToStart => {
                                !pred.has_started()
                                    && reached(as_of, pred.planned_start, edge.lag_days)
                            }
                            _ => reached(as_of, pred.planned_end, edge.lag_days),
                        };
                        overdue.then(|| Blocker {
                            id: pred.id.clone(),
                            relation: edge.relation,
                        })
                    })
                    .collect()
            };
            let reason = blocking_reason(&blockers, config.max_reasons);
            BlockageEntry {
                id: node.id.clone(),
                blockers,
                reason,
            }
        })
        .collect();

    let report = BlockageReport { as_of, entries };
    debug!(
        "event=blockage module=blockage as_of={} nodes={} blocked={}",
        as_of,
        graph.len(),
        report.blocked_count()
    );
    report
}

impl Graph {
    /// Writes blockage flags onto the nodes and updates the blocked count.
    ///
    /// Entries are matched by ID; unknown IDs are ignored and nodes without
    /// an entry are cleared.
    pub fn apply_blockage(&mut self, report: &BlockageReport) {
        for node in &mut self.nodes {
            node.is_blocked = false;
            node.blocking_reason = None;
        }
        for entry in &report.entries {
            if let Some(&idx) = self.index.get(&entry.id) {
                let node = &mut self.nodes[idx];
                node.is_blocked = entry.is_blocked();
                node.blocking_reason = entry.reason.clone();
            }
        }
        self.stats.blocked_actions = self.nodes.iter().filter(|n| n.is_blocked).count();
    }
}

/// `as_of >= date + lag`. A due date outside the calendar is never reached.
fn reached(as_of: NaiveDate, date: NaiveDate, lag_days: i64) -> bool {
    Duration::try_days(lag_days)
        .and_then(|lag| date.checked_add_signed(lag))
        .is_some_and(|due| as_of >= due)
}

fn blocking_reason(blockers: &[Blocker], max_reasons: usize) -> Option<String> {
    if blockers.is_empty() {
        return None;
    }
    let limit = max_reasons.max(1);
    let named: Vec<String> = blockers
        .iter()
        .take(limit)
        .map(|b| format!("{} ({})", b.id, b.relation))
        .collect();
    let mut reason = format!("Waiting on {}", named.join(", "));
    if blockers.len() > limit {
        reason.push_str(&format!(" and {} more", blockers.len() - limit));
    }
    Some(reason)
}
