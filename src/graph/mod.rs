//! Graph construction and structural checks.
//!
//! - [`build_graph`]: work items + dependencies → validated arena graph
//! - [`detect_cycles`]: DAG check with a deterministic topological order
//!   and one concrete cycle when the check fails

mod builder;
mod cycle;

pub use builder::{build_graph, MIN_DURATION_DAYS};
pub use cycle::{detect_cycles, CycleReport};

pub(crate) use cycle::apply_cycle_report;
