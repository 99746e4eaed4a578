//! Critical Path Method scheduling for work-item dependency graphs.
//!
//! Turns work items and typed dependencies into a scheduled graph:
//! early/late windows, slack, critical path, blockage flags, a layered
//! layout, and on-demand what-if delay projections.
//!
//! # Modules
//!
//! - **`models`**: Domain types (`WorkItem`, `DependencyDeclaration`,
//!   `Node`, `Edge`, `Graph`, `WhatIfScenario`, `Warning`)
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown
//!   references, self-loops, lag bounds)
//! - **`graph`**: Arena construction and cycle detection
//! - **`scheduler`**: CPM forward/backward passes and schedule KPIs
//! - **`blockage`**: Predecessor-driven blocked flags as of a date
//! - **`layout`**: Longest-path layering and coordinates
//! - **`simulation`**: What-if delay propagation over a copy-on-write
//!   overlay
//! - **`engine`**: One-call pipeline over a `ScheduleRequest`
//!
//! # Pipeline
//!
//! ```text
//! build_graph ─► schedule ─┬─► analyze_blockage
//!                          ├─► compute_layout
//!                          └─► simulate_delay (on demand)
//! ```
//!
//! All time arithmetic is in whole days relative to the earliest planned
//! start. There are no calendars and no clock reads.
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - PMI (2017), "PMBOK Guide", 6th ed., Ch. 6
//! - Kahn (1962), "Topological Sorting of Large Networks"

pub mod blockage;
pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod layout;
pub mod models;
pub mod scheduler;
pub mod simulation;
pub mod validation;

pub use config::EngineConfig;
pub use engine::{compute, ScheduleRequest};
pub use error::{GraphError, GraphResult};
