//! CPM domain models.
//!
//! Input records supplied by the caller, the graph the engine builds from
//! them, and the derived values it hands back.
//!
//! | Type | Role |
//! |------|------|
//! | `WorkItem` | Caller-owned task record (read only) |
//! | `DependencyDeclaration` | Typed precedence between two items |
//! | `Graph` / `Node` / `Edge` | Engine-owned arena with computed fields |
//! | `WhatIfScenario` | Disposable delay projection |
//! | `Warning` | Non-fatal data-quality issue |

mod dependency;
mod graph;
mod node;
mod scenario;
mod warning;
mod work_item;

pub use dependency::{DependencyDeclaration, RelationType};
pub use graph::{EdgeIdx, Graph, GraphPhase, GraphRecord, GraphStats, NodeIdx};
pub use node::{Edge, Node, NodeLayout, NodeSchedule, Span};
pub use scenario::{ImpactedNode, WhatIfScenario};
pub use warning::{Warning, WarningKind};
pub use work_item::{WorkItem, WorkItemStatus};

pub(crate) use node::offset_date;
