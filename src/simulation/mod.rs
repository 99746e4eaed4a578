//! What-if delay simulation.
//!
//! [`simulate_delay`] projects how a delay on one work item ripples through
//! its successors, without touching the scheduled graph it reads from.
//! Results come back as a disposable [`WhatIfScenario`](crate::models::WhatIfScenario).

mod overlay;
mod what_if;

pub use what_if::{highlight_impact, simulate_delay};
