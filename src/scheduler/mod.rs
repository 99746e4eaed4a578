//! CPM scheduling and KPI evaluation.
//!
//! # Algorithm
//!
//! [`schedule`] gates on the cycle detector, then runs the forward and
//! backward passes over the topological order. All arithmetic is
//! whole-day integer; there are no calendars.
//!
//! # KPI
//!
//! [`ScheduleKpi`] summarizes a scheduled graph: duration, float
//! distribution, critical and blocked ratios, late actions.
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - PMI (2017), "PMBOK Guide", 6th ed., Ch. 6

mod cpm;
mod kpi;

pub use cpm::schedule;
pub use kpi::ScheduleKpi;

pub(crate) use cpm::{
    backward_pass, critical_flags, critical_path, earliest_start, project_end, EarlyTimes,
};
