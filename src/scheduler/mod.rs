//! CPM sequencing, timing analysis and KPI evaluation.
//!
//! # Algorithm
//!
//! `sequencer` rebuilds a dependency-consistent order after every
//! structural edit. `CpmSchedule` runs one forward and one backward sweep
//! over that order to derive timing windows, slack and the critical path.
//!
//! # KPI
//!
//! `ScheduleKpi` summarizes a schedule: project duration, deadline margin,
//! critical activity count and critical-path variance.
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4, 24.2

mod cpm;
mod kpi;
pub mod sequencer;

pub(crate) use cpm::approx_eq;
pub use cpm::{ActivityTiming, CpmSchedule};
pub use kpi::ScheduleKpi;
