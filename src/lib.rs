//! Critical Path Method scheduling for the U-Engine ecosystem.
//!
//! Computes CPM schedules over acyclic activity networks and keeps a
//! bounded, undoable version history of each network.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Activity`, `DurationEstimate`,
//!   `ActivityNetwork`, and the `NetworkRecord` persistence form
//! - **`scheduler`**: Topological sequencing, forward/backward passes,
//!   slack, critical path, and schedule KPIs
//! - **`history`**: `VersionChain` with create/modify/undo/redo over a
//!   capped FIFO chain
//! - **`validation`**: Record integrity checks (duplicate IDs, DAG cycles,
//!   dependency refs)
//!
//! # Architecture
//!
//! Callers go through `VersionChain` and `ActivityNetwork`; the sequencer and
//! CPM passes run underneath on every edit or query. Storage, transport and
//! presentation stay outside this crate and exchange `NetworkRecord`s.
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Malcolm et al. (1959), "Application of a technique for R&D program evaluation"
//! - Vanhoucke (2012), "Project Management with Dynamic Scheduling"

pub mod error;
pub mod history;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{CpmError, Result};
