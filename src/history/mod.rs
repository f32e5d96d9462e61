//! Bounded version history for activity networks.
//!
//! `VersionChain` keeps time-ordered snapshots of a user's networks with
//! undo/redo. `ChainConfig` sets the chain cap.
//!
//! # Concurrency
//!
//! All operations are synchronous and run in time proportional to the
//! chain length. A concurrent host guards one chain with one lock; the
//! copies returned by `retrieve` can be handed across threads freely.

mod chain;
mod config;

pub use chain::{ChainEntry, VersionChain, VersionState};
pub use config::{ChainConfig, DEFAULT_MAX_CHAIN_LENGTH};
