//! Error types for network editing, scheduling and version history.

use thiserror::Error;

use crate::models::{ActivityId, NetworkId};
use crate::validation::ValidationError;

/// Errors raised by activity, network and version-chain operations.
///
/// Every variant is recoverable. A failing mutation leaves its target
/// exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CpmError {
    /// Duration estimates are not positive or not ordered
    /// `optimistic <= normal <= pessimistic`.
    #[error(
        "Invalid duration estimates (optimistic {optimistic}, normal {normal}, pessimistic {pessimistic}): \
         require 0 < optimistic <= normal <= pessimistic"
    )]
    InvalidDuration {
        optimistic: f64,
        normal: f64,
        pessimistic: f64,
    },
    /// An activity listed itself as a dependency.
    #[error("Activity {id} cannot depend on itself")]
    SelfDependency { id: ActivityId },
    /// Another activity already uses this id or name.
    #[error("An activity with ID {id} or name '{name}' already exists")]
    DuplicateIdentity { id: ActivityId, name: String },
    /// A dependency references an activity not present in the network.
    #[error("Activity {activity} depends on unknown activity {dependency}")]
    UnknownDependency {
        activity: ActivityId,
        dependency: ActivityId,
    },
    /// The requested activity is not part of the network.
    #[error("Activity with ID {id} not found")]
    UnknownActivity { id: ActivityId },
    /// The dependency relation would contain a cycle.
    #[error("Circular dependency detected involving activity {id}")]
    CyclicDependency { id: ActivityId },
    /// The deadline would fall below the critical-path length.
    #[error("Deadline {deadline}h is shorter than the critical path ({critical_path_length}h)")]
    InfeasibleDeadline {
        deadline: f64,
        critical_path_length: f64,
    },
    /// `modify` was called for a network with no active version.
    #[error("Network {id} has no active version")]
    UnknownNetwork { id: NetworkId },
    /// `undo` found nothing it may move to the redo chain.
    #[error("Nothing to undo for network {id}")]
    NothingToUndo { id: NetworkId },
    /// `redo` found no undone version for the network.
    #[error("Nothing to redo for network {id}")]
    NothingToRedo { id: NetworkId },
    /// A persisted network failed validation on import.
    #[error("Invalid network record: {}", summarize(.errors))]
    InvalidRecord { errors: Vec<ValidationError> },
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CpmError>;
