//! Persistence records.
//!
//! Flat, serde-friendly mirrors of [`ActivityNetwork`] and [`Activity`] for
//! storage collaborators. Field names follow the camelCase layout those
//! collaborators exchange:
//!
//! ```json
//! { "networkId": 7, "networkName": "Launch", "deadline": 12.0,
//!   "nodes": [ { "id": 1, "name": "Design", "description": "",
//!                "optimisticTime": 3.0, "normalTime": 4.0, "pessimisticTime": 5.0,
//!                "dependencyIds": [] } ] }
//! ```
//!
//! Only field-level round-trip fidelity is guaranteed; the wire format is
//! the collaborator's choice.

use serde::{Deserialize, Serialize};

use super::{Activity, ActivityId, ActivityNetwork, NetworkId};
use crate::error::{CpmError, Result};
use crate::scheduler::sequencer;
use crate::validation::validate_record;

/// Stored form of an activity network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    /// Network identifier.
    pub network_id: NetworkId,
    /// Network name.
    pub network_name: String,
    /// Deadline in hours, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<f64>,
    /// Activities, in topological order when exported.
    #[serde(default)]
    pub nodes: Vec<ActivityRecord>,
}

/// Stored form of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Activity identifier.
    pub id: ActivityId,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Optimistic duration (hours).
    pub optimistic_time: f64,
    /// Most likely duration (hours).
    pub normal_time: f64,
    /// Pessimistic duration (hours).
    pub pessimistic_time: f64,
    /// IDs this activity depends on, ascending.
    #[serde(default)]
    pub dependency_ids: Vec<ActivityId>,
}

impl From<&Activity> for ActivityRecord {
    fn from(activity: &Activity) -> Self {
        let d = activity.duration();
        Self {
            id: activity.id(),
            name: activity.name().to_string(),
            description: activity.description().to_string(),
            optimistic_time: d.optimistic(),
            normal_time: d.normal(),
            pessimistic_time: d.pessimistic(),
            dependency_ids: activity.dependencies().iter().copied().collect(),
        }
    }
}

impl ActivityNetwork {
    /// Exports the network as a record.
    pub fn to_record(&self) -> NetworkRecord {
        NetworkRecord {
            network_id: self.id(),
            network_name: self.name().to_string(),
            deadline: self.deadline(),
            nodes: self.activities().iter().map(ActivityRecord::from).collect(),
        }
    }

    /// Rebuilds a network from a record.
    ///
    /// Nodes may appear in any order; they are re-sequenced on import.
    ///
    /// # Errors
    /// - [`CpmError::InvalidRecord`] listing every structural problem found
    ///   (duplicate IDs or names, invalid durations, self, unknown or cyclic
    ///   dependencies)
    /// - [`CpmError::InfeasibleDeadline`] if the stored deadline is below the
    ///   critical-path length
    pub fn from_record(record: &NetworkRecord) -> Result<Self> {
        validate_record(record).map_err(|errors| CpmError::InvalidRecord { errors })?;

        let activities = record
            .nodes
            .iter()
            .map(|n| {
                Activity::with_dependencies(
                    n.id,
                    n.name.clone(),
                    n.description.clone(),
                    n.optimistic_time,
                    n.normal_time,
                    n.pessimistic_time,
                    n.dependency_ids.iter().copied(),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let mut network = ActivityNetwork::new(record.network_id, record.network_name.clone());
        network.install(sequencer::sort_activities(activities)?);
        if let Some(deadline) = record.deadline {
            network.set_deadline(deadline)?;
        }
        Ok(network)
    }
}
