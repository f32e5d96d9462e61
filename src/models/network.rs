//! Activity network model.
//!
//! A network owns its activities in a dense vector kept in topological
//! order, with dependencies stored as ID sets. Cloning a network is a plain
//! structural copy, which is what version snapshots rely on.
//!
//! Every structural edit is applied to a copy, re-sequenced and checked
//! against the deadline before it replaces the current state, so a failed
//! edit is never observable.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{Activity, ActivityId};
use crate::error::{CpmError, Result};
use crate::scheduler::{approx_eq, sequencer, ActivityTiming, CpmSchedule};

/// Opaque network identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a critical path of `critical_path_length` overruns `deadline`,
/// allowing for float rounding.
fn exceeds_deadline(critical_path_length: f64, deadline: f64) -> bool {
    critical_path_length > deadline && !approx_eq(critical_path_length, deadline)
}

/// A CPM activity network.
///
/// # Examples
///
/// ```
/// use u_cpm::models::{Activity, ActivityNetwork, NetworkId};
///
/// let mut net = ActivityNetwork::new(NetworkId(1), "Launch");
/// net.insert(Activity::new(1, "Design", "", 4.0, 4.0, 4.0).unwrap()).unwrap();
/// net.insert(Activity::with_dependencies(2, "Build", "", 6.0, 6.0, 6.0, [1]).unwrap()).unwrap();
///
/// assert_eq!(net.critical_path(), vec![1, 2]);
/// assert_eq!(net.critical_path_length(), 10.0);
/// assert_eq!(net.earliest_start(2).unwrap(), 4.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityNetwork {
    id: NetworkId,
    name: String,
    deadline: Option<f64>,
    activities: Vec<Activity>,
    positions: HashMap<ActivityId, usize>,
    /// CPM table for `activities` and `deadline`; refreshed on every change
    /// to either.
    schedule: CpmSchedule,
}

impl ActivityNetwork {
    /// Creates an empty network without a deadline.
    pub fn new(id: NetworkId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            deadline: None,
            activities: Vec::new(),
            positions: HashMap::new(),
            schedule: CpmSchedule::compute(&[], None),
        }
    }

    /// Network identifier.
    pub fn id(&self) -> NetworkId {
        self.id
    }

    /// Network name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the network.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Deadline in hours. `None` means the project ends with its critical path.
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Sets the deadline.
    ///
    /// # Errors
    /// [`CpmError::InfeasibleDeadline`] if `hours` is below the critical-path
    /// length beyond float tolerance (or not a number); the current deadline
    /// is kept.
    pub fn set_deadline(&mut self, hours: f64) -> Result<()> {
        let critical_path_length = self.critical_path_length();
        if !hours.is_finite() || exceeds_deadline(critical_path_length, hours) {
            return Err(CpmError::InfeasibleDeadline {
                deadline: hours,
                critical_path_length,
            });
        }
        self.deadline = Some(hours);
        self.schedule = CpmSchedule::compute(&self.activities, self.deadline);
        Ok(())
    }

    /// Removes the deadline.
    pub fn clear_deadline(&mut self) {
        self.deadline = None;
        self.schedule = CpmSchedule::compute(&self.activities, None);
    }

    /// Number of activities.
    pub fn node_count(&self) -> usize {
        self.activities.len()
    }

    /// Whether the network has no activities.
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Whether an activity with this ID exists.
    pub fn contains(&self, id: ActivityId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Whether an activity with this name exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.activities.iter().any(|a| a.name() == name)
    }

    /// Borrowed view of one activity.
    pub fn activity(&self, id: ActivityId) -> Option<&Activity> {
        self.positions.get(&id).map(|&i| &self.activities[i])
    }

    /// Independent copy of one activity.
    pub fn get(&self, id: ActivityId) -> Option<Activity> {
        self.activity(id).cloned()
    }

    /// Activities in topological order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Activity IDs in topological order.
    pub fn ids(&self) -> Vec<ActivityId> {
        self.activities.iter().map(Activity::id).collect()
    }

    /// Adds an activity.
    ///
    /// # Errors
    /// - [`CpmError::DuplicateIdentity`] if the ID or name is taken
    /// - [`CpmError::UnknownDependency`] if a dependency is not in the network
    /// - [`CpmError::InfeasibleDeadline`] if the new activity would push the
    ///   critical path past the deadline
    pub fn insert(&mut self, activity: Activity) -> Result<()> {
        if self.contains(activity.id()) || self.contains_name(activity.name()) {
            return Err(CpmError::DuplicateIdentity {
                id: activity.id(),
                name: activity.name().to_string(),
            });
        }
        self.check_dependencies(activity.id(), activity.dependencies())?;

        let id = activity.id();
        let mut candidate = self.activities.clone();
        candidate.push(activity);
        self.commit(candidate)?;
        debug!("network {}: inserted activity {}", self.id, id);
        Ok(())
    }

    /// Removes an activity and every dependency on it.
    ///
    /// # Errors
    /// [`CpmError::UnknownActivity`] if the ID is absent.
    pub fn delete(&mut self, id: ActivityId) -> Result<Activity> {
        let &pos = self
            .positions
            .get(&id)
            .ok_or(CpmError::UnknownActivity { id })?;

        let mut candidate = self.activities.clone();
        let removed = candidate.remove(pos);
        for act in &mut candidate {
            act.remove_dependency(id);
        }
        self.commit(candidate)?;
        debug!("network {}: deleted activity {}", self.id, id);
        Ok(removed)
    }

    /// Replaces the dependency set of an activity.
    ///
    /// # Errors
    /// - [`CpmError::UnknownActivity`] if `id` is absent
    /// - [`CpmError::SelfDependency`] if `id` is in `dependencies`
    /// - [`CpmError::UnknownDependency`] if a member of `dependencies` is absent
    /// - [`CpmError::CyclicDependency`] if the edit would close a cycle
    /// - [`CpmError::InfeasibleDeadline`] if the critical path would pass the deadline
    pub fn set_dependencies(
        &mut self,
        id: ActivityId,
        dependencies: impl IntoIterator<Item = ActivityId>,
    ) -> Result<()> {
        let mut updated = self.get(id).ok_or(CpmError::UnknownActivity { id })?;
        updated.set_dependencies(dependencies)?;
        self.replace(updated)?;
        debug!("network {}: updated dependencies of activity {}", self.id, id);
        Ok(())
    }

    /// Writes back an edited copy of an existing activity (name, description,
    /// durations and dependencies).
    ///
    /// # Errors
    /// As for [`ActivityNetwork::set_dependencies`], plus
    /// [`CpmError::DuplicateIdentity`] if the new name belongs to another activity.
    pub fn update_activity(&mut self, activity: Activity) -> Result<()> {
        let id = activity.id();
        if !self.contains(id) {
            return Err(CpmError::UnknownActivity { id });
        }
        if self
            .activities
            .iter()
            .any(|a| a.id() != id && a.name() == activity.name())
        {
            return Err(CpmError::DuplicateIdentity {
                id,
                name: activity.name().to_string(),
            });
        }
        self.replace(activity)?;
        debug!("network {}: updated activity {}", self.id, id);
        Ok(())
    }

    fn replace(&mut self, activity: Activity) -> Result<()> {
        self.check_dependencies(activity.id(), activity.dependencies())?;
        let pos = self.positions[&activity.id()];
        let mut candidate = self.activities.clone();
        candidate[pos] = activity;
        self.commit(candidate)
    }

    fn check_dependencies(&self, id: ActivityId, dependencies: &BTreeSet<ActivityId>) -> Result<()> {
        match dependencies.iter().find(|d| !self.contains(**d)) {
            Some(&dependency) => Err(CpmError::UnknownDependency {
                activity: id,
                dependency,
            }),
            None => Ok(()),
        }
    }

    /// Sequences `candidate` and installs it if it respects the deadline.
    fn commit(&mut self, candidate: Vec<Activity>) -> Result<()> {
        let sorted = sequencer::sort_activities(candidate)?;
        let schedule = CpmSchedule::compute(&sorted, self.deadline);

        if let Some(deadline) = self.deadline {
            let critical_path_length = schedule.critical_path_length();
            if exceeds_deadline(critical_path_length, deadline) {
                return Err(CpmError::InfeasibleDeadline {
                    deadline,
                    critical_path_length,
                });
            }
        }

        self.positions = sorted.iter().enumerate().map(|(i, a)| (a.id(), i)).collect();
        self.activities = sorted;
        self.schedule = schedule;
        Ok(())
    }

    /// Installs activities that are already topologically ordered.
    pub(crate) fn install(&mut self, sorted: Vec<Activity>) {
        self.positions = sorted.iter().enumerate().map(|(i, a)| (a.id(), i)).collect();
        self.schedule = CpmSchedule::compute(&sorted, self.deadline);
        self.activities = sorted;
    }

    /// Full CPM table, kept current across edits.
    ///
    /// The per-activity queries below read from this table; callers needing
    /// many timings at once can borrow it directly.
    pub fn schedule(&self) -> &CpmSchedule {
        &self.schedule
    }

    /// Activity IDs along the critical path, source first.
    pub fn critical_path(&self) -> Vec<ActivityId> {
        self.schedule.critical_path().to_vec()
    }

    /// Length of the critical path in hours; 0 for an empty network.
    pub fn critical_path_length(&self) -> f64 {
        self.schedule.critical_path_length()
    }

    fn timing<T>(&self, id: ActivityId, f: impl FnOnce(&ActivityTiming) -> T) -> Result<T> {
        self.schedule
            .timing(id)
            .map(f)
            .ok_or(CpmError::UnknownActivity { id })
    }

    /// Earliest start (hours).
    pub fn earliest_start(&self, id: ActivityId) -> Result<f64> {
        self.timing(id, |t| t.earliest_start)
    }

    /// Earliest finish (hours).
    pub fn earliest_finish(&self, id: ActivityId) -> Result<f64> {
        self.timing(id, |t| t.earliest_finish)
    }

    /// Latest start (hours).
    pub fn latest_start(&self, id: ActivityId) -> Result<f64> {
        self.timing(id, |t| t.latest_start)
    }

    /// Latest finish (hours).
    pub fn latest_finish(&self, id: ActivityId) -> Result<f64> {
        self.timing(id, |t| t.latest_finish)
    }

    /// Total slack: `LS - ES`.
    pub fn total_slack(&self, id: ActivityId) -> Result<f64> {
        self.timing(id, |t| t.total_slack)
    }

    /// Free slack: delay that leaves every successor's earliest start intact.
    pub fn free_slack(&self, id: ActivityId) -> Result<f64> {
        self.timing(id, |t| t.free_slack)
    }

    /// Safety slack: delay available when all predecessors finish at their
    /// latest finish.
    pub fn safety_slack(&self, id: ActivityId) -> Result<f64> {
        self.timing(id, |t| t.safety_slack)
    }

    /// Whether the activity has zero total slack.
    pub fn is_critical(&self, id: ActivityId) -> Result<bool> {
        self.timing(id, |t| t.is_critical())
    }
}
