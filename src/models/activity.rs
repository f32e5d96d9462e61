//! Activity model.
//!
//! An activity is the smallest unit of work in a CPM network. It carries
//! three-point duration estimates and the set of activities it depends on.
//!
//! # Duration Model
//!
//! Durations follow PERT three-point estimation (in hours):
//! - **Optimistic** (O): best case
//! - **Normal** (M): most likely case
//! - **Pessimistic** (P): worst case
//!
//! Expected = (O + 4M + P) / 6, StdDev = (P - O) / 6
//!
//! # Reference
//! Malcolm et al. (1959), "Application of a technique for R&D program evaluation" (PERT)

use std::collections::BTreeSet;

use crate::error::{CpmError, Result};

/// Activity identifier, unique within its owning network.
pub type ActivityId = u64;

/// PERT three-point duration estimate, in hours.
///
/// Always satisfies `0 < optimistic <= normal <= pessimistic` with a finite
/// expected value; every constructor and setter rejects values breaking
/// that.
///
/// # Examples
///
/// ```
/// use u_cpm::models::DurationEstimate;
///
/// let d = DurationEstimate::new(4.0, 6.0, 14.0).unwrap();
/// assert_eq!(d.expected(), 7.0);
/// assert!(DurationEstimate::new(6.0, 4.0, 14.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationEstimate {
    optimistic: f64,
    normal: f64,
    pessimistic: f64,
    expected: f64,
}

impl DurationEstimate {
    /// Creates a validated estimate.
    pub fn new(optimistic: f64, normal: f64, pessimistic: f64) -> Result<Self> {
        validate(optimistic, normal, pessimistic)?;
        Ok(Self {
            optimistic,
            normal,
            pessimistic,
            expected: expected(optimistic, normal, pessimistic),
        })
    }

    /// Creates a deterministic estimate (O = M = P).
    pub fn fixed(hours: f64) -> Result<Self> {
        Self::new(hours, hours, hours)
    }

    /// Optimistic duration (hours).
    pub fn optimistic(&self) -> f64 {
        self.optimistic
    }

    /// Most likely duration (hours).
    pub fn normal(&self) -> f64 {
        self.normal
    }

    /// Pessimistic duration (hours).
    pub fn pessimistic(&self) -> f64 {
        self.pessimistic
    }

    /// PERT mean: `(O + 4M + P) / 6`.
    pub fn expected(&self) -> f64 {
        self.expected
    }

    /// PERT standard deviation: `(P - O) / 6`.
    pub fn std_dev(&self) -> f64 {
        (self.pessimistic - self.optimistic) / 6.0
    }

    /// Variance.
    pub fn variance(&self) -> f64 {
        let sd = self.std_dev();
        sd * sd
    }

    fn with(self, optimistic: f64, normal: f64, pessimistic: f64) -> Result<Self> {
        Self::new(optimistic, normal, pessimistic)
    }
}

fn expected(optimistic: f64, normal: f64, pessimistic: f64) -> f64 {
    (optimistic + 4.0 * normal + pessimistic) / 6.0
}

fn validate(optimistic: f64, normal: f64, pessimistic: f64) -> Result<()> {
    // NaN fails every comparison, so it is rejected here as well.
    let ordered = optimistic > 0.0 && optimistic <= normal && normal <= pessimistic;
    // Finite inputs can still overflow the weighted mean.
    if ordered && pessimistic.is_finite() && expected(optimistic, normal, pessimistic).is_finite() {
        Ok(())
    } else {
        Err(CpmError::InvalidDuration {
            optimistic,
            normal,
            pessimistic,
        })
    }
}

/// An activity in a CPM network.
///
/// Activities are plain values: cloning yields an independent copy.
/// A network hands out clones, so editing a returned activity never
/// changes the network until it is written back with
/// [`ActivityNetwork::update_activity`](super::ActivityNetwork::update_activity).
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    id: ActivityId,
    name: String,
    description: String,
    duration: DurationEstimate,
    dependencies: BTreeSet<ActivityId>,
}

impl Activity {
    /// Creates an activity without dependencies.
    ///
    /// # Errors
    /// [`CpmError::InvalidDuration`] unless `0 < optimistic <= normal <= pessimistic`.
    pub fn new(
        id: ActivityId,
        name: impl Into<String>,
        description: impl Into<String>,
        optimistic: f64,
        normal: f64,
        pessimistic: f64,
    ) -> Result<Self> {
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            duration: DurationEstimate::new(optimistic, normal, pessimistic)?,
            dependencies: BTreeSet::new(),
        })
    }

    /// Creates an activity with an initial dependency set.
    ///
    /// # Errors
    /// [`CpmError::InvalidDuration`] as for [`Activity::new`], or
    /// [`CpmError::SelfDependency`] when `id` is in `dependencies`.
    pub fn with_dependencies(
        id: ActivityId,
        name: impl Into<String>,
        description: impl Into<String>,
        optimistic: f64,
        normal: f64,
        pessimistic: f64,
        dependencies: impl IntoIterator<Item = ActivityId>,
    ) -> Result<Self> {
        let mut activity = Self::new(id, name, description, optimistic, normal, pessimistic)?;
        activity.set_dependencies(dependencies)?;
        Ok(activity)
    }

    /// Activity identifier.
    pub fn id(&self) -> ActivityId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Duration estimate.
    pub fn duration(&self) -> &DurationEstimate {
        &self.duration
    }

    /// Expected duration in hours, used by all CPM passes.
    pub fn expected_duration(&self) -> f64 {
        self.duration.expected()
    }

    /// IDs of activities that must finish before this one starts, ascending.
    pub fn dependencies(&self) -> &BTreeSet<ActivityId> {
        &self.dependencies
    }

    /// Whether this activity directly depends on `id`.
    pub fn depends_on(&self, id: ActivityId) -> bool {
        self.dependencies.contains(&id)
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sets the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Replaces the dependency set.
    ///
    /// # Errors
    /// [`CpmError::SelfDependency`] if the set contains this activity's own
    /// id; the current set is kept.
    pub fn set_dependencies(&mut self, dependencies: impl IntoIterator<Item = ActivityId>) -> Result<()> {
        let dependencies: BTreeSet<ActivityId> = dependencies.into_iter().collect();
        if dependencies.contains(&self.id) {
            return Err(CpmError::SelfDependency { id: self.id });
        }
        self.dependencies = dependencies;
        Ok(())
    }

    /// Sets the optimistic time and re-derives the expected duration.
    ///
    /// # Errors
    /// [`CpmError::InvalidDuration`] if the new value breaks the ordering;
    /// the estimate is left unchanged.
    pub fn set_optimistic_time(&mut self, hours: f64) -> Result<()> {
        let d = self.duration;
        self.duration = d.with(hours, d.normal, d.pessimistic)?;
        Ok(())
    }

    /// Sets the normal time and re-derives the expected duration.
    ///
    /// # Errors
    /// As for [`Activity::set_optimistic_time`].
    pub fn set_normal_time(&mut self, hours: f64) -> Result<()> {
        let d = self.duration;
        self.duration = d.with(d.optimistic, hours, d.pessimistic)?;
        Ok(())
    }

    /// Sets the pessimistic time and re-derives the expected duration.
    ///
    /// # Errors
    /// As for [`Activity::set_optimistic_time`].
    pub fn set_pessimistic_time(&mut self, hours: f64) -> Result<()> {
        let d = self.duration;
        self.duration = d.with(d.optimistic, d.normal, hours)?;
        Ok(())
    }

    /// Removes `id` from the dependency set, if present.
    pub(crate) fn remove_dependency(&mut self, id: ActivityId) {
        self.dependencies.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_duration() {
        let act = Activity::new(1, "Wings", "Wings are working", 5.0, 10.0, 15.0).unwrap();
        assert_eq!(act.expected_duration(), (5.0 + 4.0 * 10.0 + 15.0) / 6.0);
        assert_eq!(act.expected_duration(), 10.0);
    }

    #[test]
    fn test_setters_recompute_expected() {
        let mut act = Activity::new(1, "Wings", "", 2.0, 3.0, 10.0).unwrap();

        act.set_pessimistic_time(16.0).unwrap();
        assert_eq!(act.expected_duration(), (2.0 + 4.0 * 3.0 + 16.0) / 6.0);

        act.set_optimistic_time(1.0).unwrap();
        assert_eq!(act.expected_duration(), (1.0 + 4.0 * 3.0 + 16.0) / 6.0);

        act.set_normal_time(7.0).unwrap();
        assert_eq!(act.expected_duration(), (1.0 + 4.0 * 7.0 + 16.0) / 6.0);
        assert_eq!(act.duration().normal(), 7.0);
    }

    #[test]
    fn test_invalid_durations_rejected() {
        assert!(matches!(
            Activity::new(1, "A", "", 0.0, 1.0, 2.0),
            Err(CpmError::InvalidDuration { .. })
        ));
        assert!(Activity::new(1, "A", "", 3.0, 2.0, 4.0).is_err());
        assert!(Activity::new(1, "A", "", 1.0, 5.0, 4.0).is_err());
        assert!(Activity::new(1, "A", "", f64::NAN, 5.0, 6.0).is_err());
        assert!(Activity::new(1, "A", "", 1.0, 1.0, f64::INFINITY).is_err());
        assert!(Activity::new(1, "A", "", 2.0, 2.0, 2.0).is_ok());
    }

    #[test]
    fn test_overflowing_expected_rejected() {
        assert!(matches!(
            Activity::new(1, "A", "", 1e308, 1e308, 1e308),
            Err(CpmError::InvalidDuration { .. })
        ));
        assert!(DurationEstimate::fixed(f64::MAX).is_err());

        let mut act = Activity::new(1, "A", "", 1.0, 1e307, 1e308).unwrap();
        let before = act.clone();
        assert!(act.set_normal_time(1e308).is_err());
        assert_eq!(act, before);
        assert!(DurationEstimate::fixed(1e300).unwrap().expected().is_finite());
    }

    #[test]
    fn test_failed_setter_leaves_state_unchanged() {
        let mut act = Activity::new(1, "A", "", 2.0, 4.0, 6.0).unwrap();
        let before = act.clone();

        assert!(act.set_normal_time(8.0).is_err());
        assert!(act.set_optimistic_time(-1.0).is_err());
        assert!(act.set_pessimistic_time(3.0).is_err());
        assert_eq!(act, before);
    }

    #[test]
    fn test_self_dependency_rejected() {
        let mut act = Activity::with_dependencies(5, "A", "", 1.0, 2.0, 3.0, [1, 2]).unwrap();

        let err = act.set_dependencies([1, 5, 7]).unwrap_err();
        assert_eq!(err, CpmError::SelfDependency { id: 5 });
        assert_eq!(act.dependencies().iter().copied().collect::<Vec<_>>(), vec![1, 2]);

        act.set_dependencies([9, 3]).unwrap();
        assert_eq!(act.dependencies().iter().copied().collect::<Vec<_>>(), vec![3, 9]);
        assert!(Activity::with_dependencies(5, "A", "", 1.0, 2.0, 3.0, [5]).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let a = Activity::with_dependencies(1, "A", "desc", 1.0, 2.0, 3.0, [7]).unwrap();
        let mut b = a.clone();
        b.set_name("B");
        b.set_dependencies([8]).unwrap();
        b.set_normal_time(2.5).unwrap();

        assert_eq!(a.name(), "A");
        assert!(a.depends_on(7));
        assert_eq!(a.duration().normal(), 2.0);
    }

    #[test]
    fn test_pert_spread() {
        let d = DurationEstimate::new(4.0, 6.0, 16.0).unwrap();
        assert_eq!(d.std_dev(), 2.0);
        assert_eq!(d.variance(), 4.0);
        assert_eq!(DurationEstimate::fixed(3.0).unwrap().std_dev(), 0.0);
    }
}
