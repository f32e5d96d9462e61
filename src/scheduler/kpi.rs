//! Schedule quality metrics (KPIs).
//!
//! Summarizes a CPM table for reporting.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Project Duration | Critical-path length |
//! | Deadline Margin | Deadline minus project duration |
//! | Critical Count | Activities with zero total slack |
//! | Avg Total Slack | Mean of `LS - ES` |
//! | Path Variance | Sum of PERT variances along the critical path |
//!
//! # Reference
//! Malcolm et al. (1959): project-duration variance as the sum of
//! critical-activity variances.

use serde::Serialize;

use crate::models::ActivityNetwork;

/// Network schedule indicators. All times in hours.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Critical-path length.
    pub project_duration: f64,
    /// Network deadline, if one is set.
    pub deadline: Option<f64>,
    /// `deadline - project_duration`; `None` without a deadline.
    pub deadline_margin: Option<f64>,
    /// Number of activities.
    pub activity_count: usize,
    /// Number of activities with zero total slack.
    pub critical_count: usize,
    /// Mean total slack across all activities.
    pub avg_total_slack: f64,
    /// Sum of PERT variances along the critical path.
    pub critical_path_variance: f64,
}

impl ScheduleKpi {
    /// Computes KPIs for a network.
    pub fn calculate(network: &ActivityNetwork) -> Self {
        let schedule = network.schedule();
        let timings = schedule.timings();
        let project_duration = schedule.critical_path_length();

        let avg_total_slack = if timings.is_empty() {
            0.0
        } else {
            timings.iter().map(|t| t.total_slack).sum::<f64>() / timings.len() as f64
        };

        let critical_path_variance = schedule
            .critical_path()
            .iter()
            .filter_map(|&id| network.activity(id))
            .map(|a| a.duration().variance())
            .sum::<f64>();

        Self {
            project_duration,
            deadline: network.deadline(),
            deadline_margin: network.deadline().map(|d| d - project_duration),
            activity_count: timings.len(),
            critical_count: timings.iter().filter(|t| t.is_critical()).count(),
            avg_total_slack,
            critical_path_variance,
        }
    }

    /// Standard deviation of the project duration.
    pub fn critical_path_std_dev(&self) -> f64 {
        self.critical_path_variance.sqrt()
    }

    /// Whether the plan keeps at least `min_margin` hours before its deadline.
    ///
    /// Always true without a deadline.
    pub fn meets_margin(&self, min_margin: f64) -> bool {
        self.deadline_margin.map_or(true, |m| m >= min_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, NetworkId};

    fn network() -> ActivityNetwork {
        let mut net = ActivityNetwork::new(NetworkId(1), "KPI");
        net.insert(Activity::new(1, "A", "", 2.0, 4.0, 6.0).unwrap()).unwrap();
        net.insert(Activity::with_dependencies(2, "B", "", 2.0, 2.0, 2.0, [1]).unwrap())
            .unwrap();
        net.insert(Activity::with_dependencies(3, "C", "", 3.0, 6.0, 9.0, [1]).unwrap())
            .unwrap();
        net
    }

    #[test]
    fn test_kpi_without_deadline() {
        let kpi = ScheduleKpi::calculate(&network());

        assert_eq!(kpi.project_duration, 10.0);
        assert_eq!(kpi.activity_count, 3);
        assert_eq!(kpi.critical_count, 2);
        // Slack: A 0, B 4, C 0
        assert!((kpi.avg_total_slack - 4.0 / 3.0).abs() < 1e-9);
        // Var(A) = (4/6)^2, Var(C) = 1
        assert!((kpi.critical_path_variance - (4.0f64 / 9.0 + 1.0)).abs() < 1e-9);
        assert!(kpi.deadline_margin.is_none());
        assert!(kpi.meets_margin(100.0));
    }

    #[test]
    fn test_kpi_with_deadline() {
        let mut net = network();
        net.set_deadline(12.0).unwrap();
        let kpi = ScheduleKpi::calculate(&net);

        assert_eq!(kpi.deadline, Some(12.0));
        assert_eq!(kpi.deadline_margin, Some(2.0));
        assert_eq!(kpi.critical_count, 0);
        assert!(kpi.meets_margin(2.0));
        assert!(!kpi.meets_margin(2.5));
    }

    #[test]
    fn test_kpi_empty_network() {
        let kpi = ScheduleKpi::calculate(&ActivityNetwork::new(NetworkId(1), "Empty"));
        assert_eq!(kpi.project_duration, 0.0);
        assert_eq!(kpi.avg_total_slack, 0.0);
        assert_eq!(kpi.critical_path_std_dev(), 0.0);
    }
}
