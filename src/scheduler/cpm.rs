//! Critical Path Method timing analysis.
//!
//! # Algorithm
//!
//! Input activities must already be in topological order.
//!
//! 1. **Forward pass**: `ES(a) = max EF(p)` over predecessors (0 for sources),
//!    `EF(a) = ES(a) + d(a)`. The same sweep keeps, per activity, the
//!    predecessor with the largest `EF` (ties to the smallest ID). Since
//!    `EF(a)` is the longest path ending in `a`, this is the longest-path
//!    DP table.
//! 2. **Critical path**: backtrack from the sink with the largest `EF`
//!    (ties to the smallest ID) through the recorded predecessors.
//! 3. **Backward pass**: sinks get `LF = project end`, then in reverse order
//!    `LF(a) = min LS(s)` over successors, `LS(a) = LF(a) - d(a)`.
//! 4. **Slack**: total `LS - ES`; free `min ES(s) - EF(a)` (project end for
//!    sinks); safety `LS(a) - max LF(p)` (`LS(a)` for sources).
//!
//! The project end is the network deadline when set, otherwise the
//! critical-path length.
//!
//! # Complexity
//! O(V + E) for the full table.
//!
//! # Reference
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Vanhoucke (2012), "Project Management with Dynamic Scheduling", Ch. 2 (slack definitions)

use std::collections::HashMap;

use serde::Serialize;

use crate::models::{Activity, ActivityId};

/// Relative tolerance for comparing accumulated durations.
pub(crate) const EPSILON: f64 = 1e-9;

pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Timing window and slack for one activity (hours).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityTiming {
    /// Activity ID.
    pub id: ActivityId,
    /// Expected duration used by the passes.
    pub duration: f64,
    /// Earliest start.
    pub earliest_start: f64,
    /// Earliest finish.
    pub earliest_finish: f64,
    /// Latest start.
    pub latest_start: f64,
    /// Latest finish.
    pub latest_finish: f64,
    /// `LS - ES`.
    pub total_slack: f64,
    /// Delay possible without moving any successor's earliest start.
    pub free_slack: f64,
    /// Delay possible when every predecessor finishes as late as allowed.
    pub safety_slack: f64,
}

impl ActivityTiming {
    /// Whether the activity has zero total slack.
    pub fn is_critical(&self) -> bool {
        approx_eq(self.total_slack, 0.0)
    }
}

/// Complete CPM table for a network.
///
/// Timings are stored in the network's topological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpmSchedule {
    timings: Vec<ActivityTiming>,
    #[serde(skip)]
    positions: HashMap<ActivityId, usize>,
    critical_path: Vec<ActivityId>,
    critical_path_length: f64,
    project_end: f64,
}

impl CpmSchedule {
    /// Runs the forward and backward passes.
    ///
    /// `activities` must be topologically ordered with every dependency
    /// present; an [`ActivityNetwork`](crate::models::ActivityNetwork)
    /// always holds its activities that way.
    pub(crate) fn compute(activities: &[Activity], deadline: Option<f64>) -> Self {
        let n = activities.len();
        let positions: HashMap<ActivityId, usize> = activities
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id(), i))
            .collect();

        let mut predecessors: Vec<Vec<usize>> = Vec::with_capacity(n);
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, act) in activities.iter().enumerate() {
            let preds: Vec<usize> = act
                .dependencies()
                .iter()
                .filter_map(|d| positions.get(d).copied())
                .collect();
            for &p in &preds {
                successors[p].push(i);
            }
            predecessors.push(preds);
        }

        let durations: Vec<f64> = activities.iter().map(Activity::expected_duration).collect();

        // Forward pass + longest-path DP
        let mut es = vec![0.0; n];
        let mut ef = vec![0.0; n];
        let mut best_pred: Vec<Option<usize>> = vec![None; n];
        for i in 0..n {
            let mut best: Option<usize> = None;
            for &p in &predecessors[i] {
                best = Some(match best {
                    None => p,
                    Some(b) => pick_longer(b, p, &ef, activities),
                });
            }
            es[i] = best.map_or(0.0, |b| ef[b]);
            ef[i] = es[i] + durations[i];
            best_pred[i] = best;
        }

        let end = (0..n)
            .filter(|&i| successors[i].is_empty())
            .reduce(|a, b| pick_longer(a, b, &ef, activities));
        let critical_path_length = end.map_or(0.0, |e| ef[e]);

        let mut critical_path = Vec::new();
        let mut cursor = end;
        while let Some(i) = cursor {
            critical_path.push(activities[i].id());
            cursor = best_pred[i];
        }
        critical_path.reverse();

        // Backward pass
        let project_end = deadline.unwrap_or(critical_path_length);
        let mut ls = vec![0.0; n];
        let mut lf = vec![0.0; n];
        for i in (0..n).rev() {
            lf[i] = successors[i]
                .iter()
                .map(|&s| ls[s])
                .reduce(f64::min)
                .unwrap_or(project_end);
            ls[i] = lf[i] - durations[i];
        }

        let timings = (0..n)
            .map(|i| {
                let free_slack = successors[i]
                    .iter()
                    .map(|&s| es[s])
                    .reduce(f64::min)
                    .unwrap_or(project_end)
                    - ef[i];
                let safety_slack = ls[i]
                    - predecessors[i]
                        .iter()
                        .map(|&p| lf[p])
                        .reduce(f64::max)
                        .unwrap_or(0.0);
                ActivityTiming {
                    id: activities[i].id(),
                    duration: durations[i],
                    earliest_start: es[i],
                    earliest_finish: ef[i],
                    latest_start: ls[i],
                    latest_finish: lf[i],
                    total_slack: ls[i] - es[i],
                    free_slack,
                    safety_slack,
                }
            })
            .collect();

        Self {
            timings,
            positions,
            critical_path,
            critical_path_length,
            project_end,
        }
    }

    /// Timing for one activity.
    pub fn timing(&self, id: ActivityId) -> Option<&ActivityTiming> {
        self.positions.get(&id).map(|&i| &self.timings[i])
    }

    /// All timings in topological order.
    pub fn timings(&self) -> &[ActivityTiming] {
        &self.timings
    }

    /// Activity IDs along the longest path, source first.
    pub fn critical_path(&self) -> &[ActivityId] {
        &self.critical_path
    }

    /// Total expected duration of the critical path (hours).
    pub fn critical_path_length(&self) -> f64 {
        self.critical_path_length
    }

    /// Finish time used to seed the backward pass (hours).
    pub fn project_end(&self) -> f64 {
        self.project_end
    }

    /// Activities with zero total slack, in topological order.
    pub fn critical_activities(&self) -> Vec<ActivityId> {
        self.timings
            .iter()
            .filter(|t| t.is_critical())
            .map(|t| t.id)
            .collect()
    }
}

/// Returns whichever of `a`, `b` has the larger finish, preferring the
/// smaller activity ID on ties.
fn pick_longer(a: usize, b: usize, ef: &[f64], activities: &[Activity]) -> usize {
    if approx_eq(ef[a], ef[b]) {
        if activities[a].id() <= activities[b].id() {
            a
        } else {
            b
        }
    } else if ef[a] > ef[b] {
        a
    } else {
        b
    }
}
