//! Topological sequencing of activities.
//!
//! # Algorithm
//!
//! Depth-first, dependency-first placement: each activity not yet placed
//! first places its unplaced dependencies (ascending by ID), then itself.
//! Activities are visited in their current order, so an already valid
//! sequence is returned unchanged.
//!
//! Each activity is marked unvisited, visiting (on the work stack) or
//! placed. Reaching a visiting activity again is a back edge, which means
//! the dependency relation has a cycle.
//!
//! # Complexity
//! O(V + E)
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{btree_set, HashMap};

use crate::error::{CpmError, Result};
use crate::models::{Activity, ActivityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Placed,
}

/// Computes a topological order of `activities`.
///
/// Returns indices into `activities`; every activity's dependencies appear
/// before it.
///
/// # Errors
/// - [`CpmError::UnknownDependency`] if a dependency is not in `activities`
/// - [`CpmError::CyclicDependency`] if the dependencies form a cycle
pub fn topological_order(activities: &[Activity]) -> Result<Vec<usize>> {
    let index: HashMap<ActivityId, usize> = activities
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id(), i))
        .collect();

    let mut marks = vec![Mark::Unvisited; activities.len()];
    let mut order = Vec::with_capacity(activities.len());

    for i in 0..activities.len() {
        place(i, activities, &index, &mut marks, &mut order)?;
    }

    Ok(order)
}

/// Places `root` and every unplaced activity it depends on.
///
/// Uses an explicit stack of pending dependency iterators, so chain depth
/// is bounded by the heap rather than the thread stack.
fn place<'a>(
    root: usize,
    activities: &'a [Activity],
    index: &HashMap<ActivityId, usize>,
    marks: &mut [Mark],
    order: &mut Vec<usize>,
) -> Result<()> {
    if marks[root] == Mark::Placed {
        return Ok(());
    }

    marks[root] = Mark::Visiting;
    let mut stack: Vec<(usize, btree_set::Iter<'a, ActivityId>)> =
        vec![(root, activities[root].dependencies().iter())];

    while let Some((i, deps)) = stack.last_mut() {
        let i = *i;
        let Some(&dep) = deps.next() else {
            marks[i] = Mark::Placed;
            order.push(i);
            stack.pop();
            continue;
        };

        let &j = index.get(&dep).ok_or(CpmError::UnknownDependency {
            activity: activities[i].id(),
            dependency: dep,
        })?;
        match marks[j] {
            Mark::Placed => {}
            Mark::Visiting => {
                return Err(CpmError::CyclicDependency {
                    id: activities[j].id(),
                })
            }
            Mark::Unvisited => {
                marks[j] = Mark::Visiting;
                stack.push((j, activities[j].dependencies().iter()));
            }
        }
    }

    Ok(())
}

/// Reorders `activities` topologically, consuming the input.
///
/// # Errors
/// As for [`topological_order`]; the input is dropped on failure, so callers
/// wanting atomicity pass a copy.
pub fn sort_activities(activities: Vec<Activity>) -> Result<Vec<Activity>> {
    let order = topological_order(&activities)?;
    let mut slots: Vec<Option<Activity>> = activities.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// Whether every activity's dependencies precede it in `activities`.
pub fn is_topologically_ordered(activities: &[Activity]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(activities.len());
    for act in activities {
        if !act.dependencies().iter().all(|d| seen.contains(d)) {
            return false;
        }
        seen.insert(act.id());
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn act(id: ActivityId, deps: &[ActivityId]) -> Activity {
        Activity::with_dependencies(id, format!("A{id}"), "", 1.0, 1.0, 1.0, deps.iter().copied())
            .unwrap()
    }

    fn ids(activities: &[Activity]) -> Vec<ActivityId> {
        activities.iter().map(|a| a.id()).collect()
    }

    #[test]
    fn test_dependencies_placed_first() {
        // D → {B, C}, B → A, C → A; listed in reverse
        let sorted = sort_activities(vec![act(4, &[2, 3]), act(3, &[1]), act(2, &[1]), act(1, &[])])
            .unwrap();

        assert_eq!(ids(&sorted), vec![1, 2, 3, 4]);
        assert!(is_topologically_ordered(&sorted));
    }

    #[test]
    fn test_valid_order_is_stable() {
        let input = vec![act(5, &[]), act(1, &[5]), act(9, &[]), act(2, &[1, 9])];
        let sorted = sort_activities(input.clone()).unwrap();
        assert_eq!(ids(&sorted), ids(&input));
    }

    #[test]
    fn test_cycle_detected() {
        // 1 → 3 → 2 → 1
        let err = topological_order(&[act(1, &[3]), act(2, &[1]), act(3, &[2])]).unwrap_err();
        assert!(matches!(err, CpmError::CyclicDependency { .. }));
    }

    #[test]
    fn test_unknown_dependency() {
        let err = topological_order(&[act(1, &[]), act(2, &[42])]).unwrap_err();
        assert_eq!(
            err,
            CpmError::UnknownDependency {
                activity: 2,
                dependency: 42
            }
        );
    }

    #[test]
    fn test_diamond_not_reported_as_cycle() {
        // Shared dependency reached twice must not look like a back edge.
        let order = topological_order(&[act(1, &[]), act(2, &[1]), act(3, &[1]), act(4, &[2, 3, 1])])
            .unwrap();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_long_reversed_chain() {
        // n → n-1 → … → 1, listed newest first
        let n = 20_000;
        let input: Vec<Activity> = (1..=n)
            .rev()
            .map(|id| if id == 1 { act(1, &[]) } else { act(id, &[id - 1]) })
            .collect();

        let sorted = sort_activities(input).unwrap();
        assert_eq!(ids(&sorted), (1..=n).collect::<Vec<_>>());
    }

    #[test]
    fn test_long_cycle_detected() {
        let n = 20_000;
        let input: Vec<Activity> = (1..=n)
            .map(|id| act(id, &[if id == 1 { n } else { id - 1 }]))
            .collect();
        let err = topological_order(&input).unwrap_err();
        assert!(matches!(err, CpmError::CyclicDependency { .. }));
    }

    #[test]
    fn test_empty() {
        assert!(topological_order(&[]).unwrap().is_empty());
        assert!(is_topologically_ordered(&[]));
    }

    #[test]
    fn test_order_check_detects_violation() {
        assert!(!is_topologically_ordered(&[act(2, &[1]), act(1, &[])]));
    }
}
