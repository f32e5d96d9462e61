//! Input validation for imported networks.
//!
//! Checks structural integrity of a [`NetworkRecord`] before it is turned
//! into an [`ActivityNetwork`](crate::models::ActivityNetwork). Detects:
//! - Duplicate IDs and names
//! - Invalid duration estimates
//! - Self dependencies
//! - Dependencies on missing activities
//! - Circular dependencies (DAG validation)
//!
//! All problems are collected so a caller can report them together.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.4 (Topological Sort)

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{ActivityId, DurationEstimate, NetworkRecord};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two activities share the same ID.
    DuplicateId,
    /// Two activities share the same name.
    DuplicateName,
    /// Duration estimates are non-positive or out of order.
    InvalidDuration,
    /// An activity lists itself as a dependency.
    SelfDependency,
    /// An activity references a predecessor that doesn't exist.
    InvalidPredecessor,
    /// Dependency graph contains a cycle.
    CyclicDependency,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a network record.
///
/// Checks:
/// 1. No duplicate activity IDs
/// 2. No duplicate activity names
/// 3. Durations satisfy `0 < optimistic <= normal <= pessimistic`
/// 4. No activity depends on itself
/// 5. All dependency references point to existing activities
/// 6. No circular dependencies
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_record(record: &NetworkRecord) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for node in &record.nodes {
        if !ids.insert(node.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate activity ID: {}", node.id),
            ));
        }
        if !names.insert(node.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate activity name: '{}'", node.name),
            ));
        }
        if DurationEstimate::new(node.optimistic_time, node.normal_time, node.pessimistic_time).is_err() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!(
                    "Activity {} has invalid durations ({}, {}, {})",
                    node.id, node.optimistic_time, node.normal_time, node.pessimistic_time
                ),
            ));
        }
    }

    for node in &record.nodes {
        for &dep in &node.dependency_ids {
            if dep == node.id {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SelfDependency,
                    format!("Activity {} depends on itself", node.id),
                ));
            } else if !ids.contains(&dep) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidPredecessor,
                    format!("Activity {} references unknown predecessor {}", node.id, dep),
                ));
            }
        }
    }

    if let Some(e) = detect_cycles(record) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Detects cycles in the dependency graph using DFS.
///
/// # Algorithm
/// Nodes are unvisited, visiting (on the DFS stack) or done. Reaching a
/// visiting node again is a back edge, so a cycle exists. Self loops are
/// reported separately and skipped. The stack lives on the heap, so long
/// chains cannot exhaust the thread stack.
fn detect_cycles(record: &NetworkRecord) -> Option<ValidationError> {
    // Build adjacency list: activity_id → successors
    let mut adj: BTreeMap<ActivityId, Vec<ActivityId>> = BTreeMap::new();
    let mut all_ids: BTreeSet<ActivityId> = BTreeSet::new();

    for node in &record.nodes {
        all_ids.insert(node.id);
        for &dep in &node.dependency_ids {
            if dep != node.id {
                adj.entry(dep).or_default().push(node.id);
            }
        }
    }

    let mut colors: HashMap<ActivityId, Color> = HashMap::new();

    for &node in &all_ids {
        if !colors.contains_key(&node) && has_cycle_dfs(node, &adj, &mut colors) {
            return Some(ValidationError::new(
                ValidationErrorKind::CyclicDependency,
                format!("Circular dependency detected involving activity {node}"),
            ));
        }
    }

    None
}

/// DFS color; absent from the map means unvisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Visiting,
    Done,
}

fn successors(adj: &BTreeMap<ActivityId, Vec<ActivityId>>, node: ActivityId) -> &[ActivityId] {
    adj.get(&node).map(Vec::as_slice).unwrap_or_default()
}

fn has_cycle_dfs(
    start: ActivityId,
    adj: &BTreeMap<ActivityId, Vec<ActivityId>>,
    colors: &mut HashMap<ActivityId, Color>,
) -> bool {
    colors.insert(start, Color::Visiting);
    let mut stack = vec![(start, successors(adj, start).iter())];

    while let Some((node, neighbors)) = stack.last_mut() {
        let node = *node;
        let Some(&next) = neighbors.next() else {
            colors.insert(node, Color::Done);
            stack.pop();
            continue;
        };
        match colors.get(&next) {
            Some(Color::Visiting) => return true, // Back edge → cycle
            Some(Color::Done) => {}
            None => {
                colors.insert(next, Color::Visiting);
                stack.push((next, successors(adj, next).iter()));
            }
        }
    }

    false
}
