//! Conservation audit for the job registry.
//!
//! For any point in a run the following must hold:
//!
//! ```text
//! union(Pending, Available, Carried, Delivered, Expired) == original job ids
//! ```
//!
//! with every id in exactly one bucket and at most one job carried. The
//! registry's transitions keep this true by construction; the audit also
//! cross-checks the `available` and `carried` indices against the per-job
//! states, which is where a bookkeeping bug would show up first.
//!
//! A violation produces a [`JobAnomaly`].

use std::collections::{BTreeMap, BTreeSet};

use courier_types::{JobId, JobState};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::registry::JobRegistry;

/// Details of a failed conservation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAnomaly {
    /// Ids from the original set that no bucket holds.
    pub missing: Vec<JobId>,
    /// Ids held by the registry that were never in the original set.
    pub unexpected: Vec<JobId>,
    /// Ids that appear more than once.
    pub duplicated: Vec<JobId>,
    /// Number of jobs in the `Carried` state.
    pub carried_count: usize,
    /// Human-readable description of every violation found.
    pub message: String,
}

/// The result of a conservation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConservationResult {
    /// Every job is accounted for exactly once.
    Balanced,
    /// One or more jobs are missing, duplicated, or mis-indexed.
    Anomaly(JobAnomaly),
}

impl ConservationResult {
    /// Returns `true` if the check passed.
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Verify that `registry` accounts for exactly the jobs in `expected`.
pub fn verify_conservation(expected: &BTreeSet<JobId>, registry: &JobRegistry) -> ConservationResult {
    let mut problems: Vec<String> = Vec::new();

    // Count every id over all records.
    let mut seen: BTreeMap<&JobId, usize> = BTreeMap::new();
    for record in registry.records() {
        let n = seen.entry(&record.job.id).or_insert(0);
        *n = n.saturating_add(1);
    }

    let duplicated: Vec<JobId> = seen
        .iter()
        .filter(|(_, n)| **n > 1)
        .map(|(id, _)| (*id).clone())
        .collect();
    let missing: Vec<JobId> = expected
        .iter()
        .filter(|id| !seen.contains_key(id))
        .cloned()
        .collect();
    let unexpected: Vec<JobId> = seen
        .keys()
        .filter(|id| !expected.contains(**id))
        .map(|id| (*id).clone())
        .collect();

    if !duplicated.is_empty() {
        problems.push(format!("duplicated ids: {}", join(&duplicated)));
    }
    if !missing.is_empty() {
        problems.push(format!("missing ids: {}", join(&missing)));
    }
    if !unexpected.is_empty() {
        problems.push(format!("unexpected ids: {}", join(&unexpected)));
    }

    // The id index must point every id at its own record.
    for (id, &i) in registry.id_index() {
        if registry.records().get(i).map(|r| &r.job.id) != Some(id) {
            problems.push(format!("index entry for {id} points at the wrong record"));
        }
    }

    // The available queue must list exactly the Available records, once each.
    let mut queued = BTreeSet::new();
    for &i in registry.available_indices() {
        match registry.records().get(i) {
            Some(r) if r.state == JobState::Available => {
                if !queued.insert(i) {
                    problems.push(format!("{} queued as available twice", r.job.id));
                }
            }
            Some(r) => problems.push(format!(
                "{} queued as available but is {:?}",
                r.job.id, r.state
            )),
            None => problems.push(format!("available queue holds stale index {i}")),
        }
    }
    let available_count = registry.count(JobState::Available);
    if queued.len() != available_count {
        problems.push(format!(
            "{available_count} jobs are available but {} are queued",
            queued.len()
        ));
    }

    // At most one carried job, and the carried pointer agrees with it.
    let carried_count = registry.count(JobState::Carried);
    if carried_count > 1 {
        problems.push(format!("{carried_count} jobs carried at once"));
    }
    let pointer_state = registry
        .carried_index()
        .and_then(|i| registry.records().get(i))
        .map(|r| r.state);
    match (pointer_state, carried_count) {
        (None, 0) | (Some(JobState::Carried), 1) => {}
        (pointer, count) => problems.push(format!(
            "carried pointer ({pointer:?}) disagrees with {count} carried jobs"
        )),
    }

    if problems.is_empty() {
        return ConservationResult::Balanced;
    }

    let message = problems.join("; ");
    error!(%message, "Job conservation violated");
    ConservationResult::Anomaly(JobAnomaly {
        missing,
        unexpected,
        duplicated,
        carried_count,
        message,
    })
}

fn join(ids: &[JobId]) -> String {
    ids.iter().map(JobId::as_str).collect::<Vec<_>>().join(", ")
}
