//! The job registry: owner of every job and its lifecycle state.
//!
//! Jobs are stored in their original feed order. Two indices sit on top:
//!
//! - `available`: record indices of available jobs, in release order.
//! - `carried`: the record index of the single carried job, if any.
//!
//! Cross-references from outside the registry (the session's "current
//! job", snapshots) are by [`JobId`], never by handle.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use courier_types::{Deadline, Job, JobId, JobState, Position};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DispatchError;

/// A job together with its lifecycle bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// The job as supplied by the feed.
    pub job: Job,
    /// Current lifecycle state.
    pub state: JobState,
    /// Elapsed time the job became available.
    pub released_at: Option<f64>,
    /// Elapsed time the job was picked up.
    pub accepted_at: Option<f64>,
    /// Elapsed time the job was delivered or expired.
    pub finished_at: Option<f64>,
    /// For delivered jobs, whether the delivery met the deadline.
    pub on_time: Option<bool>,
}

impl JobRecord {
    const fn new(job: Job) -> Self {
        Self {
            job,
            state: JobState::Pending,
            released_at: None,
            accepted_at: None,
            finished_at: None,
            on_time: None,
        }
    }
}

/// Result of a successful drop-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// The delivered job.
    pub job_id: JobId,
    /// Money earned.
    pub payout: Decimal,
    /// `true` if delivered no later than the deadline.
    pub on_time: bool,
    /// The deadline, as elapsed seconds.
    pub due_at: f64,
    /// Elapsed time of delivery.
    pub delivered_at: f64,
}

/// Owner of all jobs in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRegistry {
    /// All jobs in original feed order.
    records: Vec<JobRecord>,
    /// Identifier to record index.
    index: BTreeMap<JobId, usize>,
    /// Record indices of available jobs, in release order.
    available: Vec<usize>,
    /// Record index of the carried job.
    carried: Option<usize>,
}

impl JobRegistry {
    /// Build a registry with every job `Pending`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::DuplicateJob`] if two jobs share an id, or
    /// [`DispatchError::InvalidJob`] if a weight, payout, or release time is
    /// negative or not finite, or an absolute deadline is not finite.
    pub fn new(jobs: Vec<Job>) -> Result<Self, DispatchError> {
        let mut index = BTreeMap::new();
        let mut records = Vec::with_capacity(jobs.len());

        for (i, job) in jobs.into_iter().enumerate() {
            validate_job(&job)?;
            if index.insert(job.id.clone(), i).is_some() {
                return Err(DispatchError::DuplicateJob(job.id));
            }
            records.push(JobRecord::new(job));
        }

        Ok(Self {
            records,
            index,
            available: Vec::new(),
            carried: None,
        })
    }

    // -------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------

    /// Release every pending job whose release time has been reached.
    ///
    /// Jobs are released in ascending release time; ties keep feed order.
    /// Returns the ids of the newly available jobs in that order.
    pub fn tick_releases(&mut self, elapsed_time: f64) -> Vec<JobId> {
        let mut due: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.state == JobState::Pending && r.job.release_time <= elapsed_time)
            .map(|(i, _)| i)
            .collect();
        // Stable sort keeps feed order among equal release times.
        due.sort_by(|a, b| {
            let ta = self.records.get(*a).map_or(0.0, |r| r.job.release_time);
            let tb = self.records.get(*b).map_or(0.0, |r| r.job.release_time);
            ta.total_cmp(&tb)
        });

        let mut released = Vec::with_capacity(due.len());
        for i in due {
            if let Some(record) = self.records.get_mut(i) {
                record.state = JobState::Available;
                record.released_at = Some(elapsed_time);
                self.available.push(i);
                debug!(job_id = %record.job.id, elapsed_time, "Job released");
                released.push(record.job.id.clone());
            }
        }
        if !released.is_empty() {
            info!(count = released.len(), elapsed_time, "Jobs became available");
        }
        released
    }

    /// Expire every available job older than `ttl_secs`.
    ///
    /// Age is `elapsed_time - release_time`; a job expires when its age is
    /// strictly greater than the TTL. Carried jobs are never touched.
    /// Returns the ids of the expired jobs in release order.
    pub fn tick_expirations(&mut self, elapsed_time: f64, ttl_secs: f64) -> Vec<JobId> {
        let mut expired = Vec::new();
        let records = &mut self.records;
        self.available.retain(|&i| {
            let Some(record) = records.get_mut(i) else {
                return false;
            };
            if elapsed_time - record.job.release_time > ttl_secs {
                record.state = JobState::Expired;
                record.finished_at = Some(elapsed_time);
                info!(job_id = %record.job.id, elapsed_time, "Job expired before pickup");
                expired.push(record.job.id.clone());
                false
            } else {
                true
            }
        });
        expired
    }

    /// Pick up the best available job whose pickup is within
    /// `max_distance` (Chebyshev) of `position`.
    ///
    /// The best job has the highest priority, then the highest payout, then
    /// the lowest id. Returns `None` without changing anything if a job is
    /// already carried or no job qualifies.
    pub fn accept_nearest(
        &mut self,
        position: Position,
        max_distance: u32,
        elapsed_time: f64,
    ) -> Option<JobId> {
        if self.carried.is_some() {
            debug!("Accept ignored: a job is already carried");
            return None;
        }

        let (slot, chosen) = self
            .available
            .iter()
            .enumerate()
            .filter_map(|(slot, &i)| self.records.get(i).map(|r| (slot, i, r)))
            .filter(|(_, _, r)| r.job.pickup.chebyshev(position) <= max_distance)
            .max_by(|(_, _, a), (_, _, b)| compare_for_acceptance(&a.job, &b.job))
            .map(|(slot, i, _)| (slot, i))?;

        let record = self.records.get_mut(chosen)?;
        self.available.remove(slot);
        record.state = JobState::Carried;
        record.accepted_at = Some(elapsed_time);
        self.carried = Some(chosen);
        info!(
            job_id = %record.job.id,
            priority = record.job.priority,
            payout = %record.job.payout,
            "Job accepted"
        );
        Some(record.job.id.clone())
    }

    /// Deliver the carried job if `position` is within `max_distance`
    /// (Chebyshev) of its dropoff.
    ///
    /// The deadline is `release_time + ttl_secs` unless the job carries an
    /// absolute deadline. Returns `None` if nothing is carried or the
    /// courier is too far away.
    pub fn deliver_if_at_dropoff(
        &mut self,
        position: Position,
        elapsed_time: f64,
        max_distance: u32,
        ttl_secs: f64,
    ) -> Option<DeliveryResult> {
        let i = self.carried?;
        let record = self.records.get_mut(i)?;
        if record.job.dropoff.chebyshev(position) > max_distance {
            return None;
        }

        let due_at = record.job.due_at(ttl_secs);
        let on_time = elapsed_time <= due_at;
        record.state = JobState::Delivered;
        record.finished_at = Some(elapsed_time);
        record.on_time = Some(on_time);
        self.carried = None;

        info!(job_id = %record.job.id, on_time, elapsed_time, due_at, "Job delivered");
        Some(DeliveryResult {
            job_id: record.job.id.clone(),
            payout: record.job.payout,
            on_time,
            due_at,
            delivered_at: elapsed_time,
        })
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// Available jobs in release order.
    pub fn available(&self) -> impl Iterator<Item = &Job> {
        self.available
            .iter()
            .filter_map(|&i| self.records.get(i).map(|r| &r.job))
    }

    /// Available jobs whose pickup lies within `radius` (Chebyshev) of
    /// `position`, in release order.
    pub fn available_near(&self, position: Position, radius: u32) -> Vec<&Job> {
        self.available()
            .filter(|job| job.pickup.chebyshev(position) <= radius)
            .collect()
    }

    /// The carried job, if any.
    pub fn carried(&self) -> Option<&Job> {
        self.carried
            .and_then(|i| self.records.get(i))
            .map(|r| &r.job)
    }

    /// Look up a job's record by id.
    pub fn get(&self, id: &JobId) -> Option<&JobRecord> {
        self.index.get(id).and_then(|&i| self.records.get(i))
    }

    /// Current state of a job.
    pub fn state_of(&self, id: &JobId) -> Option<JobState> {
        self.get(id).map(|r| r.state)
    }

    /// All records in original feed order.
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    /// Number of jobs in `state`.
    pub fn count(&self, state: JobState) -> usize {
        self.records.iter().filter(|r| r.state == state).count()
    }

    /// Number of delivered jobs that missed their deadline.
    pub fn late_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.state == JobState::Delivered && r.on_time == Some(false))
            .count()
    }

    /// Ids grouped by state. Every state is present, possibly empty.
    pub fn buckets(&self) -> BTreeMap<JobState, Vec<JobId>> {
        let mut buckets: BTreeMap<JobState, Vec<JobId>> =
            JobState::ALL.into_iter().map(|s| (s, Vec::new())).collect();
        for record in &self.records {
            buckets
                .entry(record.state)
                .or_default()
                .push(record.job.id.clone());
        }
        buckets
    }

    /// The set of every job id the registry was built with.
    pub fn job_ids(&self) -> BTreeSet<JobId> {
        self.index.keys().cloned().collect()
    }

    /// Total number of jobs.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the registry holds no jobs.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if every job is delivered or expired.
    pub fn all_terminal(&self) -> bool {
        self.records.iter().all(|r| r.state.is_terminal())
    }

    /// Returns `true` if no job is available or carried. Pending jobs are
    /// ignored.
    pub fn none_active(&self) -> bool {
        self.available.is_empty() && self.carried.is_none()
    }

    pub(crate) fn available_indices(&self) -> &[usize] {
        &self.available
    }

    pub(crate) const fn carried_index(&self) -> Option<usize> {
        self.carried
    }

    pub(crate) const fn id_index(&self) -> &BTreeMap<JobId, usize> {
        &self.index
    }
}

/// Order two jobs by acceptance preference: greater means preferred.
fn compare_for_acceptance(a: &Job, b: &Job) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.payout.cmp(&b.payout))
        .then_with(|| b.id.cmp(&a.id))
}

fn validate_job(job: &Job) -> Result<(), DispatchError> {
    let invalid = |reason: &str| DispatchError::InvalidJob {
        id: job.id.clone(),
        reason: reason.to_owned(),
    };
    if !job.weight.is_finite() || job.weight < 0.0 {
        return Err(invalid("weight must be a finite non-negative number"));
    }
    if job.payout.is_sign_negative() && !job.payout.is_zero() {
        return Err(invalid("payout must not be negative"));
    }
    if !job.release_time.is_finite() || job.release_time < 0.0 {
        return Err(invalid("release time must be a finite non-negative number"));
    }
    if matches!(job.deadline, Deadline::At(at) if !at.is_finite()) {
        return Err(invalid("absolute deadline must be finite"));
    }
    Ok(())
}
