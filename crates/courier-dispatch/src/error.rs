//! Error types for the `courier-dispatch` crate.

use courier_types::JobId;

/// Errors raised while building a job registry.
///
/// Lifecycle operations themselves never fail: an impossible transition
/// (nothing to accept, nothing to deliver) is reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Two jobs share an identifier.
    #[error("duplicate job id: {0}")]
    DuplicateJob(JobId),

    /// A job has a field outside its valid range.
    #[error("job {id} is invalid: {reason}")]
    InvalidJob {
        /// The offending job.
        id: JobId,
        /// Explanation of what is wrong.
        reason: String,
    },
}
