//! Error kinds raised by the cursor and its guard.
//!
//! [`CursorError::InvalidArgument`] is recoverable and returned to the caller.
//! [`CursorError::AllocationFailure`] and [`CursorError::LockFailure`] are
//! fatal. The guard hands allocation failures to [`escalate`], which
//! terminates the process after reporting the failing operation. Lock
//! failures only come out of `SharedCursor::try_acquire`; callers that cannot
//! proceed without the lock escalate them the same way.

use std::collections::TryReserveError;
use thiserror::Error;

/// Errors produced by [`RingCursor`](crate::RingCursor) and
/// [`SharedCursor`](crate::SharedCursor).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CursorError {
    /// Input rejected before any state was touched.
    #[error("{operation}: invalid argument: {reason}")]
    InvalidArgument {
        /// Name of the rejected operation.
        operation: &'static str,
        /// What was wrong with the input.
        reason: String,
    },

    /// Backing storage for the ring could not be reserved.
    #[error("{operation}: allocation failed: {source}")]
    AllocationFailure {
        /// Name of the failing operation.
        operation: &'static str,
        /// Error reported by the allocator.
        #[source]
        source: TryReserveError,
    },

    /// The mutual-exclusion lock could not be acquired.
    #[error("{operation}: lock failure: {reason}")]
    LockFailure {
        /// Name of the failing operation.
        operation: &'static str,
        /// Why acquisition failed.
        reason: String,
    },
}

impl CursorError {
    pub(crate) fn invalid(operation: &'static str, reason: impl Into<String>) -> Self {
        CursorError::InvalidArgument {
            operation,
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CursorError::InvalidArgument { .. } => "invalid_argument",
            CursorError::AllocationFailure { .. } => "allocation_failure",
            CursorError::LockFailure { .. } => "lock_failure",
        }
    }

    /// Name of the operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            CursorError::InvalidArgument { operation, .. }
            | CursorError::AllocationFailure { operation, .. }
            | CursorError::LockFailure { operation, .. } => operation,
        }
    }

    /// Numeric status code, stable across releases.
    pub fn status_code(&self) -> i32 {
        match self {
            CursorError::InvalidArgument { .. } => 22,
            CursorError::AllocationFailure { .. } => 12,
            CursorError::LockFailure { .. } => 35,
        }
    }

    /// Whether the error must terminate the process.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, CursorError::InvalidArgument { .. })
    }
}

/// Report a fatal error and terminate the process with a failure status.
pub fn escalate(err: CursorError) -> ! {
    tracing::error!(
        operation = err.operation(),
        kind = err.as_label(),
        code = err.status_code(),
        error = %err,
        "fatal cursor error; terminating"
    );
    eprintln!("carousel: fatal error in {}: {}", err.operation(), err);
    std::process::exit(1)
}
