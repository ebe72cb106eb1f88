use thiserror::Error;
use uuid::Uuid;

use crate::service::summary::TotalsOverflow;
use crate::store::StoreError;

/// Errors returned by [`crate::PlannerService`] operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Caller input broke a precondition. Nothing was read or written.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No cached event has this id.
    #[error("event {0} was not found")]
    NotFound(Uuid),

    /// The backing store failed to load or save.
    #[error("persistence failed: {0}")]
    Persistence(#[source] StoreError),

    /// Stored amounts add up past what a `Decimal` can hold.
    #[error(transparent)]
    Overflow(#[from] TotalsOverflow),

    /// The cancellation token fired before the operation committed.
    #[error("operation cancelled")]
    Cancelled,
}

impl PlannerError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<StoreError> for PlannerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cancelled => Self::Cancelled,
            other => Self::Persistence(other),
        }
    }
}

pub type Result<T, E = PlannerError> = std::result::Result<T, E>;
