//! Domain-level errors (no external dependencies)

use std::collections::TryReserveError;
use thiserror::Error;

/// Boxed error produced by a caller-supplied grow function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Coarse classification of domain failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Wrong shape of input, negative counts, empty collections, bad text.
    InvalidArgument,
    /// The grow function failed while being iterated.
    CollaboratorFailure,
    /// Backing storage could not be grown.
    AllocationFailure,
    /// A configured bound on the amount of work was hit.
    ResourceLimit,
}

/// Domain errors represent violated operation contracts.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid query '{query}': {reason}")]
    InvalidQuery { query: String, reason: String },

    #[error("grow function failed in generation {generation}")]
    CollaboratorFailure {
        generation: usize,
        #[source]
        source: BoxError,
    },

    #[error("cannot allocate {what}")]
    AllocationFailure {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    #[error("generation {generation} exceeds the frontier limit of {limit} trees")]
    FrontierLimit { limit: usize, generation: usize },
}

impl DomainError {
    pub fn invalid_query(query: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query: query.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidArgument(_) | DomainError::InvalidQuery { .. } => {
                ErrorKind::InvalidArgument
            }
            DomainError::CollaboratorFailure { .. } => ErrorKind::CollaboratorFailure,
            DomainError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
            DomainError::FrontierLimit { .. } => ErrorKind::ResourceLimit,
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
