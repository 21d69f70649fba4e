//! Error types for hypothesis validation and constraint building.

use thiserror::Error;

use crate::optimiser::hypothesis::Fate;

/// Errors that abort an optimisation pass.
///
/// A solver that fails to reach an optimal solution is not an error: it is
/// reported through [`SolverStatus`](crate::optimiser::SolverStatus) and the
/// pass yields an empty selection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimiserError {
    /// Raw fate code outside the known set.
    #[error("Unknown hypothesis type code: {0}")]
    UnknownFate(u32),

    /// A reference required by the hypothesis type is absent.
    #[error("Hypothesis {index} ({fate}) is missing required reference `{field}`")]
    MissingReference {
        index: usize,
        fate: Fate,
        field: &'static str,
    },

    /// A reference is present on a hypothesis type that forbids it.
    #[error("Hypothesis {index} ({fate}) carries unexpected reference `{field}`")]
    UnexpectedReference {
        index: usize,
        fate: Fate,
        field: &'static str,
    },

    /// Track ids are 1-based; zero never names a tracklet.
    #[error("Hypothesis {index} refers to invalid track id {id}")]
    InvalidTrackId { index: usize, id: u32 },

    /// A referenced tracklet lies beyond the largest subject id.
    #[error("Hypothesis {index} refers to track {id}, but only {num_tracklets} tracklets exist")]
    ReferenceOutOfRange {
        index: usize,
        id: u32,
        num_tracklets: usize,
    },

    /// Track ids do not cover `1..=N` densely. Only the first few missing
    /// ids are listed.
    #[error("Track ids are not dense, {missing_count} missing, starting with {first_missing:?}")]
    MalformedIdentifierSpace {
        missing_count: usize,
        first_missing: Vec<u32>,
    },
}

impl OptimiserError {
    /// Whether the error describes a badly formed hypothesis record.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::MalformedIdentifierSpace { .. })
    }
}

/// Result type alias for optimiser operations.
pub type OptimiserResult<T> = Result<T, OptimiserError>;
