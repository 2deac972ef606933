//! Domain error types.
//!
//! These errors come from mutations and validation. Queries never return
//! them: a query that cannot resolve something returns an empty result.

use super::{CorridorId, StopId, TrainId};

/// Domain-level errors for mutations and data consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// No train with this id in the diagram
    #[error("unknown train: {0}")]
    UnknownTrain(TrainId),

    /// No corridor with this id in the diagram
    #[error("unknown corridor: {0}")]
    UnknownCorridor(CorridorId),

    /// The stop is not in the expected timetable
    #[error("unknown stop: {0}")]
    UnknownStop(StopId),

    /// Inclusive row range is empty, reversed or out of bounds
    #[error("invalid stop range {start}..={end} for timetable of {len} stops")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// An operation needs two different trains
    #[error("operation needs two different trains, got {0} twice")]
    SameTrain(TrainId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidRange {
            start: 2,
            end: 5,
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "invalid stop range 2..=5 for timetable of 4 stops"
        );
    }
}
