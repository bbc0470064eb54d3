use std::fmt;

use crate::{flight::FlightId, ip::SolverStatus, validation::ValidationError};

/// Failures of the enumerate-then-select pipeline. None of these are
/// retried here; callers decide whether to relax parameters and rerun.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// The schedule failed validation.
    MalformedInput(Vec<ValidationError>),
    InvalidParameters(String),
    /// The bounds admitted no pairing at all.
    EmptyPairingSet,
    /// These flights are not contained in any pairing.
    UncoveredFlight(Vec<FlightId>),
    /// The solver returned neither an optimal nor a time-limited result.
    SolverFailure(SolverStatus),
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput(errors) => {
                write!(f, "malformed input: ")?;
                for (i, error) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", error)?;
                }
                Ok(())
            }
            Self::InvalidParameters(reason) => write!(f, "invalid parameters: {}", reason),
            Self::EmptyPairingSet => write!(
                f,
                "no pairings generated; loosen the duty-hour, turn-time or leg bounds"
            ),
            Self::UncoveredFlight(ids) => {
                write!(f, "no pairing covers flight(s) {}", ids.join(", "))
            }
            Self::SolverFailure(status) => write!(f, "solver failed with status {:?}", status),
        }
    }
}

impl std::error::Error for PlanningError {}

impl From<Vec<ValidationError>> for PlanningError {
    fn from(value: Vec<ValidationError>) -> Self {
        Self::MalformedInput(value)
    }
}
