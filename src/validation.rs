//! Input checks run before enumeration.
//!
//! Detects:
//! - Duplicate flight ids
//! - Flights that do not depart strictly before they arrive
//! - Flights with a blank origin or destination

use std::collections::HashSet;
use std::fmt;

use crate::flight::Flight;

pub type ValidationResult = Result<(), Vec<ValidationError>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    DuplicateId,
    /// Departure at or after arrival.
    NonPositiveDuration,
    UnknownStation,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a flight schedule, reporting every problem found rather
/// than stopping at the first.
pub fn validate_flights(flights: &[Flight]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for flight in flights {
        if !ids.insert(flight.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate flight ID: {}", flight.id),
            ));
        }
        if flight.depart_time >= flight.arrive_time {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!(
                    "Flight '{}' departs at {} but arrives at {}",
                    flight.id, flight.depart_time, flight.arrive_time
                ),
            ));
        }
        if flight.origin.is_empty() || flight.dest.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownStation,
                format!("Flight '{}' has a blank origin or destination", flight.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
