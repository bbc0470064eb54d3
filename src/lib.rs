//! Airline crew pairing.
//!
//! A flight schedule is turned into every legal duty sequence a single
//! crew could fly ([`pairing`]), and the cheapest subset of those that
//! flies each flight exactly once is chosen by a set-partitioning program
//! ([`master`]) solved through the [`ip::IpSolver`] seam.

extern crate chrono;

#[cfg(feature = "cp-sat")]
pub mod cp_sat_solver;
pub mod crew;
pub mod error;
pub mod export;
pub mod flight;
pub mod generator;
pub mod ip;
pub mod master;
pub mod metrics;
pub mod network;
pub mod pairing;
pub mod planner;
pub mod scenario;
pub mod solver;
pub mod validation;

#[cfg(feature = "node")]
mod node;

pub use error::PlanningError;
pub use master::Solution;
pub use planner::{plan, PlanOutcome};
