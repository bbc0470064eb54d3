//! Master Selector: picks the cheapest exact cover of the schedule.
//!
//! Formulated as a set-partitioning program with one binary variable per
//! pairing and one `== 1` row per flight, then handed to any
//! [`IpSolver`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::PlanningError,
    flight::{Flight, FlightId},
    ip::{IpModel, IpSolver, SolverConfig, SolverStatus},
    pairing::Pairing,
};

/// Chosen pairings and their total cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub selected: Vec<Pairing>,
    pub obj: f64,
}

/// Builds the set-partitioning model for `pairings` over `flights`.
///
/// A flight no pairing covers still gets its row, left empty with a
/// right-hand side of 1. That row can never hold, so the solver reports
/// infeasibility instead of returning a cover that skips the flight.
pub fn build_model(pairings: &[Pairing], flights: &[Flight]) -> IpModel {
    let mut model = IpModel::new("crew_master");
    let mut columns: HashMap<&str, Vec<(String, f64)>> = HashMap::new();
    for pairing in pairings {
        model.add_binary(&pairing.pairing_id, pairing.cost);
        for flight in &pairing.flights {
            let terms = columns.entry(flight.as_str()).or_default();
            // A pairing listing a flight twice gets coefficient 2, which no
            // exact cover can use.
            let repeat = terms
                .len()
                .checked_sub(1)
                .filter(|&i| terms[i].0 == pairing.pairing_id);
            match repeat {
                Some(i) => terms[i].1 += 1.0,
                None => terms.push((pairing.pairing_id.clone(), 1.0)),
            }
        }
    }
    for flight in flights {
        let terms = columns.remove(flight.id.as_str()).unwrap_or_default();
        model.add_equal(format!("cover_{}", flight.id), terms, 1.0);
    }
    model
}

/// Flights (in input order) that appear in no pairing.
pub fn uncovered_flights(pairings: &[Pairing], flights: &[Flight]) -> Vec<FlightId> {
    let mut covered = std::collections::HashSet::new();
    for pairing in pairings {
        covered.extend(pairing.flights.iter().map(String::as_str));
    }
    flights
        .iter()
        .filter(|f| !covered.contains(f.id.as_str()))
        .map(|f| f.id.clone())
        .collect()
}

/// Solves the set-partitioning program.
///
/// An optimal or time-limited result is accepted; pairings whose
/// variable exceeds 0.5 are selected, in input order, and the solver's
/// objective value is returned with them. Any other status is a
/// [`PlanningError::SolverFailure`].
pub fn solve<S: IpSolver + ?Sized>(
    pairings: &[Pairing],
    flights: &[Flight],
    solver: &S,
    config: &SolverConfig,
) -> Result<Solution, PlanningError> {
    let model = build_model(pairings, flights);
    let result = solver.solve(&model, config);

    match (result.status, result.objective_value) {
        (SolverStatus::Optimal | SolverStatus::TimeLimited, Some(obj)) => {
            let selected = pairings
                .iter()
                .filter(|p| result.value(&p.pairing_id) > 0.5)
                .cloned()
                .collect();
            Ok(Solution { selected, obj })
        }
        (SolverStatus::Optimal | SolverStatus::TimeLimited, None) => {
            Err(PlanningError::SolverFailure(SolverStatus::Error))
        }
        (status, _) => Err(PlanningError::SolverFailure(status)),
    }
}
