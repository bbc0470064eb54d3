//! End-to-end planning: validate, enumerate, select.

use crate::{
    crew::{Crew, FlatRateCost},
    error::PlanningError,
    flight::Flight,
    ip::{IpSolver, SolverConfig},
    master::{self, Solution},
    metrics::{compute_metrics, SolutionMetrics},
    network::FlightNetwork,
    pairing::{generate_pairings, Pairing, PairingConfig},
    scenario::ScenarioConfig,
    validation::validate_flights,
};

#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub pairings: Vec<Pairing>,
    pub solution: Solution,
    pub metrics: SolutionMetrics,
}

/// Enumerates pairings for `flights`, priced at the crew pool's median
/// rate, and selects the cheapest exact cover.
///
/// Stops with [`PlanningError::EmptyPairingSet`] when the bounds admit no
/// pairing, and with [`PlanningError::UncoveredFlight`] before solving when
/// some flight has no pairing at all.
pub fn plan<S: IpSolver + ?Sized>(
    flights: &[Flight],
    crews: &[Crew],
    config: &ScenarioConfig,
    solver: &S,
) -> Result<PlanOutcome, PlanningError> {
    let cost = FlatRateCost::from_crews(crews).with_hotel_cost(config.hotel_cost);
    plan_with_cost(flights, &cost, &config.pairing, solver, &config.solver)
}

pub fn plan_with_cost<C, S>(
    flights: &[Flight],
    cost: &C,
    pairing_config: &PairingConfig,
    solver: &S,
    solver_config: &SolverConfig,
) -> Result<PlanOutcome, PlanningError>
where
    C: crate::crew::CostModel + Sync,
    S: IpSolver + ?Sized,
{
    pairing_config.validate()?;
    validate_flights(flights)?;

    let network = FlightNetwork::build(flights);
    let pairings = generate_pairings(&network, cost, pairing_config)?;
    if pairings.is_empty() {
        return Err(PlanningError::EmptyPairingSet);
    }
    let uncovered = master::uncovered_flights(&pairings, flights);
    if !uncovered.is_empty() {
        return Err(PlanningError::UncoveredFlight(uncovered));
    }

    let solution = master::solve(&pairings, flights, solver, solver_config)?;
    let metrics = compute_metrics(&solution);
    Ok(PlanOutcome {
        pairings,
        solution,
        metrics,
    })
}
