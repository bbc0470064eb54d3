//! Pairing enumeration.
//!
//! Every flight is tried as the start of a duty. From each start an
//! explicit-stack depth-first search extends the duty forward in time
//! with flights the crew can legally fly next, recording every state it
//! visits. The per-start searches share nothing but the read-only
//! network, so they fan out across threads when enabled.

use std::collections::HashMap;

use chrono::TimeDelta;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    crew::{duty_hours, CostModel},
    error::PlanningError,
    flight::{iso_time, FlightId, Timestamp},
    network::{feasible_follow, FlightNetwork},
};

pub type PairingId = String;

/// One continuous duty period for one crew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub pairing_id: PairingId,
    /// Ordered by departure.
    pub flights: Vec<FlightId>,
    #[serde(with = "iso_time")]
    pub start: Timestamp,
    #[serde(with = "iso_time")]
    pub end: Timestamp,
    pub duty_hours: f64,
    pub cost: f64,
}

impl Pairing {
    pub fn legs(&self) -> usize {
        self.flights.len()
    }

    pub fn covers(&self, flight: &str) -> bool {
        self.flights.iter().any(|f| f == flight)
    }
}

/// Bounds on the pairings the enumerator may produce.
///
/// ```
/// use chrono::TimeDelta;
/// use crew_pairing::pairing::PairingConfig;
///
/// let config = PairingConfig::default()
///     .with_max_legs(4)
///     .with_max_duty(TimeDelta::hours(12));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PairingConfig {
    /// Minimum ground time between consecutive legs.
    pub min_turn: TimeDelta,
    /// Longest allowed span from first departure to last arrival.
    pub max_duty: TimeDelta,
    /// Most legs in one pairing.
    pub max_legs: usize,
    /// Run the per-start searches on the rayon pool.
    pub parallel: bool,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            min_turn: TimeDelta::minutes(45),
            max_duty: TimeDelta::hours(10),
            max_legs: 6,
            parallel: true,
        }
    }
}

impl PairingConfig {
    pub fn with_min_turn(mut self, min_turn: TimeDelta) -> Self {
        self.min_turn = min_turn;
        self
    }

    pub fn with_max_duty(mut self, max_duty: TimeDelta) -> Self {
        self.max_duty = max_duty;
        self
    }

    pub fn with_max_legs(mut self, max_legs: usize) -> Self {
        self.max_legs = max_legs;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn max_duty_hours(&self) -> f64 {
        self.max_duty.num_seconds() as f64 / 3600.0
    }

    /// A zero duty bound is accepted; it simply admits no pairing.
    pub fn validate(&self) -> Result<(), PlanningError> {
        if self.min_turn < TimeDelta::zero() {
            return Err(PlanningError::InvalidParameters(
                "minimum turn time must not be negative".into(),
            ));
        }
        if self.max_duty < TimeDelta::zero() {
            return Err(PlanningError::InvalidParameters(
                "maximum duty time must not be negative".into(),
            ));
        }
        if self.max_legs == 0 {
            return Err(PlanningError::InvalidParameters(
                "a pairing needs at least one leg".into(),
            ));
        }
        Ok(())
    }
}

/// Converts a duty limit given in hours, or `None` when it is not finite
/// or out of `TimeDelta`'s range.
pub fn hours_to_duration(hours: f64) -> Option<TimeDelta> {
    let millis = (hours * 3_600_000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    TimeDelta::try_milliseconds(millis as i64)
}

/// Search state: network indices flown so far plus the duty start.
#[derive(Clone, Debug)]
struct Node {
    trail: Vec<usize>,
    start: Timestamp,
    last_arrival: Timestamp,
}

/// A pairing before it is given an id.
#[derive(Clone, Debug)]
struct Candidate {
    trail: Vec<usize>,
    start: Timestamp,
    end: Timestamp,
    duty_hours: f64,
    cost: f64,
}

/// Enumerates all legal pairings within `config`'s bounds.
///
/// The result is deduplicated by flight sequence (cheapest record wins,
/// earliest on ties), sorted by start time with generation order
/// breaking ties, and numbered `P_000000`, `P_000001`, ... in that order.
/// An empty result is not an error here.
pub fn generate_pairings<C>(
    network: &FlightNetwork,
    cost_model: &C,
    config: &PairingConfig,
) -> Result<Vec<Pairing>, PlanningError>
where
    C: CostModel + Sync,
{
    config.validate()?;

    let per_start: Vec<Vec<Candidate>> = if config.parallel {
        (0..network.len())
            .into_par_iter()
            .map(|start| search_from(network, start, cost_model, config))
            .collect()
    } else {
        (0..network.len())
            .map(|start| search_from(network, start, cost_model, config))
            .collect()
    };

    let mut best: Vec<Candidate> = Vec::new();
    let mut index_by_key: HashMap<Vec<usize>, usize> = HashMap::new();
    for candidate in per_start.into_iter().flatten() {
        match index_by_key.get(&candidate.trail) {
            Some(&i) => {
                if candidate.cost < best[i].cost {
                    best[i] = candidate;
                }
            }
            None => {
                index_by_key.insert(candidate.trail.clone(), best.len());
                best.push(candidate);
            }
        }
    }
    best.sort_by_key(|c| c.start);

    Ok(best
        .into_iter()
        .enumerate()
        .map(|(i, c)| Pairing {
            pairing_id: format!("P_{:06}", i),
            flights: c.trail.iter().map(|&f| network.get(f).id.clone()).collect(),
            start: c.start,
            end: c.end,
            duty_hours: c.duty_hours,
            cost: c.cost,
        })
        .collect())
}

/// Depth-first search over duties starting at network index `start`.
fn search_from<C: CostModel>(
    network: &FlightNetwork,
    start: usize,
    cost_model: &C,
    config: &PairingConfig,
) -> Vec<Candidate> {
    let max_duty_hours = config.max_duty_hours();
    let first = network.get(start);
    let mut found = Vec::new();
    let mut frontier = vec![Node {
        trail: vec![start],
        start: first.depart_time,
        last_arrival: first.arrive_time,
    }];

    while let Some(node) = frontier.pop() {
        let duty = duty_hours(node.start, node.last_arrival);
        // A single leg longer than the duty limit never yields a pairing.
        if duty > max_duty_hours {
            continue;
        }
        found.push(Candidate {
            trail: node.trail.clone(),
            start: node.start,
            end: node.last_arrival,
            duty_hours: duty,
            cost: cost_model.pairing_cost(node.start, node.last_arrival),
        });

        if duty >= max_duty_hours || node.trail.len() >= config.max_legs {
            continue;
        }

        let last = network.get(*node.trail.last().unwrap_or(&start));
        for next in network.first_departing_after(last.depart_time)..network.len() {
            let candidate = network.get(next);
            if !feasible_follow(last, candidate, config.min_turn) {
                continue;
            }
            if duty_hours(node.start, candidate.arrive_time) > max_duty_hours {
                continue;
            }
            let mut trail = node.trail.clone();
            trail.push(next);
            frontier.push(Node {
                trail,
                start: node.start,
                last_arrival: candidate.arrive_time,
            });
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crew::FlatRateCost;
    use crate::flight::{parse_time, Flight};

    fn flight(id: &str, origin: &str, dest: &str, dep: &str, arr: &str) -> Flight {
        Flight::new(id, origin, dest, parse_time(dep).unwrap(), parse_time(arr).unwrap())
    }

    fn two_leg_schedule() -> FlightNetwork {
        FlightNetwork::build(&[
            flight("F1", "A", "B", "2025-10-01T08:00:00", "2025-10-01T09:00:00"),
            flight("F2", "B", "C", "2025-10-01T10:00:00", "2025-10-01T11:30:00"),
        ])
    }

    fn sequences(pairings: &[Pairing]) -> Vec<Vec<&str>> {
        pairings
            .iter()
            .map(|p| p.flights.iter().map(String::as_str).collect())
            .collect()
    }

    #[test]
    fn two_flights_give_singletons_and_combined() {
        let config = PairingConfig::default().with_max_legs(2).with_parallel(false);
        let pairings =
            generate_pairings(&two_leg_schedule(), &FlatRateCost::new(100.0), &config).unwrap();

        assert_eq!(
            sequences(&pairings),
            vec![vec!["F1"], vec!["F1", "F2"], vec!["F2"]]
        );
        let combined = &pairings[1];
        assert!((combined.duty_hours - 3.5).abs() < 1e-9);
        assert!((combined.cost - 350.0).abs() < 1e-9);
        assert_eq!(combined.pairing_id, "P_000001");
    }

    #[test]
    fn leg_bound_stops_extension() {
        let config = PairingConfig::default().with_max_legs(1).with_parallel(false);
        let pairings =
            generate_pairings(&two_leg_schedule(), &FlatRateCost::new(100.0), &config).unwrap();
        assert_eq!(sequences(&pairings), vec![vec!["F1"], vec!["F2"]]);
    }

    #[test]
    fn duty_bound_stops_extension() {
        let config = PairingConfig::default()
            .with_max_duty(TimeDelta::hours(3))
            .with_parallel(false);
        let pairings =
            generate_pairings(&two_leg_schedule(), &FlatRateCost::new(100.0), &config).unwrap();
        assert_eq!(sequences(&pairings), vec![vec!["F1"], vec!["F2"]]);
    }

    #[test]
    fn duty_hours_convert_within_range() {
        assert_eq!(hours_to_duration(8.5), Some(TimeDelta::minutes(510)));
        assert_eq!(hours_to_duration(1e300), None);
        assert_eq!(hours_to_duration(f64::NAN), None);
    }

    #[test]
    fn huge_turn_time_leaves_only_singletons() {
        let config = PairingConfig::default()
            .with_min_turn(TimeDelta::days(365 * 300_000))
            .with_parallel(false);
        let pairings =
            generate_pairings(&two_leg_schedule(), &FlatRateCost::new(100.0), &config).unwrap();
        assert_eq!(sequences(&pairings), vec![vec!["F1"], vec!["F2"]]);
    }

    #[test]
    fn zero_duty_bound_yields_nothing() {
        let config = PairingConfig::default().with_max_duty(TimeDelta::zero());
        let pairings =
            generate_pairings(&two_leg_schedule(), &FlatRateCost::new(100.0), &config).unwrap();
        assert!(pairings.is_empty());
    }

    #[test]
    fn zero_legs_is_rejected() {
        let config = PairingConfig::default().with_max_legs(0);
        let result = generate_pairings(&two_leg_schedule(), &FlatRateCost::new(100.0), &config);
        assert!(matches!(result, Err(PlanningError::InvalidParameters(_))));
    }

    #[test]
    fn isolated_flight_is_still_a_singleton() {
        let network = FlightNetwork::build(&[
            flight("F1", "A", "B", "2025-10-01T08:00:00", "2025-10-01T09:00:00"),
            flight("F2", "B", "A", "2025-10-01T10:00:00", "2025-10-01T11:00:00"),
            flight("X", "Q", "R", "2025-10-01T09:30:00", "2025-10-01T10:30:00"),
        ]);
        let config = PairingConfig::default().with_parallel(false);
        let pairings = generate_pairings(&network, &FlatRateCost::new(80.0), &config).unwrap();
        let with_x: Vec<_> = pairings.iter().filter(|p| p.covers("X")).collect();
        assert_eq!(with_x.len(), 1);
        assert_eq!(with_x[0].flights, vec!["X".to_string()]);
    }

    #[test]
    fn overnight_pairing_pays_hotel() {
        let network = FlightNetwork::build(&[
            flight("F1", "A", "B", "2025-10-01T21:00:00", "2025-10-01T22:00:00"),
            flight("F2", "B", "A", "2025-10-01T23:00:00", "2025-10-02T00:30:00"),
        ]);
        let config = PairingConfig::default().with_parallel(false);
        let cost = FlatRateCost::new(100.0).with_hotel_cost(50.0);
        let pairings = generate_pairings(&network, &cost, &config).unwrap();
        let both = pairings.iter().find(|p| p.legs() == 2).unwrap();
        assert!((both.cost - (350.0 + 50.0)).abs() < 1e-9);
        let first = pairings.iter().find(|p| p.flights == ["F1"]).unwrap();
        assert!((first.cost - 100.0).abs() < 1e-9);
    }

    #[test]
    fn parallel_matches_sequential() {
        let network = FlightNetwork::build(&[
            flight("F1", "A", "B", "2025-10-01T06:00:00", "2025-10-01T07:00:00"),
            flight("F2", "B", "A", "2025-10-01T08:00:00", "2025-10-01T09:00:00"),
            flight("F3", "B", "C", "2025-10-01T08:00:00", "2025-10-01T09:30:00"),
            flight("F4", "A", "B", "2025-10-01T10:00:00", "2025-10-01T11:00:00"),
            flight("F5", "C", "A", "2025-10-01T10:30:00", "2025-10-01T12:00:00"),
        ]);
        let cost = FlatRateCost::new(90.0);
        let sequential =
            generate_pairings(&network, &cost, &PairingConfig::default().with_parallel(false))
                .unwrap();
        let parallel =
            generate_pairings(&network, &cost, &PairingConfig::default().with_parallel(true))
                .unwrap();
        assert_eq!(sequential, parallel);
    }
}
