//! Time-ordered view over a flight schedule.

use chrono::TimeDelta;

use crate::flight::{Flight, Timestamp};

/// Flights sorted ascending by departure. Ties keep their input order.
#[derive(Debug, Clone)]
pub struct FlightNetwork {
    flights: Vec<Flight>,
}

impl FlightNetwork {
    /// Sorts the flights by departure. No feasibility checks happen here.
    pub fn build(flights: &[Flight]) -> Self {
        let mut flights = flights.to_vec();
        flights.sort_by_key(|f| f.depart_time);
        Self { flights }
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn get(&self, index: usize) -> &Flight {
        &self.flights[index]
    }

    /// Index of the first flight departing strictly after `time`.
    pub fn first_departing_after(&self, time: Timestamp) -> usize {
        self.flights.partition_point(|f| f.depart_time <= time)
    }
}

/// Whether the crew of `first` can fly `next` immediately afterwards:
/// it must depart from where `first` landed, at least `min_turn` later.
pub fn feasible_follow(first: &Flight, next: &Flight, min_turn: TimeDelta) -> bool {
    let Some(ready) = first.arrive_time.checked_add_signed(min_turn) else {
        return false;
    };
    ready <= next.depart_time && first.dest == next.origin
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::parse_time;

    fn flight(id: &str, origin: &str, dest: &str, dep: &str, arr: &str) -> Flight {
        Flight::new(id, origin, dest, parse_time(dep).unwrap(), parse_time(arr).unwrap())
    }

    #[test]
    fn build_sorts_stably_by_departure() {
        let flights = vec![
            flight("F3", "A0", "A1", "2025-10-01T12:00:00", "2025-10-01T13:00:00"),
            flight("F1", "A0", "A1", "2025-10-01T08:00:00", "2025-10-01T09:00:00"),
            flight("F2", "A1", "A0", "2025-10-01T08:00:00", "2025-10-01T10:00:00"),
        ];
        let network = FlightNetwork::build(&flights);
        let ids: Vec<&str> = network.flights().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["F1", "F2", "F3"]);
    }

    #[test]
    fn follow_requires_turn_time_and_matching_station() {
        let a = flight("A", "A0", "A1", "2025-10-01T08:00:00", "2025-10-01T09:00:00");
        let on_time = flight("B", "A1", "A2", "2025-10-01T09:45:00", "2025-10-01T11:00:00");
        let too_soon = flight("C", "A1", "A2", "2025-10-01T09:44:00", "2025-10-01T11:00:00");
        let elsewhere = flight("D", "A2", "A0", "2025-10-01T12:00:00", "2025-10-01T13:00:00");
        let turn = TimeDelta::minutes(45);

        assert!(feasible_follow(&a, &on_time, turn));
        assert!(!feasible_follow(&a, &too_soon, turn));
        assert!(!feasible_follow(&a, &elsewhere, turn));
        assert!(feasible_follow(&a, &too_soon, TimeDelta::zero()));
    }

    #[test]
    fn turn_past_the_calendar_range_never_follows() {
        let a = flight("A", "A0", "A1", "2025-10-01T08:00:00", "2025-10-01T09:00:00");
        let b = flight("B", "A1", "A2", "2025-10-01T09:45:00", "2025-10-01T11:00:00");
        assert!(!feasible_follow(&a, &b, TimeDelta::days(365 * 300_000)));
    }

    #[test]
    fn departure_lookup_skips_ties() {
        let flights = vec![
            flight("F1", "A0", "A1", "2025-10-01T08:00:00", "2025-10-01T09:00:00"),
            flight("F2", "A1", "A0", "2025-10-01T08:00:00", "2025-10-01T10:00:00"),
            flight("F3", "A0", "A1", "2025-10-01T12:00:00", "2025-10-01T13:00:00"),
        ];
        let network = FlightNetwork::build(&flights);
        assert_eq!(network.first_departing_after(network.get(0).depart_time), 2);
        assert_eq!(network.first_departing_after(network.get(2).depart_time), 3);
    }
}
