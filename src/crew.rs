use crate::flight::AirportCode;
use crate::flight::Timestamp;
use serde::{Deserialize, Serialize};

pub type CrewId = String;

/// Hourly rate used when the crew pool is empty.
pub const DEFAULT_HOURLY_COST: f64 = 80.0;
/// Flat hotel charge for a pairing that ends on a later calendar date.
pub const HOTEL_COST: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crew {
    pub crew_id: CrewId,
    pub base: AirportCode,
    pub max_duty_hours: f64,
    pub hourly_cost: f64,
}

impl Crew {
    pub fn new(crew_id: impl Into<CrewId>, base: &str, hourly_cost: f64) -> Self {
        Self {
            crew_id: crew_id.into(),
            base: AirportCode::from(base),
            max_duty_hours: 10.0,
            hourly_cost,
        }
    }
}

/// Representative hourly cost of the crew pool: the median of
/// `hourly_cost`, averaging the two middle values for an even count.
pub fn crew_cost_rate(crews: &[Crew]) -> f64 {
    let mut costs: Vec<f64> = crews
        .iter()
        .map(|c| c.hourly_cost)
        .filter(|c| c.is_finite())
        .collect();
    if costs.is_empty() {
        return DEFAULT_HOURLY_COST;
    }
    costs.sort_by(f64::total_cmp);
    let mid = costs.len() / 2;
    if costs.len() % 2 == 0 {
        (costs[mid - 1] + costs[mid]) / 2.0
    } else {
        costs[mid]
    }
}

/// Prices one duty period. The enumerator only sees this trait, so a
/// per-crew or base-aware model can replace the flat rate.
pub trait CostModel {
    fn pairing_cost(&self, start: Timestamp, end: Timestamp) -> f64;
}

/// Duty hours times a single hourly rate, plus a hotel charge whenever
/// the duty ends on a different calendar date than it started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatRateCost {
    pub hourly_rate: f64,
    pub hotel_cost: f64,
}

impl FlatRateCost {
    pub fn new(hourly_rate: f64) -> Self {
        Self {
            hourly_rate,
            hotel_cost: HOTEL_COST,
        }
    }

    pub fn from_crews(crews: &[Crew]) -> Self {
        Self::new(crew_cost_rate(crews))
    }

    pub fn with_hotel_cost(mut self, hotel_cost: f64) -> Self {
        self.hotel_cost = hotel_cost;
        self
    }
}

impl CostModel for FlatRateCost {
    fn pairing_cost(&self, start: Timestamp, end: Timestamp) -> f64 {
        let mut cost = duty_hours(start, end) * self.hourly_rate;
        if start.date_naive() != end.date_naive() {
            cost += self.hotel_cost;
        }
        cost
    }
}

#[inline]
pub fn duty_hours(start: Timestamp, end: Timestamp) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::parse_time;

    #[test]
    fn median_of_odd_and_even_pools() {
        let odd = vec![
            Crew::new("C000", "A0", 90.0),
            Crew::new("C001", "A0", 70.0),
            Crew::new("C002", "A1", 80.0),
        ];
        assert_eq!(crew_cost_rate(&odd), 80.0);

        let even = vec![
            Crew::new("C000", "A0", 60.0),
            Crew::new("C001", "A0", 100.0),
            Crew::new("C002", "A1", 70.0),
            Crew::new("C003", "A1", 90.0),
        ];
        assert_eq!(crew_cost_rate(&even), 80.0);
    }

    #[test]
    fn empty_pool_falls_back() {
        assert_eq!(crew_cost_rate(&[]), DEFAULT_HOURLY_COST);
    }

    #[test]
    fn flat_rate_prices_duty_and_hotel() {
        let cost = FlatRateCost::new(100.0);
        let same_day = cost.pairing_cost(
            parse_time("2025-10-01T08:00:00").unwrap(),
            parse_time("2025-10-01T11:30:00").unwrap(),
        );
        assert!((same_day - 350.0).abs() < 1e-9);

        let overnight = cost.pairing_cost(
            parse_time("2025-10-01T22:00:00").unwrap(),
            parse_time("2025-10-02T01:00:00").unwrap(),
        );
        assert!((overnight - (300.0 + HOTEL_COST)).abs() < 1e-9);
    }

    #[test]
    fn overnight_uses_local_dates() {
        let cost = FlatRateCost::new(100.0);
        // 22:30 to 01:00 UTC, but the same local day at +02:00.
        let local_same_day = cost.pairing_cost(
            parse_time("2025-10-02T00:30:00+02:00").unwrap(),
            parse_time("2025-10-02T03:00:00+02:00").unwrap(),
        );
        assert!((local_same_day - 250.0).abs() < 1e-9);

        let local_overnight = cost.pairing_cost(
            parse_time("2025-10-01T23:00:00+02:00").unwrap(),
            parse_time("2025-10-02T01:00:00+02:00").unwrap(),
        );
        assert!((local_overnight - (200.0 + HOTEL_COST)).abs() < 1e-9);
    }

    #[test]
    fn duty_hours_keep_fractional_seconds() {
        let hours = duty_hours(
            parse_time("2025-10-01T08:00:00").unwrap(),
            parse_time("2025-10-01T08:00:01.800").unwrap(),
        );
        assert!((hours - 1.8 / 3600.0).abs() < 1e-12);
    }
}
