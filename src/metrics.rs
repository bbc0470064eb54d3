use serde::{Deserialize, Serialize};

use crate::master::Solution;

/// Summary figures for a selected set of pairings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionMetrics {
    pub total_cost: f64,
    pub pairings_selected: usize,
    pub avg_duty_hours: f64,
    /// Legs summed over the selected pairings.
    pub flights_covered: usize,
}

pub fn compute_metrics(solution: &Solution) -> SolutionMetrics {
    let selected = &solution.selected;
    let pairings_selected = selected.len();
    SolutionMetrics {
        total_cost: selected.iter().map(|p| p.cost).sum(),
        pairings_selected,
        avg_duty_hours: selected.iter().map(|p| p.duty_hours).sum::<f64>()
            / pairings_selected.max(1) as f64,
        flights_covered: selected.iter().map(|p| p.flights.len()).sum(),
    }
}
