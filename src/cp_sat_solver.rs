//! [`IpSolver`] backend on Google OR-Tools CP-SAT (feature `cp-sat`).

use std::collections::HashMap;
use std::time::Instant;

use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};
use cp_sat::proto::{CpSolverStatus, SatParameters};

use crate::ip::{IpModel, IpSolution, IpSolver, LinearConstraint, SolverConfig, SolverStatus};

/// Objective coefficients are scaled to integers at this many units per
/// cost unit.
const COST_SCALE: f64 = 100.0;

/// Hands the model to CP-SAT. Coefficients and right-hand sides must be
/// integral; costs are rounded to cents for the search, while the
/// reported objective sums the exact costs of the chosen variables.
///
/// `SolverConfig::node_limit` has no CP-SAT counterpart and is ignored.
pub struct CpSatSolver {
    workers: i32,
    seed: i32,
}

impl CpSatSolver {
    pub fn new() -> Self {
        Self { workers: 8, seed: 42 }
    }

    pub fn with_workers(mut self, workers: i32) -> Self {
        self.workers = workers.max(1);
        self
    }
}

impl Default for CpSatSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn integral(value: f64) -> Option<i64> {
    let rounded = value.round();
    ((value - rounded).abs() <= 1e-9 && rounded.abs() < i64::MAX as f64).then_some(rounded as i64)
}

impl IpSolver for CpSatSolver {
    fn solve(&self, model: &IpModel, config: &SolverConfig) -> IpSolution {
        let started = Instant::now();
        if model.validate().is_err() {
            return IpSolution::empty(SolverStatus::Error);
        }

        let mut builder = CpModelBuilder::default();
        let vars: HashMap<&str, BoolVar> = model
            .variables
            .iter()
            .map(|name| (name.as_str(), builder.new_bool_var()))
            .collect();

        for constraint in &model.constraints {
            let LinearConstraint::Equal { terms, rhs, .. } = constraint;
            let Some(rhs) = integral(*rhs) else {
                return IpSolution::empty(SolverStatus::Error);
            };
            let mut weighted: Vec<(i64, BoolVar)> = Vec::with_capacity(terms.len());
            for (var, coefficient) in terms {
                let (Some(coefficient), Some(v)) = (integral(*coefficient), vars.get(var.as_str())) else {
                    return IpSolution::empty(SolverStatus::Error);
                };
                weighted.push((coefficient, v.clone()));
            }
            let expr: LinearExpr = weighted.into_iter().collect();
            builder.add_eq(expr, LinearExpr::from(rhs));
        }

        let objective: LinearExpr = model
            .variables
            .iter()
            .map(|name| {
                let cost = model.objective.get(name).copied().unwrap_or(0.0);
                ((cost * COST_SCALE).round() as i64, vars[name.as_str()].clone())
            })
            .collect();
        builder.minimize(objective);

        let mut params = SatParameters::default();
        params.num_search_workers = Some(self.workers);
        params.random_seed = Some(self.seed);
        params.log_search_progress = Some(false);
        if let Some(ms) = config.time_limit_ms {
            params.max_time_in_seconds = Some(ms as f64 / 1000.0);
        }
        let response = builder.solve_with_parameters(&params);

        let status = match response.status() {
            CpSolverStatus::Optimal => SolverStatus::Optimal,
            CpSolverStatus::Feasible => SolverStatus::TimeLimited,
            CpSolverStatus::Infeasible => SolverStatus::Infeasible,
            _ => SolverStatus::Error,
        };
        let mut solution = IpSolution::empty(status);
        if matches!(status, SolverStatus::Optimal | SolverStatus::TimeLimited) {
            let mut objective_value = 0.0;
            for name in &model.variables {
                let chosen = vars[name.as_str()].solution_value(&response);
                if chosen {
                    objective_value += model.objective.get(name).copied().unwrap_or(0.0);
                }
                solution.values.insert(name.clone(), if chosen { 1.0 } else { 0.0 });
            }
            solution.objective_value = Some(objective_value);
        }
        solution.solve_time_ms = started.elapsed().as_millis() as i64;
        solution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(vars: &[&str]) -> Vec<(String, f64)> {
        vars.iter().map(|v| (v.to_string(), 1.0)).collect()
    }

    #[test]
    fn test_matches_bundled_solver() {
        let mut model = IpModel::new("small");
        for (name, cost) in [("a", 10.0), ("b", 10.0), ("c", 10.0), ("ab", 12.0), ("bc", 11.0)] {
            model.add_binary(name, cost);
        }
        model.add_equal("row_a", row(&["a", "ab"]), 1.0);
        model.add_equal("row_b", row(&["b", "ab", "bc"]), 1.0);
        model.add_equal("row_c", row(&["c", "bc"]), 1.0);

        let solution = CpSatSolver::new().with_workers(1).solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert!((solution.objective_value.unwrap() - 21.0).abs() < 1e-9);
        assert_eq!(solution.value("bc"), 1.0);
    }

    #[test]
    fn test_empty_row_is_infeasible() {
        let mut model = IpModel::new("empty_row");
        model.add_binary("x", 1.0);
        model.add_equal("r", Vec::new(), 1.0);
        let solution = CpSatSolver::new().with_workers(1).solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_fractional_coefficient_is_an_error() {
        let mut model = IpModel::new("fractional");
        model.add_binary("x", 1.0);
        model.add_equal("r", vec![("x".into(), 0.5)], 1.0);
        let solution = CpSatSolver::new().solve(&model, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Error);
    }
}
