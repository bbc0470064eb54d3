//! Bundled set-partitioning solver.

use std::collections::HashMap;
use std::time::Instant;

use crate::ip::{IpModel, IpSolution, IpSolver, LinearConstraint, SolverConfig, SolverStatus};

const EPS: f64 = 1e-9;

/// Exact depth-first branch-and-bound for set-partitioning models.
///
/// Branches on the uncovered row with the fewest compatible columns and
/// prunes with a lower bound that charges every uncovered row the
/// cheapest per-row share (`cost / rows covered`) among its compatible
/// columns.
///
/// # Limitations
///
/// - Every constraint must be an equality with a right-hand side of 0
///   or 1 and coefficients of 1, or above 1 (which fixes that column to
///   zero); anything else returns [`SolverStatus::Error`]
/// - Worst case is exponential in the number of rows
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BranchAndBoundSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &IpModel, config: &SolverConfig) -> IpSolution {
        let started = Instant::now();
        if model.validate().is_err() {
            return IpSolution::empty(SolverStatus::Error);
        }

        let index: HashMap<&str, usize> = model
            .variables
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let costs: Vec<f64> = model
            .variables
            .iter()
            .map(|v| model.objective.get(v).copied().unwrap_or(0.0))
            .collect();

        let mut forced_zero = vec![false; costs.len()];
        let mut rows: Vec<Vec<usize>> = Vec::new();
        for constraint in &model.constraints {
            let LinearConstraint::Equal { terms, rhs, .. } = constraint;
            let zero_rhs = rhs.abs() <= EPS;
            if !zero_rhs && (rhs - 1.0).abs() > EPS {
                return finish(IpSolution::empty(SolverStatus::Error), started, 0);
            }
            let mut columns = Vec::with_capacity(terms.len());
            for (var, coefficient) in terms {
                let Some(&col) = index.get(var.as_str()) else {
                    return finish(IpSolution::empty(SolverStatus::Error), started, 0);
                };
                if columns.contains(&col) {
                    return finish(IpSolution::empty(SolverStatus::Error), started, 0);
                }
                if (coefficient - 1.0).abs() <= EPS {
                    columns.push(col);
                } else if *coefficient > 1.0 {
                    // Setting it to 1 overshoots a 0/1 right-hand side.
                    forced_zero[col] = true;
                } else {
                    return finish(IpSolution::empty(SolverStatus::Error), started, 0);
                }
            }
            if zero_rhs {
                for col in columns {
                    forced_zero[col] = true;
                }
            } else {
                rows.push(columns);
            }
        }

        for row in rows.iter_mut() {
            row.retain(|&col| !forced_zero[col]);
        }
        if rows.iter().any(Vec::is_empty) {
            return finish(IpSolution::empty(SolverStatus::Infeasible), started, 0);
        }

        let mut col_rows: Vec<Vec<usize>> = vec![Vec::new(); costs.len()];
        for (r, row) in rows.iter().enumerate() {
            for &col in row {
                col_rows[col].push(r);
            }
        }
        // Columns outside every row are set independently of the search.
        let free: Vec<usize> = (0..costs.len())
            .filter(|&c| !forced_zero[c] && col_rows[c].is_empty() && costs[c] < 0.0)
            .collect();

        let mut search = Search {
            costs: &costs,
            rows: &rows,
            col_rows: &col_rows,
            covered: vec![false; rows.len()],
            uncovered: rows.len(),
            chosen: Vec::new(),
            cost: 0.0,
            best: None,
            nodes: 0,
            stopped: false,
            started,
            config,
        };
        search.explore();

        let status = match (&search.best, search.stopped) {
            (Some(_), false) => SolverStatus::Optimal,
            (Some(_), true) => SolverStatus::TimeLimited,
            (None, false) => SolverStatus::Infeasible,
            (None, true) => SolverStatus::Error,
        };
        let nodes = search.nodes;
        let mut solution = IpSolution::empty(status);
        if let Some((best_cost, best_columns)) = search.best {
            let mut values: HashMap<String, f64> = model
                .variables
                .iter()
                .map(|name| (name.clone(), 0.0))
                .collect();
            let mut objective = best_cost;
            for &col in best_columns.iter().chain(free.iter()) {
                values.insert(model.variables[col].clone(), 1.0);
            }
            objective += free.iter().map(|&c| costs[c]).sum::<f64>();
            solution.values = values;
            solution.objective_value = Some(objective);
        }
        finish(solution, started, nodes)
    }
}

fn finish(mut solution: IpSolution, started: Instant, nodes: u64) -> IpSolution {
    solution.solve_time_ms = started.elapsed().as_millis() as i64;
    solution.nodes = nodes;
    solution
}

struct Search<'a> {
    costs: &'a [f64],
    rows: &'a [Vec<usize>],
    col_rows: &'a [Vec<usize>],
    covered: Vec<bool>,
    uncovered: usize,
    chosen: Vec<usize>,
    cost: f64,
    best: Option<(f64, Vec<usize>)>,
    nodes: u64,
    stopped: bool,
    started: Instant,
    config: &'a SolverConfig,
}

impl Search<'_> {
    fn out_of_budget(&self) -> bool {
        if let Some(limit) = self.config.node_limit {
            if self.nodes > limit {
                return true;
            }
        }
        if let Some(limit) = self.config.time_limit_ms {
            if self.started.elapsed().as_millis() as u64 >= limit {
                return true;
            }
        }
        false
    }

    fn compatible(&self, col: usize) -> bool {
        self.col_rows[col].iter().all(|&r| !self.covered[r])
    }

    fn share(&self, col: usize) -> f64 {
        self.costs[col] / self.col_rows[col].len() as f64
    }

    fn explore(&mut self) {
        if self.stopped {
            return;
        }
        self.nodes += 1;
        if self.out_of_budget() {
            self.stopped = true;
            return;
        }

        if self.uncovered == 0 {
            let improved = match &self.best {
                Some((best, _)) => self.cost < best - EPS,
                None => true,
            };
            if improved {
                self.best = Some((self.cost, self.chosen.clone()));
            }
            return;
        }

        let mut bound = self.cost;
        let mut branch_row = None;
        let mut branch_size = usize::MAX;
        for (r, row) in self.rows.iter().enumerate() {
            if self.covered[r] {
                continue;
            }
            let mut count = 0;
            let mut cheapest = f64::INFINITY;
            for &col in row {
                if self.compatible(col) {
                    count += 1;
                    cheapest = cheapest.min(self.share(col));
                }
            }
            if count == 0 {
                return;
            }
            bound += cheapest;
            if count < branch_size {
                branch_size = count;
                branch_row = Some(r);
            }
        }
        if let Some((best, _)) = &self.best {
            if bound >= best - EPS {
                return;
            }
        }
        let Some(r) = branch_row else {
            return;
        };

        let mut options: Vec<usize> = self.rows[r]
            .iter()
            .copied()
            .filter(|&col| self.compatible(col))
            .collect();
        options.sort_by(|&a, &b| self.share(a).total_cmp(&self.share(b)));

        for col in options {
            self.select(col);
            self.explore();
            self.deselect(col);
            if self.stopped {
                return;
            }
        }
    }

    fn select(&mut self, col: usize) {
        for &r in &self.col_rows[col] {
            self.covered[r] = true;
        }
        self.uncovered -= self.col_rows[col].len();
        self.chosen.push(col);
        self.cost += self.costs[col];
    }

    fn deselect(&mut self, col: usize) {
        for &r in &self.col_rows[col] {
            self.covered[r] = false;
        }
        self.uncovered += self.col_rows[col].len();
        self.chosen.pop();
        self.cost -= self.costs[col];
    }
}
