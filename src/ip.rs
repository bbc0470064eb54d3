//! Binary integer-program modeling layer.
//!
//! Describes a minimization over named 0/1 variables with linear
//! equality constraints, and the [`IpSolver`] contract any backend must
//! honour. The Master Selector builds an [`IpModel`] and only ever reads
//! the normalised [`SolverStatus`] back, never a backend's own codes.

use std::collections::{HashMap, HashSet};

/// A linear constraint over binary variables.
#[derive(Debug, Clone, PartialEq)]
pub enum LinearConstraint {
    /// `sum(coefficient * variable) == rhs`.
    ///
    /// An empty `terms` list with a non-zero `rhs` is unsatisfiable and is
    /// how a row with no candidate columns is expressed.
    Equal {
        name: String,
        terms: Vec<(String, f64)>,
        rhs: f64,
    },
}

impl LinearConstraint {
    pub fn name(&self) -> &str {
        match self {
            Self::Equal { name, .. } => name,
        }
    }
}

/// A minimization model over binary variables.
///
/// # Examples
///
/// ```
/// use crew_pairing::ip::{IpModel, LinearConstraint};
///
/// let mut model = IpModel::new("cover");
/// model.add_binary("x1", 3.0);
/// model.add_binary("x2", 5.0);
/// model.add_equal("row", vec![("x1".into(), 1.0), ("x2".into(), 1.0)], 1.0);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IpModel {
    pub name: String,
    /// Variable names in insertion order.
    pub variables: Vec<String>,
    /// Objective coefficient per variable name.
    pub objective: HashMap<String, f64>,
    pub constraints: Vec<LinearConstraint>,
}

impl IpModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a binary variable with its objective coefficient.
    pub fn add_binary(&mut self, name: impl Into<String>, cost: f64) {
        let name = name.into();
        if self.objective.insert(name.clone(), cost).is_none() {
            self.variables.push(name);
        }
    }

    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add an equality constraint.
    pub fn add_equal(&mut self, name: impl Into<String>, terms: Vec<(String, f64)>, rhs: f64) {
        self.constraints.push(LinearConstraint::Equal {
            name: name.into(),
            terms,
            rhs,
        });
    }

    /// Checks that every constraint term refers to a declared variable.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for constraint in &self.constraints {
            let LinearConstraint::Equal { name, terms, rhs } = constraint;
            if !seen.insert(name.as_str()) {
                return Err(format!("duplicate constraint: {name}"));
            }
            if !rhs.is_finite() {
                return Err(format!("constraint {name}: non-finite rhs"));
            }
            for (var, coefficient) in terms {
                if !self.objective.contains_key(var) {
                    return Err(format!("constraint {name}: undefined variable {var}"));
                }
                if !coefficient.is_finite() {
                    return Err(format!("constraint {name}: non-finite coefficient"));
                }
            }
        }
        if let Some((var, _)) = self.objective.iter().find(|(_, c)| !c.is_finite()) {
            return Err(format!("non-finite objective coefficient for {var}"));
        }
        Ok(())
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

/// Outcome of a solve, normalised across backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal assignment.
    Optimal,
    /// A budget ran out; the assignment is the best found so far.
    TimeLimited,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// Invalid model, unsupported constraint shape, or no assignment
    /// found before a budget ran out.
    Error,
}

#[derive(Debug, Clone)]
pub struct IpSolution {
    pub status: SolverStatus,
    pub objective_value: Option<f64>,
    /// Value per variable name (0.0 or 1.0 for the bundled solver).
    pub values: HashMap<String, f64>,
    pub solve_time_ms: i64,
    /// Search nodes explored.
    pub nodes: u64,
}

impl IpSolution {
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: HashMap::new(),
            solve_time_ms: 0,
            nodes: 0,
        }
    }

    /// Whether the solution carries a usable assignment.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::TimeLimited)
            && self.objective_value.is_some()
    }

    pub fn value(&self, var: &str) -> f64 {
        self.values.get(var).copied().unwrap_or(0.0)
    }
}

/// Solve budget, passed to the backend unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Wall-clock limit in milliseconds. `None` means no limit.
    pub time_limit_ms: Option<u64>,
    /// Maximum number of search nodes. `None` means no limit.
    pub node_limit: Option<u64>,
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }
}

/// Anything that can solve an [`IpModel`].
pub trait IpSolver {
    fn solve(&self, model: &IpModel, config: &SolverConfig) -> IpSolution;
}
