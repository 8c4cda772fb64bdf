//! Implements a solver interface for microlp, a pure rust simplex solver
use ::microlp::{ComparisonOp, Error, LinearExpr, OptimizationDirection, Problem, Variable};
use log::debug;

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::LinearProgram;
use crate::optimize::solvers::{LpOutcome, LpSolver, SolverError};

/// Simplex solver backed by the microlp crate
#[derive(Clone, Debug, Default)]
pub struct MicrolpSolver {}

impl MicrolpSolver {
    pub fn new() -> Self {
        Self {}
    }
}

impl LpSolver for MicrolpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve_lp(&self, program: &LinearProgram) -> Result<LpOutcome, SolverError> {
        let direction = match program.sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut problem = Problem::new(direction);
        let lb = program.lower_bounds();
        let ub = program.upper_bounds();
        let variables: Vec<Variable> = program
            .objective()
            .iter()
            .enumerate()
            .map(|(j, c)| problem.add_var(*c, (lb[j], ub[j])))
            .collect();

        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); program.num_equalities()];
        for (r, c, v) in program.equalities().triplet_iter() {
            rows[r].push((c, *v));
        }
        for row in rows.into_iter().filter(|row| !row.is_empty()) {
            let mut expr = LinearExpr::empty();
            row.into_iter()
                .for_each(|(c, v)| expr.add(variables[c], v));
            problem.add_constraint(expr, ComparisonOp::Eq, 0.);
        }
        debug!(
            "Solving LP with microlp: {} variables, {} equality rows",
            variables.len(),
            program.num_equalities()
        );

        let outcome = match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = variables.iter().map(|v| solution[*v]).collect();
                LpOutcome::Optimal {
                    objective_value: program.objective_value(&values),
                    values,
                }
            }
            Err(Error::Infeasible) => LpOutcome::Infeasible,
            Err(Error::Unbounded) => LpOutcome::Unbounded,
            #[allow(unreachable_patterns)]
            Err(other) => LpOutcome::Failed(format!("microlp failed: {}", other)),
        };
        Ok(outcome)
    }
}
