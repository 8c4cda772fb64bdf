//! Implements a solver interface for Clarabel
//!
//! Clarabel solves problems of the form
//!
//! ```text
//! minimize   ½xᵀPx + qᵀx
//! subject to Ax + s = b, s ∈ K
//! ```
//!
//! so a linear program maps onto it with P = 0, the balanced rows and fixed variables as a zero
//! cone, and every finite bound as a row of the nonnegative cone.
use ::clarabel::algebra::CscMatrix as ClarabelCsc;
use ::clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use log::{debug, warn};
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::LinearProgram;
use crate::optimize::solvers::{LpOutcome, LpSolver, SolverError};

/// Interior point solver backed by the clarabel crate
#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    /// Feasibility and duality gap tolerance
    tolerance: f64,
    /// Maximum number of interior point iterations
    max_iterations: u32,
}

impl ClarabelSolver {
    pub fn new(tolerance: f64, max_iterations: u32) -> Self {
        Self {
            tolerance,
            max_iterations,
        }
    }

    fn settings(&self) -> DefaultSettings<f64> {
        DefaultSettings {
            verbose: false,
            max_iter: self.max_iterations,
            tol_feas: self.tolerance.min(1e-8),
            tol_gap_abs: self.tolerance.min(1e-8),
            tol_gap_rel: self.tolerance.min(1e-8),
            ..DefaultSettings::default()
        }
    }
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        ClarabelSolver::new(1e-8, 200)
    }
}

/// Constraint rows in clarabel's form, split by cone
struct ConicRows {
    a: CscMatrix<f64>,
    b: Vec<f64>,
    n_zero: usize,
    n_nonneg: usize,
}

/// Stack the equality rows, fixed variables and finite bounds into a single constraint matrix
fn conic_rows(program: &LinearProgram) -> ConicRows {
    let n = program.num_variables();
    let lb = program.lower_bounds();
    let ub = program.upper_bounds();
    let equalities = program.equalities();

    let mut triplets: Vec<(usize, usize, f64)> = equalities
        .triplet_iter()
        .map(|(r, c, v)| (r, c, *v))
        .collect();
    let mut b = vec![0.; equalities.nrows()];

    // Zero cone: x_j = lb_j for fixed variables
    for j in (0..n).filter(|&j| lb[j] == ub[j]) {
        triplets.push((b.len(), j, 1.));
        b.push(lb[j]);
    }
    let n_zero = b.len();

    // Nonnegative cone: ub_j - x_j >= 0 and x_j - lb_j >= 0
    for j in (0..n).filter(|&j| lb[j] != ub[j]) {
        if ub[j].is_finite() {
            triplets.push((b.len(), j, 1.));
            b.push(ub[j]);
        }
        if lb[j].is_finite() {
            triplets.push((b.len(), j, -1.));
            b.push(-lb[j]);
        }
    }
    let n_nonneg = b.len() - n_zero;

    let mut coo = CooMatrix::new(b.len(), n);
    triplets
        .into_iter()
        .for_each(|(r, c, v)| coo.push(r, c, v));
    ConicRows {
        a: CscMatrix::from(&coo),
        b,
        n_zero,
        n_nonneg,
    }
}

fn to_clarabel(matrix: CscMatrix<f64>) -> ClarabelCsc<f64> {
    let (m, n) = (matrix.nrows(), matrix.ncols());
    let (col_offsets, row_indices, values) = matrix.disassemble();
    ClarabelCsc::new(m, n, col_offsets, row_indices, values)
}

impl LpSolver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve_lp(&self, program: &LinearProgram) -> Result<LpOutcome, SolverError> {
        let n = program.num_variables();
        let rows = conic_rows(program);

        // Clarabel minimizes, so a maximization negates the linear cost
        let q: Vec<f64> = match program.sense() {
            ObjectiveSense::Maximize => program.objective().iter().map(|c| -c).collect(),
            ObjectiveSense::Minimize => program.objective().iter().copied().collect(),
        };

        if rows.b.is_empty() {
            // Every variable is free
            return Ok(if q.iter().any(|c| *c != 0.) {
                LpOutcome::Unbounded
            } else {
                LpOutcome::Optimal {
                    objective_value: 0.,
                    values: vec![0.; n],
                }
            });
        }

        let mut cones: Vec<SupportedConeT<f64>> = Vec::with_capacity(2);
        if rows.n_zero > 0 {
            cones.push(SupportedConeT::ZeroConeT(rows.n_zero));
        }
        if rows.n_nonneg > 0 {
            cones.push(SupportedConeT::NonnegativeConeT(rows.n_nonneg));
        }
        debug!(
            "Solving LP with clarabel: {} variables, {} equality rows, {} inequality rows",
            n, rows.n_zero, rows.n_nonneg
        );

        let p = ClarabelCsc::new(n, n, vec![0; n + 1], Vec::new(), Vec::new());
        let a = to_clarabel(rows.a);
        let mut solver = DefaultSolver::new(&p, &q, &a, &rows.b, &cones, self.settings());
        solver.solve();

        let status = &solver.solution.status;
        debug!(
            "clarabel finished with status {:?} after {} iterations",
            status, solver.solution.iterations
        );
        let optimum = || {
            let values = solver.solution.x.clone();
            LpOutcome::Optimal {
                objective_value: program.objective_value(&values),
                values,
            }
        };
        let outcome = match status {
            SolverStatus::Solved => optimum(),
            SolverStatus::AlmostSolved => {
                warn!("clarabel reached reduced accuracy only");
                optimum()
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                LpOutcome::Infeasible
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                LpOutcome::Unbounded
            }
            other => LpOutcome::Failed(format!("clarabel stopped with status {:?}", other)),
        };
        Ok(outcome)
    }
}
