//! Provides struct representing a linear program handed to a solver
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use thiserror::Error;

use crate::optimize::matrix::StoichiometricMatrix;
use crate::optimize::objective::ObjectiveSense;

/// A linear program in the form
///
/// ```text
/// optimize   c·x
/// subject to A·x = 0
///            lb <= x <= ub
/// ```
///
/// Bounds may be infinite. The equality matrix only holds the rows that have to be balanced.
#[derive(Clone, Debug)]
pub struct LinearProgram {
    /// Equality constraint matrix
    equalities: CscMatrix<f64>,
    /// Lower bounds of the variables
    lower_bounds: DVector<f64>,
    /// Upper bounds of the variables
    upper_bounds: DVector<f64>,
    /// Objective coefficients of the variables
    objective: DVector<f64>,
    /// Whether the objective is maximized or minimized
    sense: ObjectiveSense,
}

impl LinearProgram {
    /// Create a new linear program, checking that the dimensions agree and the bounds are
    /// consistent
    pub fn new(
        equalities: CscMatrix<f64>,
        lower_bounds: DVector<f64>,
        upper_bounds: DVector<f64>,
        objective: DVector<f64>,
        sense: ObjectiveSense,
    ) -> Result<LinearProgram, ProblemError> {
        let n = equalities.ncols();
        for (name, len) in [
            ("lower bounds", lower_bounds.len()),
            ("upper bounds", upper_bounds.len()),
            ("objective", objective.len()),
        ] {
            if len != n {
                return Err(ProblemError::DimensionMismatch {
                    name,
                    expected: n,
                    found: len,
                });
            }
        }
        if let Some(idx) = (0..n).find(|&i| {
            lower_bounds[i].is_nan() || upper_bounds[i].is_nan() || lower_bounds[i] > upper_bounds[i]
        }) {
            return Err(ProblemError::InvalidVariableBounds(idx));
        }
        Ok(LinearProgram {
            equalities,
            lower_bounds,
            upper_bounds,
            objective,
            sense,
        })
    }

    /// Build the flux balance program of a stoichiometric matrix, keeping only its balanced rows
    pub fn from_stoichiometry(
        stoichiometry: &StoichiometricMatrix,
        objective: DVector<f64>,
        sense: ObjectiveSense,
    ) -> Result<LinearProgram, ProblemError> {
        let balanced = stoichiometry.balanced_rows();
        // Map each balanced row to its position among the balanced rows
        let mut row_map = vec![None; balanced.len()];
        let mut n_rows = 0;
        for (row, keep) in balanced.iter().enumerate() {
            if *keep {
                row_map[row] = Some(n_rows);
                n_rows += 1;
            }
        }
        let s = stoichiometry.matrix();
        let mut coo = CooMatrix::new(n_rows, s.ncols());
        for (row, col, value) in s.triplet_iter() {
            if let Some(new_row) = row_map[row] {
                coo.push(new_row, col, *value);
            }
        }
        LinearProgram::new(
            CscMatrix::from(&coo),
            stoichiometry.lower_bounds().clone(),
            stoichiometry.upper_bounds().clone(),
            objective,
            sense,
        )
    }

    pub fn equalities(&self) -> &CscMatrix<f64> {
        &self.equalities
    }

    pub fn lower_bounds(&self) -> &DVector<f64> {
        &self.lower_bounds
    }

    pub fn upper_bounds(&self) -> &DVector<f64> {
        &self.upper_bounds
    }

    pub fn objective(&self) -> &DVector<f64> {
        &self.objective
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn num_variables(&self) -> usize {
        self.equalities.ncols()
    }

    pub fn num_equalities(&self) -> usize {
        self.equalities.nrows()
    }

    /// Value of the objective at a point
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }
}

/// Errors associated with building a linear program
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProblemError {
    #[error("Length of {name} is {found}, expected {expected}")]
    DimensionMismatch {
        name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Variable {0} has a lower bound greater than its upper bound")]
    InvalidVariableBounds(usize),
}
