//! Interface between the flux balance engine and the linear programming solvers
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use cfg_if::cfg_if;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::optimize::problem::LinearProgram;

pub mod clarabel;
#[cfg(feature = "microlp")]
pub mod microlp;

/// A solver able to solve linear programs
///
/// Implementations report an infeasible or unbounded program, and numerical trouble during
/// solving, through [`LpOutcome`]. An `Err` is reserved for programs the solver can't be
/// handed at all.
pub trait LpSolver: Debug + Send + Sync {
    /// Name of the solver, recorded in solutions
    fn name(&self) -> &'static str;

    /// Solve a linear program
    fn solve_lp(&self, program: &LinearProgram) -> Result<LpOutcome, SolverError>;
}

/// Result of solving a linear program
#[derive(Clone, Debug, PartialEq)]
pub enum LpOutcome {
    /// An optimum was found
    Optimal {
        /// Objective value at the optimum, in the direction of the program's sense
        objective_value: f64,
        /// Variable values, in column order
        values: Vec<f64>,
    },
    /// No point satisfies the constraints
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
    /// The solver stopped without a conclusion
    Failed(String),
}

/// Available solver backends
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverBackend {
    /// Interior point solver from the clarabel crate, always available
    Clarabel,
    /// Simplex solver from the microlp crate, requires the `microlp` feature
    Microlp,
}

impl SolverBackend {
    /// Create a solver for this backend, using the solver settings in `configuration`
    ///
    /// # Examples
    /// ```rust
    /// use fbars_core::configuration::Configuration;
    /// use fbars_core::optimize::solvers::SolverBackend;
    /// let solver = SolverBackend::Clarabel
    ///     .instantiate(&Configuration::default())
    ///     .unwrap();
    /// assert_eq!(solver.name(), "clarabel");
    /// ```
    pub fn instantiate(
        self,
        configuration: &Configuration,
    ) -> Result<Box<dyn LpSolver>, SolverError> {
        match self {
            SolverBackend::Clarabel => Ok(Box::new(clarabel::ClarabelSolver::new(
                configuration.tolerance,
                configuration.max_iterations,
            ))),
            SolverBackend::Microlp => microlp_solver(),
        }
    }

    /// Whether the backend was compiled into this build
    pub fn is_available(self) -> bool {
        match self {
            SolverBackend::Clarabel => true,
            SolverBackend::Microlp => cfg!(feature = "microlp"),
        }
    }
}

cfg_if! {
    if #[cfg(feature = "microlp")] {
        fn microlp_solver() -> Result<Box<dyn LpSolver>, SolverError> {
            Ok(Box::new(microlp::MicrolpSolver::new()))
        }
    } else {
        fn microlp_solver() -> Result<Box<dyn LpSolver>, SolverError> {
            Err(SolverError::Unavailable(SolverBackend::Microlp.to_string()))
        }
    }
}

impl Display for SolverBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverBackend::Clarabel => write!(f, "clarabel"),
            SolverBackend::Microlp => write!(f, "microlp"),
        }
    }
}

impl FromStr for SolverBackend {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clarabel" => Ok(SolverBackend::Clarabel),
            "microlp" => Ok(SolverBackend::Microlp),
            _ => Err(SolverError::UnknownBackend(s.to_string())),
        }
    }
}

/// Errors from setting up a solver
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SolverError {
    #[error("Solver backend {0} was not compiled into this build")]
    Unavailable(String),
    #[error("Unknown solver backend {0}")]
    UnknownBackend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names() {
        assert_eq!("Clarabel".parse::<SolverBackend>().unwrap(), SolverBackend::Clarabel);
        assert_eq!("microlp".parse::<SolverBackend>().unwrap(), SolverBackend::Microlp);
        assert_eq!(
            "glpk".parse::<SolverBackend>().unwrap_err(),
            SolverError::UnknownBackend("glpk".to_string())
        );
        assert_eq!(SolverBackend::Microlp.to_string(), "microlp");
    }

    #[test]
    fn microlp_availability() {
        let result = SolverBackend::Microlp.instantiate(&Configuration::default());
        if cfg!(feature = "microlp") {
            assert_eq!(result.unwrap().name(), "microlp");
        } else {
            assert_eq!(
                result.unwrap_err(),
                SolverError::Unavailable("microlp".to_string())
            );
            assert!(!SolverBackend::Microlp.is_available());
        }
    }
}
