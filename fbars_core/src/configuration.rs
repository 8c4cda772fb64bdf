//! Process-wide defaults used when building reactions and engines
use std::sync::{LazyLock, RwLock};

use crate::optimize::solvers::SolverBackend;

/// Default configuration, read by [`ReactionBuilder`](crate::metabolic_model::reaction::ReactionBuilder)
/// for default bounds and by [`FbaEngine::from_configuration`](crate::optimize::fba::FbaEngine::from_configuration)
pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Settings shared by model construction and solving
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Lower bound given to reactions created without one
    pub lower_bound: f64,
    /// Upper bound given to reactions created without one
    pub upper_bound: f64,
    /// Numerical tolerance, fluxes smaller than this are reported as zero
    pub tolerance: f64,
    /// Which LP backend an engine built from this configuration uses
    pub solver: SolverBackend,
    /// Iteration limit handed through to the solver backend
    pub max_iterations: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            solver: SolverBackend::Clarabel,
            max_iterations: 200,
        }
    }
}

impl Configuration {
    /// Snapshot of the current process-wide configuration
    pub fn current() -> Configuration {
        match CONFIGURATION.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}
