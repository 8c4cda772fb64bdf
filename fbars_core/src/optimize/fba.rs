//! Flux balance analysis: finds a steady state flux distribution optimizing an objective
use indexmap::IndexMap;
use log::{debug, info, warn};
use nalgebra::DVector;
use thiserror::Error;

use crate::configuration::Configuration;
use crate::metabolic_model::gene::GeneActivity;
use crate::metabolic_model::model::Model;
use crate::optimize::matrix::{MatrixError, StoichiometricMatrix};
use crate::optimize::objective::Objective;
use crate::optimize::problem::{LinearProgram, ProblemError};
use crate::optimize::solution::{Solution, SolutionStatus};
use crate::optimize::solvers::{LpOutcome, LpSolver, SolverBackend, SolverError};

/// Runs flux balance analysis with a fixed solver
///
/// The solver is chosen when the engine is created and used for every solve. Solving never
/// modifies the model, so one engine can solve many models.
///
/// # Examples
/// ```rust
/// use fbars_core::metabolic_model::metabolite::MetaboliteBuilder;
/// use fbars_core::metabolic_model::model::Model;
/// use fbars_core::metabolic_model::reaction::Reaction;
/// use fbars_core::optimize::fba::FbaEngine;
/// use fbars_core::optimize::solvers::SolverBackend;
///
/// let mut model = Model::new("tutorial_model");
/// for id in ["A", "B"] {
///     model.add_metabolite(MetaboliteBuilder::default().id(id).boundary(true).build().unwrap());
/// }
/// let mut r1 = Reaction::new("R1");
/// r1.metabolites.insert("A".to_string(), -1.);
/// r1.metabolites.insert("B".to_string(), 1.);
/// r1.set_bounds(0., 10.).unwrap();
/// model.add_reaction(r1).unwrap();
/// model.set_objective("R1").unwrap();
///
/// let engine = FbaEngine::new(SolverBackend::Clarabel).unwrap();
/// let solution = engine.optimize(&model).unwrap();
/// assert!(solution.is_optimal());
/// assert!((solution.flux("R1").unwrap() - 10.).abs() < 1e-6);
/// ```
#[derive(Debug)]
pub struct FbaEngine {
    solver: Box<dyn LpSolver>,
}

impl FbaEngine {
    /// Create an engine using a solver backend, with solver settings from the current
    /// configuration
    pub fn new(backend: SolverBackend) -> Result<FbaEngine, FbaError> {
        let configuration = Configuration {
            solver: backend,
            ..Configuration::current()
        };
        FbaEngine::from_configuration(&configuration)
    }

    /// Create an engine using the backend and solver settings of a configuration
    pub fn from_configuration(configuration: &Configuration) -> Result<FbaEngine, FbaError> {
        let solver = configuration
            .solver
            .instantiate(configuration)
            .map_err(|err| match err {
                SolverError::Unavailable(name) => FbaError::SolverUnavailable(name),
                other => FbaError::Configuration(other.to_string()),
            })?;
        Ok(FbaEngine { solver })
    }

    /// Create an engine around any solver implementation
    pub fn with_solver<S: LpSolver + 'static>(solver: S) -> FbaEngine {
        FbaEngine {
            solver: Box::new(solver),
        }
    }

    pub fn solver_name(&self) -> &'static str {
        self.solver.name()
    }

    /// Optimize the model's own objective
    pub fn optimize(&self, model: &Model) -> Result<Solution, FbaError> {
        if model.objective.is_empty() {
            return Err(FbaError::Configuration(
                "model has no objective".to_string(),
            ));
        }
        self.solve(model, &model.objective)
    }

    /// Find the steady state flux distribution which optimizes `objective`
    ///
    /// Reactions whose gene reaction rule evaluates to inactive are held at zero flux. An
    /// infeasible or unbounded problem, or a solver failure, is reported through the status of
    /// the returned [`Solution`].
    pub fn solve(&self, model: &Model, objective: &Objective) -> Result<Solution, FbaError> {
        if let Some((id, _)) = objective.terms().find(|(id, _)| !model.has_reaction(id)) {
            return Err(FbaError::UnknownReaction(id.to_string()));
        }

        let mut stoichiometry = StoichiometricMatrix::build(model)?;
        for reaction in model.reactions() {
            let activity = model
                .reaction_activity(reaction)
                .map_err(|err| FbaError::Configuration(err.to_string()))?;
            if activity == GeneActivity::Inactive {
                debug!("Reaction {} is inactive, fixing its flux at 0", reaction.id);
                stoichiometry.override_bounds(&reaction.id, 0., 0.)?;
            }
        }

        let mut c = DVector::zeros(stoichiometry.reaction_ids().len());
        for (id, coefficient) in objective.terms() {
            c[stoichiometry.column(id)?] += coefficient;
        }
        let program = LinearProgram::from_stoichiometry(&stoichiometry, c, objective.sense())?;
        info!(
            "Running flux balance analysis on {} with {}: {} reactions, {} balanced metabolites",
            model.id.as_deref().unwrap_or("<unnamed>"),
            self.solver.name(),
            program.num_variables(),
            program.num_equalities()
        );

        let outcome = match self.solver.solve_lp(&program) {
            Ok(outcome) => outcome,
            Err(err) => LpOutcome::Failed(err.to_string()),
        };
        let solver = self.solver.name();
        let solution = match outcome {
            LpOutcome::Optimal {
                objective_value,
                values,
            } => {
                let fluxes: IndexMap<String, f64> = stoichiometry
                    .reaction_ids()
                    .iter()
                    .cloned()
                    .zip(values)
                    .collect();
                Solution::optimal(objective_value, fluxes, solver)
            }
            LpOutcome::Infeasible => {
                Solution::without_optimum(SolutionStatus::Infeasible, None, solver)
            }
            LpOutcome::Unbounded => {
                Solution::without_optimum(SolutionStatus::Unbounded, None, solver)
            }
            LpOutcome::Failed(message) => {
                warn!("Solver {} failed: {}", solver, message);
                Solution::without_optimum(SolutionStatus::Error, Some(message), solver)
            }
        };
        info!(
            "Flux balance analysis finished: {}, objective value {:?}",
            solution.status(),
            solution.objective_value()
        );
        Ok(solution)
    }
}

/// Errors which prevent flux balance analysis from running
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FbaError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("Objective references reaction {0} which is not in the model")]
    UnknownReaction(String),
    #[error("Solver backend {0} is not available")]
    SolverUnavailable(String),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gpr_parse::parse_gpr;
    use crate::metabolic_model::metabolite::MetaboliteBuilder;
    use crate::metabolic_model::reaction::Reaction;
    use crate::optimize::objective::ObjectiveSense;
    use approx::assert_abs_diff_eq;

    fn reaction(id: &str, metabolites: &[(&str, f64)], lb: f64, ub: f64) -> Reaction {
        let mut rxn = Reaction::new(id);
        metabolites.iter().for_each(|(m, c)| {
            rxn.metabolites.insert(m.to_string(), *c);
        });
        rxn.set_bounds(lb, ub).unwrap();
        rxn
    }

    fn engine() -> FbaEngine {
        FbaEngine::new(SolverBackend::Clarabel).unwrap()
    }

    /// R1: A -> B with both metabolites on the boundary
    fn single_reaction_model(ub: f64) -> Model {
        let mut model = Model::new("tutorial_model");
        for id in ["A", "B"] {
            model.add_metabolite(
                MetaboliteBuilder::default()
                    .id(id)
                    .boundary(true)
                    .build()
                    .unwrap(),
            );
        }
        model
            .add_reaction(reaction("R1", &[("A", -1.), ("B", 1.)], 0., ub))
            .unwrap();
        model
    }

    #[test]
    fn upper_bound_limits_single_reaction() {
        let model = single_reaction_model(10.);
        let solution = engine()
            .solve(&model, &Objective::maximize_reaction("R1"))
            .unwrap();
        assert_eq!(solution.status(), SolutionStatus::Optimal);
        assert_abs_diff_eq!(solution.flux("R1").unwrap(), 10., epsilon = 1e-6);
        assert_abs_diff_eq!(solution.objective_value().unwrap(), 10., epsilon = 1e-6);
        assert_eq!(solution.solver(), "clarabel");

        // Raising the bound raises the optimum, so the bound was binding
        let relaxed = single_reaction_model(20.);
        let solution = engine()
            .solve(&relaxed, &Objective::maximize_reaction("R1"))
            .unwrap();
        assert_abs_diff_eq!(solution.flux("R1").unwrap(), 20., epsilon = 1e-6);
    }

    #[test]
    fn minimize_single_reaction() {
        let model = single_reaction_model(10.);
        let mut objective = Objective::maximize_reaction("R1");
        objective.set_sense(ObjectiveSense::Minimize);
        let solution = engine().solve(&model, &objective).unwrap();
        assert_abs_diff_eq!(solution.flux("R1").unwrap(), 0., epsilon = 1e-6);
    }

    #[test]
    fn unknown_objective_reaction() {
        let model = single_reaction_model(10.);
        assert_eq!(
            engine()
                .solve(&model, &Objective::maximize_reaction("PYK"))
                .unwrap_err(),
            FbaError::UnknownReaction("PYK".to_string())
        );
    }

    #[test]
    fn empty_objective() {
        let model = single_reaction_model(10.);
        assert!(matches!(
            engine().optimize(&model),
            Err(FbaError::Configuration(_))
        ));
    }

    #[test]
    fn conflicting_bounds_are_infeasible() {
        let mut model = Model::new("test_model");
        model
            .add_reactions(vec![
                reaction("R_in", &[("A", 1.)], 5., 10.),
                reaction("R_out", &[("A", -1.)], 0., 2.),
            ])
            .unwrap();
        model.set_objective("R_out").unwrap();
        let solution = engine().optimize(&model).unwrap();
        assert_eq!(solution.status(), SolutionStatus::Infeasible);
        assert_eq!(solution.objective_value(), None);
        assert!(solution.fluxes().is_none());
    }

    #[test]
    fn unbounded_objective() {
        let mut model = single_reaction_model(10.);
        model
            .reaction_mut("R1")
            .unwrap()
            .set_bounds(0., f64::INFINITY)
            .unwrap();
        model.set_objective("R1").unwrap();
        let solution = engine().optimize(&model).unwrap();
        assert_eq!(solution.status(), SolutionStatus::Unbounded);
        assert_eq!(solution.objective_value(), None);
    }

    #[test]
    fn knocked_out_genes_block_reactions() {
        let mut model = Model::new("test_model");
        let mut genes = IndexMap::new();
        let mut r1 = reaction("R1", &[("A", -1.), ("B", 1.)], 0., 1000.);
        r1.gpr = Some(parse_gpr("g1", &mut genes).unwrap());
        let mut r2 = reaction("R2", &[("A", -1.), ("B", 1.)], 0., 1000.);
        r2.gpr = Some(parse_gpr("g2", &mut genes).unwrap());
        model
            .add_reactions(vec![
                reaction("EX_A", &[("A", -1.)], -10., 0.),
                r1,
                r2,
                reaction("EX_B", &[("B", -1.)], 0., 1000.),
            ])
            .unwrap();
        model.set_objective("EX_B").unwrap();

        model.knock_out_gene("g1").unwrap();
        let solution = engine().optimize(&model).unwrap();
        assert_abs_diff_eq!(solution.objective_value().unwrap(), 10., epsilon = 1e-6);
        assert_abs_diff_eq!(solution.flux("R1").unwrap(), 0., epsilon = 1e-6);
        assert_abs_diff_eq!(solution.flux("R2").unwrap(), 10., epsilon = 1e-6);

        model.knock_out_gene("g2").unwrap();
        let solution = engine().optimize(&model).unwrap();
        assert_eq!(solution.status(), SolutionStatus::Optimal);
        assert_abs_diff_eq!(solution.objective_value().unwrap(), 0., epsilon = 1e-6);
        // The model's own bounds are untouched
        assert_eq!(model.reaction("R2").unwrap().bounds(), (0., 1000.));
    }

    #[derive(Debug)]
    struct FailingSolver;

    impl LpSolver for FailingSolver {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn solve_lp(&self, _program: &LinearProgram) -> Result<LpOutcome, SolverError> {
            Ok(LpOutcome::Failed("numerical trouble".to_string()))
        }
    }

    #[test]
    fn solver_failure_is_a_status() {
        let engine = FbaEngine::with_solver(FailingSolver);
        assert_eq!(engine.solver_name(), "failing");
        let solution = engine
            .solve(&single_reaction_model(10.), &Objective::maximize_reaction("R1"))
            .unwrap();
        assert_eq!(solution.status(), SolutionStatus::Error);
        assert_eq!(solution.message(), Some("numerical trouble"));
    }

    #[test]
    fn unavailable_backend() {
        if !SolverBackend::Microlp.is_available() {
            assert_eq!(
                FbaEngine::new(SolverBackend::Microlp).unwrap_err(),
                FbaError::SolverUnavailable("microlp".to_string())
            );
        }
    }
}
