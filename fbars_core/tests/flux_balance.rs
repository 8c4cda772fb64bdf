use std::path::PathBuf;

use approx::assert_abs_diff_eq;
use fbars_core::io;
use fbars_core::metabolic_model::model::Model;
use fbars_core::optimize::fba::FbaEngine;
use fbars_core::optimize::solution::{Solution, SolutionStatus};
use fbars_core::optimize::solvers::SolverBackend;

fn mini_core() -> Model {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join("test_models")
        .join("mini_core.json");
    io::load(path).unwrap()
}

fn assert_steady_state(model: &Model, solution: &Solution) {
    for met in model.metabolites().filter(|m| !m.boundary) {
        let net: f64 = model
            .reactions_of_metabolite(&met.id)
            .unwrap()
            .iter()
            .map(|r| solution.flux(&r.id).unwrap() * r.coefficient(&met.id).unwrap())
            .sum();
        assert_abs_diff_eq!(net, 0., epsilon = 1e-5);
    }
}

fn assert_within_bounds(model: &Model, solution: &Solution) {
    for reaction in model.reactions() {
        let flux = solution.flux(&reaction.id).unwrap();
        assert!(
            flux >= reaction.lower_bound - 1e-5 && flux <= reaction.upper_bound + 1e-5,
            "flux {} of {} outside of {:?}",
            flux,
            reaction.id,
            reaction.bounds()
        );
    }
}

#[test]
fn mini_core_maintenance_optimum() {
    let model = mini_core();
    let engine = FbaEngine::new(SolverBackend::Clarabel).unwrap();
    let solution = engine.optimize(&model).unwrap();
    assert_eq!(solution.status(), SolutionStatus::Optimal);
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 97.5, epsilon = 1e-4);
    // Oxygen uptake is the limiting exchange
    assert_abs_diff_eq!(solution.flux("EX_o2_e").unwrap(), -15., epsilon = 1e-4);
    assert_abs_diff_eq!(solution.flux("EX_glc__D_e").unwrap(), -7.5, epsilon = 1e-4);
    assert_abs_diff_eq!(solution.flux("EX_ac_e").unwrap(), 15., epsilon = 1e-4);
    assert_steady_state(&model, &solution);
    assert_within_bounds(&model, &solution);

    let nadh = solution.metabolite_summary(&model, "nadh_c").unwrap();
    assert_abs_diff_eq!(nadh.net_rate, 0., epsilon = 1e-5);
    let producers: Vec<&str> = nadh
        .producing
        .iter()
        .map(|c| c.reaction_id.as_str())
        .collect();
    assert_eq!(producers, vec!["GLYC", "PDH"]);
    assert_eq!(nadh.consuming.len(), 1);
    assert_eq!(nadh.consuming[0].reaction_id, "NADHOX");

    let summary = solution.model_summary(&model).unwrap();
    let uptake: Vec<&str> = summary
        .uptake
        .iter()
        .map(|e| e.metabolite_id.as_str())
        .collect();
    assert_eq!(uptake, vec!["glc__D_e", "o2_c"]);
    let secretion: Vec<&str> = summary
        .secretion
        .iter()
        .map(|e| e.metabolite_id.as_str())
        .collect();
    assert_eq!(secretion, vec!["ac_c", "co2_c"]);
}

#[test]
fn reversible_pyruvate_kinase() {
    let mut model = mini_core();
    let pyk = model.reaction_mut("PYK").unwrap();
    assert!(!pyk.reversibility());
    pyk.set_bounds(-500., 500.).unwrap();
    assert!(model.reaction("PYK").unwrap().reversibility());

    let solution = FbaEngine::new(SolverBackend::Clarabel)
        .unwrap()
        .optimize(&model)
        .unwrap();
    assert_eq!(solution.status(), SolutionStatus::Optimal);
    assert_steady_state(&model, &solution);
    assert_within_bounds(&model, &solution);
}

#[test]
fn gene_knockouts() {
    let engine = FbaEngine::new(SolverBackend::Clarabel).unwrap();

    // An isozyme remains for the glycolysis reaction
    let mut model = mini_core();
    model.knock_out_gene("b1723").unwrap();
    let solution = engine.optimize(&model).unwrap();
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 97.5, epsilon = 1e-4);

    // Without glucose transport the maintenance demand can't be met
    let mut model = mini_core();
    model.knock_out_gene("b1101").unwrap();
    assert_eq!(model.inactive_reactions().unwrap(), vec!["GLCt"]);
    let solution = engine.optimize(&model).unwrap();
    assert_eq!(solution.status(), SolutionStatus::Infeasible);
    assert!(solution.objective_value().is_none());
}

#[test]
fn save_and_load_round_trip() {
    let mut model = mini_core();
    // Acetate secretion left unbounded
    model
        .reaction_mut("EX_ac_e")
        .unwrap()
        .set_bounds(0., f64::INFINITY)
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mini_core_copy.json");
    io::save(&model, &path).unwrap();
    let reloaded = io::load(&path).unwrap();

    let ids = |m: &Model| m.reactions().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&reloaded), ids(&model));
    let met_ids = |m: &Model| m.metabolites().map(|r| r.id.clone()).collect::<Vec<_>>();
    assert_eq!(met_ids(&reloaded), met_ids(&model));
    for reaction in model.reactions() {
        assert_eq!(
            reloaded.reaction(&reaction.id).unwrap().metabolites,
            reaction.metabolites
        );
        assert_eq!(reloaded.reaction(&reaction.id).unwrap().bounds(), reaction.bounds());
    }
    assert_eq!(
        reloaded.reaction("EX_ac_e").unwrap().bounds(),
        (0., f64::INFINITY)
    );

    let solution = FbaEngine::new(SolverBackend::Clarabel)
        .unwrap()
        .optimize(&reloaded)
        .unwrap();
    assert_abs_diff_eq!(solution.objective_value().unwrap(), 97.5, epsilon = 1e-4);
}

#[cfg(feature = "microlp")]
#[test]
fn backends_agree() {
    let model = mini_core();
    let clarabel = FbaEngine::new(SolverBackend::Clarabel)
        .unwrap()
        .optimize(&model)
        .unwrap();
    let microlp = FbaEngine::new(SolverBackend::Microlp)
        .unwrap()
        .optimize(&model)
        .unwrap();
    assert_eq!(microlp.solver(), "microlp");
    assert_abs_diff_eq!(
        clarabel.objective_value().unwrap(),
        microlp.objective_value().unwrap(),
        epsilon = 1e-4
    );
    assert_steady_state(&model, &microlp);
}
