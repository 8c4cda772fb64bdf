//! Walks through loading, inspecting, building and optimizing a metabolic model
//!
//! Usage: `fbars_walkthrough [MODEL.json] [OUTPUT.json]`. Without arguments the bundled
//! mini_core model is used and the exported copy is written to the temporary directory.
use std::env;
use std::error::Error;
use std::path::PathBuf;

use fbars_core::io;
use fbars_core::metabolic_model::metabolite::MetaboliteBuilder;
use fbars_core::metabolic_model::model::Model;
use fbars_core::metabolic_model::reaction::ReactionBuilder;
use fbars_core::optimize::fba::FbaEngine;
use fbars_core::optimize::solvers::SolverBackend;
use log::info;

fn default_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("fbars_core")
        .join("test_data")
        .join("test_models")
        .join("mini_core.json")
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let mut args = env::args().skip(1);
    let model_path = args.next().map(PathBuf::from).unwrap_or_else(default_model_path);
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("fbars_walkthrough_model.json"));

    // Loading and inspecting a model
    let mut tutorial_model = io::load(&model_path)?;
    println!(
        "{}: {} reactions, {} metabolites, {} genes",
        tutorial_model.id.as_deref().unwrap_or("model"),
        tutorial_model.num_reactions(),
        tutorial_model.num_metabolites(),
        tutorial_model.num_genes()
    );
    println!("Compartments: {:?}", tutorial_model.compartment_ids());

    let pyk = tutorial_model.reaction("PYK")?;
    println!("{}", pyk);
    println!("  bounds {:?}, reversible: {}", pyk.bounds(), pyk.reversibility());
    let atp = tutorial_model.metabolite("atp_c")?;
    println!(
        "{} ({}) formula {}, in {} reactions",
        atp.id,
        atp.name.as_deref().unwrap_or(""),
        atp.formula.as_deref().unwrap_or("?"),
        tutorial_model.reactions_of_metabolite("atp_c")?.len()
    );
    let pdh_gpr = tutorial_model
        .reaction("PDH")?
        .gpr
        .as_ref()
        .map(|gpr| gpr.to_string())
        .unwrap_or_default();
    println!("PDH gene reaction rule: {}", pdh_gpr);

    tutorial_model.reaction_mut("PYK")?.set_bounds(-500., 500.)?;
    let pyk = tutorial_model.reaction("PYK")?;
    println!(
        "PYK bounds {:?}, reversible: {}",
        pyk.bounds(),
        pyk.reversibility()
    );
    tutorial_model.reaction_mut("PYK")?.set_bounds(0., 1000.)?;

    // Building a reaction into a fresh model
    let mut test_model = Model::new("test_model");
    let mut pdh = ReactionBuilder::default()
        .id("PDH")
        .name(Some("Pyruvate dehydrogenase".to_string()))
        .subsystem(Some("Central Carbon Metabolism".to_string()))
        .lower_bound(0.)
        .upper_bound(1000.)
        .build()?;
    let metabolites = [
        ("accoa_c", "Acetyl-CoA", 1.),
        ("co2_c", "CO2", 1.),
        ("coa_c", "Coenzyme A", -1.),
        ("nad_c", "Nicotinamide adenine dinucleotide", -1.),
        ("nadh_c", "Nicotinamide adenine dinucleotide - reduced", 1.),
        ("pyr_c", "Pyruvate", -1.),
    ];
    for (id, name, coefficient) in metabolites {
        let met = MetaboliteBuilder::default()
            .id(id)
            .name(Some(name.to_string()))
            .compartment(Some("c".to_string()))
            .build()?;
        pdh.add_metabolites(&[(&met, coefficient)])?;
    }
    println!("{}", pdh.reaction_string());
    test_model.add_reaction(pdh)?;
    println!(
        "{}: {} reactions, {} metabolites",
        test_model.id.as_deref().unwrap_or("model"),
        test_model.num_reactions(),
        test_model.num_metabolites()
    );

    // Running flux balance analysis
    tutorial_model.set_objective("ATPM")?;
    let engine = FbaEngine::new(SolverBackend::Clarabel)?;
    let solution = engine.optimize(&tutorial_model)?;
    println!(
        "Status {}, objective value {:?}",
        solution.status(),
        solution.objective_value()
    );
    if solution.is_optimal() {
        println!("{}", solution.model_summary(&tutorial_model)?);
        println!("{}", solution.metabolite_summary(&tutorial_model, "nadh_c")?);
        println!("{}", solution.metabolite_summary(&tutorial_model, "atp_c")?);
    }

    // Exporting the model
    io::save(&tutorial_model, &output_path)?;
    info!("Walkthrough finished, model written to {}", output_path.display());
    println!("Model written to {}", output_path.display());
    Ok(())
}
