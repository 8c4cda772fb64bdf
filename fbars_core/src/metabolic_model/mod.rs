//! Types making up a metabolic network: metabolites, reactions, genes, and the model holding them

pub mod gene;
pub mod metabolite;
pub mod model;
pub mod reaction;
