//! This module provides the Model struct for representing an entire metabolic model
use indexmap::{IndexMap, IndexSet};
use log::debug;
use thiserror::Error;

use crate::metabolic_model::gene::{Gene, GeneActivity, Gpr, GprError};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;
use crate::optimize::objective::Objective;

/// Represents a Genome Scale Metabolic Model
///
/// Reactions, metabolites and genes are held in insertion ordered maps keyed by id. Every
/// metabolite (and gene) referenced by a reaction added through [`Model::add_reaction`] is
/// present in the model.
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Map of reaction ids to Reactions
    reactions: IndexMap<String, Reaction>,
    /// Map of gene ids to Genes
    genes: IndexMap<String, Gene>,
    /// Map of metabolite ids to Metabolites
    metabolites: IndexMap<String, Metabolite>,
    /// Objective used by [`FbaEngine::optimize`](crate::optimize::fba::FbaEngine::optimize)
    pub objective: Objective,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Human readable name of the Model
    pub name: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

impl Model {
    /// Create a new model with an id and nothing in it
    pub fn new(id: &str) -> Self {
        Model {
            id: Some(id.to_string()),
            ..Model::default()
        }
    }

    /// Create a new model without an id
    pub fn new_empty() -> Self {
        Model::default()
    }

    // region Adding Components
    /// Add a reaction to the model
    ///
    /// Metabolites referenced by the reaction which are not yet in the model are added, using the
    /// definitions attached by [`Reaction::add_metabolites`] when available, and a metabolite with
    /// only an id otherwise. Metabolites already in the model are never replaced. The same holds
    /// for genes named by the reaction's GPR. A reaction with the id of an existing reaction
    /// replaces it.
    ///
    /// # Examples
    /// ```rust
    /// use fbars_core::metabolic_model::metabolite::Metabolite;
    /// use fbars_core::metabolic_model::model::Model;
    /// use fbars_core::metabolic_model::reaction::Reaction;
    /// let mut test_model = Model::new("test_model");
    /// let mut pdh = Reaction::new("PDH");
    /// pdh.add_metabolites(&[(&Metabolite::new("pyr_c"), -1.), (&Metabolite::new("accoa_c"), 1.)])
    ///     .unwrap();
    /// test_model.add_reaction(pdh).unwrap();
    /// assert_eq!(test_model.num_reactions(), 1);
    /// assert_eq!(test_model.num_metabolites(), 2);
    /// ```
    pub fn add_reaction(&mut self, mut reaction: Reaction) -> Result<(), ModelError> {
        if reaction.lower_bound > reaction.upper_bound
            || reaction.lower_bound.is_nan()
            || reaction.upper_bound.is_nan()
        {
            return Err(ModelError::InvalidBounds {
                id: reaction.id.clone(),
                lower_bound: reaction.lower_bound,
                upper_bound: reaction.upper_bound,
            });
        }
        if let Some((met, _)) = reaction.metabolites.iter().find(|(_, coef)| **coef == 0.) {
            return Err(ModelError::ZeroCoefficient {
                reaction: reaction.id.clone(),
                metabolite: met.clone(),
            });
        }
        let mut pending = reaction.take_pending_metabolites();
        for met_id in reaction.metabolites.keys() {
            if !self.metabolites.contains_key(met_id) {
                let met = pending
                    .shift_remove(met_id)
                    .unwrap_or_else(|| Metabolite::new(met_id));
                debug!("Adding metabolite {} with reaction {}", met_id, reaction.id);
                self.metabolites.insert(met_id.clone(), met);
            }
        }
        if let Some(ref gpr) = reaction.gpr {
            for gene_id in gpr.gene_ids() {
                if !self.genes.contains_key(gene_id) {
                    self.genes.insert(gene_id.to_string(), Gene::new(gene_id));
                }
            }
        }
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }

    /// Add several reactions, stopping at the first invalid one
    pub fn add_reactions(&mut self, reactions: Vec<Reaction>) -> Result<(), ModelError> {
        for reaction in reactions {
            self.add_reaction(reaction)?;
        }
        Ok(())
    }

    /// Add a metabolite to the model, unless one with the same id is already present
    ///
    /// Returns whether the metabolite was inserted.
    pub fn add_metabolite(&mut self, metabolite: Metabolite) -> bool {
        if self.metabolites.contains_key(&metabolite.id) {
            return false;
        }
        self.metabolites.insert(metabolite.id.clone(), metabolite);
        true
    }

    /// Add a gene to the model, replacing any gene with the same id
    ///
    /// # Examples
    /// ```rust
    /// use fbars_core::metabolic_model::gene::GeneBuilder;
    /// use fbars_core::metabolic_model::model::Model;
    /// let mut model = Model::new_empty();
    /// let new_gene = GeneBuilder::default().id("new_gene").build().unwrap();
    /// model.add_gene(new_gene);
    /// ```
    pub fn add_gene(&mut self, gene: Gene) {
        self.genes.insert(gene.id.clone(), gene);
    }

    /// Add metabolites to a reaction already in the model, merging coefficients as
    /// [`Reaction::add_metabolites`] does
    ///
    /// Metabolites the model doesn't have yet are added with the given definitions.
    ///
    /// # Examples
    /// ```rust
    /// use fbars_core::metabolic_model::metabolite::Metabolite;
    /// use fbars_core::metabolic_model::model::Model;
    /// use fbars_core::metabolic_model::reaction::Reaction;
    /// let mut model = Model::new("test_model");
    /// model.add_reaction(Reaction::new("R1")).unwrap();
    /// model
    ///     .add_metabolites_to_reaction("R1", &[(&Metabolite::new("B"), 1.)])
    ///     .unwrap();
    /// assert!(model.has_metabolite("B"));
    /// ```
    pub fn add_metabolites_to_reaction(
        &mut self,
        reaction_id: &str,
        stoichiometry: &[(&Metabolite, f64)],
    ) -> Result<(), ModelError> {
        let pending = {
            let reaction = self.reaction_mut(reaction_id)?;
            reaction.add_metabolites(stoichiometry)?;
            reaction.take_pending_metabolites()
        };
        for (met_id, met) in pending {
            if !self.metabolites.contains_key(&met_id) {
                debug!("Adding metabolite {} with reaction {}", met_id, reaction_id);
                self.metabolites.insert(met_id, met);
            }
        }
        Ok(())
    }
    // endregion Adding Components

    /// Remove a reaction, also dropping it from the objective
    ///
    /// Metabolites and genes are left in the model.
    pub fn remove_reaction(&mut self, id: &str) -> Result<Reaction, ModelError> {
        let reaction = self
            .reactions
            .shift_remove(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))?;
        self.objective.remove_term(id);
        Ok(reaction)
    }

    // region Accessors
    pub fn reaction(&self, id: &str) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Mutable access to a reaction, e.g. for changing its bounds
    ///
    /// Metabolites added through the returned reference don't enter the model, use
    /// [`Model::add_metabolites_to_reaction`] for that.
    pub fn reaction_mut(&mut self, id: &str) -> Result<&mut Reaction, ModelError> {
        self.reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    pub fn metabolite(&self, id: &str) -> Result<&Metabolite, ModelError> {
        self.metabolites
            .get(id)
            .ok_or_else(|| ModelError::MetaboliteNotFound(id.to_string()))
    }

    pub fn gene(&self, id: &str) -> Result<&Gene, ModelError> {
        self.genes
            .get(id)
            .ok_or_else(|| ModelError::GeneNotFound(id.to_string()))
    }

    pub fn has_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    pub fn has_metabolite(&self, id: &str) -> bool {
        self.metabolites.contains_key(id)
    }

    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    pub fn metabolites(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.values()
    }

    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn num_metabolites(&self) -> usize {
        self.metabolites.len()
    }

    pub fn num_genes(&self) -> usize {
        self.genes.len()
    }

    /// All reactions in which a metabolite participates
    pub fn reactions_of_metabolite(&self, metabolite_id: &str) -> Result<Vec<&Reaction>, ModelError> {
        self.metabolite(metabolite_id)?;
        Ok(self
            .reactions
            .values()
            .filter(|r| r.metabolites.contains_key(metabolite_id))
            .collect())
    }

    /// Short ids of the compartments in the model
    ///
    /// Uses the stored compartment map if the model has one, and otherwise the compartments of
    /// the metabolites, in order of first appearance.
    pub fn compartment_ids(&self) -> Vec<String> {
        match self.compartments {
            Some(ref compartments) => compartments.keys().cloned().collect(),
            None => self
                .metabolites
                .values()
                .filter_map(|m| m.compartment.clone())
                .collect::<IndexSet<String>>()
                .into_iter()
                .collect(),
        }
    }
    // endregion Accessors

    /// Set the objective to maximizing a single reaction
    pub fn set_objective(&mut self, reaction_id: &str) -> Result<(), ModelError> {
        self.reaction(reaction_id)?;
        self.objective = Objective::maximize_reaction(reaction_id);
        Ok(())
    }

    /// Knock out a gene, reactions which can't be catalyzed without it will carry no flux
    pub fn knock_out_gene(&mut self, id: &str) -> Result<(), ModelError> {
        self.genes
            .get_mut(id)
            .ok_or_else(|| ModelError::GeneNotFound(id.to_string()))?
            .knock_out();
        Ok(())
    }
}

// region GPR Functionality
impl Model {
    /// Evaluate whether a GPR evaluates to Active or Inactive given the model's genes
    pub fn eval_gpr(&self, gpr: &Gpr) -> Result<GeneActivity, GprError> {
        gpr.eval_with(&|gene_id: &str| self.genes.get(gene_id).map(|g| g.activity))
    }

    /// Activity of a reaction, reactions without a GPR are always active
    pub fn reaction_activity(&self, reaction: &Reaction) -> Result<GeneActivity, GprError> {
        match reaction.gpr {
            Some(ref gpr) => self.eval_gpr(gpr),
            None => Ok(GeneActivity::Active),
        }
    }

    /// Ids of the reactions whose GPR evaluates to inactive
    pub fn inactive_reactions(&self) -> Result<Vec<&str>, GprError> {
        let mut inactive = Vec::new();
        for reaction in self.reactions.values() {
            if self.reaction_activity(reaction)? == GeneActivity::Inactive {
                inactive.push(reaction.id.as_str());
            }
        }
        Ok(inactive)
    }
}
// endregion GPR Functionality

/// Errors from building or querying a Model
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} is not in the model")]
    ReactionNotFound(String),
    #[error("Metabolite {0} is not in the model")]
    MetaboliteNotFound(String),
    #[error("Gene {0} is not in the model")]
    GeneNotFound(String),
    #[error("Reaction {id} has lower bound {lower_bound} greater than upper bound {upper_bound}")]
    InvalidBounds {
        id: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error("Reaction {reaction} has a zero coefficient for metabolite {metabolite}")]
    ZeroCoefficient { reaction: String, metabolite: String },
}
