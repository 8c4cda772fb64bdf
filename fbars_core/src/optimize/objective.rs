//! Provides struct for representing the objective of a flux balance problem

use indexmap::IndexMap;

/// Represents the Objective of a flux balance problem: a linear combination of reaction fluxes
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Map of reaction id to objective coefficient
    terms: IndexMap<String, f64>,
    /// Sense of the objective (maximize, or minimize), see [`ObjectiveSense`]
    sense: ObjectiveSense,
}

impl Default for Objective {
    fn default() -> Self {
        Objective::new_maximize()
    }
}

impl Objective {
    /// Create a new empty objective, with a given sense
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            terms: IndexMap::new(),
            sense,
        }
    }

    /// Create a new empty maximization objective
    pub fn new_maximize() -> Self {
        Self::new(ObjectiveSense::Maximize)
    }

    /// Create a new empty minimization objective
    pub fn new_minimize() -> Self {
        Self::new(ObjectiveSense::Minimize)
    }

    /// Objective maximizing the flux through a single reaction
    ///
    /// # Examples
    /// ```rust
    /// use fbars_core::optimize::objective::{Objective, ObjectiveSense};
    /// let objective = Objective::maximize_reaction("ATPS4rpp");
    /// assert_eq!(objective.coefficient("ATPS4rpp"), Some(1.0));
    /// assert_eq!(objective.sense(), ObjectiveSense::Maximize);
    /// ```
    pub fn maximize_reaction(reaction_id: &str) -> Self {
        let mut objective = Self::new_maximize();
        objective.add_term(reaction_id, 1.);
        objective
    }

    /// Change the sense of the objective
    pub fn set_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Add a linear term to the objective, adding to the coefficient if the reaction is
    /// already present
    pub fn add_term(&mut self, reaction_id: &str, coefficient: f64) {
        *self.terms.entry(reaction_id.to_string()).or_insert(0.) += coefficient;
    }

    /// Add a series of linear terms to the objective function
    pub fn add_terms(&mut self, reaction_ids: &[&str], coefficients: &[f64]) {
        reaction_ids
            .iter()
            .zip(coefficients)
            .for_each(|(id, coef)| self.add_term(id, *coef));
    }

    /// Remove the term for a reaction, if there is one
    pub fn remove_term(&mut self, reaction_id: &str) -> Option<f64> {
        self.terms.shift_remove(reaction_id)
    }

    /// Remove all terms from the objective
    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn coefficient(&self, reaction_id: &str) -> Option<f64> {
        self.terms.get(reaction_id).copied()
    }

    /// Iterate over (reaction id, coefficient) pairs
    pub fn terms(&self) -> impl Iterator<Item = (&str, f64)> {
        self.terms.iter().map(|(id, coef)| (id.as_str(), *coef))
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}
