//! This module provides a struct for representing reactions
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use indexmap::IndexMap;

use crate::configuration::Configuration;
use crate::metabolic_model::gene::Gpr;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::ModelError;

/// Represents a reaction in the metabolic model
///
/// # Examples
/// ```rust
/// use fbars_core::metabolic_model::reaction::ReactionBuilder;
/// let pdh = ReactionBuilder::default()
///     .id("PDH")
///     .name(Some("Pyruvate dehydrogenase".to_string()))
///     .lower_bound(0.)
///     .upper_bound(1000.)
///     .build()
///     .unwrap();
/// assert!(!pdh.reversibility());
/// ```
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Metabolite stoichiometry of the reaction, keyed by metabolite id
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Gene Protein Reaction rule to determine if reaction is active
    #[builder(default = "None")]
    pub gpr: Option<Gpr>,
    /// Lower flux bound
    #[builder(default = "Configuration::current().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "Configuration::current().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
    /// Notes about the reaction
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Reaction Annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
    /// Metabolite definitions attached with [`Reaction::add_metabolites`], moved into the model
    /// by [`Model::add_reaction`](crate::metabolic_model::model::Model::add_reaction)
    #[builder(setter(skip), default = "IndexMap::new()")]
    pub(crate) pending_metabolites: IndexMap<String, Metabolite>,
}

impl ReactionBuilder {
    fn validate(&self) -> Result<(), String> {
        // Unset bounds take the configured defaults at build time
        let lb = self
            .lower_bound
            .unwrap_or_else(|| Configuration::current().lower_bound);
        let ub = self
            .upper_bound
            .unwrap_or_else(|| Configuration::current().upper_bound);
        if lb.is_nan() || ub.is_nan() {
            return Err(format!("bounds ({}, {}) must not be NaN", lb, ub));
        }
        if lb > ub {
            return Err(format!("lower bound {} is greater than upper bound {}", lb, ub));
        }
        if let Some(ref metabolites) = self.metabolites {
            if let Some((id, _)) = metabolites.iter().find(|(_, coef)| **coef == 0.) {
                return Err(format!("metabolite {} has a stoichiometric coefficient of 0", id));
            }
        }
        Ok(())
    }
}

impl Reaction {
    /// Create a new reaction with default bounds and no metabolites
    pub fn new(id: &str) -> Reaction {
        let config = Configuration::current();
        Reaction {
            id: id.to_string(),
            metabolites: IndexMap::new(),
            name: None,
            gpr: None,
            lower_bound: config.lower_bound,
            upper_bound: config.upper_bound,
            subsystem: None,
            notes: None,
            annotation: None,
            pending_metabolites: IndexMap::new(),
        }
    }

    /// A reaction is reversible if it can carry negative flux
    pub fn reversibility(&self) -> bool {
        self.lower_bound < 0.
    }

    /// Get the (lower, upper) bounds
    pub fn bounds(&self) -> (f64, f64) {
        (self.lower_bound, self.upper_bound)
    }

    /// Set both bounds at once
    ///
    /// Any bounds with `lower_bound <= upper_bound` are accepted, including negative lower bounds
    /// which make the reaction reversible.
    pub fn set_bounds(&mut self, lower_bound: f64, upper_bound: f64) -> Result<(), ModelError> {
        if lower_bound > upper_bound || lower_bound.is_nan() || upper_bound.is_nan() {
            return Err(ModelError::InvalidBounds {
                id: self.id.clone(),
                lower_bound,
                upper_bound,
            });
        }
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        Ok(())
    }

    /// Add metabolites to the reaction, merging with any already present coefficients
    ///
    /// The metabolite definitions are kept with the reaction so that adding the reaction to a
    /// model also adds any metabolites the model doesn't have yet. A coefficient which merges to
    /// zero removes the metabolite from the reaction.
    ///
    /// # Examples
    /// ```rust
    /// use fbars_core::metabolic_model::metabolite::Metabolite;
    /// use fbars_core::metabolic_model::reaction::Reaction;
    /// let pyr = Metabolite::new("pyr_c");
    /// let accoa = Metabolite::new("accoa_c");
    /// let mut pdh = Reaction::new("PDH");
    /// pdh.add_metabolites(&[(&pyr, -1.), (&accoa, 1.)]).unwrap();
    /// assert_eq!(pdh.coefficient("pyr_c"), Some(-1.));
    /// ```
    pub fn add_metabolites(&mut self, stoichiometry: &[(&Metabolite, f64)]) -> Result<(), ModelError> {
        if let Some((met, _)) = stoichiometry.iter().find(|(_, coef)| *coef == 0.) {
            return Err(ModelError::ZeroCoefficient {
                reaction: self.id.clone(),
                metabolite: met.id.clone(),
            });
        }
        for (met, coef) in stoichiometry {
            let merged = self.metabolites.get(&met.id).copied().unwrap_or(0.) + coef;
            if merged == 0. {
                self.metabolites.shift_remove(&met.id);
            } else {
                self.metabolites.insert(met.id.clone(), merged);
            }
            self.pending_metabolites
                .entry(met.id.clone())
                .or_insert_with(|| (*met).clone());
        }
        Ok(())
    }

    /// Stoichiometric coefficient of a metabolite, None if it doesn't participate
    pub fn coefficient(&self, metabolite_id: &str) -> Option<f64> {
        self.metabolites.get(metabolite_id).copied()
    }

    /// Ids of the metabolites consumed by the reaction
    pub fn reactants(&self) -> Vec<&str> {
        self.metabolites
            .iter()
            .filter(|(_, coef)| **coef < 0.)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Ids of the metabolites produced by the reaction
    pub fn products(&self) -> Vec<&str> {
        self.metabolites
            .iter()
            .filter(|(_, coef)| **coef > 0.)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// A reaction with a single metabolite exchanges it with the outside of the system
    pub fn is_boundary(&self) -> bool {
        self.metabolites.len() == 1
    }

    /// Render the reaction as an equation, e.g. `pyr_c + coa_c --> accoa_c + co2_c`
    pub fn reaction_string(&self) -> String {
        let arrow = if self.lower_bound < 0. && self.upper_bound > 0. {
            "<=>"
        } else if self.upper_bound <= 0. && self.lower_bound < 0. {
            "<--"
        } else {
            "-->"
        };
        let side = |coefs: Vec<(&String, f64)>| -> String {
            coefs
                .into_iter()
                .map(|(id, coef)| {
                    if coef == 1. {
                        id.to_string()
                    } else {
                        format!("{} {}", coef, id)
                    }
                })
                .collect::<Vec<_>>()
                .join(" + ")
        };
        let left = side(
            self.metabolites
                .iter()
                .filter(|(_, c)| **c < 0.)
                .map(|(id, c)| (id, -c))
                .collect(),
        );
        let right = side(
            self.metabolites
                .iter()
                .filter(|(_, c)| **c > 0.)
                .map(|(id, c)| (id, *c))
                .collect(),
        );
        format!("{} {} {}", left, arrow, right).trim().to_string()
    }

    /// Move the attached metabolite definitions out of the reaction
    pub(crate) fn take_pending_metabolites(&mut self) -> IndexMap<String, Metabolite> {
        std::mem::take(&mut self.pending_metabolites)
    }
}

impl Display for Reaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.reaction_string())
    }
}
