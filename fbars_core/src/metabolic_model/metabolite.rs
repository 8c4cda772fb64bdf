//! This module provides the metabolite struct representing a metabolite

use std::fmt::{Display, Formatter};
use std::hash::Hash;

use derive_builder::Builder;

/// Represents a metabolite
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(setter(into))]
pub struct Metabolite {
    /// Used to identify the metabolite (must be unique)
    pub id: String,
    /// Human Readable name of the metabolite
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Which compartment the metabolite is in
    #[builder(default = "None")]
    pub compartment: Option<String>,
    /// Electrical charge of the Metabolite
    #[builder(default = "None")]
    pub charge: Option<i32>,
    /// Chemical Formula of the metabolite
    #[builder(default = "None")]
    pub formula: Option<String>,
    /// Boundary metabolites sit outside the system, and are not mass balanced
    #[builder(default = "false")]
    pub boundary: bool,
    /// Notes about the metabolite
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Metabolite annotations
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Metabolite {
    /// Create a metabolite with only an id, the rest of the fields left empty
    pub fn new(id: &str) -> Metabolite {
        Metabolite {
            id: id.to_string(),
            name: None,
            compartment: None,
            charge: None,
            formula: None,
            boundary: false,
            notes: None,
            annotation: None,
        }
    }
}

impl Display for Metabolite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Hash for Metabolite {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state); // Hash by id
                             // If the metabolite has an associated compartment, also hash by that
        if let Some(ref compartment) = self.compartment {
            compartment.hash(state)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let nadh = MetaboliteBuilder::default()
            .id("nadh_c")
            .name(Some("Nicotinamide adenine dinucleotide - reduced".to_string()))
            .compartment(Some("c".to_string()))
            .build()
            .unwrap();
        assert_eq!(nadh.id, "nadh_c");
        assert_eq!(nadh.compartment.as_deref(), Some("c"));
        assert_eq!(nadh.charge, None);
        assert!(!nadh.boundary);
        assert_eq!(nadh.to_string(), "nadh_c");
    }
}
