//! Module providing JSON IO for Models, using the COBRA JSON layout
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::io::gpr_parse::parse_gpr;
use crate::io::IoError;
use crate::metabolic_model::gene::{Gene, GeneActivity};
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::Model;
use crate::metabolic_model::reaction::{Reaction, ReactionBuilder};
use crate::optimize::objective::ObjectiveSense;

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    #[serde(default)]
    metabolites: Vec<JsonMetabolite>,
    #[serde(default)]
    reactions: Vec<JsonReaction>,
    #[serde(default)]
    genes: Vec<JsonGene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compartments: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compartment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    charge: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    formula: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    boundary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    #[serde(serialize_with = "serialize_bound", deserialize_with = "deserialize_lower_bound")]
    lower_bound: f64,
    #[serde(serialize_with = "serialize_bound", deserialize_with = "deserialize_upper_bound")]
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objective_coefficient: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subsystem: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}

#[derive(Serialize, Deserialize)]
struct JsonGene {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    notes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    annotation: Option<Value>,
}
// endregion JSON Model

// region Bounds
/* JSON has no infinity, serde_json writes it as null. Infinite bounds are written as the largest
finite f64 instead, and read back as infinite, as is a null on the matching side.
 */
fn serialize_bound<S: Serializer>(bound: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if bound.is_infinite() {
        serializer.serialize_f64(f64::MAX.copysign(*bound))
    } else {
        serializer.serialize_f64(*bound)
    }
}

fn read_bound(bound: f64) -> f64 {
    if bound >= f64::MAX {
        f64::INFINITY
    } else if bound <= f64::MIN {
        f64::NEG_INFINITY
    } else {
        bound
    }
}

fn deserialize_lower_bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(f64::NEG_INFINITY, read_bound))
}

fn deserialize_upper_bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.map_or(f64::INFINITY, read_bound))
}
// endregion Bounds

// region Conversions
/* Notes and annotations are kept as serialized JSON strings, the model doesn't interpret them,
it only carries them through to the written file.
 */
fn value_to_string(value: Option<Value>) -> Option<String> {
    value.map(|v| v.to_string())
}

fn string_to_value(text: &Option<String>) -> Option<Value> {
    text.as_ref()
        .map(|t| serde_json::from_str(t).unwrap_or_else(|_| Value::String(t.clone())))
}

impl From<JsonGene> for Gene {
    fn from(g: JsonGene) -> Self {
        Self {
            id: g.id,
            name: g.name,
            activity: GeneActivity::Active, // All genes start as active
            notes: value_to_string(g.notes),
            annotation: value_to_string(g.annotation),
        }
    }
}

impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge,
            formula: m.formula,
            boundary: m.boundary,
            notes: value_to_string(m.notes),
            annotation: value_to_string(m.annotation),
        }
    }
}

impl From<&Gene> for JsonGene {
    fn from(g: &Gene) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            notes: string_to_value(&g.notes),
            annotation: string_to_value(&g.annotation),
        }
    }
}

impl From<&Metabolite> for JsonMetabolite {
    fn from(m: &Metabolite) -> Self {
        Self {
            id: m.id.clone(),
            name: m.name.clone(),
            compartment: m.compartment.clone(),
            charge: m.charge,
            formula: m.formula.clone(),
            boundary: m.boundary,
            notes: string_to_value(&m.notes),
            annotation: string_to_value(&m.annotation),
        }
    }
}

impl Model {
    /// Read a model from a COBRA JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, IoError> {
        let model_str = fs::read_to_string(path)?;
        Model::from_json_str(&model_str)
    }

    /// Write the model to a COBRA JSON file
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Parse a model from a string holding COBRA JSON
    pub fn from_json_str(json: &str) -> Result<Model, IoError> {
        let json_model: JsonModel =
            serde_json::from_str(json).map_err(|err| IoError::Format(err.to_string()))?;
        Model::from_json(json_model)
    }

    /// Serialize the model to a COBRA JSON string
    pub fn to_json_string(&self) -> Result<String, IoError> {
        serde_json::to_string_pretty(&self.to_json())
            .map_err(|err| IoError::Format(err.to_string()))
    }

    fn from_json(json_model: JsonModel) -> Result<Self, IoError> {
        let mut model = Model::new_empty();
        model.id = json_model.id;
        model.name = json_model.name;
        model.compartments = json_model.compartments;
        model.version = json_model.version;

        let mut genes: IndexMap<String, Gene> = json_model
            .genes
            .into_iter()
            .map(|g| (g.id.clone(), Gene::from(g)))
            .collect();
        for met in json_model.metabolites {
            if !model.add_metabolite(Metabolite::from(met)) {
                return Err(IoError::Format("duplicate metabolite id".to_string()));
            }
        }

        /* Parse the GPRs before adding reactions, so that genes named only in a rule end up in
        the gene map alongside the declared ones
         */
        let mut reactions: Vec<Reaction> = Vec::with_capacity(json_model.reactions.len());
        for rxn in json_model.reactions {
            let gpr = if rxn.gene_reaction_rule.trim().is_empty() {
                None
            } else {
                Some(
                    parse_gpr(&rxn.gene_reaction_rule, &mut genes).map_err(|source| {
                        IoError::Gpr {
                            reaction: rxn.id.clone(),
                            source,
                        }
                    })?,
                )
            };
            if let Some(coef) = rxn.objective_coefficient {
                if coef != 0. {
                    model.objective.add_term(&rxn.id, coef);
                }
            }
            let reaction = ReactionBuilder::default()
                .id(rxn.id)
                .metabolites(rxn.metabolites)
                .name(rxn.name)
                .gpr(gpr)
                .lower_bound(rxn.lower_bound)
                .upper_bound(rxn.upper_bound)
                .subsystem(rxn.subsystem)
                .notes(value_to_string(rxn.notes))
                .annotation(value_to_string(rxn.annotation))
                .build()
                .map_err(|err| IoError::Format(err.to_string()))?;
            reactions.push(reaction);
        }
        genes.into_values().for_each(|g| model.add_gene(g));
        for reaction in reactions {
            if model.has_reaction(&reaction.id) {
                return Err(IoError::Format(format!(
                    "duplicate reaction id {}",
                    reaction.id
                )));
            }
            model.add_reaction(reaction)?;
        }
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        if self.objective.sense() == ObjectiveSense::Minimize {
            warn!("COBRA JSON has no objective direction, the minimized objective is written as maximized");
        }
        let reactions = self
            .reactions()
            .map(|r| JsonReaction {
                id: r.id.clone(),
                name: r.name.clone(),
                metabolites: r.metabolites.clone(),
                lower_bound: r.lower_bound,
                upper_bound: r.upper_bound,
                gene_reaction_rule: r
                    .gpr
                    .as_ref()
                    .map(|rule| rule.to_string_id())
                    .unwrap_or_default(),
                objective_coefficient: self.objective.coefficient(&r.id),
                subsystem: r.subsystem.clone(),
                notes: string_to_value(&r.notes),
                annotation: string_to_value(&r.annotation),
            })
            .collect();

        JsonModel {
            metabolites: self.metabolites().map(JsonMetabolite::from).collect(),
            reactions,
            genes: self.genes().map(JsonGene::from).collect(),
            id: self.id.clone(),
            name: self.name.clone(),
            compartments: self.compartments.clone(),
            version: self.version.clone(),
        }
    }
}
// endregion Conversions

#[cfg(test)]
mod json_tests {
    use super::*;
    use crate::metabolic_model::gene::{Gpr, GprOperation};
    use std::path::PathBuf;

    fn mini_core_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join("test_models")
            .join("mini_core.json")
    }

    #[test]
    fn json_metabolite() {
        let data = r#"{
"id":"glc__D_e",
"name":"D-Glucose",
"compartment":"e",
"charge":0,
"formula":"C6H12O6",
"notes":{"original_bigg_ids":["glc_D_e"]},
"annotation":{"bigg.metabolite":["glc__D"],"sbo":"SBO:0000247"}
}"#;
        let met = Metabolite::from(serde_json::from_str::<JsonMetabolite>(data).unwrap());
        assert_eq!(met.id, "glc__D_e");
        assert_eq!(met.name.unwrap(), "D-Glucose");
        assert_eq!(met.compartment.unwrap(), "e");
        assert_eq!(met.charge, Some(0));
        assert_eq!(met.formula.unwrap(), "C6H12O6");
        assert!(!met.boundary);
        assert!(met.annotation.unwrap().contains("SBO:0000247"));
    }

    #[test]
    fn json_reaction() {
        let data = r#"{
"id":"PFK",
"name":"Phosphofructokinase",
"metabolites":{"adp_c":1.0,"atp_c":-1.0,"f6p_c":-1.0,"fdp_c":1.0,"h_c":1.0},
"lower_bound":0.0,
"upper_bound":1000.0,
"gene_reaction_rule":"b3916 or b1723",
"subsystem":"Glycolysis/Gluconeogenesis"
}"#;
        let reaction: JsonReaction = serde_json::from_str(data).unwrap();
        assert_eq!(reaction.id, "PFK");
        assert_eq!(reaction.metabolites.len(), 5);
        assert_eq!(reaction.metabolites["atp_c"], -1.0);
        assert_eq!(reaction.gene_reaction_rule, "b3916 or b1723");
        assert!(reaction.objective_coefficient.is_none());
    }

    #[test]
    fn read_json() {
        let model = Model::read_json(mini_core_path()).unwrap();
        assert_eq!(model.id.as_deref(), Some("mini_core"));
        assert_eq!(model.version.as_deref(), Some("1"));
        assert_eq!(model.num_reactions(), 11);
        assert_eq!(model.num_metabolites(), 13);
        assert_eq!(model.num_genes(), 10);
        assert_eq!(model.compartment_ids(), vec!["c".to_string(), "e".to_string()]);

        let nadh = model.metabolite("nadh_c").unwrap();
        assert_eq!(nadh.charge, Some(-2));
        assert_eq!(nadh.formula.as_deref(), Some("C21H27N7O14P2"));

        let pyk = model.reaction("PYK").unwrap();
        assert_eq!(pyk.bounds(), (0., 1000.));
        match pyk.gpr {
            Some(Gpr::Operation(GprOperation::Or { ref left, ref right })) => {
                assert_eq!(**left, Gpr::GeneNode("b1854".to_string()));
                assert_eq!(**right, Gpr::GeneNode("b1676".to_string()));
            }
            ref other => panic!("Incorrect Parse {:?}", other),
        }
        assert_eq!(model.objective.coefficient("ATPM"), Some(1.));
        assert_eq!(model.gene("b1854").unwrap().name.as_deref(), Some("pykA"));
    }

    #[test]
    fn malformed_json() {
        assert!(matches!(
            Model::from_json_str("{\"reactions\": [{\"id\": 3}]}"),
            Err(IoError::Format(_))
        ));
        let bad_rule = r#"{"reactions":[{"id":"R","metabolites":{"A":-1.0},"lower_bound":0,"upper_bound":1,"gene_reaction_rule":"b1 and"}]}"#;
        assert!(matches!(
            Model::from_json_str(bad_rule),
            Err(IoError::Gpr { ref reaction, .. }) if reaction == "R"
        ));
        let bad_bounds = r#"{"reactions":[{"id":"R","metabolites":{"A":-1.0},"lower_bound":5,"upper_bound":1}]}"#;
        assert!(matches!(Model::from_json_str(bad_bounds), Err(IoError::Format(_))));
    }

    #[test]
    fn undeclared_metabolites_and_genes_are_added() {
        let data = r#"{"reactions":[{"id":"R1","metabolites":{"A":-1.0,"B":1.0},"lower_bound":0,"upper_bound":10,"gene_reaction_rule":"g1 or g2"}]}"#;
        let model = Model::from_json_str(data).unwrap();
        assert_eq!(model.num_metabolites(), 2);
        assert_eq!(model.num_genes(), 2);
        assert!(model.objective.is_empty());
    }

    #[test]
    fn infinite_bounds_round_trip() {
        let mut model = Model::new("test_model");
        let mut r1 = Reaction::new("R1");
        r1.metabolites.insert("A".to_string(), -1.);
        r1.set_bounds(0., f64::INFINITY).unwrap();
        let mut r2 = Reaction::new("R2");
        r2.metabolites.insert("A".to_string(), 1.);
        r2.set_bounds(f64::NEG_INFINITY, f64::INFINITY).unwrap();
        model.add_reactions(vec![r1, r2]).unwrap();

        let text = model.to_json_string().unwrap();
        assert!(!text.contains("null"));
        let reread = Model::from_json_str(&text).unwrap();
        assert_eq!(reread.reaction("R1").unwrap().bounds(), (0., f64::INFINITY));
        assert_eq!(
            reread.reaction("R2").unwrap().bounds(),
            (f64::NEG_INFINITY, f64::INFINITY)
        );

        // Files written by tools which emit null for infinite bounds
        let data = r#"{"reactions":[{"id":"R","metabolites":{"A":-1.0},"lower_bound":null,"upper_bound":null}]}"#;
        let model = Model::from_json_str(data).unwrap();
        assert_eq!(
            model.reaction("R").unwrap().bounds(),
            (f64::NEG_INFINITY, f64::INFINITY)
        );
    }

    #[test]
    fn minimized_objective_reads_back_maximized() {
        let mut model = Model::read_json(mini_core_path()).unwrap();
        model.objective.set_sense(ObjectiveSense::Minimize);
        let reread = Model::from_json_str(&model.to_json_string().unwrap()).unwrap();
        assert_eq!(reread.objective.sense(), ObjectiveSense::Maximize);
        assert_eq!(
            reread.objective.terms().collect::<Vec<_>>(),
            model.objective.terms().collect::<Vec<_>>()
        );
    }

    #[test]
    fn to_json_string_round_trips() {
        let model = Model::read_json(mini_core_path()).unwrap();
        let text = model.to_json_string().unwrap();
        let reread = Model::from_json_str(&text).unwrap();
        assert_eq!(
            reread.reactions().map(|r| &r.id).collect::<Vec<_>>(),
            model.reactions().map(|r| &r.id).collect::<Vec<_>>()
        );
        for reaction in model.reactions() {
            let other = reread.reaction(&reaction.id).unwrap();
            assert_eq!(other.metabolites, reaction.metabolites);
            assert_eq!(other.bounds(), reaction.bounds());
            assert_eq!(other.gpr, reaction.gpr);
        }
        assert_eq!(reread.objective, model.objective);
        assert_eq!(reread.metabolite("nadh_c").unwrap(), model.metabolite("nadh_c").unwrap());
    }
}
