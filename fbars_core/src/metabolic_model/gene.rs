//! This module provides the Gene struct, and the Gpr AST used to represent a
//! gene protein reaction rule
use std::fmt::{Display, Formatter};
use std::hash::Hash;

use derive_builder::Builder;
use thiserror::Error;

/// Structure Representing a Gene
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct Gene {
    /// Used to identify the gene
    pub id: String,
    /// Human Readable Gene Name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Whether this gene is currently active (see [`GeneActivity`])
    #[builder(default = "GeneActivity::Active")]
    pub activity: GeneActivity,
    /// Notes about the gene, stored as serialized JSON
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Gene Annotations, stored as serialized JSON
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Gene {
    /// Create a new active gene with only an id
    pub fn new(id: &str) -> Gene {
        Gene {
            id: id.to_string(),
            name: None,
            activity: GeneActivity::Active,
            notes: None,
            annotation: None,
        }
    }

    /// Mark the gene as inactive
    pub fn knock_out(&mut self) {
        self.activity = GeneActivity::Inactive;
    }

    pub fn is_active(&self) -> bool {
        self.activity == GeneActivity::Active
    }
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl Hash for Gene {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.activity.hash(state);
    }
}

/// Whether a gene is active or not
#[derive(Clone, Debug, Hash, Eq, PartialEq, Copy)]
pub enum GeneActivity {
    /// Gene is considered active
    Active,
    /// Gene is considered inactive
    Inactive,
}

/// Representation of a Gene Protein Reaction Rule as an AST
#[derive(Clone, Debug, PartialEq)]
pub enum Gpr {
    /// Operation on one or two sub-rules (see [`GprOperation`])
    Operation(GprOperation),
    /// A terminal gene node, holding the gene id
    GeneNode(String),
}

impl Gpr {
    /// Create a new binary operation node
    pub fn new_binary_operation(
        left: Gpr,
        operator: GprOperatorType,
        right: Gpr,
    ) -> Result<Gpr, GprError> {
        let op = match operator {
            GprOperatorType::Or => GprOperation::Or {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::And => GprOperation::And {
                left: Box::new(left),
                right: Box::new(right),
            },
            GprOperatorType::Not => return Err(GprError::InvalidBinaryOp),
        };
        Ok(Gpr::Operation(op))
    }

    /// Create a new unary operation node
    pub fn new_unary_operation(operator: GprOperatorType, operand: Gpr) -> Result<Gpr, GprError> {
        match operator {
            GprOperatorType::Not => Ok(Gpr::Operation(GprOperation::Not {
                val: Box::new(operand),
            })),
            _ => Err(GprError::InvalidUnaryOp),
        }
    }

    /// Create a new gene node
    pub fn new_gene_node(gene: &str) -> Gpr {
        Gpr::GeneNode(gene.to_string())
    }

    /// Evaluate the rule, looking up the activity of each gene with `activity_of`
    ///
    /// Returns [`GprError::GeneNotFound`] if `activity_of` has no answer for a gene in the rule.
    pub fn eval_with<F>(&self, activity_of: &F) -> Result<GeneActivity, GprError>
    where
        F: Fn(&str) -> Option<GeneActivity>,
    {
        match self {
            Gpr::Operation(GprOperation::Or { left, right }) => {
                let l = left.eval_with(activity_of)?;
                let r = right.eval_with(activity_of)?;
                if l == GeneActivity::Active || r == GeneActivity::Active {
                    Ok(GeneActivity::Active)
                } else {
                    Ok(GeneActivity::Inactive)
                }
            }
            Gpr::Operation(GprOperation::And { left, right }) => {
                let l = left.eval_with(activity_of)?;
                let r = right.eval_with(activity_of)?;
                if l == GeneActivity::Active && r == GeneActivity::Active {
                    Ok(GeneActivity::Active)
                } else {
                    Ok(GeneActivity::Inactive)
                }
            }
            Gpr::Operation(GprOperation::Not { val }) => match val.eval_with(activity_of)? {
                GeneActivity::Active => Ok(GeneActivity::Inactive),
                GeneActivity::Inactive => Ok(GeneActivity::Active),
            },
            Gpr::GeneNode(gene) => {
                activity_of(gene).ok_or_else(|| GprError::GeneNotFound(gene.clone()))
            }
        }
    }

    /// Ids of every gene mentioned in the rule, in order of appearance
    pub fn gene_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_gene_ids(&mut ids);
        ids
    }

    fn collect_gene_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        match self {
            Gpr::Operation(GprOperation::Or { left, right })
            | Gpr::Operation(GprOperation::And { left, right }) => {
                left.collect_gene_ids(ids);
                right.collect_gene_ids(ids);
            }
            Gpr::Operation(GprOperation::Not { val }) => val.collect_gene_ids(ids),
            Gpr::GeneNode(gene) => {
                if !ids.contains(&gene.as_str()) {
                    ids.push(gene.as_str())
                }
            }
        }
    }

    /// Generate a GPR string with gene ids from the GPR AST
    pub fn to_string_id(&self) -> String {
        match self {
            Gpr::Operation(GprOperation::Or { left, right }) => {
                format!("({} or {})", left.to_string_id(), right.to_string_id())
            }
            Gpr::Operation(GprOperation::And { left, right }) => {
                format!("({} and {})", left.to_string_id(), right.to_string_id())
            }
            Gpr::Operation(GprOperation::Not { val }) => format!("(not {})", val.to_string_id()),
            Gpr::GeneNode(gene) => gene.clone(),
        }
    }
}

impl Display for Gpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_id())
    }
}

/// Possible operations on genes
#[derive(Clone, Debug, PartialEq)]
pub enum GprOperation {
    Or { left: Box<Gpr>, right: Box<Gpr> },
    And { left: Box<Gpr>, right: Box<Gpr> },
    Not { val: Box<Gpr> },
}

/// Types of Allowed GPR Operations
pub enum GprOperatorType {
    /// Or, results in active if either left or right are active
    Or,
    /// And, results in active if both left and right are active
    And,
    /// Not, results in active if val is inactive
    Not,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GprError {
    #[error("Invalid binary operation")]
    InvalidBinaryOp,
    #[error("Invalid unary operation")]
    InvalidUnaryOp,
    #[error("Gene {0} in GPR is not present in the model")]
    GeneNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(id: &str) -> Option<GeneActivity> {
        match id {
            "active1" | "active2" => Some(GeneActivity::Active),
            "inactive1" | "inactive2" => Some(GeneActivity::Inactive),
            _ => None,
        }
    }

    fn node(id: &str) -> Box<Gpr> {
        Box::new(Gpr::new_gene_node(id))
    }

    #[test]
    fn and_node() {
        let both_active = Gpr::Operation(GprOperation::And {
            left: node("active1"),
            right: node("active2"),
        });
        assert_eq!(both_active.eval_with(&activity), Ok(GeneActivity::Active));

        let one_inactive = Gpr::Operation(GprOperation::And {
            left: node("active1"),
            right: node("inactive1"),
        });
        assert_eq!(one_inactive.eval_with(&activity), Ok(GeneActivity::Inactive));
    }

    #[test]
    fn or_node() {
        let one_active = Gpr::Operation(GprOperation::Or {
            left: node("inactive1"),
            right: node("active2"),
        });
        assert_eq!(one_active.eval_with(&activity), Ok(GeneActivity::Active));

        let both_inactive = Gpr::Operation(GprOperation::Or {
            left: node("inactive1"),
            right: node("inactive2"),
        });
        assert_eq!(both_inactive.eval_with(&activity), Ok(GeneActivity::Inactive));
    }

    #[test]
    fn not_node() {
        let not_active = Gpr::new_unary_operation(GprOperatorType::Not, *node("active1")).unwrap();
        assert_eq!(not_active.eval_with(&activity), Ok(GeneActivity::Inactive));
        assert!(Gpr::new_unary_operation(GprOperatorType::And, *node("active1")).is_err());
    }

    #[test]
    fn missing_gene() {
        let gpr = Gpr::new_gene_node("b0001");
        assert_eq!(
            gpr.eval_with(&activity),
            Err(GprError::GeneNotFound("b0001".to_string()))
        );
    }

    #[test]
    fn display_and_gene_ids() {
        let gpr = Gpr::new_binary_operation(
            Gpr::new_binary_operation(
                Gpr::new_gene_node("b1"),
                GprOperatorType::And,
                Gpr::new_gene_node("b2"),
            )
            .unwrap(),
            GprOperatorType::Or,
            Gpr::new_unary_operation(GprOperatorType::Not, Gpr::new_gene_node("b1")).unwrap(),
        )
        .unwrap();
        assert_eq!(gpr.to_string(), "((b1 and b2) or (not b1))");
        assert_eq!(gpr.gene_ids(), vec!["b1", "b2"]);
    }

    #[test]
    fn knock_out() {
        let mut gene = GeneBuilder::default().id("b1241").name(Some("adhE".to_string())).build().unwrap();
        assert!(gene.is_active());
        gene.knock_out();
        assert_eq!(gene.activity, GeneActivity::Inactive);
    }
}
