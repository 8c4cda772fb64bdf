//! Provides the stoichiometric matrix of a model, along with the flux bounds of its reactions
use indexmap::IndexMap;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use thiserror::Error;

use crate::metabolic_model::model::Model;

/// Stoichiometric matrix of a model
///
/// Rows follow the insertion order of the model's metabolites and columns the insertion order
/// of its reactions, so building the matrix twice from the same model gives identical results.
#[derive(Clone, Debug, PartialEq)]
pub struct StoichiometricMatrix {
    /// Reaction ids, in column order
    reaction_ids: Vec<String>,
    /// Metabolite ids, in row order
    metabolite_ids: Vec<String>,
    /// Index of each reaction id
    reaction_index: IndexMap<String, usize>,
    /// Sparse matrix of stoichiometric coefficients, S[metabolite, reaction]
    matrix: CscMatrix<f64>,
    /// Lower flux bound of each column
    lower_bounds: DVector<f64>,
    /// Upper flux bound of each column
    upper_bounds: DVector<f64>,
    /// Whether each row is held at steady state, false for boundary metabolites
    balanced: Vec<bool>,
}

impl StoichiometricMatrix {
    /// Build the stoichiometric matrix and bound vectors of a model
    ///
    /// # Examples
    /// ```rust
    /// use fbars_core::metabolic_model::model::Model;
    /// use fbars_core::metabolic_model::reaction::Reaction;
    /// use fbars_core::optimize::matrix::StoichiometricMatrix;
    /// let mut model = Model::new("tutorial_model");
    /// let mut r1 = Reaction::new("R1");
    /// r1.metabolites.insert("A".to_string(), -1.);
    /// r1.metabolites.insert("B".to_string(), 2.);
    /// model.add_reaction(r1).unwrap();
    /// let s = StoichiometricMatrix::build(&model).unwrap();
    /// assert_eq!(s.shape(), (2, 1));
    /// assert_eq!(s.coefficient("B", "R1"), Some(2.));
    /// ```
    pub fn build(model: &Model) -> Result<StoichiometricMatrix, MatrixError> {
        let metabolite_index: IndexMap<&str, usize> = model
            .metabolites()
            .enumerate()
            .map(|(idx, met)| (met.id.as_str(), idx))
            .collect();
        let n_rows = metabolite_index.len();
        let n_cols = model.num_reactions();

        let mut coo = CooMatrix::new(n_rows, n_cols);
        let mut lower_bounds = DVector::zeros(n_cols);
        let mut upper_bounds = DVector::zeros(n_cols);
        let mut reaction_ids = Vec::with_capacity(n_cols);
        let mut reaction_index = IndexMap::with_capacity(n_cols);

        for (col, reaction) in model.reactions().enumerate() {
            for (met_id, coef) in reaction.metabolites.iter() {
                let row = *metabolite_index.get(met_id.as_str()).ok_or_else(|| {
                    MatrixError::MissingMetabolite {
                        reaction: reaction.id.clone(),
                        metabolite: met_id.clone(),
                    }
                })?;
                coo.push(row, col, *coef);
            }
            lower_bounds[col] = reaction.lower_bound;
            upper_bounds[col] = reaction.upper_bound;
            reaction_ids.push(reaction.id.clone());
            reaction_index.insert(reaction.id.clone(), col);
        }

        Ok(StoichiometricMatrix {
            reaction_ids,
            metabolite_ids: model.metabolites().map(|m| m.id.clone()).collect(),
            reaction_index,
            matrix: CscMatrix::from(&coo),
            lower_bounds,
            upper_bounds,
            balanced: model.metabolites().map(|m| !m.boundary).collect(),
        })
    }

    /// Override the bounds of a single column, leaving the model untouched
    pub fn override_bounds(
        &mut self,
        reaction_id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), MatrixError> {
        if lower_bound > upper_bound {
            return Err(MatrixError::InvalidBounds {
                reaction: reaction_id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        let col = self.column(reaction_id)?;
        self.lower_bounds[col] = lower_bound;
        self.upper_bounds[col] = upper_bound;
        Ok(())
    }

    /// Column index of a reaction
    pub fn column(&self, reaction_id: &str) -> Result<usize, MatrixError> {
        self.reaction_index
            .get(reaction_id)
            .copied()
            .ok_or_else(|| MatrixError::UnknownReaction(reaction_id.to_string()))
    }

    /// Coefficient of a metabolite in a reaction, Some(0.) if the metabolite doesn't participate
    /// and None if either id is unknown
    pub fn coefficient(&self, metabolite_id: &str, reaction_id: &str) -> Option<f64> {
        let row = self.metabolite_ids.iter().position(|id| id == metabolite_id)?;
        let col = self.reaction_index.get(reaction_id).copied()?;
        let column = self.matrix.col(col);
        Some(
            column
                .row_indices()
                .iter()
                .zip(column.values())
                .find(|(r, _)| **r == row)
                .map(|(_, v)| *v)
                .unwrap_or(0.),
        )
    }

    /// (rows, columns) of the matrix
    pub fn shape(&self) -> (usize, usize) {
        (self.metabolite_ids.len(), self.reaction_ids.len())
    }

    pub fn reaction_ids(&self) -> &[String] {
        &self.reaction_ids
    }

    pub fn metabolite_ids(&self) -> &[String] {
        &self.metabolite_ids
    }

    pub fn matrix(&self) -> &CscMatrix<f64> {
        &self.matrix
    }

    pub fn lower_bounds(&self) -> &DVector<f64> {
        &self.lower_bounds
    }

    pub fn upper_bounds(&self) -> &DVector<f64> {
        &self.upper_bounds
    }

    /// Which rows take part in the steady state constraint
    pub fn balanced_rows(&self) -> &[bool] {
        &self.balanced
    }
}

/// Errors from building a stoichiometric matrix
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("Reaction {reaction} references metabolite {metabolite} which is not in the model")]
    MissingMetabolite { reaction: String, metabolite: String },
    #[error("Reaction {0} has no column in the matrix")]
    UnknownReaction(String),
    #[error("Invalid bounds ({lower_bound}, {upper_bound}) for reaction {reaction}")]
    InvalidBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
}
