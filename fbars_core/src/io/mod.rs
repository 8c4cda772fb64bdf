//! Module for reading and writing Models
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::metabolic_model::model::{Model, ModelError};

pub mod gpr_parse;
pub mod json;

use gpr_parse::GprParseError;

/// Read a model from a file, choosing the format from the file extension
///
/// Only the COBRA JSON format (`.json`) is currently supported.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Model, IoError> {
    let path = path.as_ref();
    let model = match ModelFormat::from_path(path)? {
        ModelFormat::Json => Model::read_json(path)?,
    };
    info!(
        "Loaded model {} from {} ({} reactions, {} metabolites, {} genes)",
        model.id.as_deref().unwrap_or("<unnamed>"),
        path.display(),
        model.num_reactions(),
        model.num_metabolites(),
        model.num_genes()
    );
    Ok(model)
}

/// Write a model to a file, choosing the format from the file extension
///
/// COBRA JSON stores objective coefficients but no direction, so a minimized objective reads
/// back as maximized.
pub fn save<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), IoError> {
    let path = path.as_ref();
    match ModelFormat::from_path(path)? {
        ModelFormat::Json => model.write_json(path)?,
    }
    info!("Saved model to {}", path.display());
    Ok(())
}

/// File formats models can be read from and written to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModelFormat {
    Json,
}

impl ModelFormat {
    fn from_path(path: &Path) -> Result<ModelFormat, IoError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ModelFormat::Json),
            Some(ext) => Err(IoError::UnsupportedFormat(ext.to_string())),
            None => Err(IoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Errors from reading or writing models
#[derive(Debug, Error)]
pub enum IoError {
    #[error("Unable to access model file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed model file: {0}")]
    Format(String),
    #[error("Unsupported model file format: {0}")]
    UnsupportedFormat(String),
    #[error("Unable to parse gene reaction rule of reaction {reaction}: {source}")]
    Gpr {
        reaction: String,
        #[source]
        source: GprParseError,
    },
    #[error("Model file describes an invalid model: {0}")]
    InvalidModel(#[from] ModelError),
}
