//! Core rust implementation of fbars, a crate for flux balance analysis of metabolic models.
//!
//! A [`Model`](metabolic_model::model::Model) is built up from reactions, metabolites and genes,
//! or loaded with [`io::load`]. An [`FbaEngine`](optimize::fba::FbaEngine) then finds the steady
//! state flux distribution optimizing the model's objective.

pub mod configuration;
pub mod io;
pub mod metabolic_model;
pub mod optimize;
