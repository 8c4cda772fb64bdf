//! Module for building and solving flux balance problems

pub mod fba;
pub mod matrix;
pub mod objective;
pub mod problem;
pub mod solution;
pub mod solvers;
