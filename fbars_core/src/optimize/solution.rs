//! Provides the result of a flux balance analysis, and summaries of it
use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;

use crate::configuration::Configuration;
use crate::metabolic_model::model::Model;

/// Status of a solved flux balance problem
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal flux distribution was found
    Optimal,
    /// No flux distribution satisfies the constraints
    Infeasible,
    /// The objective can grow without limit
    Unbounded,
    /// The solver failed, see [`Solution::message`]
    Error,
}

impl Display for SolutionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let status = match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::Error => "error",
        };
        write!(f, "{}", status)
    }
}

/// Solution to a flux balance problem
///
/// The objective value and fluxes are only present for optimal solutions.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    status: SolutionStatus,
    objective_value: Option<f64>,
    /// Fluxes keyed by reaction id, in the model's reaction order
    fluxes: Option<IndexMap<String, f64>>,
    /// Diagnostic message from the solver
    message: Option<String>,
    /// Name of the solver which produced the solution
    solver: String,
}

impl Solution {
    pub(crate) fn optimal(objective_value: f64, fluxes: IndexMap<String, f64>, solver: &str) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            objective_value: Some(objective_value),
            fluxes: Some(fluxes),
            message: None,
            solver: solver.to_string(),
        }
    }

    pub(crate) fn without_optimum(
        status: SolutionStatus,
        message: Option<String>,
        solver: &str,
    ) -> Self {
        Self {
            status,
            objective_value: None,
            fluxes: None,
            message,
            solver: solver.to_string(),
        }
    }

    pub fn status(&self) -> SolutionStatus {
        self.status
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    pub fn fluxes(&self) -> Option<&IndexMap<String, f64>> {
        self.fluxes.as_ref()
    }

    /// Flux through a single reaction
    pub fn flux(&self, reaction_id: &str) -> Option<f64> {
        self.fluxes.as_ref()?.get(reaction_id).copied()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn solver(&self) -> &str {
        &self.solver
    }

    fn optimal_fluxes(&self) -> Result<&IndexMap<String, f64>, SummaryError> {
        match (self.status, self.fluxes.as_ref()) {
            (SolutionStatus::Optimal, Some(fluxes)) => Ok(fluxes),
            (status, _) => Err(SummaryError::InvalidState(status)),
        }
    }

    /// Summarize how the reactions of a model produce and consume a metabolite at this solution
    ///
    /// Rates with magnitude below the configured tolerance are left out of the producing and
    /// consuming lists.
    pub fn metabolite_summary(
        &self,
        model: &Model,
        metabolite_id: &str,
    ) -> Result<MetaboliteSummary, SummaryError> {
        let fluxes = self.optimal_fluxes()?;
        let reactions = model
            .reactions_of_metabolite(metabolite_id)
            .map_err(|_| SummaryError::UnknownMetabolite(metabolite_id.to_string()))?;
        let tolerance = Configuration::current().tolerance;

        let mut producing = Vec::new();
        let mut consuming = Vec::new();
        let mut net_rate = 0.;
        for reaction in reactions {
            let flux = fluxes.get(&reaction.id).copied().unwrap_or(0.);
            let coefficient = reaction.coefficient(metabolite_id).unwrap_or(0.);
            let rate = flux * coefficient;
            net_rate += rate;
            let contribution = FluxContribution {
                reaction_id: reaction.id.clone(),
                flux,
                rate,
                percent: 0.,
                definition: reaction.reaction_string(),
            };
            if rate > tolerance {
                producing.push(contribution);
            } else if rate < -tolerance {
                consuming.push(contribution);
            }
        }
        set_percentages(&mut producing);
        set_percentages(&mut consuming);

        Ok(MetaboliteSummary {
            metabolite_id: metabolite_id.to_string(),
            producing,
            consuming,
            net_rate,
        })
    }

    /// Summarize the whole solution: exchange with the environment and all non-zero fluxes
    ///
    /// Reactions with a single metabolite count as exchange reactions. An exchange adding the
    /// metabolite to the system is uptake, one removing it is secretion.
    pub fn model_summary(&self, model: &Model) -> Result<ModelSummary, SummaryError> {
        let fluxes = self.optimal_fluxes()?;
        let tolerance = Configuration::current().tolerance;

        let mut uptake = Vec::new();
        let mut secretion = Vec::new();
        for reaction in model.reactions().filter(|r| r.is_boundary()) {
            let flux = fluxes.get(&reaction.id).copied().unwrap_or(0.);
            if let Some((met_id, coef)) = reaction.metabolites.first() {
                let rate = flux * coef;
                let exchange = ExchangeFlux {
                    metabolite_id: met_id.clone(),
                    reaction_id: reaction.id.clone(),
                    rate: rate.abs(),
                };
                if rate > tolerance {
                    uptake.push(exchange);
                } else if rate < -tolerance {
                    secretion.push(exchange);
                }
            }
        }
        let nonzero_fluxes = fluxes
            .iter()
            .filter(|(_, flux)| flux.abs() > tolerance)
            .map(|(id, flux)| (id.clone(), *flux))
            .collect();

        Ok(ModelSummary {
            objective_value: self.objective_value.unwrap_or(0.),
            uptake,
            secretion,
            fluxes: nonzero_fluxes,
        })
    }
}

fn set_percentages(contributions: &mut [FluxContribution]) {
    let total: f64 = contributions.iter().map(|c| c.rate).sum();
    if total != 0. {
        contributions
            .iter_mut()
            .for_each(|c| c.percent = 100. * c.rate / total);
    }
}

/// Contribution of a single reaction to the turnover of a metabolite
#[derive(Clone, Debug, PartialEq)]
pub struct FluxContribution {
    pub reaction_id: String,
    /// Flux through the reaction
    pub flux: f64,
    /// Rate of production of the metabolite, flux times coefficient
    pub rate: f64,
    /// Share of the total production (or consumption) of the metabolite
    pub percent: f64,
    /// Reaction equation
    pub definition: String,
}

/// Producing and consuming reactions of a metabolite
#[derive(Clone, Debug, PartialEq)]
pub struct MetaboliteSummary {
    pub metabolite_id: String,
    pub producing: Vec<FluxContribution>,
    pub consuming: Vec<FluxContribution>,
    /// Sum of flux times coefficient over all reactions, zero at steady state
    pub net_rate: f64,
}

fn contribution_table(contributions: &[FluxContribution]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Percent", "Flux", "Reaction", "Definition"]);
    for c in contributions {
        builder.push_record([
            format!("{:.2}%", c.percent),
            format!("{:.4}", c.rate),
            c.reaction_id.clone(),
            c.definition.clone(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

impl Display for MetaboliteSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.metabolite_id)?;
        writeln!(f, "Net rate: {:.4}", self.net_rate)?;
        writeln!(f, "Producing Reactions")?;
        writeln!(f, "{}", contribution_table(&self.producing))?;
        writeln!(f, "Consuming Reactions")?;
        write!(f, "{}", contribution_table(&self.consuming))
    }
}

/// Exchange of a metabolite with the environment
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeFlux {
    pub metabolite_id: String,
    pub reaction_id: String,
    /// Magnitude of the exchange rate
    pub rate: f64,
}

/// Overview of an optimal solution
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSummary {
    pub objective_value: f64,
    pub uptake: Vec<ExchangeFlux>,
    pub secretion: Vec<ExchangeFlux>,
    /// Reaction fluxes with magnitude above the tolerance
    pub fluxes: IndexMap<String, f64>,
}

fn exchange_table(exchanges: &[ExchangeFlux]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Metabolite", "Reaction", "Flux"]);
    for e in exchanges {
        builder.push_record([
            e.metabolite_id.clone(),
            e.reaction_id.clone(),
            format!("{:.4}", e.rate),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

impl Display for ModelSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Objective: {:.4}", self.objective_value)?;
        writeln!(f, "Uptake")?;
        writeln!(f, "{}", exchange_table(&self.uptake))?;
        writeln!(f, "Secretion")?;
        writeln!(f, "{}", exchange_table(&self.secretion))?;

        let mut builder = Builder::default();
        builder.push_record(["Reaction", "Flux"]);
        for (id, flux) in self.fluxes.iter() {
            builder.push_record([id.clone(), format!("{:.4}", flux)]);
        }
        let mut table = builder.build();
        table.with(Style::sharp());
        write!(f, "{}", table)
    }
}

/// Errors from summarizing a solution
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SummaryError {
    #[error("Only optimal solutions can be summarized, solution is {0}")]
    InvalidState(SolutionStatus),
    #[error("Metabolite {0} is not in the model")]
    UnknownMetabolite(String),
}
