mod aggregate;
pub mod builder;
mod config;
pub mod manual;
mod population;
mod preferences;
mod rules;

use log::{debug, info};

pub use crate::aggregate::*;
pub use crate::config::*;
pub use crate::population::*;
pub use crate::preferences::PreferenceDeriver;
pub use crate::rules::{
    build_rule, Approval, Majority, Plurality, Proportional, RankedChoice, VotingRule,
};

/// Runs one electoral rule on a population.
///
/// Arguments:
/// * `rule` the rule and its parameters
/// * `population` the voters and candidates of this election
///
/// The rule parameters are checked before counting. Populations in which no
/// voter strictly prefers one candidate over another are rejected, since the
/// outcome would only reflect the tie-breaking order.
pub fn evaluate(rule: &Rule, population: &Population) -> Result<ElectionResult, SimulationError> {
    rule.validate(population.num_candidates())?;
    let prefs = PreferenceDeriver::new(population);
    if !prefs.has_strict_preference() {
        return Err(SimulationError::DegenerateElectorate);
    }
    let engine = build_rule(rule);
    info!(
        "Running {} on {} voters and {} candidates",
        engine.name(),
        population.num_voters(),
        population.num_candidates()
    );
    engine.elect(&prefs)
}

/// A population on which several rules can be compared.
pub struct Simulation {
    population: Population,
}

impl Simulation {
    /// Validates the configuration and samples the population.
    pub fn new(config: &PopulationConfig) -> Result<Simulation, SimulationError> {
        Ok(Simulation {
            population: generate_population(config)?,
        })
    }

    pub fn from_population(population: Population) -> Simulation {
        Simulation { population }
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn run(&self, rule: &Rule) -> Result<Report, SimulationError> {
        let result = evaluate(rule, &self.population)?;
        debug!("Simulation::run: {}: {:?}", rule.name(), result);
        Ok(aggregate(rule, result, &self.population))
    }

    /// Runs all the rules on the same population.
    pub fn compare(&self, rules: &[Rule]) -> Result<Vec<Report>, SimulationError> {
        // Check all the rules before running any of them.
        for r in rules {
            r.validate(self.population.num_candidates())?;
        }
        rules.iter().map(|r| self.run(r)).collect()
    }
}

/// One-shot simulation with the default rule parameters.
///
/// Arguments:
/// * `voting_system` the name of the rule (`plurality`, `majority`, `ranked-choice`, `proportional`, `approval`)
/// * `scenario` the candidate scenario (`default` or `electorate`), `default` if not provided
/// * `candidates` the number of candidates
/// * `population` the number of voters
/// * `seed` the seed of the random source
/// * `dispersion` the dispersion of the electorate (`none`, `high`, `polarized-<k>`,
/// `centered`, `bipolar`, `tripolar`), `high` if not provided
pub fn run_simulation(
    voting_system: &str,
    scenario: Option<&str>,
    candidates: u32,
    population: u32,
    seed: u64,
    dispersion: Option<&str>,
) -> Result<Report, SimulationError> {
    // Everything is parsed before sampling.
    let rule = Rule::from_name(voting_system)?;
    let config = PopulationConfig {
        population,
        candidates,
        dispersion: dispersion.map_or(Ok(Dispersion::High), |d| d.parse())?,
        candidate_scenario: scenario.map_or(Ok(CandidateScenario::Default), |s| s.parse())?,
        seed,
        ..PopulationConfig::DEFAULT
    };
    config.validate()?;
    rule.validate(candidates as usize)?;
    Simulation::new(&config)?.run(&rule)
}
