use crate::sim::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    pub label: Option<String>,
}

/// The resolved parameters, as written at the top of the summary.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct OutputConfig {
    pub label: Option<String>,
    pub population: u32,
    pub candidates: u32,
    pub issues: u32,
    pub dispersion: String,
    #[serde(rename = "candidateScenario")]
    pub candidate_scenario: String,
    #[serde(rename = "clusterStd")]
    pub cluster_std: f64,
    pub seed: u64,
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSettings {
    #[serde(rename = "votingSystem")]
    pub voting_system: String,
    pub seats: Option<u32>,
    pub threshold: Option<f64>,
    pub method: Option<String>,
    pub approvals: Option<u32>,
    #[serde(rename = "eliminationAlgorithm")]
    pub elimination_algorithm: Option<String>,
}

impl RuleSettings {
    /// The rule with its defaults replaced by the provided parameters.
    ///
    /// Parameters that do not apply to the voting system are ignored.
    pub fn to_rule(&self) -> Result<Rule, SimulationError> {
        let rule = match Rule::from_name(self.voting_system.as_str())? {
            Rule::RankedChoice { elimination } => Rule::RankedChoice {
                elimination: match &self.elimination_algorithm {
                    Some(s) => s.parse()?,
                    None => elimination,
                },
            },
            Rule::Proportional {
                seats,
                threshold,
                method,
            } => Rule::Proportional {
                seats: self.seats.unwrap_or(seats),
                threshold: self.threshold.unwrap_or(threshold),
                method: match &self.method {
                    Some(s) => s.parse()?,
                    None => method,
                },
            },
            Rule::Approval { approvals } => Rule::Approval {
                approvals: self.approvals.unwrap_or(approvals),
            },
            r => r,
        };
        Ok(rule)
    }
}

#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    pub population: Option<u32>,
    pub candidates: Option<u32>,
    pub issues: Option<u32>,
    #[serde(alias = "electorateScenario")]
    pub dispersion: Option<String>,
    #[serde(rename = "candidateScenario")]
    pub candidate_scenario: Option<String>,
    #[serde(rename = "clusterStd")]
    pub cluster_std: Option<f64>,
    pub seed: Option<u64>,
    pub rules: Option<Vec<RuleSettings>>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
}

pub fn read_config(path: &str) -> SimResult<SimConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SimConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> SimResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read content: {:?}", contents);
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
