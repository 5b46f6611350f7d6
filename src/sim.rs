use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use voting_sim::*;

use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::sim::config_reader::*;

pub mod config_reader;

#[derive(Debug, Snafu)]
pub enum SimError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Simulation error: {source}"))]
    Simulation { source: SimulationError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SimResult<T> = Result<T, SimError>;

fn tally_to_json(tally: &[(CandidateId, u64)]) -> JSMap<String, JSValue> {
    let mut js: JSMap<String, JSValue> = JSMap::new();
    for (cid, count) in tally {
        js.insert(cid.to_string(), json!(count.to_string()));
    }
    js
}

fn shares_to_json(shares: &[(CandidateId, f64)]) -> JSMap<String, JSValue> {
    let mut js: JSMap<String, JSValue> = JSMap::new();
    for (cid, share) in shares {
        js.insert(cid.to_string(), json!(share));
    }
    js
}

fn round_stats_to_json(round_stats: &[RoundStats]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in round_stats {
        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round_stat.tally_result_eliminated.iter() {
            tally_results.push(json!({
                "eliminated": elim_stats.candidate.to_string(),
                "transfers": tally_to_json(&elim_stats.transfers)
            }));
        }
        for winner in round_stat.tally_results_elected.iter() {
            tally_results.push(json!({
                "elected": winner.to_string(),
                "transfers": {}
            }));
        }
        let mut js = json!({
            "round": round_stat.round,
            "tally": tally_to_json(&round_stat.tally),
            "tallyResults": tally_results
        });
        // Only flagged when the round was decided by candidate id.
        if round_stat.tiebreak {
            js["tiebreak"] = json!(true);
        }
        l.push(js);
    }
    l
}

fn rule_parameters_to_json(rule: &Rule) -> JSValue {
    match *rule {
        Rule::RankedChoice { elimination } => {
            json!({ "eliminationAlgorithm": elimination.to_string() })
        }
        Rule::Proportional {
            seats,
            threshold,
            method,
        } => json!({ "seats": seats, "threshold": threshold, "method": method.to_string() }),
        Rule::Approval { approvals } => json!({ "approvals": approvals }),
        Rule::Plurality | Rule::Majority => json!({}),
    }
}

fn report_to_json(report: &Report) -> JSValue {
    let winners: Vec<String> = report.winners.iter().map(|c| c.to_string()).collect();
    let mut js: JSMap<String, JSValue> = JSMap::new();
    js.insert("votingSystem".to_string(), json!(report.rule.name()));
    js.insert("parameters".to_string(), rule_parameters_to_json(&report.rule));
    js.insert("winners".to_string(), json!(winners));
    js.insert("tally".to_string(), json!(tally_to_json(&report.tally)));
    if let Rule::Proportional { .. } = report.rule {
        // The tally holds the seats, the shares are the votes.
        js.insert(
            "shares".to_string(),
            json!(shares_to_json(&report.first_preference_shares)),
        );
        js.insert(
            "seatShares".to_string(),
            json!(shares_to_json(&report.shares)),
        );
    } else {
        js.insert("shares".to_string(), json!(shares_to_json(&report.shares)));
    }
    if let Some(t) = report.threshold {
        js.insert("threshold".to_string(), json!(t.to_string()));
    }
    js.insert(
        "rounds".to_string(),
        json!(round_stats_to_json(&report.round_stats)),
    );
    js.insert(
        "fairness".to_string(),
        json!({
            "unweighted": report.fairness.unweighted,
            "weighted": report.fairness.weighted
        }),
    );
    JSValue::Object(js)
}

fn build_summary_js(
    config: &PopulationConfig,
    output_settings: &OutputSettings,
    reports: &[Report],
) -> JSValue {
    let c = OutputConfig {
        label: output_settings.label.clone(),
        population: config.population,
        candidates: config.candidates,
        issues: config.dimensions,
        dispersion: config.dispersion.to_string(),
        candidate_scenario: config.candidate_scenario.to_string(),
        cluster_std: config.cluster_std,
        seed: config.seed,
    };
    let results: Vec<JSValue> = reports.iter().map(report_to_json).collect();
    json!({
        "config": c,
        "results": results })
}

/// The population parameters: flags first, then the configuration file, then the defaults.
fn resolve_population_config(args: &Args, config: &SimConfig) -> SimResult<PopulationConfig> {
    let defaults = PopulationConfig::DEFAULT;
    let dispersion = match args.dispersion.as_ref().or(config.dispersion.as_ref()) {
        Some(s) => s.parse::<Dispersion>().context(SimulationSnafu {})?,
        None => defaults.dispersion,
    };
    let candidate_scenario = match args
        .candidate_scenario
        .as_ref()
        .or(config.candidate_scenario.as_ref())
    {
        Some(s) => s.parse::<CandidateScenario>().context(SimulationSnafu {})?,
        None => defaults.candidate_scenario,
    };
    let seed = match args.seed.or(config.seed) {
        Some(s) => s,
        None => {
            let s: u64 = rand::random();
            info!("No seed provided, using seed {}", s);
            s
        }
    };
    let res = PopulationConfig {
        population: args
            .population
            .or(config.population)
            .unwrap_or(defaults.population),
        candidates: args
            .candidates
            .or(config.candidates)
            .unwrap_or(defaults.candidates),
        dimensions: args.issues.or(config.issues).unwrap_or(defaults.dimensions),
        dispersion,
        candidate_scenario,
        cluster_std: args
            .cluster_std
            .or(config.cluster_std)
            .unwrap_or(defaults.cluster_std),
        seed,
    };
    res.validate().context(SimulationSnafu {})?;
    Ok(res)
}

/// The rules to compare. The voting systems given as flags replace the ones of the
/// configuration file, and the rule parameters given as flags apply to all the rules.
fn resolve_rules(args: &Args, config: &SimConfig) -> SimResult<Vec<Rule>> {
    let settings: Vec<RuleSettings> = match (&args.voting_system, &config.rules) {
        (Some(names), _) => names
            .iter()
            .map(|n| RuleSettings {
                voting_system: n.clone(),
                ..RuleSettings::default()
            })
            .collect(),
        (None, Some(rules)) => rules.clone(),
        (None, None) => vec![RuleSettings {
            voting_system: Rule::Plurality.name().to_string(),
            ..RuleSettings::default()
        }],
    };
    if settings.is_empty() {
        whatever!("No voting system to simulate");
    }
    let mut res: Vec<Rule> = Vec::new();
    for rs in settings {
        let merged = RuleSettings {
            voting_system: rs.voting_system,
            seats: args.seats.or(rs.seats),
            threshold: args.threshold.or(rs.threshold),
            method: args.method.clone().or(rs.method),
            approvals: args.approvals.or(rs.approvals),
            elimination_algorithm: args.elimination.clone().or(rs.elimination_algorithm),
        };
        res.push(merged.to_rule().context(SimulationSnafu {})?);
    }
    Ok(res)
}

fn resolve_output_settings(args: &Args, config: &SimConfig) -> OutputSettings {
    let file_settings = config.output_settings.clone().unwrap_or_default();
    OutputSettings {
        output_path: args.out.clone().or(file_settings.output_path),
        label: file_settings.label,
    }
}

fn write_summary(output_path: Option<&str>, pretty_js: &str) -> SimResult<()> {
    match output_path {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(path, pretty_js).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

fn check_summary(reference_path: &str, pretty_js_stats: &str) -> SimResult<()> {
    let summary_ref = read_summary(reference_path)?;
    debug!("summary: {:?}", summary_ref);
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        whatever!("Difference detected between calculated summary and reference summary")
    }
    Ok(())
}

pub fn run(args: &Args) -> SimResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => SimConfig::default(),
    };
    let population_config = resolve_population_config(args, &config)?;
    let rules = resolve_rules(args, &config)?;
    let output_settings = resolve_output_settings(args, &config);
    info!(
        "Simulating {:?} with {:?}",
        rules.iter().map(|r| r.name()).collect::<Vec<&str>>(),
        population_config
    );

    let sim = Simulation::new(&population_config).context(SimulationSnafu {})?;
    let reports = sim.compare(&rules).context(SimulationSnafu {})?;
    for r in reports.iter() {
        info!("{}: winners: {:?}", r.rule.name(), r.winners);
    }

    let result_js = build_summary_js(&population_config, &output_settings, &reports);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(output_settings.output_path.as_deref(), &pretty_js_stats)?;

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        check_summary(reference_path, &pretty_js_stats)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn temp_path(name: &str) -> String {
        let p: PathBuf = std::env::temp_dir().join(format!(
            "vsim_{}_{}.json",
            name,
            std::process::id()
        ));
        p.display().to_string()
    }

    fn test_data(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn run_to_json(cmd: &[&str], name: &str) -> JSValue {
        init();
        let out = temp_path(name);
        let mut full: Vec<&str> = cmd.to_vec();
        full.extend(["-o", out.as_str()]);
        let args = Args::parse_from(full);
        run(&args).unwrap();
        let js = read_summary(out.as_str()).unwrap();
        let _ = fs::remove_file(out);
        js
    }

    fn count(js: &JSValue) -> u64 {
        js.as_str().unwrap().parse::<u64>().unwrap()
    }

    #[test]
    fn compare_from_flags() {
        let js = run_to_json(
            &[
                "vsim",
                "--voting-system",
                "plurality",
                "--voting-system",
                "proportional",
                "--seats",
                "10",
                "--threshold",
                "0.0",
                "-p",
                "500",
                "--candidates",
                "4",
                "-s",
                "3",
            ],
            "compare_from_flags",
        );
        assert_eq!(js["config"]["seed"], json!(3));
        assert_eq!(js["config"]["population"], json!(500));
        let results = js["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["votingSystem"], json!("plurality"));

        let votes: u64 = results[0]["tally"]
            .as_object()
            .unwrap()
            .values()
            .map(count)
            .sum();
        assert_eq!(votes, 500);

        assert_eq!(results[1]["parameters"]["seats"], json!(10));
        let seats: u64 = results[1]["tally"]
            .as_object()
            .unwrap()
            .values()
            .map(count)
            .sum();
        assert_eq!(seats, 10);
        assert!(results[1]["seatShares"].is_object());
    }

    #[test]
    fn ranked_choice_rounds() {
        let js = run_to_json(
            &[
                "vsim",
                "--voting-system",
                "rcv",
                "--candidates",
                "5",
                "-p",
                "1000",
                "--dispersion",
                "tripolar",
                "-s",
                "11",
            ],
            "ranked_choice_rounds",
        );
        let result = &js["results"][0];
        assert_eq!(result["votingSystem"], json!("ranked-choice"));
        let rounds = result["rounds"].as_array().unwrap();
        assert!(!rounds.is_empty());
        let last = &rounds[rounds.len() - 1]["tallyResults"];
        let winner = result["winners"][0].as_str().unwrap();
        assert!(last
            .as_array()
            .unwrap()
            .iter()
            .any(|tr| tr["elected"].as_str() == Some(winner)));
    }

    #[test]
    fn tiebreaks_are_flagged_in_rounds() {
        let rounds = round_stats_to_json(&[
            RoundStats {
                round: 1,
                tally: vec![(CandidateId(0), 3), (CandidateId(1), 2), (CandidateId(2), 2)],
                tally_results_elected: Vec::new(),
                tally_result_eliminated: vec![EliminationStats {
                    candidate: CandidateId(2),
                    transfers: vec![(CandidateId(1), 2)],
                }],
                tiebreak: true,
            },
            RoundStats {
                round: 2,
                tally: vec![(CandidateId(0), 3), (CandidateId(1), 4)],
                tally_results_elected: vec![CandidateId(1)],
                tally_result_eliminated: Vec::new(),
                tiebreak: false,
            },
        ]);
        assert_eq!(rounds[0]["tiebreak"], json!(true));
        assert_eq!(rounds[0]["tallyResults"][0]["eliminated"], json!("C2"));
        assert_eq!(rounds[0]["tallyResults"][0]["transfers"]["C1"], json!("2"));
        assert!(rounds[1].get("tiebreak").is_none());
        assert_eq!(rounds[1]["tallyResults"][0]["elected"], json!("C1"));
    }

    #[test]
    fn config_file_with_overrides() {
        let config = test_data("bipolar_config.json");
        let js = run_to_json(
            &["vsim", "-c", config.as_str(), "-p", "300"],
            "config_file_with_overrides",
        );
        assert_eq!(js["config"]["population"], json!(300));
        assert_eq!(js["config"]["dispersion"], json!("polarized-2"));
        assert_eq!(js["config"]["label"], json!("bipolar electorate"));
        let results = js["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[1]["parameters"]["eliminationAlgorithm"],
            json!("batch")
        );
        assert_eq!(results[2]["parameters"]["method"], json!("dhondt"));
    }

    #[test]
    fn drawn_seed_is_reported() {
        let cmd = ["vsim", "-p", "200", "--candidates", "3"];
        let first = run_to_json(&cmd, "drawn_seed_is_reported_1");
        let seed = first["config"]["seed"].as_u64().unwrap().to_string();
        let mut replay: Vec<&str> = cmd.to_vec();
        replay.extend(["-s", seed.as_str()]);
        let second = run_to_json(&replay, "drawn_seed_is_reported_2");
        assert_eq!(first, second);
    }

    #[test]
    fn reference_check() {
        init();
        let reference = temp_path("reference_check_ref");
        let cmd = [
            "vsim",
            "--voting-system",
            "majority",
            "--candidates",
            "3",
            "-p",
            "400",
            "-s",
            "5",
        ];
        let mut first: Vec<&str> = cmd.to_vec();
        first.extend(["-o", reference.as_str()]);
        run(&Args::parse_from(first)).unwrap();

        let out = temp_path("reference_check_out");
        let mut same: Vec<&str> = cmd.to_vec();
        same.extend(["-o", out.as_str(), "-r", reference.as_str()]);
        assert!(run(&Args::parse_from(same)).is_ok());

        let other = [
            "vsim",
            "--voting-system",
            "majority",
            "--candidates",
            "3",
            "-p",
            "400",
            "-s",
            "6",
            "-o",
            out.as_str(),
            "-r",
            reference.as_str(),
        ];
        assert!(matches!(
            run(&Args::parse_from(other)),
            Err(SimError::Whatever { .. })
        ));
        let _ = fs::remove_file(reference);
        let _ = fs::remove_file(out);
    }

    #[test]
    fn invalid_inputs() {
        init();
        let res = run(&Args::parse_from(["vsim", "--voting-system", "borda", "-s", "1"]));
        assert!(matches!(
            res,
            Err(SimError::Simulation {
                source: SimulationError::InvalidRule(_)
            })
        ));
        let res = run(&Args::parse_from(["vsim", "--candidates", "1", "-s", "1"]));
        assert!(matches!(res, Err(SimError::Simulation { .. })));
        let res = run(&Args::parse_from([
            "vsim",
            "--voting-system",
            "approval",
            "--approvals",
            "5",
            "--candidates",
            "3",
            "-s",
            "1",
        ]));
        assert!(matches!(res, Err(SimError::Simulation { .. })));
        let res = run(&Args::parse_from(["vsim", "-c", "/nonexistent/vsim.json"]));
        assert!(matches!(res, Err(SimError::OpeningJson { .. })));
    }
}
