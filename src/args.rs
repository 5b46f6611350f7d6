use clap::Parser;

/// This is a voting simulator: it samples an electorate in an ideological space and
/// compares the outcome of electoral rules on it.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the simulation parameters in JSON format.
    /// The command line flags override the values of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the outcome of a simulation in JSON format. If provided, vsim will
    /// check that the produced summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the simulation will be written in JSON format to the given
    /// location. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (plurality, majority, ranked-choice, proportional or approval) The voting system to simulate.
    /// The flag can be repeated to compare several systems on the same electorate.
    #[clap(long, value_parser)]
    pub voting_system: Option<Vec<String>>,

    /// (default 10000) The number of voters.
    #[clap(short, long, value_parser)]
    pub population: Option<u32>,

    /// (default 2) The number of candidates.
    #[clap(long, value_parser)]
    pub candidates: Option<u32>,

    /// (default 2) The number of issues, i.e. the dimension of the ideological space.
    #[clap(short, long, value_parser)]
    pub issues: Option<u32>,

    /// (default high) The dispersion of the electorate: none, high, polarized-<k>, centered, bipolar or tripolar.
    #[clap(long, alias = "electorate-scenario", value_parser)]
    pub dispersion: Option<String>,

    /// (default 'default') Where the candidates come from: default or electorate.
    #[clap(long, value_parser)]
    pub candidate_scenario: Option<String>,

    /// (default 1.0) The spread of the voters around their cluster center.
    #[clap(long, value_parser)]
    pub cluster_std: Option<f64>,

    /// (optional) The seed of the random source. A seed is drawn and reported if not provided.
    #[clap(short, long, value_parser)]
    pub seed: Option<u64>,

    /// (proportional, default 349) The number of seats to allocate.
    #[clap(long, value_parser)]
    pub seats: Option<u32>,

    /// (proportional, default 0.04) The minimum share of the electorate needed to get seats.
    #[clap(long, value_parser)]
    pub threshold: Option<f64>,

    /// (proportional, default largest-remainder) The allocation method: largest-remainder, dhondt or sainte-lague.
    #[clap(long, value_parser)]
    pub method: Option<String>,

    /// (approval, default 2) The number of candidates approved by every voter.
    #[clap(long, value_parser)]
    pub approvals: Option<u32>,

    /// (ranked-choice, default single) The elimination algorithm: single or batch.
    #[clap(long, value_parser)]
    pub elimination: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
