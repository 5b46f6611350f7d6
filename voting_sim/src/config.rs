// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// A point in the ideological space. Every coordinate is one "issue".
pub type Position = Vec<f64>;

/// The identifier of a candidate.
///
/// Identifiers are the 0-based index of the candidate in the population. All the
/// tie-breaks of this crate favour the lower identifier.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CandidateId(pub u32);

impl CandidateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "C{}", self.0)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Candidate {
    pub id: CandidateId,
    pub position: Position,
}

/// Voters and candidates placed in the same space.
///
/// Invariants (checked at construction):
/// - at least one voter and two candidates
/// - all positions have the same, non-zero, number of dimensions
/// - all coordinates are finite
#[derive(PartialEq, Debug, Clone)]
pub struct Population {
    dimensions: usize,
    voters: Vec<Position>,
    candidates: Vec<Candidate>,
}

impl Population {
    pub fn new(
        voters: Vec<Position>,
        candidate_positions: Vec<Position>,
    ) -> Result<Population, SimulationError> {
        if voters.is_empty() {
            return Err(SimulationError::InvalidConfiguration(
                "the population needs at least one voter".to_string(),
            ));
        }
        if candidate_positions.len() < 2 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "at least 2 candidates are required, got {}",
                candidate_positions.len()
            )));
        }
        let dimensions = voters[0].len();
        if dimensions == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "positions need at least one dimension".to_string(),
            ));
        }
        for p in voters.iter().chain(candidate_positions.iter()) {
            if p.len() != dimensions {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "position {:?} does not have {} dimensions",
                    p, dimensions
                )));
            }
            if p.iter().any(|x| !x.is_finite()) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "position {:?} is not finite",
                    p
                )));
            }
        }
        let candidates = candidate_positions
            .into_iter()
            .enumerate()
            .map(|(idx, position)| Candidate {
                id: CandidateId(idx as u32),
                position,
            })
            .collect();
        Ok(Population {
            dimensions,
            voters,
            candidates,
        })
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn voters(&self) -> &[Position] {
        &self.voters
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn num_voters(&self) -> usize {
        self.voters.len()
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }
}

/// How voters are spread in the ideological space.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Dispersion {
    /// Every voter sits at the origin.
    None,
    /// A wide isotropic normal distribution around the origin.
    High,
    /// Voters are drawn around k separated cluster centers.
    Polarized(u32),
}

impl FromStr for Dispersion {
    type Err = SimulationError;

    /// Accepts `none`, `high`, `polarized-<k>` and the named scenarios
    /// `centered`, `bipolar` and `tripolar`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Dispersion::None),
            "high" => Ok(Dispersion::High),
            "centered" => Ok(Dispersion::Polarized(1)),
            "bipolar" => Ok(Dispersion::Polarized(2)),
            "tripolar" => Ok(Dispersion::Polarized(3)),
            x => match x.strip_prefix("polarized-").map(|k| k.parse::<u32>()) {
                Some(Ok(k)) if k >= 1 => Ok(Dispersion::Polarized(k)),
                _ => Err(SimulationError::InvalidConfiguration(format!(
                    "unknown dispersion {:?}",
                    x
                ))),
            },
        }
    }
}

impl Display for Dispersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dispersion::None => write!(f, "none"),
            Dispersion::High => write!(f, "high"),
            Dispersion::Polarized(k) => write!(f, "polarized-{}", k),
        }
    }
}

/// Where the candidates come from.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum CandidateScenario {
    /// Isotropic normal around the origin, independent of the electorate.
    Default,
    /// Sampled from the same dispersion model as the voters.
    Electorate,
}

impl FromStr for CandidateScenario {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(CandidateScenario::Default),
            "electorate" => Ok(CandidateScenario::Electorate),
            x => Err(SimulationError::InvalidConfiguration(format!(
                "unknown candidate scenario {:?}",
                x
            ))),
        }
    }
}

impl Display for CandidateScenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateScenario::Default => write!(f, "default"),
            CandidateScenario::Electorate => write!(f, "electorate"),
        }
    }
}

// ********* Rules **********

/// The elimination algorithm to apply in ranked-choice elections.
///
/// - Single eliminates one candidate at a time. This is the easiest to
/// understand, but it may add many more rounds when there a lot of
/// candidates with a comparatively very low number of votes.
///
/// - Batch eliminates, in one round, all the trailing candidates whose
/// combined votes are lower than the votes of the next candidate: none of
/// them could overtake it through transfers.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum EliminationAlgorithm {
    Batch,
    Single,
}

impl FromStr for EliminationAlgorithm {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(EliminationAlgorithm::Single),
            "batch" => Ok(EliminationAlgorithm::Batch),
            x => Err(SimulationError::InvalidConfiguration(format!(
                "unknown elimination algorithm {:?}",
                x
            ))),
        }
    }
}

impl Display for EliminationAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EliminationAlgorithm::Single => write!(f, "single"),
            EliminationAlgorithm::Batch => write!(f, "batch"),
        }
    }
}

/// Seat allocation methods for proportional elections.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum AllocationMethod {
    /// Hare quota, leftover seats to the largest remainders.
    LargestRemainder,
    /// Divisors 1, 2, 3, ...
    DHondt,
    /// Divisors 1, 3, 5, ...
    SainteLague,
}

impl FromStr for AllocationMethod {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "largest-remainder" | "largestRemainder" | "hare" => {
                Ok(AllocationMethod::LargestRemainder)
            }
            "dhondt" | "d'hondt" => Ok(AllocationMethod::DHondt),
            "sainte-lague" | "sainteLague" => Ok(AllocationMethod::SainteLague),
            x => Err(SimulationError::InvalidConfiguration(format!(
                "unknown allocation method {:?}",
                x
            ))),
        }
    }
}

impl Display for AllocationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationMethod::LargestRemainder => write!(f, "largest-remainder"),
            AllocationMethod::DHondt => write!(f, "dhondt"),
            AllocationMethod::SainteLague => write!(f, "sainte-lague"),
        }
    }
}

/// The electoral rule of an election, with its parameters.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Rule {
    Plurality,
    /// Two-round runoff.
    Majority,
    /// Instant runoff.
    RankedChoice { elimination: EliminationAlgorithm },
    Proportional {
        seats: u32,
        /// Minimum share of the electorate (in [0, 1)) to take part in the allocation.
        threshold: f64,
        method: AllocationMethod,
    },
    /// Every voter approves its `approvals` nearest candidates.
    Approval { approvals: u32 },
}

impl Rule {
    pub const DEFAULT_SEATS: u32 = 349;
    pub const DEFAULT_THRESHOLD: f64 = 0.04;
    pub const DEFAULT_APPROVALS: u32 = 2;

    pub const RANKED_CHOICE: Rule = Rule::RankedChoice {
        elimination: EliminationAlgorithm::Single,
    };

    pub const PROPORTIONAL: Rule = Rule::Proportional {
        seats: Rule::DEFAULT_SEATS,
        threshold: Rule::DEFAULT_THRESHOLD,
        method: AllocationMethod::LargestRemainder,
    };

    pub const APPROVAL: Rule = Rule::Approval {
        approvals: Rule::DEFAULT_APPROVALS,
    };

    /// Looks up a rule by name, with the default parameters.
    pub fn from_name(name: &str) -> Result<Rule, SimulationError> {
        match name {
            "plurality" => Ok(Rule::Plurality),
            "majority" => Ok(Rule::Majority),
            "ranked-choice" | "rcv" | "irv" => Ok(Rule::RANKED_CHOICE),
            "proportional" => Ok(Rule::PROPORTIONAL),
            "approval" => Ok(Rule::APPROVAL),
            x => Err(SimulationError::InvalidRule(x.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Plurality => "plurality",
            Rule::Majority => "majority",
            Rule::RankedChoice { .. } => "ranked-choice",
            Rule::Proportional { .. } => "proportional",
            Rule::Approval { .. } => "approval",
        }
    }

    /// Checks the parameters of the rule against the number of candidates.
    pub fn validate(&self, num_candidates: usize) -> Result<(), SimulationError> {
        match *self {
            Rule::Proportional {
                seats, threshold, ..
            } => {
                if seats == 0 {
                    return Err(SimulationError::InvalidConfiguration(
                        "proportional elections need at least one seat".to_string(),
                    ));
                }
                if !(0.0..1.0).contains(&threshold) {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "threshold must be in [0, 1), got {}",
                        threshold
                    )));
                }
                Ok(())
            }
            Rule::Approval { approvals } => {
                if approvals == 0 || approvals as usize > num_candidates {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "approvals must be between 1 and {}, got {}",
                        num_candidates, approvals
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for Rule {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rule::from_name(s)
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EliminationStats {
    pub candidate: CandidateId,
    /// Where the supporters of the eliminated candidate went.
    pub transfers: Vec<(CandidateId, u64)>,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    pub tally: Vec<(CandidateId, u64)>,
    pub tally_results_elected: Vec<CandidateId>,
    pub tally_result_eliminated: Vec<EliminationStats>,
    /// Equal counts had to be broken by candidate id to decide this round.
    pub tiebreak: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectionResult {
    /// The winner for single-winner rules, the seat holders (most seats first)
    /// for proportional elections.
    pub winners: Vec<CandidateId>,
    /// The deciding count: final round votes, approvals or seats.
    pub tally: Vec<(CandidateId, u64)>,
    /// The first-preference votes of every candidate.
    pub first_preferences: Vec<(CandidateId, u64)>,
    /// Winning vote threshold, for the rules that have one.
    pub threshold: Option<u64>,
    pub round_stats: Vec<RoundStats>,
}

/// Errors that prevent a simulation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SimulationError {
    InvalidConfiguration(String),
    InvalidRule(String),
    /// No voter strictly prefers any candidate over another one.
    DegenerateElectorate,
    /// No candidate reached the threshold of a proportional election.
    NoQualifyingCandidate,
    /// A count ended up without any candidate to elect. Populations always
    /// hold at least two candidates, so the rules only return it if their
    /// tally bookkeeping is broken.
    EmptyElection,
}

impl Error for SimulationError {}

impl Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::InvalidConfiguration(msg) => {
                write!(f, "invalid configuration: {}", msg)
            }
            SimulationError::InvalidRule(name) => write!(f, "unsupported voting system {:?}", name),
            SimulationError::DegenerateElectorate => write!(
                f,
                "degenerate electorate: every voter is indifferent between all the candidates"
            ),
            SimulationError::NoQualifyingCandidate => {
                write!(f, "no candidate reached the proportional threshold")
            }
            SimulationError::EmptyElection => write!(f, "empty election"),
        }
    }
}
