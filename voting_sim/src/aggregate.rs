use log::debug;

use crate::config::*;

/// How close the outcome sits to the electorate.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Fairness {
    /// Inverse of the mean voter distance to the winners.
    pub unweighted: Option<f64>,
    /// Inverse of the mean voter distance to the candidates, weighted by their
    /// share of the outcome (votes, approvals or seats).
    pub weighted: Option<f64>,
}

/// The reportable summary of one election.
#[derive(PartialEq, Debug, Clone)]
pub struct Report {
    pub rule: Rule,
    pub winners: Vec<CandidateId>,
    pub tally: Vec<(CandidateId, u64)>,
    /// The tally, normalized to 1.0.
    pub shares: Vec<(CandidateId, f64)>,
    pub first_preferences: Vec<(CandidateId, u64)>,
    /// The first preferences, normalized to 1.0.
    pub first_preference_shares: Vec<(CandidateId, f64)>,
    pub threshold: Option<u64>,
    pub round_stats: Vec<RoundStats>,
    pub fairness: Fairness,
}

/// Combines the outcome of an election with the population it was run on.
pub fn aggregate(rule: &Rule, result: ElectionResult, population: &Population) -> Report {
    let shares = normalize(&result.tally);
    let first_preference_shares = normalize(&result.first_preferences);
    let fairness = fairness(&result.winners, &shares, population);
    debug!("aggregate: {}: fairness: {:?}", rule.name(), fairness);
    Report {
        rule: *rule,
        winners: result.winners,
        tally: result.tally,
        shares,
        first_preferences: result.first_preferences,
        first_preference_shares,
        threshold: result.threshold,
        round_stats: result.round_stats,
        fairness,
    }
}

/// Turns counts into shares summing to 1.0. An empty count gives zero shares.
pub fn normalize(tally: &[(CandidateId, u64)]) -> Vec<(CandidateId, f64)> {
    let total: u64 = tally.iter().map(|(_, c)| c).sum();
    tally
        .iter()
        .map(|(cid, c)| {
            let share = if total == 0 {
                0.0
            } else {
                *c as f64 / total as f64
            };
            (*cid, share)
        })
        .collect()
}

/// Mean Euclidean distance of the voters to a candidate.
pub fn mean_distance(population: &Population, cid: CandidateId) -> f64 {
    let c = &population.candidates()[cid.index()].position;
    let total: f64 = population
        .voters()
        .iter()
        .map(|v| {
            v.iter()
                .zip(c.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt()
        })
        .sum();
    total / population.num_voters() as f64
}

fn inverse(d: f64) -> Option<f64> {
    if d > 0.0 {
        Some(1.0 / d)
    } else {
        None
    }
}

fn fairness(
    winners: &[CandidateId],
    shares: &[(CandidateId, f64)],
    population: &Population,
) -> Fairness {
    let unweighted = if winners.is_empty() {
        None
    } else {
        let d: f64 = winners
            .iter()
            .map(|cid| mean_distance(population, *cid))
            .sum::<f64>()
            / winners.len() as f64;
        inverse(d)
    };
    let weighted_d: f64 = shares
        .iter()
        .filter(|(_, s)| *s > 0.0)
        .map(|(cid, s)| s * mean_distance(population, *cid))
        .sum();
    Fairness {
        unweighted,
        weighted: inverse(weighted_d),
    }
}
