// The electoral rules.
//
// Every rule consumes the preferences of the voters and produces an
// ElectionResult. The rule parameters are validated before counting.

mod approval;
mod majority;
mod plurality;
mod proportional;
mod ranked_choice;

use std::collections::BTreeMap;

use crate::config::*;
use crate::preferences::PreferenceDeriver;

pub use approval::Approval;
pub use majority::Majority;
pub use plurality::Plurality;
pub use proportional::Proportional;
pub use ranked_choice::RankedChoice;

/// Counts per candidate, ordered by candidate id.
pub(crate) type Tally = BTreeMap<CandidateId, u64>;

/// A voting rule: turns the preferences of an electorate into a result.
pub trait VotingRule {
    fn name(&self) -> &'static str;

    fn elect(&self, prefs: &PreferenceDeriver) -> Result<ElectionResult, SimulationError>;
}

/// Creates the implementation corresponding to a rule configuration.
pub fn build_rule(rule: &Rule) -> Box<dyn VotingRule> {
    match *rule {
        Rule::Plurality => Box::new(Plurality),
        Rule::Majority => Box::new(Majority),
        Rule::RankedChoice { elimination } => Box::new(RankedChoice { elimination }),
        Rule::Proportional {
            seats,
            threshold,
            method,
        } => Box::new(Proportional {
            seats,
            threshold,
            method,
        }),
        Rule::Approval { approvals } => Box::new(Approval { approvals }),
    }
}

/// The candidate with the largest count. Ties go to the lowest id.
pub(crate) fn leader(tally: &Tally) -> Option<(CandidateId, u64)> {
    // The map iterates by increasing id: only replace on a strictly larger count.
    tally.iter().fold(None, |best, (&cid, &count)| match best {
        Some((_, best_count)) if best_count >= count => best,
        _ => Some((cid, count)),
    })
}

/// The smallest count that is strictly more than half of the total.
pub(crate) fn majority_threshold(tally: &Tally) -> u64 {
    let total: u64 = tally.values().sum();
    total / 2 + 1
}

pub(crate) fn tally_to_vec(tally: &Tally) -> Vec<(CandidateId, u64)> {
    tally.iter().map(|(cid, c)| (*cid, *c)).collect()
}
