use log::{debug, info};

use super::*;

/// Approval voting: every voter approves its `approvals` nearest candidates,
/// the most approved candidate wins.
pub struct Approval {
    pub approvals: u32,
}

impl VotingRule for Approval {
    fn name(&self) -> &'static str {
        "approval"
    }

    fn elect(&self, prefs: &PreferenceDeriver) -> Result<ElectionResult, SimulationError> {
        let mut approved: Tally = prefs.candidate_ids().into_iter().map(|c| (c, 0)).collect();
        let mut first: Tally = approved.clone();
        for v in 0..prefs.num_voters() {
            let top = prefs.top_k(v, self.approvals as usize);
            if let Some(c) = top.first().and_then(|cid| first.get_mut(cid)) {
                *c += 1;
            }
            for cid in top.iter() {
                if let Some(c) = approved.get_mut(cid) {
                    *c += 1;
                }
            }
        }
        debug!("approval: approvals: {:?}", approved);

        let (winner, count) = leader(&approved).ok_or(SimulationError::EmptyElection)?;
        info!("approval: {} elected with {} approvals", winner, count);
        Ok(ElectionResult {
            winners: vec![winner],
            tally: tally_to_vec(&approved),
            first_preferences: tally_to_vec(&first),
            threshold: None,
            round_stats: Vec::new(),
        })
    }
}
