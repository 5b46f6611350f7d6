use log::{debug, info};

use super::*;

/// Two-round system.
///
/// A candidate with a strict majority of the first preferences is elected in
/// the first round. Otherwise the two best candidates go to a runoff, in which
/// every voter supports the one of the two it prefers.
pub struct Majority;

impl VotingRule for Majority {
    fn name(&self) -> &'static str {
        "majority"
    }

    fn elect(&self, prefs: &PreferenceDeriver) -> Result<ElectionResult, SimulationError> {
        let first = prefs.first_preference_tally();
        let vote_threshold = majority_threshold(&first);
        debug!(
            "majority: first round tally: {:?}, threshold: {}",
            first, vote_threshold
        );

        // Best first: most votes, then lowest id.
        let mut ranked: Vec<(CandidateId, u64)> = tally_to_vec(&first);
        ranked.sort_by(|(c1, v1), (c2, v2)| v2.cmp(v1).then(c1.cmp(c2)));

        let (a, b) = match ranked.as_slice() {
            [(front, count), ..] if *count >= vote_threshold => {
                info!(
                    "majority: {} elected in the first round with {} votes",
                    front, count
                );
                let first_preferences = tally_to_vec(&first);
                return Ok(ElectionResult {
                    winners: vec![*front],
                    tally: first_preferences.clone(),
                    first_preferences: first_preferences.clone(),
                    threshold: Some(vote_threshold),
                    round_stats: vec![RoundStats {
                        round: 1,
                        tally: first_preferences,
                        tally_results_elected: vec![*front],
                        tally_result_eliminated: Vec::new(),
                        tiebreak: false,
                    }],
                });
            }
            [(a, _), (b, _), ..] => (*a, *b),
            _ => return Err(SimulationError::EmptyElection),
        };
        info!("majority: no majority in the first round, runoff between {} and {}", a, b);
        // The second qualifier was chosen by id over a candidate with the same votes.
        let qualification_tiebreak =
            matches!(ranked.as_slice(), [_, (_, v2), (_, v3), ..] if v2 == v3);

        // Runoff, and the transfers of the voters whose candidate did not qualify.
        let mut runoff: Tally = [(a, 0), (b, 0)].into_iter().collect();
        let mut transfers: BTreeMap<CandidateId, Tally> = BTreeMap::new();
        for v in 0..prefs.num_voters() {
            let choice = if prefs.prefers(v, a, b) { a } else { b };
            if let Some(c) = runoff.get_mut(&choice) {
                *c += 1;
            }
            let first_choice = prefs.first_choice(v);
            if first_choice != a && first_choice != b {
                *transfers
                    .entry(first_choice)
                    .or_default()
                    .entry(choice)
                    .or_insert(0) += 1;
            }
        }
        debug!("majority: runoff tally: {:?}", runoff);

        let (winner, count) = leader(&runoff).ok_or(SimulationError::EmptyElection)?;
        let runoff_tiebreak = runoff.values().all(|c| *c == count);
        info!("majority: {} elected in the runoff with {} votes", winner, count);

        // Candidates without any vote have nothing to transfer and are not reported.
        let eliminated: Vec<EliminationStats> = transfers
            .iter()
            .map(|(cid, t)| EliminationStats {
                candidate: *cid,
                transfers: tally_to_vec(t),
            })
            .collect();

        let first_preferences = tally_to_vec(&first);
        let runoff_tally = tally_to_vec(&runoff);
        Ok(ElectionResult {
            winners: vec![winner],
            tally: runoff_tally.clone(),
            first_preferences: first_preferences.clone(),
            threshold: Some(majority_threshold(&runoff)),
            round_stats: vec![
                RoundStats {
                    round: 1,
                    tally: first_preferences,
                    tally_results_elected: Vec::new(),
                    tally_result_eliminated: eliminated,
                    tiebreak: qualification_tiebreak,
                },
                RoundStats {
                    round: 2,
                    tally: runoff_tally,
                    tally_results_elected: vec![winner],
                    tally_result_eliminated: Vec::new(),
                    tiebreak: runoff_tiebreak,
                },
            ],
        })
    }
}
