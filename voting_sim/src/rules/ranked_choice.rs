use log::{debug, info};

use super::*;

/// Instant-runoff voting.
///
/// Every round, the candidate(s) with the fewest votes are eliminated and
/// their voters move to their next preferred candidate still running. The
/// count stops as soon as a candidate holds a strict majority of the ballots,
/// or when a single candidate remains.
pub struct RankedChoice {
    pub elimination: EliminationAlgorithm,
}

// Flag to indicate if a tiebreak happened.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
enum TiebreakSituation {
    Clean,           // Did not happen
    TiebreakOccured, // Happened and had to be resolved.
}

impl VotingRule for RankedChoice {
    fn name(&self) -> &'static str {
        "ranked-choice"
    }

    fn elect(&self, prefs: &PreferenceDeriver) -> Result<ElectionResult, SimulationError> {
        let mut running: Vec<CandidateId> = prefs.candidate_ids();
        // The candidate currently holding the ballot of each voter. Only the
        // first choice is derived up front, the next ones on transfer.
        let mut holders: Vec<CandidateId> =
            (0..prefs.num_voters()).map(|v| prefs.first_choice(v)).collect();
        let mut round_stats: Vec<RoundStats> = Vec::new();
        let mut first_preferences: Vec<(CandidateId, u64)> = Vec::new();

        // Every round eliminates at least one candidate, there are at most K rounds.
        loop {
            let round_id = (round_stats.len() + 1) as u32;
            let tally = compute_tally(&holders, &running);
            let vote_threshold = majority_threshold(&tally);
            debug!(
                "ranked_choice: round {}: tally: {:?}, threshold: {}",
                round_id, tally, vote_threshold
            );
            if round_stats.is_empty() {
                first_preferences = tally_to_vec(&tally);
            }

            let (front, count) = leader(&tally).ok_or(SimulationError::EmptyElection)?;
            if running.len() == 1 || count >= vote_threshold {
                info!(
                    "ranked_choice: round {}: {} elected with {} votes",
                    round_id, front, count
                );
                let final_tally = tally_to_vec(&tally);
                round_stats.push(RoundStats {
                    round: round_id,
                    tally: final_tally.clone(),
                    tally_results_elected: vec![front],
                    tally_result_eliminated: Vec::new(),
                    tiebreak: false,
                });
                return Ok(ElectionResult {
                    winners: vec![front],
                    tally: final_tally,
                    first_preferences,
                    threshold: Some(vote_threshold),
                    round_stats,
                });
            }

            let (eliminated, tiebreak) = find_eliminated_candidates(&tally, self.elimination);
            debug!(
                "ranked_choice: round {}: eliminated: {:?}, tiebreak situation: {:?}",
                round_id, eliminated, tiebreak
            );
            running.retain(|cid| !eliminated.contains(cid));
            assert!(!running.is_empty(), "All the candidates were eliminated");

            // Move the ballots of the eliminated candidates and record the transfers.
            let mut transfers: BTreeMap<CandidateId, Tally> = eliminated
                .iter()
                .map(|cid| (*cid, Tally::new()))
                .collect();
            for (v, holder) in holders.iter_mut().enumerate() {
                if let Some(t) = transfers.get_mut(holder) {
                    let next = prefs
                        .preferred_among(v, &running)
                        .ok_or(SimulationError::EmptyElection)?;
                    *t.entry(next).or_insert(0) += 1;
                    *holder = next;
                }
            }
            for (cid, t) in transfers.iter() {
                info!(
                    "ranked_choice: round {}: {} eliminated, transfers: {:?}",
                    round_id, cid, t
                );
            }

            round_stats.push(RoundStats {
                round: round_id,
                tally: tally_to_vec(&tally),
                tally_results_elected: Vec::new(),
                tally_result_eliminated: transfers
                    .iter()
                    .map(|(cid, t)| EliminationStats {
                        candidate: *cid,
                        transfers: tally_to_vec(t),
                    })
                    .collect(),
                tiebreak: tiebreak == TiebreakSituation::TiebreakOccured,
            });
        }
    }
}

// The tally of the running candidates, including the ones without votes.
fn compute_tally(holders: &[CandidateId], running: &[CandidateId]) -> Tally {
    let mut tally: Tally = running.iter().map(|cid| (*cid, 0)).collect();
    for h in holders.iter() {
        if let Some(c) = tally.get_mut(h) {
            *c += 1;
        }
    }
    tally
}

fn find_eliminated_candidates(
    tally: &Tally,
    algorithm: EliminationAlgorithm,
) -> (Vec<CandidateId>, TiebreakSituation) {
    // Try to eliminate candidates in batch
    if algorithm == EliminationAlgorithm::Batch {
        if let Some(v) = find_eliminated_candidates_batch(tally) {
            return (v, TiebreakSituation::Clean);
        }
    }
    find_eliminated_candidates_single(tally)
}

fn find_eliminated_candidates_batch(tally: &Tally) -> Option<Vec<CandidateId>> {
    // Sort the candidates in increasing tally.
    let mut sorted_tally: Vec<(CandidateId, u64)> = tally_to_vec(tally);
    sorted_tally.sort_by_key(|(_, vc)| *vc);

    // the vote count for this candidate and the cumulative count (excluding the current one)
    let mut sorted_tally_cum: Vec<(CandidateId, u64, u64)> = Vec::new();
    let mut curr_count: u64 = 0;
    for (cid, cur_vc) in sorted_tally.iter() {
        sorted_tally_cum.push((*cid, *cur_vc, curr_count));
        curr_count += *cur_vc;
    }
    debug!(
        "find_eliminated_candidates_batch: sorted_tally_cum: {:?}",
        sorted_tally_cum
    );

    // Find the largest index for which the previous cumulative count is strictly lower than the current vote count.
    // Anything below will not be able to transfer higher.
    let large_gap_idx = sorted_tally_cum
        .iter()
        .enumerate()
        .filter(|(_, (_, cur_vc, previous_cum_count))| previous_cum_count < cur_vc)
        .last();

    // The idx == 0 element is not relevant because the previous cumulative count was zero.
    match large_gap_idx {
        Some((idx, _)) if idx > 0 => {
            let res: Vec<CandidateId> = sorted_tally.iter().map(|(cid, _)| *cid).take(idx).collect();
            debug!(
                "find_eliminated_candidates_batch: found a batch to eliminate: {:?}",
                res
            );
            Some(res)
        }
        _ => {
            debug!("find_eliminated_candidates_batch: no batch to eliminate");
            None
        }
    }
}

// Elimination method for single candidates.
// Among the candidates with the fewest votes, the highest id is eliminated.
fn find_eliminated_candidates_single(tally: &Tally) -> (Vec<CandidateId>, TiebreakSituation) {
    let min_count: u64 = tally.values().copied().min().unwrap_or(0);
    let all_smallest: Vec<CandidateId> = tally
        .iter()
        .filter_map(|(cid, vc)| if *vc <= min_count { Some(*cid) } else { None })
        .collect();
    debug!(
        "find_eliminated_candidates_single: all_smallest: {:?}",
        all_smallest
    );
    let situation = if all_smallest.len() > 1 {
        TiebreakSituation::TiebreakOccured
    } else {
        TiebreakSituation::Clean
    };
    (all_smallest.last().copied().into_iter().collect(), situation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::population::*;

    fn tally(counts: &[u64]) -> Tally {
        counts
            .iter()
            .enumerate()
            .map(|(idx, c)| (CandidateId(idx as u32), *c))
            .collect()
    }

    fn line(candidates: &[f64], voters: &[f64]) -> Population {
        let positions: Vec<Position> = candidates.iter().map(|x| vec![*x]).collect();
        let mut b = Builder::new(1).unwrap().candidates(&positions).unwrap();
        for x in voters {
            b.add_voter(&[*x]).unwrap();
        }
        b.build().unwrap()
    }

    #[test]
    fn single_elimination_ties_remove_highest_id() {
        let (e, tb) = find_eliminated_candidates_single(&tally(&[4, 2, 2, 7]));
        assert_eq!(e, vec![CandidateId(2)]);
        assert_eq!(tb, TiebreakSituation::TiebreakOccured);
        let (e, tb) = find_eliminated_candidates_single(&tally(&[4, 1, 2]));
        assert_eq!(e, vec![CandidateId(1)]);
        assert_eq!(tb, TiebreakSituation::Clean);
    }

    #[test]
    fn batch_elimination() {
        // 1 + 2 < 5 but 1 + 2 + 5 = 8: the two trailing candidates go at once.
        assert_eq!(
            find_eliminated_candidates_batch(&tally(&[1, 9, 2, 5, 8])),
            Some(vec![CandidateId(0), CandidateId(2)])
        );
        // Nothing to gain over single elimination.
        assert_eq!(find_eliminated_candidates_batch(&tally(&[3, 3, 4])), None);
    }

    #[test]
    fn transfers_until_majority() {
        // Round 1: C0 = 3, C1 = 2, C2 = 2 (threshold 4). C2 is eliminated and its
        // voters are nearer to C1.
        let p = line(
            &[0.0, 10.0, 20.0],
            &[0.0, 1.0, 2.0, 9.0, 10.0, 16.0, 17.0],
        );
        let rule = RankedChoice {
            elimination: EliminationAlgorithm::Single,
        };
        let res = rule.elect(&PreferenceDeriver::new(&p)).unwrap();
        assert_eq!(res.winners, vec![CandidateId(1)]);
        assert_eq!(res.round_stats.len(), 2);
        assert_eq!(
            res.round_stats[0].tally_result_eliminated,
            vec![EliminationStats {
                candidate: CandidateId(2),
                transfers: vec![(CandidateId(1), 2)],
            }]
        );
        assert_eq!(res.tally, vec![(CandidateId(0), 3), (CandidateId(1), 4)]);
        assert_eq!(res.threshold, Some(4));
        // C1 and C2 both had 2 votes: C2 went out on its id.
        assert!(res.round_stats[0].tiebreak);
        assert!(!res.round_stats[1].tiebreak);
    }

    #[test]
    fn clean_elimination_has_no_tiebreak() {
        // Round 1: C0 = 3, C1 = 3, C2 = 1. Round 2: C1 = 4.
        let p = line(
            &[0.0, 10.0, 20.0],
            &[0.0, 1.0, 2.0, 9.0, 10.0, 11.0, 17.0],
        );
        let res = RankedChoice {
            elimination: EliminationAlgorithm::Single,
        }
        .elect(&PreferenceDeriver::new(&p))
        .unwrap();
        assert_eq!(
            res.round_stats[0].tally_result_eliminated[0].candidate,
            CandidateId(2)
        );
        assert_eq!(res.winners, vec![CandidateId(1)]);
        assert!(res.round_stats.iter().all(|r| !r.tiebreak));
    }

    #[test]
    fn even_split_leaves_the_lower_id() {
        let p = line(&[0.0, 10.0], &[1.0, 2.0, 9.0, 11.0]);
        let res = RankedChoice {
            elimination: EliminationAlgorithm::Single,
        }
        .elect(&PreferenceDeriver::new(&p))
        .unwrap();
        assert_eq!(res.winners, vec![CandidateId(0)]);
        assert_eq!(res.tally, vec![(CandidateId(0), 4)]);
    }

    #[test]
    fn winner_holds_a_majority_of_the_final_round() {
        for elimination in [EliminationAlgorithm::Single, EliminationAlgorithm::Batch] {
            for seed in 0..8 {
                let p = generate_population(&PopulationConfig {
                    population: 400,
                    candidates: 7,
                    dispersion: Dispersion::Polarized(4),
                    seed,
                    ..PopulationConfig::DEFAULT
                })
                .unwrap();
                let res = RankedChoice { elimination }
                    .elect(&PreferenceDeriver::new(&p))
                    .unwrap();
                let total: u64 = res.tally.iter().map(|(_, c)| c).sum();
                assert_eq!(total, 400);
                let winner_count = res
                    .tally
                    .iter()
                    .find(|(cid, _)| *cid == res.winners[0])
                    .map(|(_, c)| *c)
                    .unwrap();
                assert!(2 * winner_count > total || res.tally.len() == 1);
                assert_eq!(
                    res.first_preferences.iter().map(|(_, c)| c).sum::<u64>(),
                    400
                );
            }
        }
    }
}
