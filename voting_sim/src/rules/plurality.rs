use log::{debug, info};

use super::*;

/// First past the post: the most first-preference votes wins.
pub struct Plurality;

impl VotingRule for Plurality {
    fn name(&self) -> &'static str {
        "plurality"
    }

    fn elect(&self, prefs: &PreferenceDeriver) -> Result<ElectionResult, SimulationError> {
        let tally = prefs.first_preference_tally();
        debug!("plurality: tally: {:?}", tally);
        let (winner, count) = leader(&tally).ok_or(SimulationError::EmptyElection)?;
        info!("plurality: {} elected with {} votes", winner, count);
        let first_preferences = tally_to_vec(&tally);
        Ok(ElectionResult {
            winners: vec![winner],
            tally: first_preferences.clone(),
            first_preferences,
            threshold: None,
            round_stats: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use crate::population::*;

    #[test]
    fn two_two_tie_goes_to_lower_id() {
        let mut b = Builder::new(1)
            .unwrap()
            .candidates(&[vec![0.0], vec![10.0]])
            .unwrap();
        for x in [1.0, 2.0, 9.0, 11.0] {
            b.add_voter(&[x]).unwrap();
        }
        let p = b.build().unwrap();
        let res = Plurality.elect(&PreferenceDeriver::new(&p)).unwrap();
        assert_eq!(res.winners, vec![CandidateId(0)]);
        assert_eq!(
            res.tally,
            vec![(CandidateId(0), 2), (CandidateId(1), 2)]
        );
    }

    #[test]
    fn winner_has_the_most_votes() {
        for seed in 0..10 {
            let p = generate_population(&PopulationConfig {
                population: 500,
                candidates: 5,
                dispersion: Dispersion::Polarized(3),
                seed,
                ..PopulationConfig::DEFAULT
            })
            .unwrap();
            let res = Plurality.elect(&PreferenceDeriver::new(&p)).unwrap();
            let winner_count = res
                .tally
                .iter()
                .find(|(cid, _)| *cid == res.winners[0])
                .map(|(_, c)| *c)
                .unwrap();
            assert!(res.tally.iter().all(|(_, c)| *c <= winner_count));
            assert_eq!(res.tally.iter().map(|(_, c)| c).sum::<u64>(), 500);
        }
    }
}
