use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::config::*;

/// Derives the preferences of the voters from their distance to the candidates.
///
/// Voters prefer nearer candidates (Euclidean distance). Equal distances are
/// resolved in favour of the lower candidate id, so that every voter holds a
/// strict ranking over all the candidates.
///
/// The full ranking of a voter costs O(K log K). Rules that only need the
/// first choice, a pairwise comparison or the first few choices use the
/// dedicated queries, which never build the rankings of the whole electorate.
pub struct PreferenceDeriver<'a> {
    population: &'a Population,
}

impl<'a> PreferenceDeriver<'a> {
    pub fn new(population: &'a Population) -> PreferenceDeriver<'a> {
        PreferenceDeriver { population }
    }

    pub fn population(&self) -> &'a Population {
        self.population
    }

    pub fn num_voters(&self) -> usize {
        self.population.num_voters()
    }

    /// All the candidate ids, in increasing order.
    pub fn candidate_ids(&self) -> Vec<CandidateId> {
        self.population.candidates().iter().map(|c| c.id).collect()
    }

    fn distance_sq(&self, voter: usize, cid: CandidateId) -> f64 {
        let v = &self.population.voters()[voter];
        let c = &self.population.candidates()[cid.index()].position;
        v.iter().zip(c.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    /// Orders two candidates from the point of view of a voter. `Less` means
    /// that `a` is preferred.
    fn compare(&self, voter: usize, a: CandidateId, b: CandidateId) -> Ordering {
        self.distance_sq(voter, a)
            .total_cmp(&self.distance_sq(voter, b))
            .then(a.cmp(&b))
    }

    /// Returns true if the voter ranks `a` above `b`.
    pub fn prefers(&self, voter: usize, a: CandidateId, b: CandidateId) -> bool {
        self.compare(voter, a, b) == Ordering::Less
    }

    pub fn first_choice(&self, voter: usize) -> CandidateId {
        // A population always holds at least 2 candidates.
        (1..self.population.num_candidates() as u32)
            .map(CandidateId)
            .fold(CandidateId(0), |best, cid| {
                if self.prefers(voter, cid, best) {
                    cid
                } else {
                    best
                }
            })
    }

    /// The preferred candidate of the voter among the given ones.
    pub fn preferred_among(&self, voter: usize, remaining: &[CandidateId]) -> Option<CandidateId> {
        remaining
            .iter()
            .copied()
            .min_by(|a, b| self.compare(voter, *a, *b))
    }

    /// The k preferred candidates of the voter, best first.
    pub fn top_k(&self, voter: usize, k: usize) -> Vec<CandidateId> {
        let mut cids = self.candidate_ids();
        let k = k.min(cids.len());
        if k == 0 {
            return Vec::new();
        }
        if k < cids.len() {
            cids.select_nth_unstable_by(k - 1, |a, b| self.compare(voter, *a, *b));
            cids.truncate(k);
        }
        cids.sort_by(|a, b| self.compare(voter, *a, *b));
        cids
    }

    /// The complete ranking of the voter, best first.
    pub fn ranking(&self, voter: usize) -> Vec<CandidateId> {
        let mut cids = self.candidate_ids();
        cids.sort_by(|a, b| self.compare(voter, *a, *b));
        cids
    }

    /// The rankings of all the voters.
    ///
    /// This materializes a population × candidates matrix.
    pub fn rankings(&self) -> Vec<Vec<CandidateId>> {
        (0..self.num_voters()).map(|v| self.ranking(v)).collect()
    }

    /// First-preference votes of every candidate, including the ones without votes.
    pub fn first_preference_tally(&self) -> BTreeMap<CandidateId, u64> {
        let mut tally: BTreeMap<CandidateId, u64> =
            self.candidate_ids().into_iter().map(|cid| (cid, 0)).collect();
        for v in 0..self.num_voters() {
            if let Some(c) = tally.get_mut(&self.first_choice(v)) {
                *c += 1;
            }
        }
        tally
    }

    /// True if at least one voter is not equidistant from all the candidates.
    pub fn has_strict_preference(&self) -> bool {
        (0..self.num_voters()).any(|v| {
            let d0 = self.distance_sq(v, CandidateId(0));
            (1..self.population.num_candidates() as u32)
                .any(|c| self.distance_sq(v, CandidateId(c)) != d0)
        })
    }
}
