use log::{debug, info};

use super::*;

/// Party-list proportional representation.
///
/// The seats are allocated from the first-preference votes. Candidates whose
/// share of the electorate is below the threshold get no seat and their votes
/// are removed from the allocation base.
pub struct Proportional {
    pub seats: u32,
    pub threshold: f64,
    pub method: AllocationMethod,
}

impl VotingRule for Proportional {
    fn name(&self) -> &'static str {
        "proportional"
    }

    fn elect(&self, prefs: &PreferenceDeriver) -> Result<ElectionResult, SimulationError> {
        let votes = prefs.first_preference_tally();
        let electorate = prefs.num_voters() as f64;

        let qualifying: Vec<(CandidateId, u64)> = votes
            .iter()
            .filter(|(_, v)| (**v as f64) / electorate >= self.threshold)
            .map(|(cid, v)| (*cid, *v))
            .collect();
        debug!(
            "proportional: {} of {} candidates above threshold {}: {:?}",
            qualifying.len(),
            votes.len(),
            self.threshold,
            qualifying
        );
        if qualifying.is_empty() {
            return Err(SimulationError::NoQualifyingCandidate);
        }

        let allocated: Tally = match self.method {
            AllocationMethod::LargestRemainder => largest_remainder(&qualifying, self.seats),
            AllocationMethod::DHondt => highest_averages(&qualifying, self.seats, |s| s + 1),
            AllocationMethod::SainteLague => {
                highest_averages(&qualifying, self.seats, |s| 2 * s + 1)
            }
        };
        debug!("proportional: {} allocation: {:?}", self.method, allocated);

        let mut seats: Tally = votes.keys().map(|cid| (*cid, 0)).collect();
        seats.extend(allocated);

        // Seat holders, most seats first.
        let mut winners: Vec<(CandidateId, u64)> =
            seats.iter().filter(|(_, s)| **s > 0).map(|(c, s)| (*c, *s)).collect();
        winners.sort_by(|(c1, s1), (c2, s2)| s2.cmp(s1).then(c1.cmp(c2)));
        info!("proportional: seats: {:?}", winners);

        Ok(ElectionResult {
            winners: winners.iter().map(|(cid, _)| *cid).collect(),
            tally: tally_to_vec(&seats),
            first_preferences: tally_to_vec(&votes),
            threshold: None,
            round_stats: Vec::new(),
        })
    }
}

/// Hare quota: every candidate first receives the integer part of its quota,
/// the leftover seats go to the largest remainders (lower id on ties).
fn largest_remainder(votes: &[(CandidateId, u64)], seats: u32) -> Tally {
    let base: u128 = votes.iter().map(|(_, v)| *v as u128).sum();
    let seats_u = seats as u128;
    if base == 0 {
        return votes.iter().map(|(cid, _)| (*cid, 0)).collect();
    }

    // quota = v * seats / base, kept as an exact fraction.
    let mut res: Tally = Tally::new();
    let mut remainders: Vec<(CandidateId, u128)> = Vec::new();
    for (cid, v) in votes.iter() {
        let numerator = (*v as u128) * seats_u;
        res.insert(*cid, (numerator / base) as u64);
        remainders.push((*cid, numerator % base));
    }
    let allocated: u64 = res.values().sum();
    let leftover = (seats as u64).saturating_sub(allocated) as usize;
    remainders.sort_by(|(c1, r1), (c2, r2)| r2.cmp(r1).then(c1.cmp(c2)));
    for (cid, _) in remainders.iter().take(leftover) {
        if let Some(s) = res.get_mut(cid) {
            *s += 1;
        }
    }
    res
}

/// Divisor methods: every seat goes to the candidate with the highest average
/// votes / divisor(seats already won). Equal averages go to the lower id.
fn highest_averages(votes: &[(CandidateId, u64)], seats: u32, divisor: fn(u64) -> u64) -> Tally {
    let mut res: Tally = votes.iter().map(|(cid, _)| (*cid, 0)).collect();
    for _ in 0..seats {
        // Compare v1 / d1 and v2 / d2 exactly as v1 * d2 and v2 * d1.
        let best = votes.iter().fold(None, |best: Option<(CandidateId, u128, u128)>, (cid, v)| {
            let won = res.get(cid).copied().unwrap_or(0);
            let v = *v as u128;
            let d = divisor(won) as u128;
            match best {
                Some((_, bv, bd)) if bv * d >= v * bd => best,
                _ => Some((*cid, v, d)),
            }
        });
        if let Some((cid, _, _)) = best {
            if let Some(s) = res.get_mut(&cid) {
                *s += 1;
            }
        }
    }
    res
}
