pub use crate::config::*;

/// A builder for populations placed by hand.
///
/// Generated populations cover most experiments; the builder is for the small,
/// fully controlled situations.
///
/// ```
/// pub use voting_sim::builder::Builder;
/// # use voting_sim::SimulationError;
///
/// let mut builder = Builder::new(1)?
///     .candidates(&[vec![0.0], vec![10.0]])?;
///
/// builder.add_voter(&[1.0])?;
/// builder.add_voters(&[9.0], 2)?;
///
/// let population = builder.build()?;
/// assert_eq!(population.num_voters(), 3);
///
/// # Ok::<(), SimulationError>(())
/// ```
pub struct Builder {
    pub(crate) _dimensions: usize,
    pub(crate) _candidates: Option<Vec<Position>>,
    pub(crate) _voters: Vec<Position>,
}

impl Builder {
    pub fn new(dimensions: usize) -> Result<Builder, SimulationError> {
        if dimensions == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "positions need at least one dimension".to_string(),
            ));
        }
        Ok(Builder {
            _dimensions: dimensions,
            _candidates: None,
            _voters: Vec::new(),
        })
    }

    pub fn candidates(self, positions: &[Position]) -> Result<Builder, SimulationError> {
        for p in positions {
            self.check(p)?;
        }
        Ok(Builder {
            _dimensions: self._dimensions,
            _candidates: Some(positions.to_vec()),
            _voters: self._voters,
        })
    }

    /// Adds a voter at the given position.
    pub fn add_voter(&mut self, position: &[f64]) -> Result<(), SimulationError> {
        self.add_voters(position, 1)
    }

    /// Adds `count` voters sharing the same position.
    pub fn add_voters(&mut self, position: &[f64], count: u32) -> Result<(), SimulationError> {
        self.check(position)?;
        for _ in 0..count {
            self._voters.push(position.to_vec());
        }
        Ok(())
    }

    pub fn build(self) -> Result<Population, SimulationError> {
        let candidates = self._candidates.ok_or_else(|| {
            SimulationError::InvalidConfiguration("no candidates were declared".to_string())
        })?;
        Population::new(self._voters, candidates)
    }

    fn check(&self, position: &[f64]) -> Result<(), SimulationError> {
        if position.len() != self._dimensions {
            return Err(SimulationError::InvalidConfiguration(format!(
                "expected {} dimensions, got {:?}",
                self._dimensions, position
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_dimensions() {
        assert!(Builder::new(0).is_err());
        let b = Builder::new(2).unwrap();
        assert!(b.candidates(&[vec![0.0], vec![1.0]]).is_err());
        let mut b = Builder::new(2)
            .unwrap()
            .candidates(&[vec![0.0, 0.0], vec![1.0, 1.0]])
            .unwrap();
        assert!(b.add_voter(&[1.0]).is_err());
    }

    #[test]
    fn missing_candidates() {
        let mut b = Builder::new(1).unwrap();
        b.add_voter(&[1.0]).unwrap();
        assert!(b.build().is_err());
    }
}
