// Sampling of electorates and candidates.

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::config::*;

/// Standard deviation of the `high` dispersion.
pub const HIGH_SPREAD: f64 = 5.0;
/// Standard deviation of the candidates in the default candidate scenario.
pub const CANDIDATE_SPREAD: f64 = 5.0;
/// Cluster centers are drawn uniformly in [-CENTER_BOX, CENTER_BOX] on every axis.
pub const CENTER_BOX: f64 = 10.0;

/// Parameters of a generated population.
#[derive(PartialEq, Debug, Clone)]
pub struct PopulationConfig {
    pub population: u32,
    pub candidates: u32,
    /// Number of issues, i.e. the dimension of the ideological space.
    pub dimensions: u32,
    pub dispersion: Dispersion,
    pub candidate_scenario: CandidateScenario,
    /// Spread of the voters around their cluster center.
    pub cluster_std: f64,
    pub seed: u64,
}

impl PopulationConfig {
    pub const DEFAULT: PopulationConfig = PopulationConfig {
        population: 10_000,
        candidates: 2,
        dimensions: 2,
        dispersion: Dispersion::High,
        candidate_scenario: CandidateScenario::Default,
        cluster_std: 1.0,
        seed: 0,
    };

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.population < 1 {
            return Err(SimulationError::InvalidConfiguration(
                "population size must be at least 1".to_string(),
            ));
        }
        if self.candidates < 2 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "at least 2 candidates are required, got {}",
                self.candidates
            )));
        }
        if self.dimensions < 1 {
            return Err(SimulationError::InvalidConfiguration(
                "the ideological space needs at least one dimension".to_string(),
            ));
        }
        if let Dispersion::Polarized(k) = self.dispersion {
            if k == 0 || k > self.population {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "polarized dispersion needs between 1 and {} clusters, got {}",
                    self.population, k
                )));
            }
        }
        if !self.cluster_std.is_finite() || self.cluster_std < 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "cluster spread must be finite and non-negative, got {}",
                self.cluster_std
            )));
        }
        Ok(())
    }
}

impl Default for PopulationConfig {
    fn default() -> Self {
        PopulationConfig::DEFAULT
    }
}

// The shape of the distribution, once its random centers have been drawn.
#[derive(PartialEq, Debug, Clone)]
enum Layout {
    Point,
    Isotropic(f64),
    Clusters(Vec<Position>, f64),
}

impl Layout {
    fn draw<R: Rng>(
        rng: &mut R,
        dispersion: Dispersion,
        dimensions: usize,
        cluster_std: f64,
    ) -> Layout {
        match dispersion {
            Dispersion::None => Layout::Point,
            Dispersion::High => Layout::Isotropic(HIGH_SPREAD),
            Dispersion::Polarized(k) => {
                let centers: Vec<Position> = (0..k)
                    .map(|_| {
                        (0..dimensions)
                            .map(|_| rng.random_range(-CENTER_BOX..=CENTER_BOX))
                            .collect()
                    })
                    .collect();
                debug!("Layout::draw: cluster centers: {:?}", centers);
                Layout::Clusters(centers, cluster_std)
            }
        }
    }

    fn sample<R: Rng>(
        &self,
        rng: &mut R,
        count: usize,
        dimensions: usize,
    ) -> Result<Vec<Position>, SimulationError> {
        match self {
            Layout::Point => Ok(vec![vec![0.0; dimensions]; count]),
            Layout::Isotropic(spread) => {
                let origin = vec![0.0; dimensions];
                sample_around(rng, &origin, *spread, count)
            }
            Layout::Clusters(centers, spread) => {
                // Voters are split as evenly as possible, the first clusters
                // receiving the extra ones.
                let k = centers.len();
                let mut res: Vec<Position> = Vec::with_capacity(count);
                for (idx, center) in centers.iter().enumerate() {
                    let cluster_size = count / k + usize::from(idx < count % k);
                    res.extend(sample_around(rng, center, *spread, cluster_size)?);
                }
                Ok(res)
            }
        }
    }
}

fn sample_around<R: Rng>(
    rng: &mut R,
    center: &[f64],
    spread: f64,
    count: usize,
) -> Result<Vec<Position>, SimulationError> {
    let noise = Normal::new(0.0, spread).map_err(|e| {
        SimulationError::InvalidConfiguration(format!("invalid spread {}: {}", spread, e))
    })?;
    Ok((0..count)
        .map(|_| center.iter().map(|c| c + noise.sample(rng)).collect())
        .collect())
}

/// Samples the voters and the candidates of a population.
///
/// The result only depends on the configuration: the same seed always yields the
/// same positions.
pub fn generate_population(config: &PopulationConfig) -> Result<Population, SimulationError> {
    config.validate()?;
    info!(
        "Generating {} voters and {} candidates in {} dimensions, dispersion {}, candidates {}, seed {}",
        config.population,
        config.candidates,
        config.dimensions,
        config.dispersion,
        config.candidate_scenario,
        config.seed
    );
    let mut rng = SmallRng::seed_from_u64(config.seed);
    let dimensions = config.dimensions as usize;

    let layout = Layout::draw(&mut rng, config.dispersion, dimensions, config.cluster_std);
    let voters = layout.sample(&mut rng, config.population as usize, dimensions)?;

    let candidates = match config.candidate_scenario {
        CandidateScenario::Default => {
            let origin = vec![0.0; dimensions];
            sample_around(
                &mut rng,
                &origin,
                CANDIDATE_SPREAD,
                config.candidates as usize,
            )?
        }
        CandidateScenario::Electorate => {
            layout.sample(&mut rng, config.candidates as usize, dimensions)?
        }
    };
    debug!("generate_population: candidates: {:?}", candidates);

    Population::new(voters, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dispersion: Dispersion) -> PopulationConfig {
        PopulationConfig {
            population: 301,
            candidates: 4,
            dimensions: 3,
            dispersion,
            seed: 17,
            ..PopulationConfig::DEFAULT
        }
    }

    #[test]
    fn sizes() {
        let p = generate_population(&config(Dispersion::Polarized(3))).unwrap();
        assert_eq!(p.num_voters(), 301);
        assert_eq!(p.num_candidates(), 4);
        assert!(p.voters().iter().all(|v| v.len() == 3));
        assert!(p.candidates().iter().all(|c| c.position.len() == 3));
    }

    #[test]
    fn same_seed_same_population() {
        let a = generate_population(&config(Dispersion::High)).unwrap();
        let b = generate_population(&config(Dispersion::High)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seed_different_population() {
        let a = generate_population(&config(Dispersion::High)).unwrap();
        let b = generate_population(&PopulationConfig {
            seed: 18,
            ..config(Dispersion::High)
        })
        .unwrap();
        assert_ne!(a.voters(), b.voters());
    }

    #[test]
    fn no_dispersion_is_a_single_point() {
        let p = generate_population(&config(Dispersion::None)).unwrap();
        assert!(p.voters().iter().all(|v| v.iter().all(|x| *x == 0.0)));
    }

    #[test]
    fn polarized_voters_stay_near_their_centers() {
        let p = generate_population(&PopulationConfig {
            cluster_std: 0.0,
            ..config(Dispersion::Polarized(2))
        })
        .unwrap();
        // Without spread, every voter is exactly at one of the two centers.
        let mut distinct: Vec<&Position> = Vec::new();
        for v in p.voters() {
            if !distinct.contains(&v) {
                distinct.push(v);
            }
        }
        assert_eq!(distinct.len(), 2);
        let first = p.voters().iter().filter(|v| *v == distinct[0]).count();
        assert_eq!(first, 151);
    }

    #[test]
    fn as_many_clusters_as_voters() {
        let p = generate_population(&PopulationConfig {
            population: 5,
            ..config(Dispersion::Polarized(5))
        })
        .unwrap();
        assert_eq!(p.num_voters(), 5);
    }

    #[test]
    fn electorate_candidates_sit_on_the_cluster_centers() {
        let p = generate_population(&PopulationConfig {
            candidates: 6,
            candidate_scenario: CandidateScenario::Electorate,
            cluster_std: 0.0,
            ..config(Dispersion::Polarized(3))
        })
        .unwrap();
        // Without spread, the voters are exactly on the centers.
        let mut centers: Vec<&Position> = Vec::new();
        for v in p.voters() {
            if !centers.contains(&v) {
                centers.push(v);
            }
        }
        assert_eq!(centers.len(), 3);
        for c in p.candidates() {
            assert!(centers.contains(&&c.position), "{:?}", c);
        }
        // Candidates are split between the clusters like the voters.
        for center in centers {
            let n = p
                .candidates()
                .iter()
                .filter(|c| &c.position == center)
                .count();
            assert_eq!(n, 2);
        }
    }

    #[test]
    fn default_candidates_ignore_the_clusters() {
        let p = generate_population(&PopulationConfig {
            candidate_scenario: CandidateScenario::Default,
            cluster_std: 0.0,
            ..config(Dispersion::Polarized(2))
        })
        .unwrap();
        assert!(p
            .candidates()
            .iter()
            .all(|c| !p.voters().contains(&c.position)));
    }

    #[test]
    fn invalid_configurations() {
        let bad = [
            PopulationConfig {
                population: 0,
                ..PopulationConfig::DEFAULT
            },
            PopulationConfig {
                candidates: 1,
                ..PopulationConfig::DEFAULT
            },
            PopulationConfig {
                dimensions: 0,
                ..PopulationConfig::DEFAULT
            },
            PopulationConfig {
                dispersion: Dispersion::Polarized(0),
                ..PopulationConfig::DEFAULT
            },
            PopulationConfig {
                population: 100,
                dispersion: Dispersion::Polarized(101),
                ..PopulationConfig::DEFAULT
            },
            PopulationConfig {
                dispersion: Dispersion::Polarized(4_000_000_000),
                ..PopulationConfig::DEFAULT
            },
            PopulationConfig {
                cluster_std: -1.0,
                ..PopulationConfig::DEFAULT
            },
        ];
        for c in bad.iter() {
            assert!(matches!(
                generate_population(c),
                Err(SimulationError::InvalidConfiguration(_))
            ));
        }
    }
}
