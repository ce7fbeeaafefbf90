use crate::spatial::{MAX_PARTICLES, MAX_RESOLUTION};
use crate::{InteractionMatrix, Scalar};
use eyre::{ensure, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the simulation step finds the neighbours of each particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborSearch {
    /// Check every other particle.
    BruteForce,
    /// Only check particles in nearby cells of a [`SpatialLookup`](crate::SpatialLookup).
    SpatialHash,
}

impl Default for NeighborSearch {
    fn default() -> Self {
        NeighborSearch::SpatialHash
    }
}

/// A struct containing all of the high-level parameters for the particle life simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub num_particles: usize,
    /// Number of species. The interaction matrix must be `num_species x num_species`.
    pub num_species: usize,
    /// The time step
    pub delta_time: Scalar,
    /// Time it takes friction alone to halve a particle's speed.
    pub friction_half_time: Scalar,
    /// The interaction radius. Particles further apart than this don't affect each other.
    pub r_max: Scalar,
    /// Scales every force, on top of `r_max`.
    pub force_factor: Scalar,
    /// Row `i`, column `j` is how strongly species `i` is attracted to species `j`.
    pub interaction_matrix: Vec<Vec<Scalar>>,
    pub neighbor_search: NeighborSearch,
    /// Cells per axis of the spatial lookup. Derived from `r_max` if not given.
    pub grid_resolution: Option<usize>,
    /// Seed for the initial particle positions. Random if not given.
    pub seed: Option<u64>,
    /// Accumulate forces on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            num_particles: 600,
            num_species: 3,
            delta_time: 0.002,
            friction_half_time: 0.040,
            r_max: 0.2,
            force_factor: 2.,
            //          red    green   yellow
            // red      0.7    0.3    -0.3
            // green   -0.3    1      -0.3
            // yellow   0      0       1
            interaction_matrix: vec![
                vec![0.7, 0.3, -0.3],
                vec![-0.3, 1., -0.3],
                vec![0., 0., 1.],
            ],
            neighbor_search: NeighborSearch::default(),
            grid_resolution: None,
            seed: None,
            parallel: false,
        }
    }
}

impl SimulationParameters {
    /// Reads parameters from a JSON file. Missing fields take their default values.
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read(path)
            .wrap_err_with(|| format!("Failed to read JSON settings file: {:?}", path))?;
        let params: Self =
            serde_json::from_slice(&json).wrap_err("Serde failed to deserialize JSON.")?;
        params.validate()?;
        Ok(params)
    }

    /// The velocity multiplier applied once per tick, derived from the friction half-life.
    pub fn damping(&self) -> Scalar {
        Scalar::powf(0.5, self.delta_time / self.friction_half_time)
    }

    /// Cells per axis of the spatial lookup. Unless overridden, cells are as small as they can
    /// be while still being at least `r_max` wide.
    pub fn grid_resolution(&self) -> usize {
        self.grid_resolution
            .unwrap_or_else(|| (1. / self.r_max + 1e-3).floor().max(1.) as usize)
    }

    pub fn interaction_matrix(&self) -> eyre::Result<InteractionMatrix> {
        InteractionMatrix::from_rows(&self.interaction_matrix)
    }

    pub fn validate(&self) -> eyre::Result<()> {
        let positive = |x: Scalar| x.is_finite() && x > 0.;
        ensure!(
            positive(self.delta_time),
            "delta_time must be positive and finite, got {}",
            self.delta_time
        );
        ensure!(
            positive(self.friction_half_time),
            "friction_half_time must be positive and finite, got {}",
            self.friction_half_time
        );
        ensure!(
            positive(self.r_max),
            "r_max must be positive and finite, got {}",
            self.r_max
        );
        ensure!(
            self.force_factor.is_finite(),
            "force_factor must be finite, got {}",
            self.force_factor
        );
        ensure!(
            (1..=u8::MAX as usize + 1).contains(&self.num_species),
            "num_species must be between 1 and 256, got {}",
            self.num_species
        );
        ensure!(
            self.num_particles <= MAX_PARTICLES,
            "num_particles must be at most {}, got {}",
            MAX_PARTICLES,
            self.num_particles
        );
        ensure!(
            self.grid_resolution != Some(0),
            "grid_resolution must be at least 1"
        );
        ensure!(
            self.grid_resolution() <= MAX_RESOLUTION,
            "grid_resolution must be at most {}, got {} (r_max = {})",
            MAX_RESOLUTION,
            self.grid_resolution(),
            self.r_max
        );

        let matrix = self.interaction_matrix()?;
        ensure!(
            matrix.rows() == self.num_species && matrix.cols() == self.num_species,
            "Interaction matrix is {}x{}, but there are {} species",
            matrix.rows(),
            matrix.cols(),
            self.num_species
        );
        ensure!(
            self.interaction_matrix.iter().flatten().all(|a| a.is_finite()),
            "Interaction matrix contains a non-finite coefficient"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = SimulationParameters::default();
        params.validate().unwrap();
        assert_eq!(params.grid_resolution(), 5);

        let matrix = params.interaction_matrix().unwrap();
        assert_eq!(matrix.get(0, 0), 0.7);
        assert_eq!(matrix.get(1, 2), -0.3);
        assert_eq!(matrix.get(2, 2), 1.);
    }

    #[test]
    fn damping_from_half_time() {
        let params = SimulationParameters::default();
        let damping = params.damping();
        assert!((damping - 0.5f32.powf(0.05)).abs() < 1e-6);

        // applying the damping for one half-life halves the speed
        let ticks = (params.friction_half_time / params.delta_time).round() as i32;
        assert!((damping.powi(ticks) - 0.5).abs() < 1e-4);

        // derived fresh every time, not from a previous value
        assert_eq!(params.damping(), damping);
    }

    #[test]
    fn grid_resolution_override() {
        let params = SimulationParameters {
            grid_resolution: Some(4),
            ..Default::default()
        };
        assert_eq!(params.grid_resolution(), 4);

        let params = SimulationParameters {
            r_max: 3.,
            ..Default::default()
        };
        assert_eq!(params.grid_resolution(), 1);
    }

    #[test]
    fn rejects_bad_parameters() {
        let bad = [
            SimulationParameters {
                delta_time: 0.,
                ..Default::default()
            },
            SimulationParameters {
                friction_half_time: -1.,
                ..Default::default()
            },
            SimulationParameters {
                r_max: 0.,
                ..Default::default()
            },
            SimulationParameters {
                num_species: 0,
                interaction_matrix: vec![],
                ..Default::default()
            },
            SimulationParameters {
                num_species: 4,
                ..Default::default()
            },
            SimulationParameters {
                interaction_matrix: vec![vec![1., 0.], vec![0., 1.], vec![0., 0., 1.]],
                ..Default::default()
            },
            SimulationParameters {
                interaction_matrix: vec![
                    vec![Scalar::NAN, 0., 0.],
                    vec![0., 1., 0.],
                    vec![0., 0., 1.],
                ],
                ..Default::default()
            },
            SimulationParameters {
                grid_resolution: Some(0),
                ..Default::default()
            },
            SimulationParameters {
                grid_resolution: Some(usize::MAX),
                ..Default::default()
            },
            // derives a 100000 x 100000 grid
            SimulationParameters {
                r_max: 1e-5,
                num_particles: 10,
                ..Default::default()
            },
            SimulationParameters {
                r_max: Scalar::INFINITY,
                ..Default::default()
            },
            SimulationParameters {
                delta_time: Scalar::INFINITY,
                ..Default::default()
            },
            SimulationParameters {
                friction_half_time: Scalar::NAN,
                ..Default::default()
            },
            SimulationParameters {
                num_particles: usize::MAX,
                ..Default::default()
            },
        ];

        for params in &bad {
            assert!(params.validate().is_err(), "accepted {:?}", params);
        }
    }

    #[test]
    fn largest_grid_is_accepted() {
        let params = SimulationParameters {
            r_max: 1. / MAX_RESOLUTION as Scalar,
            num_particles: 10,
            ..Default::default()
        };
        params.validate().unwrap();
        assert!(params.grid_resolution() <= MAX_RESOLUTION);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let params: SimulationParameters = serde_json::from_str(
            r#"{ "num_particles": 10, "neighbor_search": "brute_force", "seed": 7 }"#,
        )
        .unwrap();

        assert_eq!(params.num_particles, 10);
        assert_eq!(params.neighbor_search, NeighborSearch::BruteForce);
        assert_eq!(params.seed, Some(7));
        assert_eq!(params.r_max, 0.2);
        assert_eq!(params.interaction_matrix.len(), 3);
    }

    #[test]
    fn json_round_trip() {
        let params = SimulationParameters::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: SimulationParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, back);
    }

    #[test]
    fn load_from_file() {
        let path = std::env::temp_dir().join(format!("particle_life_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "num_particles": 42, "parallel": true }"#).unwrap();
        let params = SimulationParameters::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(params.num_particles, 42);
        assert!(params.parallel);

        assert!(SimulationParameters::load(&path).is_err());
    }
}
