use crate::{ParticleLife, Scalar, Vec2};

/// Summary quantities for monitoring a run. Every particle has unit mass.
pub trait SimulationStatistics {
    fn total_time(&self) -> Scalar;
    fn total_linear_momentum(&self) -> Vec2;
    fn kinetic_energy(&self) -> Scalar;
    fn mean_speed(&self) -> Scalar;
    fn species_counts(&self) -> Vec<usize>;
}

impl SimulationStatistics for ParticleLife {
    fn total_time(&self) -> Scalar {
        self.time()
    }

    fn total_linear_momentum(&self) -> Vec2 {
        self.particles().velocity.iter().sum()
    }

    fn kinetic_energy(&self) -> Scalar {
        self.particles()
            .velocity
            .iter()
            .map(|v| 0.5 * v.norm_squared())
            .sum()
    }

    fn mean_speed(&self) -> Scalar {
        let particles = self.particles();
        if particles.is_empty() {
            return 0.;
        }
        particles.velocity.iter().map(|v| v.norm()).sum::<Scalar>() / particles.len() as Scalar
    }

    fn species_counts(&self) -> Vec<usize> {
        self.particles().species_counts(self.params().num_species)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Particles, SimulationParameters, Species};

    #[test]
    fn symmetric_pair_keeps_zero_momentum() {
        let params = SimulationParameters {
            num_species: 1,
            interaction_matrix: vec![vec![0.8]],
            ..Default::default()
        };
        let mut particles = Particles::default();
        particles.add_particle(Vec2::new(0.4, 0.5), Vec2::zeros(), Species::RED);
        particles.add_particle(Vec2::new(0.5, 0.55), Vec2::zeros(), Species::RED);
        let mut sim = ParticleLife::with_particles(params, particles).unwrap();

        for _ in 0..20 {
            sim.step();
            assert!(sim.total_linear_momentum().norm() < 1e-6);
        }
        assert!(sim.kinetic_energy() > 0.);
        assert!(sim.mean_speed() > 0.);
        assert!((sim.total_time() - 20. * 0.002).abs() < 1e-5);
    }

    #[test]
    fn statistics_of_resting_particles() {
        let sim = ParticleLife::new(SimulationParameters {
            num_particles: 90,
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(sim.total_time(), 0.);
        assert_eq!(sim.kinetic_energy(), 0.);
        assert_eq!(sim.mean_speed(), 0.);
        assert_eq!(sim.total_linear_momentum(), Vec2::zeros());
        assert_eq!(sim.species_counts(), vec![30, 30, 30]);
    }

    #[test]
    fn kinetic_energy_is_half_v_squared() {
        let params = SimulationParameters {
            num_species: 1,
            interaction_matrix: vec![vec![0.]],
            ..Default::default()
        };
        let mut particles = Particles::default();
        particles.add_particle(Vec2::new(0.5, 0.5), Vec2::new(3., 4.), Species::RED);
        let sim = ParticleLife::with_particles(params, particles).unwrap();

        assert_eq!(sim.kinetic_energy(), 12.5);
        assert_eq!(sim.mean_speed(), 5.);
    }
}
