use crate::{Scalar, Species, Vec2};
use eyre::WrapErr;
use rand::Rng;
use std::collections::TryReserveError;

/// A copy of a single particle's state, handed out to read-only consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub species: Species,
}

/// Contains all of the particle data. Indices are stable for the whole run: particles are
/// never added or removed once the simulation starts stepping.
#[derive(Debug, Clone, Default)]
pub struct Particles {
    pub position: Vec<Vec2>,
    pub velocity: Vec<Vec2>,
    pub species: Vec<Species>,
}

impl Particles {
    /// Creates `count` particles at uniformly random positions in `[0, 1) x [0, 1)`, at rest,
    /// with species handed out in contiguous blocks by creation order.
    pub fn create<R: Rng + ?Sized>(
        count: usize,
        num_species: usize,
        rng: &mut R,
    ) -> eyre::Result<Self> {
        let mut particles = Particles::default();
        particles
            .reserve(count)
            .wrap_err_with(|| format!("Failed to allocate storage for {} particles", count))?;

        for i in 0..count {
            let position = Vec2::new(rng.gen::<Scalar>(), rng.gen::<Scalar>());
            let species = Species::partition(i, count, num_species);
            particles.add_particle(position, Vec2::zeros(), species);
        }

        Ok(particles)
    }

    fn reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.position.try_reserve_exact(additional)?;
        self.velocity.try_reserve_exact(additional)?;
        self.species.try_reserve_exact(additional)?;
        Ok(())
    }

    pub fn add_particle(&mut self, position: Vec2, velocity: Vec2, species: Species) {
        self.position.push(position);
        self.velocity.push(velocity);
        self.species.push(species);
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Particle> {
        Some(Particle {
            position: *self.position.get(index)?,
            velocity: *self.velocity.get(index)?,
            species: *self.species.get(index)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Particle> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Number of particles of each species, for species `0..num_species`.
    pub fn species_counts(&self, num_species: usize) -> Vec<usize> {
        let mut counts = vec![0; num_species];
        for s in &self.species {
            if let Some(count) = counts.get_mut(s.index()) {
                *count += 1;
            }
        }
        counts
    }
}
