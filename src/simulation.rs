use eyre::ensure;
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use tracing::{info, trace, warn};

use crate::force::pair_force;
use crate::frame::vertices;
use crate::spatial::MAX_PARTICLES;
use crate::util::VecExt;
use crate::{
    InteractionMatrix, NeighborSearch, Particles, Scalar, Simulation, SimulationParameters,
    SpatialLookup, Species, Vec2, Vertex,
};

/// Contains all of the state for the particle life simulation.
pub struct ParticleLife {
    particles: Particles,
    matrix: InteractionMatrix,
    lookup: SpatialLookup,
    /// Rings of lookup cells to search around each particle.
    reach: usize,
    params: SimulationParameters,
    /// Per-tick velocity multiplier, derived once from the friction half-life.
    damping: Scalar,
    /// Scratch space for the net force on each particle.
    force: Vec<Vec2>,
    time: Scalar,
}

impl ParticleLife {
    /// Creates a simulation with `params.num_particles` randomly placed particles.
    pub fn new(params: SimulationParameters) -> eyre::Result<Self> {
        params.validate()?;

        let mut rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let particles = Particles::create(params.num_particles, params.num_species, &mut rng)?;

        Self::with_particles(params, particles)
    }

    /// Creates a simulation from an explicit set of particles. `params.num_particles` is
    /// overwritten with the actual count.
    pub fn with_particles(
        mut params: SimulationParameters,
        particles: Particles,
    ) -> eyre::Result<Self> {
        params.validate()?;
        ensure!(
            particles.velocity.len() == particles.position.len()
                && particles.species.len() == particles.position.len(),
            "Particle columns have different lengths: {} positions, {} velocities, {} species",
            particles.position.len(),
            particles.velocity.len(),
            particles.species.len()
        );
        ensure!(
            particles.len() <= MAX_PARTICLES,
            "Can't simulate more than {} particles, got {}",
            MAX_PARTICLES,
            particles.len()
        );
        if let Some(species) = particles
            .species
            .iter()
            .find(|s| s.index() >= params.num_species)
        {
            eyre::bail!(
                "Particle has {}, but only {} species are configured",
                species,
                params.num_species
            );
        }
        let finite = particles.position.iter().all(|x| x.all_finite())
            && particles.velocity.iter().all(|v| v.all_finite());
        ensure!(finite, "Particle positions and velocities must be finite");
        params.num_particles = particles.len();

        let matrix = params.interaction_matrix()?;
        let lookup = SpatialLookup::with_capacity(params.grid_resolution(), particles.len())?;
        let reach = lookup.reach_for(params.r_max);
        if reach > 1 && params.neighbor_search == NeighborSearch::SpatialHash {
            warn!(
                resolution = lookup.resolution(),
                reach, "Grid cells are smaller than r_max, searching extra rings of cells"
            );
        }

        info!(
            particles = particles.len(),
            species = params.num_species,
            search = ?params.neighbor_search,
            resolution = lookup.resolution(),
            "Created particle life simulation"
        );

        Ok(ParticleLife {
            force: vec![Vec2::zeros(); particles.len()],
            damping: params.damping(),
            particles,
            matrix,
            lookup,
            reach,
            params,
            time: 0.,
        })
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn matrix(&self) -> &InteractionMatrix {
        &self.matrix
    }

    pub fn lookup(&self) -> &SpatialLookup {
        &self.lookup
    }

    pub fn damping(&self) -> Scalar {
        self.damping
    }

    /// Simulated time elapsed so far.
    pub fn time(&self) -> Scalar {
        self.time
    }

    /// Advances the simulation by one tick of `delta_time`.
    pub fn step(&mut self) {
        let ParticleLife {
            particles,
            matrix,
            lookup,
            reach,
            params,
            damping,
            force,
            time,
        } = self;

        let neighbors = match params.neighbor_search {
            NeighborSearch::SpatialHash => {
                lookup.rebuild(particles);
                Some((&*lookup, *reach))
            }
            NeighborSearch::BruteForce => None,
        };

        accumulate_forces(particles, matrix, neighbors, params, force);

        let dt = params.delta_time;
        for (v, f) in particles.velocity.iter_mut().zip(force.iter()) {
            *v = *v * *damping + f * dt;
        }

        for (x, v) in particles
            .position
            .iter_mut()
            .zip(particles.velocity.iter_mut())
        {
            *x += *v * dt;
            reflect_bounds(x, v);
        }

        *time += dt;
        trace!(time = *time, "Finished tick");
    }
}

/// Fills `force` with the scaled net force on every particle.
fn accumulate_forces(
    particles: &Particles,
    matrix: &InteractionMatrix,
    neighbors: Option<(&SpatialLookup, usize)>,
    params: &SimulationParameters,
    force: &mut [Vec2],
) {
    let scale = params.r_max * params.force_factor;
    let net = |i: usize| net_force(i, particles, matrix, neighbors, params.r_max) * scale;

    if params.parallel {
        force
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, f)| *f = net(i));
    } else {
        force.iter_mut().enumerate().for_each(|(i, f)| *f = net(i));
    }
}

/// Sum of the (unscaled) forces on particle `i` from every particle that might be in range.
/// Uses the spatial lookup if one is given, otherwise checks every particle.
fn net_force(
    i: usize,
    particles: &Particles,
    matrix: &InteractionMatrix,
    neighbors: Option<(&SpatialLookup, usize)>,
    r_max: Scalar,
) -> Vec2 {
    let position = particles.position[i];
    let species = particles.species[i];

    let pull = |j: usize| {
        if i == j {
            return Vec2::zeros();
        }
        let a = matrix.attraction(species, particles.species[j]);
        pair_force(particles.position[j] - position, r_max, a).unwrap_or_else(Vec2::zeros)
    };

    match neighbors {
        Some((lookup, reach)) => lookup.neighbors(position, reach).map(pull).sum(),
        None => (0..particles.len()).map(pull).sum(),
    }
}

/// Keeps a particle inside the unit square. A coordinate that has left `[0, 1]` is put back on
/// the edge it crossed and the matching velocity component is reversed. Each axis is handled
/// independently.
pub fn reflect_bounds(position: &mut Vec2, velocity: &mut Vec2) {
    (0..2).for_each(|i| {
        if position[i] < 0. || position[i] > 1. {
            position[i] = position[i].clamp(0., 1.);
            velocity[i] = -velocity[i];
        }
    })
}

impl Simulation for ParticleLife {
    type Parameters = SimulationParameters;

    fn new(params: SimulationParameters) -> eyre::Result<Self> {
        ParticleLife::new(params)
    }

    fn simulate_frame(&mut self) -> Vec<Vertex> {
        let verts = vertices(&self.particles);
        self.step();
        verts
    }

    fn step(&mut self) {
        ParticleLife::step(self)
    }

    fn add_particle(&mut self, position: Vec2, velocity: Vec2, species: Species) {
        if species.index() >= self.params.num_species {
            warn!(%species, "Ignoring particle with an unconfigured species");
            return;
        }
        if !position.all_finite() || !velocity.all_finite() {
            warn!(?position, ?velocity, "Ignoring particle with a non-finite state");
            return;
        }
        if self.particles.len() >= MAX_PARTICLES {
            warn!("Ignoring particle, the simulation is full");
            return;
        }
        self.particles.add_particle(position, velocity, species);
        self.force.push(Vec2::zeros());
        self.params.num_particles += 1;
    }
}
