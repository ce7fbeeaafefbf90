pub mod driver;
pub mod force;
pub mod frame;
pub mod matrix;
pub mod parameters;
pub mod particles;
pub mod simulation;
pub mod spatial;
pub mod species;
pub mod statistics;
pub mod util;

extern crate nalgebra as na;

pub use frame::Vertex;
pub use matrix::InteractionMatrix;
pub use parameters::{NeighborSearch, SimulationParameters};
pub use particles::{Particle, Particles};
pub use simulation::ParticleLife;
pub use spatial::SpatialLookup;
pub use species::Species;
pub use statistics::SimulationStatistics;

/// All of the simulation math is done in single precision.
pub type Scalar = f32;
pub type Vec2 = na::Vector2<Scalar>;

/// Anything that can be driven one frame at a time by a presentation layer.
pub trait Simulation: Send {
    type Parameters;

    fn new(params: Self::Parameters) -> eyre::Result<Self>
    where
        Self: Sized;

    /// Returns the vertices for the current state, then advances the simulation.
    fn simulate_frame(&mut self) -> Vec<Vertex>;

    /// Advances the simulation by one tick without producing a frame.
    fn step(&mut self);

    fn add_particle(&mut self, position: Vec2, velocity: Vec2, species: Species);
}
