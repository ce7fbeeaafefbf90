use serde::{Deserialize, Serialize};
use std::fmt;

/// Colors handed to the presentation layer, indexed by species. Species beyond the end of the
/// palette wrap around.
pub const PALETTE: [[f32; 3]; 8] = [
    [0.9, 0.2, 0.2],
    [0.2, 0.85, 0.3],
    [0.95, 0.85, 0.2],
    [0.25, 0.45, 0.95],
    [0.8, 0.3, 0.85],
    [0.2, 0.85, 0.85],
    [0.95, 0.55, 0.15],
    [0.85, 0.85, 0.85],
];

/// The discrete category of a particle. Selects the row and column of the
/// [`InteractionMatrix`](crate::InteractionMatrix) used for its pairwise forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Species(pub u8);

impl Species {
    pub const RED: Species = Species(0);
    pub const GREEN: Species = Species(1);
    pub const YELLOW: Species = Species(2);

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn color(self) -> [f32; 3] {
        PALETTE[self.index() % PALETTE.len()]
    }

    /// Splits `count` particles into contiguous blocks, one per species, in creation order.
    /// Blocks have `count / num_species` particles each, and whatever is left over goes to the
    /// last species.
    pub fn partition(index: usize, count: usize, num_species: usize) -> Species {
        if num_species == 0 {
            return Species::default();
        }
        let block = (count / num_species).max(1);
        let species = usize::min(index / block, num_species - 1);
        Species(species as u8)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Species::RED => write!(f, "red"),
            Species::GREEN => write!(f, "green"),
            Species::YELLOW => write!(f, "yellow"),
            Species(i) => write!(f, "species {}", i),
        }
    }
}
