use eyre::{ensure, WrapErr};
use itertools::iproduct;
use smallvec::SmallVec;
use tracing::trace;

use crate::{Particles, Scalar, Vec2};

/// Largest supported number of cells along each axis.
pub const MAX_RESOLUTION: usize = 4096;

/// Cell keys and particle indices are stored as `u32`.
pub const MAX_PARTICLES: usize = u32::MAX as usize;

/// One entry per particle: the cell it sits in and its index in the particle store.
///
/// The derived ordering sorts by cell first and breaks ties by particle index, which keeps the
/// sorted pair list deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpatialPair {
    pub cell_key: u32,
    pub particle_index: u32,
}

/// Buckets particles into a `resolution x resolution` grid over the unit square so neighbour
/// search only has to look at nearby cells.
///
/// Rebuilt from scratch every tick: the pair list is sorted by cell key, and `start_indices`
/// maps each cell key to the first position of that key in the sorted list (`None` for empty
/// cells). The buffers are reused between rebuilds.
#[derive(Debug, Clone)]
pub struct SpatialLookup {
    resolution: usize,
    pairs: Vec<SpatialPair>,
    start_indices: Vec<Option<u32>>,
}

impl SpatialLookup {
    pub fn new(resolution: usize) -> eyre::Result<Self> {
        Self::with_capacity(resolution, 0)
    }

    /// Like [`SpatialLookup::new`], but with room for `num_particles` so rebuilds never
    /// allocate.
    pub fn with_capacity(resolution: usize, num_particles: usize) -> eyre::Result<Self> {
        let resolution = resolution.max(1);
        ensure!(
            resolution <= MAX_RESOLUTION,
            "Spatial lookup resolution {} is larger than the maximum of {}",
            resolution,
            MAX_RESOLUTION
        );
        ensure!(
            num_particles <= MAX_PARTICLES,
            "Spatial lookup can't index {} particles",
            num_particles
        );

        let num_cells = resolution * resolution;
        let mut start_indices = Vec::new();
        start_indices
            .try_reserve_exact(num_cells)
            .wrap_err_with(|| format!("Failed to allocate {} lookup cells", num_cells))?;
        start_indices.resize(num_cells, None);

        let mut pairs = Vec::new();
        pairs.try_reserve_exact(num_particles).wrap_err_with(|| {
            format!("Failed to allocate lookup for {} particles", num_particles)
        })?;

        Ok(SpatialLookup {
            resolution,
            pairs,
            start_indices,
        })
    }

    /// Number of cells along each axis.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn num_cells(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Width of a cell in simulation space.
    pub fn cell_size(&self) -> Scalar {
        1. / self.resolution as Scalar
    }

    /// How many rings of cells around a particle's own cell are needed to see every particle
    /// within `r_max`.
    pub fn reach_for(&self, r_max: Scalar) -> usize {
        ((r_max * self.resolution as Scalar).ceil() as usize).max(1)
    }

    /// Quantizes a position into `(column, row)`. Positions outside the unit square land in
    /// the nearest border cell.
    pub fn cell_coord(&self, position: Vec2) -> (usize, usize) {
        let res = self.resolution as Scalar;
        let max = self.resolution as isize - 1;
        let quantize = |c: Scalar| ((c * res).floor() as isize).clamp(0, max) as usize;
        (quantize(position.x), quantize(position.y))
    }

    /// Row-major key of the cell containing `position`.
    pub fn cell_key(&self, position: Vec2) -> u32 {
        let (x, y) = self.cell_coord(position);
        self.key_of(x, y)
    }

    #[inline]
    fn key_of(&self, x: usize, y: usize) -> u32 {
        (y * self.resolution + x) as u32
    }

    pub fn rebuild(&mut self, particles: &Particles) {
        self.pairs.clear();
        for (i, &position) in particles.position.iter().enumerate() {
            let cell_key = self.cell_key(position);
            self.pairs.push(SpatialPair {
                cell_key,
                particle_index: i as u32,
            });
        }
        self.pairs.sort_unstable();

        self.start_indices.fill(None);
        let mut previous = None;
        for (i, pair) in self.pairs.iter().enumerate() {
            if previous != Some(pair.cell_key) {
                self.start_indices[pair.cell_key as usize] = Some(i as u32);
                previous = Some(pair.cell_key);
            }
        }

        trace!(
            particles = self.pairs.len(),
            occupied = self.start_indices.iter().filter(|s| s.is_some()).count(),
            "rebuilt spatial lookup"
        );
    }

    /// The sorted pairs for every particle, grouped by cell.
    pub fn pairs(&self) -> &[SpatialPair] {
        &self.pairs
    }

    /// All of the pairs in cell `key`. Empty if the cell has no particles or the key is out of
    /// range.
    pub fn cell(&self, key: u32) -> &[SpatialPair] {
        let start = match self.start_indices.get(key as usize).copied().flatten() {
            Some(start) => start as usize,
            None => return &[],
        };

        let run = &self.pairs[start..];
        let len = run
            .iter()
            .position(|pair| pair.cell_key != key)
            .unwrap_or(run.len());
        &run[..len]
    }

    /// Keys of the cells within `reach` rings of the cell containing `position`, clipped at the
    /// edges of the grid.
    pub fn neighbor_keys(&self, position: Vec2, reach: usize) -> SmallVec<[u32; 9]> {
        let (x, y) = self.cell_coord(position);
        let max = self.resolution - 1;

        iproduct!(
            y.saturating_sub(reach)..=usize::min(y + reach, max),
            x.saturating_sub(reach)..=usize::min(x + reach, max)
        )
        .map(|(y, x)| self.key_of(x, y))
        .collect()
    }

    /// Indices of every particle in the cells around `position`. Includes the particle at
    /// `position` itself, if there is one.
    pub fn neighbors(&self, position: Vec2, reach: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbor_keys(position, reach)
            .into_iter()
            .flat_map(move |key| self.cell(key).iter().map(|pair| pair.particle_index as usize))
    }
}
