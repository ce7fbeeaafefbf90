use crate::{Scalar, Species};
use na::DMatrix;

/// Dense table of interaction coefficients. Entry `(row, col)` is how strongly species `row` is
/// attracted to (positive) or repelled by (negative) species `col`.
///
/// Accessors are lenient: assigning out of bounds does nothing and reading out of bounds
/// returns zero. Dimensions are checked against the species count in
/// [`SimulationParameters::validate`](crate::SimulationParameters::validate) instead.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionMatrix {
    data: DMatrix<Scalar>,
}

impl InteractionMatrix {
    /// Creates a `rows` x `cols` matrix filled with zeros.
    pub fn new(rows: usize, cols: usize) -> Self {
        InteractionMatrix {
            data: DMatrix::zeros(rows, cols),
        }
    }

    /// Builds a matrix from a list of rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<Scalar>]) -> eyre::Result<Self> {
        let cols = rows.first().map_or(0, |row| row.len());
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            eyre::bail!(
                "Interaction matrix row {} has {} entries, expected {}",
                i,
                row.len(),
                cols
            );
        }

        Ok(InteractionMatrix {
            data: DMatrix::from_fn(rows.len(), cols, |r, c| rows[r][c]),
        })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn fill(&mut self, value: Scalar) {
        self.data.fill(value);
    }

    pub fn assign(&mut self, row: usize, col: usize, value: Scalar) {
        if let Some(entry) = self.data.get_mut((row, col)) {
            *entry = value;
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Scalar {
        self.data.get((row, col)).copied().unwrap_or(0.)
    }

    /// The coefficient governing the force `from` feels towards `to`.
    #[inline]
    pub fn attraction(&self, from: Species, to: Species) -> Scalar {
        self.get(from.index(), to.index())
    }

    pub fn to_rows(&self) -> Vec<Vec<Scalar>> {
        self.data
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect()
    }
}
