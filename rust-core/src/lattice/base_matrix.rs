use anyhow::Error;
use nalgebra::{Matrix3, Vector3};

use crate::config::{BASE_VECTOR_TOLERANCE, MAX_DIMENSION};

/// Primitive vectors (columns) and orbital positions of a 1D, 2D or 3D lattice.
///
/// Lower-dimensional lattices are embedded in 3D: unused columns are the
/// cartesian unit vectors and unused components are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeBasis {
    base_matrix: Matrix3<f64>,
    orbital_positions: Vec<Vector3<f64>>,
    dimension: usize,
}

impl LatticeBasis {
    pub fn from_vectors(vectors: &[Vec<f64>], orbital_positions: &[Vec<f64>]) -> Result<Self, Error> {
        let dimension = vectors.len();
        if dimension == 0 || dimension > MAX_DIMENSION {
            return Err(Error::msg(format!(
                "Expected 1 to 3 primitive vectors, got {dimension}."
            )));
        }

        let mut base_matrix = Matrix3::identity();
        for (i, vector) in vectors.iter().enumerate() {
            base_matrix.set_column(i, &embed(vector, dimension)?);
        }

        // Linearly non-dependent (also catches zero vectors)
        if base_matrix.determinant().abs() < BASE_VECTOR_TOLERANCE {
            return Err(Error::msg(
                "Primitive vectors are either linearly dependent or too close to zero.",
            ));
        }

        if orbital_positions.is_empty() {
            return Err(Error::msg("At least one orbital position is required."));
        }
        let orbital_positions = orbital_positions
            .iter()
            .map(|position| embed(position, dimension))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LatticeBasis {
            base_matrix,
            orbital_positions,
            dimension,
        })
    }

    pub fn base_matrix(&self) -> &Matrix3<f64> {
        &self.base_matrix
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn orbitals(&self) -> usize {
        self.orbital_positions.len()
    }

    pub fn orbital_position(&self, orbital: usize) -> &Vector3<f64> {
        &self.orbital_positions[orbital]
    }

    /// Cartesian vector of an integer lattice translation.
    pub fn translation(&self, cells: &[isize]) -> Vector3<f64> {
        let mut n = Vector3::zeros();
        for (i, &c) in cells.iter().take(self.dimension).enumerate() {
            n[i] = c as f64;
        }
        self.base_matrix * n
    }

    /// `r(to) - r(from)` for two orbitals sitting in cells `from_cell` and `to_cell`.
    pub fn displacement(
        &self,
        from_cell: &[isize],
        from_orbital: usize,
        to_cell: &[isize],
        to_orbital: usize,
    ) -> Vector3<f64> {
        let cells: Vec<isize> = to_cell
            .iter()
            .zip(from_cell)
            .map(|(to, from)| to - from)
            .collect();
        self.orbital_positions[to_orbital] - self.orbital_positions[from_orbital]
            + self.translation(&cells)
    }
}

fn embed(components: &[f64], dimension: usize) -> Result<Vector3<f64>, Error> {
    if components.len() != dimension {
        return Err(Error::msg(format!(
            "Expected {dimension} components, got {}.",
            components.len()
        )));
    }
    let mut v = Vector3::zeros();
    for (i, &x) in components.iter().enumerate() {
        v[i] = x;
    }
    Ok(v)
}
