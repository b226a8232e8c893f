// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Basis
//!
//! The reduced coordinate system every skill lives in: `k` orthonormal rows of
//! dimension `d`, produced offline and loaded read-only.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Projection into and reconstruction out of the reduced space

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::dot;

#[derive(Debug, Error)]
pub enum BasisError {
    #[error("Basis has no rows")]
    Empty,

    #[error("Basis row {row} has dimension {found}, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Basis header declares {declared_rank}x{declared_dim} but rows are {rank}x{dim}")]
    HeaderMismatch {
        declared_rank: usize,
        declared_dim: usize,
        rank: usize,
        dim: usize,
    },

    #[error("Basis contains a non-finite value at row {row}")]
    NonFinite { row: usize },
}

/// Immutable `(k, d)` matrix stored row-major.
///
/// Orthonormality is guaranteed by the offline builder and not re-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Basis {
    rank: usize,
    dim: usize,
    data: Vec<f32>,
}

/// On-disk shape of a basis file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasisFile {
    pub rank: usize,
    pub dim: usize,
    pub rows: Vec<Vec<f32>>,
}

impl Basis {
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, BasisError> {
        let dim = rows.first().map(|r| r.len()).ok_or(BasisError::Empty)?;
        if dim == 0 {
            return Err(BasisError::Empty);
        }

        let rank = rows.len();
        let mut data = Vec::with_capacity(rank * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(BasisError::Ragged {
                    row: i,
                    expected: dim,
                    found: row.len(),
                });
            }
            if row.iter().any(|x| !x.is_finite()) {
                return Err(BasisError::NonFinite { row: i });
            }
            data.extend(row);
        }

        Ok(Self { rank, dim, data })
    }

    pub fn from_file(file: BasisFile) -> Result<Self, BasisError> {
        let declared_rank = file.rank;
        let declared_dim = file.dim;
        let basis = Self::from_rows(file.rows)?;
        if basis.rank != declared_rank || basis.dim != declared_dim {
            return Err(BasisError::HeaderMismatch {
                declared_rank,
                declared_dim,
                rank: basis.rank,
                dim: basis.dim,
            });
        }
        Ok(basis)
    }

    pub fn to_file(&self) -> BasisFile {
        BasisFile {
            rank: self.rank,
            dim: self.dim,
            rows: self.rows().map(|r| r.to_vec()).collect(),
        }
    }

    /// Number of basis rows (`k`).
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Embedding dimension (`d`).
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dim)
    }

    /// `state · Basisᵀ`: one coefficient per basis row.
    ///
    /// Returns `None` if `state` is not `d`-dimensional.
    pub fn project(&self, state: &[f32]) -> Option<Vec<f32>> {
        if state.len() != self.dim {
            return None;
        }
        Some(self.rows().map(|row| dot(row, state)).collect())
    }

    /// `coefficients · Basis`: a `(1×k)·(k×d)` product back into embedding space.
    ///
    /// Returns `None` if `coefficients` is not `k`-dimensional.
    pub fn reconstruct(&self, coefficients: &[f32]) -> Option<Vec<f32>> {
        if coefficients.len() != self.rank {
            return None;
        }
        let mut out = vec![0.0f32; self.dim];
        for (c, row) in coefficients.iter().zip(self.rows()) {
            for (o, b) in out.iter_mut().zip(row.iter()) {
                *o += c * b;
            }
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_basis() -> Basis {
        // Two orthonormal rows in R^3.
        Basis::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap()
    }

    #[test]
    fn test_shape() {
        let basis = axis_basis();
        assert_eq!(basis.rank(), 2);
        assert_eq!(basis.dim(), 3);
        assert_eq!(basis.row(1), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_project() {
        let basis = axis_basis();
        assert_eq!(basis.project(&[0.5, -2.0, 9.0]).unwrap(), vec![0.5, -2.0]);
        assert!(basis.project(&[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_reconstruct() {
        let basis = axis_basis();
        assert_eq!(basis.reconstruct(&[0.6, 0.8]).unwrap(), vec![0.6, 0.8, 0.0]);
        assert!(basis.reconstruct(&[1.0]).is_none());
    }

    #[test]
    fn test_rejects_ragged_and_empty() {
        assert!(matches!(Basis::from_rows(vec![]), Err(BasisError::Empty)));
        assert!(matches!(
            Basis::from_rows(vec![vec![1.0, 0.0], vec![1.0]]),
            Err(BasisError::Ragged { row: 1, .. })
        ));
        assert!(matches!(
            Basis::from_rows(vec![vec![f32::NAN]]),
            Err(BasisError::NonFinite { row: 0 })
        ));
    }

    #[test]
    fn test_file_header_must_match() {
        let file = BasisFile {
            rank: 3,
            dim: 3,
            rows: vec![vec![1.0, 0.0, 0.0]],
        };
        assert!(matches!(Basis::from_file(file), Err(BasisError::HeaderMismatch { .. })));

        let roundtrip = Basis::from_file(axis_basis().to_file()).unwrap();
        assert_eq!(roundtrip, axis_basis());
    }
}
