//! Systematic generator matrix construction
//!
//! The generator for `data` data shards and `parity` parity shards is a
//! `(data + parity) x data` matrix whose top `data` rows are the identity.
//! Reconstruction from any `data` surviving shards works only if every
//! `data x data` row selection is invertible, so both constructions here
//! guarantee that property:
//!
//! - **Cauchy**: parity row `r`, column `c` is `1 / (r + c)`. Row and column
//!   labels come from disjoint sets, and every square submatrix of a Cauchy
//!   matrix is non-singular.
//! - **Vandermonde**: rows of `V[r][c] = r^c` are evaluation points of
//!   distinct field elements, so any `data` of them are independent;
//!   multiplying by the inverse of the top block makes the result systematic.
//!
//! [`check_submatrices`] verifies the property directly by enumeration.

use super::error::{RsError, RsResult};
use super::galois::GaloisField;
use super::matrix::Matrix;
use log::debug;
use std::fmt;
use std::str::FromStr;

/// Upper bound on data + parity shards for an 8-bit field
pub const MAX_TOTAL_SHARDS: usize = 256;

/// Parity-row construction used for the generator matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MatrixKind {
    /// Identity over a Cauchy block (invertibility by construction)
    #[default]
    Cauchy,
    /// Vandermonde matrix made systematic by its top block's inverse
    Vandermonde,
}

impl fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatrixKind::Cauchy => write!(f, "cauchy"),
            MatrixKind::Vandermonde => write!(f, "vandermonde"),
        }
    }
}

impl FromStr for MatrixKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cauchy" => Ok(MatrixKind::Cauchy),
            "vandermonde" => Ok(MatrixKind::Vandermonde),
            other => Err(format!(
                "unknown matrix kind '{other}' (expected cauchy or vandermonde)"
            )),
        }
    }
}

/// Check `data >= 1` and `data + parity <= 256`
pub fn validate_shard_counts(data: usize, parity: usize) -> RsResult<()> {
    if data == 0 || data.saturating_add(parity) > MAX_TOTAL_SHARDS {
        return Err(RsError::InvalidShardCount { data, parity });
    }
    Ok(())
}

/// Build the systematic `(data + parity) x data` generator matrix
pub fn build_generator(
    field: &GaloisField,
    data: usize,
    parity: usize,
    kind: MatrixKind,
) -> RsResult<Matrix> {
    validate_shard_counts(data, parity)?;

    let generator = match kind {
        MatrixKind::Cauchy => build_cauchy(field, data, parity)?,
        MatrixKind::Vandermonde => build_vandermonde(field, data, parity)?,
    };
    debug!(
        "Built {} generator matrix: {} data + {} parity shards",
        kind, data, parity
    );
    Ok(generator)
}

fn build_cauchy(field: &GaloisField, data: usize, parity: usize) -> RsResult<Matrix> {
    let total = data + parity;
    let mut matrix = Matrix::new(total, data);
    for i in 0..data {
        matrix.set(i, i, 1);
    }
    for r in data..total {
        for c in 0..data {
            // r >= data > c, so r ^ c is never zero
            matrix.set(r, c, field.inv((r ^ c) as u8)?);
        }
    }
    Ok(matrix)
}

fn build_vandermonde(field: &GaloisField, data: usize, parity: usize) -> RsResult<Matrix> {
    let total = data + parity;
    let full = vandermonde(field, total, data);
    let top_inverse = full.sub_matrix(0..data, 0..data)?.invert(field)?;
    full.multiply(&top_inverse, field)
}

/// `rows x cols` Vandermonde matrix with `V[r][c] = r^c`
pub fn vandermonde(field: &GaloisField, rows: usize, cols: usize) -> Matrix {
    let mut matrix = Matrix::new(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            matrix.set(r, c, field.exp(r as u8, c));
        }
    }
    matrix
}

/// Invert the square submatrix formed by `rows` of `generator`
pub fn check_row_subset(generator: &Matrix, rows: &[usize], field: &GaloisField) -> RsResult<()> {
    generator.select_rows(rows)?.invert(field).map(|_| ())
}

/// Check that every `cols x cols` row selection of `generator` is invertible
///
/// Enumerates row subsets in lexicographic order, stopping after `limit`
/// subsets when given. Returns the number of subsets checked.
pub fn check_submatrices(
    generator: &Matrix,
    field: &GaloisField,
    limit: Option<usize>,
) -> RsResult<usize> {
    let mut checked = 0;
    for subset in Combinations::new(generator.rows(), generator.cols()) {
        if limit.is_some_and(|max| checked >= max) {
            break;
        }
        check_row_subset(generator, &subset, field)?;
        checked += 1;
    }
    Ok(checked)
}

/// Lexicographic `k`-subsets of `0..n`
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = self.indices.clone();

        let k = self.indices.len();
        match (0..k).rev().find(|&i| self.indices[i] < self.n - k + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}
