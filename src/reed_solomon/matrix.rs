//! Matrices over GF(2^8) for Reed-Solomon coding
//!
//! Small, dense, row-major matrices of field elements. Only the operations
//! the codec needs are provided: identity, product, augmentation, row and
//! range extraction, and Gauss-Jordan inversion.
//!
//! Arithmetic goes through an explicit [`GaloisField`] argument; row
//! operations reuse the field's batched slice kernels.

use super::error::{RsError, RsResult};
use super::galois::GaloisField;
use std::fmt;
use std::ops::Range;

/// Dense row-major matrix of GF(2^8) elements
#[derive(Clone, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    /// Create a new zero matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0; rows * cols],
        }
    }

    /// Create an identity matrix
    pub fn identity(size: usize) -> Self {
        let mut matrix = Self::new(size, size);
        for i in 0..size {
            matrix.set(i, i, 1);
        }
        matrix
    }

    /// Build a matrix from explicit rows, which must all have the same length
    pub fn from_rows(rows: Vec<Vec<u8>>) -> RsResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (index, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(RsError::DimensionMismatch(format!(
                    "row {index} has {} columns, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Get element at (row, col)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    /// Set element at (row, col)
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Standard matrix product `self * rhs`
    pub fn multiply(&self, rhs: &Matrix, field: &GaloisField) -> RsResult<Matrix> {
        if self.cols != rhs.rows {
            return Err(RsError::DimensionMismatch(format!(
                "cannot multiply {}x{} by {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }

        let mut result = Matrix::new(self.rows, rhs.cols);
        for r in 0..self.rows {
            let out = result.row_mut(r);
            for (k, &coefficient) in self.row(r).iter().enumerate() {
                field.mul_slice_add(coefficient, rhs.row(k), out);
            }
        }
        Ok(result)
    }

    /// Concatenate `rhs` to the right of `self`
    pub fn augment(&self, rhs: &Matrix) -> RsResult<Matrix> {
        if self.rows != rhs.rows {
            return Err(RsError::DimensionMismatch(format!(
                "cannot augment {} rows with {} rows",
                self.rows, rhs.rows
            )));
        }

        let mut result = Matrix::new(self.rows, self.cols + rhs.cols);
        for r in 0..self.rows {
            let out = result.row_mut(r);
            out[..self.cols].copy_from_slice(self.row(r));
            out[self.cols..].copy_from_slice(rhs.row(r));
        }
        Ok(result)
    }

    /// Extract the block covering `rows` x `cols`
    pub fn sub_matrix(&self, rows: Range<usize>, cols: Range<usize>) -> RsResult<Matrix> {
        if rows.start > rows.end
            || cols.start > cols.end
            || rows.end > self.rows
            || cols.end > self.cols
        {
            return Err(RsError::DimensionMismatch(format!(
                "sub-matrix {rows:?} x {cols:?} outside {}x{}",
                self.rows, self.cols
            )));
        }

        let mut result = Matrix::new(rows.len(), cols.len());
        for (dst, src) in rows.enumerate() {
            result
                .row_mut(dst)
                .copy_from_slice(&self.row(src)[cols.clone()]);
        }
        Ok(result)
    }

    /// Build a matrix from the given rows of `self`, in order
    pub fn select_rows(&self, indices: &[usize]) -> RsResult<Matrix> {
        let mut result = Matrix::new(indices.len(), self.cols);
        for (dst, &src) in indices.iter().enumerate() {
            if src >= self.rows {
                return Err(RsError::DimensionMismatch(format!(
                    "row {src} outside {}x{}",
                    self.rows, self.cols
                )));
            }
            result.row_mut(dst).copy_from_slice(self.row(src));
        }
        Ok(result)
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.cols;
        let (low, high) = (a.min(b), a.max(b));
        let (head, tail) = self.data.split_at_mut(high * cols);
        head[low * cols..(low + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Invert a square matrix by Gauss-Jordan elimination
    ///
    /// The matrix is augmented with the identity; each pivot column is
    /// searched downward for a non-zero entry (swapping rows when needed),
    /// the pivot row is scaled by the pivot's inverse and the column is
    /// cleared from every other row. Fails with [`RsError::SingularMatrix`]
    /// when a column has no usable pivot.
    pub fn invert(&self, field: &GaloisField) -> RsResult<Matrix> {
        if !self.is_square() {
            return Err(RsError::DimensionMismatch(format!(
                "cannot invert non-square {}x{} matrix",
                self.rows, self.cols
            )));
        }

        let size = self.rows;
        let mut work = self.augment(&Matrix::identity(size))?;

        for pivot in 0..size {
            let found = (pivot..size)
                .find(|&r| work.get(r, pivot) != 0)
                .ok_or(RsError::SingularMatrix)?;
            work.swap_rows(pivot, found);

            let scale = field.inv(work.get(pivot, pivot))?;
            if scale != 1 {
                let row = work.row(pivot).to_vec();
                field.mul_slice(scale, &row, work.row_mut(pivot));
            }

            let pivot_row = work.row(pivot).to_vec();
            for r in 0..size {
                if r == pivot {
                    continue;
                }
                let factor = work.get(r, pivot);
                if factor != 0 {
                    field.mul_slice_add(factor, &pivot_row, work.row_mut(r));
                }
            }
        }

        work.sub_matrix(0..size, size..2 * size)
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matrix {}x{} ", self.rows, self.cols)?;
        f.debug_list()
            .entries((0..self.rows).map(|r| hex::encode(self.row(r))))
            .finish()
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            let cells: Vec<String> = self.row(r).iter().map(|v| format!("{v:02x}")).collect();
            writeln!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}
