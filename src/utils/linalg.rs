//! Dense matrix/vector kernels
//!
//! Matrices are stored row-major in a flat `Vec<f32>`. Every kernel is a pure
//! function over its inputs, so rows can be computed in parallel. With the
//! `blas` feature the matrix-vector products go through CBLAS `sgemv`.

use crate::error::{NetworkError, Result};
#[cfg(not(feature = "blas"))]
use rayon::prelude::*;

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Matrix of the given shape filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from flat row-major data.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(NetworkError::ShapeMismatch(format!(
                "{} values cannot fill a {}x{} matrix",
                data.len(),
                rows,
                cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from nested rows; every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let row_count = rows.len();
        let mut data = Vec::with_capacity(row_count * cols);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(NetworkError::ShapeMismatch(format!(
                    "row {} has {} columns, expected {}",
                    index,
                    row.len(),
                    cols
                )));
            }
            data.extend(row);
        }
        Ok(Self {
            rows: row_count,
            cols,
            data,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Element at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        assert!(row < self.rows && col < self.cols, "matrix index out of bounds");
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    fn shape_text(&self) -> String {
        format!("{}x{}", self.rows, self.cols)
    }
}

/// Computes `M · v`.
///
/// Fails with `ShapeMismatch` when `M` is empty or `cols(M) != len(v)`; the
/// message reports the matrix shape and the vector length.
///
/// # Examples
///
/// ```
/// use dense_mlp::utils::linalg::{matrix_vector_multiply, Matrix};
///
/// let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// assert_eq!(matrix_vector_multiply(&m, &[1.0, 1.0]).unwrap(), vec![3.0, 7.0]);
/// ```
pub fn matrix_vector_multiply(matrix: &Matrix, vector: &[f32]) -> Result<Vec<f32>> {
    if matrix.is_empty() || matrix.cols != vector.len() {
        return Err(NetworkError::ShapeMismatch(format!(
            "matrix and vector dimensions are incompatible: matrix {}, vector {}x1",
            matrix.shape_text(),
            vector.len()
        )));
    }
    Ok(gemv(matrix, vector, false))
}

/// Computes `Mᵀ · v`, i.e. `result[n] = Σ_m M[m][n]·v[m]`.
///
/// Used to carry deltas back through a layer's weights.
pub fn transpose_matrix_vector_multiply(matrix: &Matrix, vector: &[f32]) -> Result<Vec<f32>> {
    if matrix.is_empty() || matrix.rows != vector.len() {
        return Err(NetworkError::ShapeMismatch(format!(
            "transposed matrix and vector dimensions are incompatible: matrix {}, vector {}x1",
            matrix.shape_text(),
            vector.len()
        )));
    }
    Ok(gemv(matrix, vector, true))
}

#[cfg(not(feature = "blas"))]
fn gemv(matrix: &Matrix, vector: &[f32], transpose: bool) -> Vec<f32> {
    if transpose {
        (0..matrix.cols)
            .into_par_iter()
            .map(|col| {
                matrix
                    .data
                    .iter()
                    .skip(col)
                    .step_by(matrix.cols)
                    .zip(vector)
                    .map(|(w, v)| w * v)
                    .sum()
            })
            .collect()
    } else {
        matrix
            .data
            .par_chunks_exact(matrix.cols)
            .map(|row| dot(row, vector))
            .collect()
    }
}

#[cfg(feature = "blas")]
fn gemv(matrix: &Matrix, vector: &[f32], transpose: bool) -> Vec<f32> {
    use cblas::{sgemv, Layout, Transpose};

    let (trans, out_len) = if transpose {
        (Transpose::Ordinary, matrix.cols)
    } else {
        (Transpose::None, matrix.rows)
    };
    let mut result = vec![0.0f32; out_len];

    unsafe {
        sgemv(
            Layout::RowMajor,
            trans,
            matrix.rows as i32,
            matrix.cols as i32,
            1.0,
            &matrix.data,
            matrix.cols as i32,
            vector,
            1,
            0.0,
            &mut result,
            1,
        );
    }
    result
}

#[cfg_attr(feature = "blas", allow(dead_code))]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Elementwise `a + b`; lengths must match.
pub fn vector_add(a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
    if a.len() != b.len() {
        return Err(NetworkError::ShapeMismatch(format!(
            "vector dimensions mismatch: lhs size = {}, rhs size = {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}

/// Outer product `a ⊗ b`: a `len(a) × len(b)` matrix with entries `a[i]·b[j]`.
pub fn outer_product(a: &[f32], b: &[f32]) -> Matrix {
    let mut data = Vec::with_capacity(a.len() * b.len());
    for &x in a {
        data.extend(b.iter().map(|&y| x * y));
    }
    Matrix {
        rows: a.len(),
        cols: b.len(),
        data,
    }
}
