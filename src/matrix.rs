use std::fmt;
use std::ops::{Index, IndexMut};

use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;

pub mod activations;
pub mod basic_ops;

pub use activations::LEAKY_RELU_SLOPE;

/// Dense `f32` matrix stored row-major in one buffer: element `(r, c)` lives
/// at `r * cols + c` and `data.len() == rows * cols` always holds.
///
/// Every operation returns a freshly allocated matrix; operands are never
/// mutated. Shape mismatches are programmer errors and panic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matrix {
    data: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl Matrix {

    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Matrix {
        assert_eq!(data.len(), rows * cols,
            "Data length {} doesn't match shape {}x{} (expected {})",
            data.len(), rows, cols, rows * cols);
        Matrix { data, rows, cols }
    }

    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix::new(vec![0.0; rows * cols], rows, cols)
    }

    /// Builds a matrix from literal rows, e.g. `Matrix::from_rows(&[[2.0, 5.0], [-2.0, 0.0]])`.
    pub fn from_rows<const C: usize>(rows: &[[f32; C]]) -> Matrix {
        let data = rows.iter().flatten().copied().collect();
        Matrix::new(data, rows.len(), C)
    }

    /// Uniform values in `[-1, 1)` from a seeded PCG generator.
    pub fn random(rows: usize, cols: usize, seed: u64) -> Matrix {
        let mut rng = Pcg64::seed_from_u64(seed);
        let uniform = Uniform::new(-1.0, 1.0);
        let data = (0..rows * cols)
            .map(|_| uniform.sample(&mut rng))
            .collect::<Vec<f32>>();

        Matrix::new(data, rows, cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.data
    }

    pub fn into_values(self) -> Vec<f32> {
        self.data
    }

    pub fn row(&self, r: usize) -> &[f32] {
        assert!(r < self.rows, "Row {} out of bounds for {}x{} matrix", r, self.rows, self.cols);
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    fn offset(&self, r: usize, c: usize) -> usize {
        assert!(r < self.rows && c < self.cols,
            "Index ({}, {}) out of bounds for {}x{} matrix", r, c, self.rows, self.cols);
        r * self.cols + c
    }

    pub fn at(&self, r: usize, c: usize) -> f32 {
        self.data[self.offset(r, c)]
    }

    pub fn at_mut(&mut self, r: usize, c: usize) -> &mut f32 {
        let idx = self.offset(r, c);
        &mut self.data[idx]
    }

    pub fn set(&mut self, r: usize, c: usize, value: f32) {
        *self.at_mut(r, c) = value;
    }

    pub fn transpose(&self) -> Matrix {
        let mut data = vec![0.0; self.data.len()];
        for i in 0..self.rows {
            for j in 0..self.cols {
                data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        Matrix::new(data, self.cols, self.rows)
    }

    pub fn scalar_multiply(&self, scalar: f32) -> Matrix {
        self.map(|x| x * scalar)
    }

    /// Standard product `self · other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.cols, other.rows,
            "Matrix dimensions don't match: {}x{} * {}x{}",
            self.rows, self.cols, other.rows, other.cols);

        let n = other.cols;
        par_rows(self.rows, n, |i, out_row| {
            for (k, &a) in self.row(i).iter().enumerate() {
                let b_row = &other.data[k * n..(k + 1) * n];
                for (out, &b) in out_row.iter_mut().zip(b_row) {
                    *out += a * b;
                }
            }
        })
    }

    /// `self · other_t^T` without building the transpose. Strided access to
    /// neither operand, but every output cell is a full dot product, so it is
    /// the slow path: only use it when the right operand arrives transposed.
    pub fn multiply_transpose(&self, other_t: &Matrix) -> Matrix {
        assert_eq!(self.cols, other_t.cols,
            "Matrix dimensions don't match: {}x{} * ({}x{})^T",
            self.rows, self.cols, other_t.rows, other_t.cols);

        par_rows(self.rows, other_t.rows, |i, out_row| {
            let a_row = self.row(i);
            for (j, out) in out_row.iter_mut().enumerate() {
                *out = a_row.iter()
                    .zip(other_t.row(j))
                    .fold(0.0, |acc, (&a, &b)| acc + a * b);
            }
        })
    }

    /// `self^T · other` without building the transpose.
    pub fn transpose_multiply(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.rows, other.rows,
            "Matrix dimensions don't match: ({}x{})^T * {}x{}",
            self.rows, self.cols, other.rows, other.cols);

        par_rows(self.cols, other.cols, |i, out_row| {
            for k in 0..self.rows {
                let a = self.data[k * self.cols + i];
                for (out, &b) in out_row.iter_mut().zip(other.row(k)) {
                    *out += a * b;
                }
            }
        })
    }

    pub fn square(&self) -> Matrix {
        self.map(|x| x * x)
    }

    /// Adds `vector[r]` to every element of row `r`.
    pub fn add_vector(&self, vector: &[f32]) -> Matrix {
        assert_eq!(vector.len(), self.rows,
            "Vector length {} doesn't match {} matrix rows", vector.len(), self.rows);

        par_rows(self.rows, self.cols, |r, out_row| {
            let addend = vector[r];
            for (out, &x) in out_row.iter_mut().zip(self.row(r)) {
                *out = x + addend;
            }
        })
    }

    /// Sum of each row, one entry per row.
    pub fn collapse(&self) -> Vec<f32> {
        (0..self.rows)
            .into_par_iter()
            .map(|r| self.row(r).iter().fold(0.0, |acc, &x| acc + x))
            .collect()
    }

    pub(crate) fn map<F>(&self, f: F) -> Matrix
    where
        F: Fn(f32) -> f32 + Sync + Send,
    {
        let data = self.data.par_iter().map(|&x| f(x)).collect();
        Matrix::new(data, self.rows, self.cols)
    }

    pub(crate) fn zip_map<F>(&self, other: &Matrix, f: F) -> Matrix
    where
        F: Fn(f32, f32) -> f32 + Sync + Send,
    {
        assert_eq!(self.dims(), other.dims(),
            "Shape mismatch {:?} vs {:?}", self.dims(), other.dims());
        let data = self.data.par_iter()
            .zip(other.data.par_iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Matrix::new(data, self.rows, self.cols)
    }
}

/// Allocates a zeroed `rows x cols` buffer and lets `fill(r, row)` write each
/// output row on the rayon pool. Rows are independent, so the result does not
/// depend on the number of worker threads.
fn par_rows<F>(rows: usize, cols: usize, fill: F) -> Matrix
where
    F: Fn(usize, &mut [f32]) + Sync + Send,
{
    let mut data = vec![0.0; rows * cols];
    if cols > 0 {
        data.par_chunks_mut(cols)
            .enumerate()
            .for_each(|(r, out_row)| fill(r, out_row));
    }
    Matrix::new(data, rows, cols)
}

impl Index<(usize, usize)> for Matrix {
    type Output = f32;

    fn index(&self, (r, c): (usize, usize)) -> &f32 {
        &self.data[self.offset(r, c)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f32 {
        self.at_mut(r, c)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} x {}:", self.rows, self.cols)?;
        for r in 0..self.rows {
            for x in self.row(r) {
                write!(f, "{}\t", x)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
