use rayon::prelude::*;

use crate::matrix::{par_rows, Matrix};

/// Negative-side slope of the leaky ReLU.
pub const LEAKY_RELU_SLOPE: f32 = 0.1;

impl Matrix {

    pub fn leaky_relu(&self) -> Matrix {
        self.map(|x| if x < 0.0 { x * LEAKY_RELU_SLOPE } else { x })
    }

    /// Scales the elements of `self` by the leaky-ReLU slope wherever the
    /// matching pre-activation in `reference` is negative, i.e. `dA * f'(Z)`.
    pub fn leaky_relu_derivative(&self, reference: &Matrix) -> Matrix {
        assert_eq!(self.dims(), reference.dims(),
            "Leaky ReLU derivative: shape mismatch {:?} vs {:?}", self.dims(), reference.dims());
        self.zip_map(reference, |x, z| if z < 0.0 { x * LEAKY_RELU_SLOPE } else { x })
    }

    /// Column-wise softmax: each column becomes a probability distribution.
    ///
    /// The column maximum is not subtracted first, so a logit above ~88
    /// overflows `exp` and turns its column into NaN.
    pub fn softmax(&self) -> Matrix {
        let exps = self.map(f32::exp);
        let cols = self.cols;

        let denominators: Vec<f32> = (0..cols)
            .into_par_iter()
            .map(|c| (0..self.rows).fold(0.0, |acc, r| acc + exps.data[r * cols + c]))
            .collect();

        par_rows(self.rows, cols, |r, out_row| {
            for ((out, &e), &denom) in out_row.iter_mut().zip(exps.row(r)).zip(&denominators) {
                *out = e / denom;
            }
        })
    }
}
