use std::ops::{Add, Sub};

use crate::matrix::Matrix;

impl Matrix {

    pub fn add(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.dims(), other.dims(),
            "Matrix add: shape mismatch {:?} vs {:?}", self.dims(), other.dims());
        self.zip_map(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.dims(), other.dims(),
            "Matrix subtract: shape mismatch {:?} vs {:?}", self.dims(), other.dims());
        self.zip_map(other, |a, b| a - b)
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: &Matrix) -> Matrix {
        Matrix::add(self, rhs)
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: &Matrix) -> Matrix {
        self.subtract(rhs)
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Matrix) -> Matrix {
        self.subtract(&rhs)
    }
}
