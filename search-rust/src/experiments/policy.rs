//! Linear policy: action = W · normalize(observation).
//!
//! `W` is an (action_dim × obs_dim) matrix stored row-major in a flat f64
//! vector. The search treats it as an opaque point in parameter space and
//! only needs elementwise arithmetic plus the matrix-vector product.

use rand::Rng;
use serde::Serialize;

use super::error::SearchError;
use super::normalize::normalize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Row-major `data`; fails unless it holds exactly `rows * cols` values.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self, SearchError> {
        if data.len() != rows * cols {
            return Err(SearchError::MatrixData { rows, cols, len: data.len() });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Independent entries drawn uniformly from `[0, 1)`.
    pub fn random_uniform<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let data = (0..rows * cols).map(|_| rng.gen::<f64>()).collect();
        Matrix { rows, cols, data }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// `self + k * other`.
    pub fn scaled_add(&self, other: &Matrix, k: f64) -> Matrix {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols), "shape mismatch");
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a + k * b).collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    pub fn add(&self, other: &Matrix) -> Matrix {
        self.scaled_add(other, 1.0)
    }

    pub fn sub(&self, other: &Matrix) -> Matrix {
        self.scaled_add(other, -1.0)
    }

    /// Matrix-vector product. Fails if `x.len() != cols`.
    pub fn matvec(&self, x: &[f64]) -> Result<Vec<f64>, SearchError> {
        if x.len() != self.cols {
            return Err(SearchError::WeightShape {
                rows: self.rows,
                cols: self.cols,
                obs_len: x.len(),
            });
        }
        Ok(self
            .data
            .chunks_exact(self.cols.max(1))
            .take(self.rows)
            .map(|row| row.iter().zip(x).map(|(w, v)| w * v).sum())
            .collect())
    }
}

#[cfg(test)]
impl Matrix {
    pub(crate) fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Matrix { rows, cols, data: vec![value; rows * cols] }
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}

/// Observation → action through a weight matrix.
pub struct LinearPolicy<'a> {
    weights: &'a Matrix,
}

impl<'a> LinearPolicy<'a> {
    pub fn new(weights: &'a Matrix) -> Self {
        LinearPolicy { weights }
    }

    pub fn act(&self, observation: &[f64]) -> Result<Vec<f64>, SearchError> {
        let x = normalize(observation)?;
        self.weights.matvec(&x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::error::NormalizeError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_matvec() {
        let w = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, -1.0, 0.0, 0.5]).unwrap();
        let y = w.matvec(&[1.0, 1.0, 2.0]).unwrap();
        assert_eq!(y, vec![9.0, 0.0]);
    }

    #[test]
    fn test_from_vec_checks_length() {
        assert_eq!(
            Matrix::from_vec(2, 3, vec![1.0; 5]),
            Err(SearchError::MatrixData { rows: 2, cols: 3, len: 5 })
        );
        let m = Matrix::from_vec(2, 3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m, Matrix::from_vec(2, 3, (0..6).map(f64::from).collect()).unwrap());
    }

    #[test]
    fn test_matvec_shape_error() {
        let w = Matrix::zeros(2, 3);
        assert_eq!(
            w.matvec(&[1.0, 2.0]),
            Err(SearchError::WeightShape { rows: 2, cols: 3, obs_len: 2 })
        );
    }

    #[test]
    fn test_arithmetic() {
        let a = Matrix::from_vec(1, 2, vec![1.0, 2.0]).unwrap();
        let b = Matrix::from_vec(1, 2, vec![0.5, -1.0]).unwrap();
        assert_eq!(a.add(&b).as_slice(), &[1.5, 1.0]);
        assert_eq!(a.sub(&b).as_slice(), &[0.5, 3.0]);
        assert_eq!(a.scaled_add(&b, 4.0).as_slice(), &[3.0, -2.0]);
    }

    #[test]
    fn test_random_uniform_range_and_seed() {
        let m1 = Matrix::random_uniform(4, 24, &mut StdRng::seed_from_u64(11));
        let m2 = Matrix::random_uniform(4, 24, &mut StdRng::seed_from_u64(11));
        assert_eq!(m1, m2);
        assert_eq!((m1.rows(), m1.cols()), (4, 24));
        assert!(m1.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_linear_policy_normalizes_input() {
        let w = Matrix::from_vec(1, 2, vec![1.0, 0.0]).unwrap();
        let policy = LinearPolicy::new(&w);
        // [10, 30] normalizes to [-1/√2, 1/√2] no matter the scale.
        let a = policy.act(&[10.0, 30.0]).unwrap();
        assert!((a[0] + std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_linear_policy_zero_weights() {
        let w = Matrix::zeros(3, 4);
        let a = LinearPolicy::new(&w).act(&[0.1, 0.4, -2.0, 7.0]).unwrap();
        assert_eq!(a, vec![0.0; 3]);
    }

    #[test]
    fn test_linear_policy_degenerate_observation() {
        let w = Matrix::zeros(1, 3);
        assert_eq!(
            LinearPolicy::new(&w).act(&[1.0, 1.0, 1.0]),
            Err(SearchError::Normalize(NormalizeError::ZeroVariance))
        );
    }
}
