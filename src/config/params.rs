//! Solver parameters for the conjugate gradient engine.
//!
//! Defaults: `maxiter = 100`, `tol = 1e-8`. Parameters are validated when the
//! engine is constructed and cannot be changed afterwards.

use num_traits::{Float, NumCast};

use crate::error::KError;

/// PCG stopping parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PcgParams<R> {
    /// Maximum number of iterations.
    pub maxiter: usize,
    /// Target relative residual ‖b − A·x‖ / ‖b‖.
    pub tol: R,
}

impl<R: Float> Default for PcgParams<R> {
    fn default() -> Self {
        Self {
            maxiter: 100,
            tol: <R as NumCast>::from(1e-8).unwrap_or_else(R::epsilon),
        }
    }
}

impl<R: Float> PcgParams<R> {
    pub fn new(maxiter: usize, tol: R) -> Self {
        Self { maxiter, tol }
    }

    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }

    pub fn with_tol(mut self, tol: R) -> Self {
        self.tol = tol;
        self
    }

    /// Reject `maxiter == 0` and a negative or NaN `tol`.
    pub fn validate(&self) -> Result<(), KError> {
        if self.maxiter == 0 {
            return Err(KError::InvalidParameter("maxiter must be positive".into()));
        }
        if self.tol.is_nan() || self.tol < R::zero() {
            return Err(KError::InvalidParameter(
                "tol must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let prm = PcgParams::<f64>::default();
        assert_eq!(prm.maxiter, 100);
        assert_eq!(prm.tol, 1e-8);
        assert!(prm.validate().is_ok());
    }

    /// Stricter than accepting any values: zero `maxiter` and negative or NaN
    /// `tol` are refused before a solver is built.
    #[test]
    fn validation_is_stricter_than_plain_construction() {
        assert!(PcgParams::new(0, 1e-8f64).validate().is_err());
        assert!(PcgParams::new(10, -1e-3f64).validate().is_err());
        assert!(PcgParams::new(10, f32::NAN).validate().is_err());
        assert!(PcgParams::new(1, 0.0f64).validate().is_ok());
    }
}
