//! Convergence tracking & tolerance checks for iterative solvers.

use std::fmt;

use num_traits::Float;

/// Stopping rule on the relative residual.
#[derive(Clone, Copy, Debug)]
pub struct Convergence<R> {
    pub tol: R,
    pub max_iters: usize,
}

impl<R: Float> Convergence<R> {
    /// True while `relative_residual > tol` and `iteration < max_iters`.
    ///
    /// A NaN residual compares false against `tol` and stops the iteration.
    #[inline]
    pub fn keep_going(&self, relative_residual: R, iteration: usize) -> bool {
        relative_residual > self.tol && iteration < self.max_iters
    }
}

/// Outcome of one solve: iterations performed and final relative residual.
///
/// Running out of iterations is not an error; compare `residual` against the
/// tolerance (see [`SolveStats::converged`]) to decide whether it is acceptable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveStats<R> {
    pub iterations: usize,
    pub residual: R,
}

impl<R: Float> SolveStats<R> {
    pub fn converged(&self, tol: R) -> bool {
        self.residual <= tol
    }
}

impl<R: fmt::Display> fmt::Display for SolveStats<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "iterations: {}, error: {}", self.iterations, self.residual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_on_tolerance_or_budget() {
        let conv = Convergence { tol: 1e-6, max_iters: 3 };
        assert!(conv.keep_going(1e-3, 0));
        assert!(!conv.keep_going(1e-6, 0));
        assert!(!conv.keep_going(1e-3, 3));
        assert!(!conv.keep_going(f64::NAN, 0));
    }

    #[test]
    fn display() {
        let stats = SolveStats { iterations: 4, residual: 0.5 };
        assert_eq!(stats.to_string(), "iterations: 4, error: 0.5");
        assert!(stats.converged(0.5));
        assert!(!stats.converged(0.1));
    }
}
