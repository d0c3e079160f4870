//! Relaxation used as a preconditioner.
//!
//! `apply` runs a fixed number of (S)SOR sweeps on `A·x = r` starting from
//! `x = 0`. A symmetric sweep (forward then backward) yields a symmetric
//! positive definite operator for SPD `A` and `0 < ω < 2`, which is what CG
//! requires; one-directional sweeps are only suitable for non-symmetric
//! Krylov methods.

use std::fmt;

use bitflags::bitflags;
use num_traits::{One, Zero};

use crate::backend::Builtin;
use crate::core::scalar::Scalar;
use crate::error::KError;
use crate::matrix::CsrMatrix;
use crate::preconditioner::jacobi::invert_diagonal;
use crate::preconditioner::Preconditioner;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SweepType: u8 {
        const FORWARD   = 0b01; // forward Gauss–Seidel
        const BACKWARD  = 0b10;
        const SYMMETRIC = Self::FORWARD.bits() | Self::BACKWARD.bits();
    }
}

/// SOR/SSOR sweeps with damping `omega`.
#[derive(Clone, Debug)]
pub struct Relaxation<T: Scalar> {
    matrix: CsrMatrix<T>,
    inv_diag: Vec<T>,
    omega: T::Real,
    sweeps: usize,
    sweep: SweepType,
}

impl<T: Scalar> Relaxation<T> {
    pub fn new(
        matrix: CsrMatrix<T>,
        omega: T::Real,
        sweeps: usize,
        sweep: SweepType,
    ) -> Result<Self, KError> {
        let two = T::Real::one() + T::Real::one();
        if !(omega > T::Real::zero() && omega < two) {
            return Err(KError::InvalidParameter(format!(
                "relaxation factor must lie in (0, 2), got {omega:?}"
            )));
        }
        if sweeps == 0 {
            return Err(KError::InvalidParameter("at least one sweep is required".into()));
        }
        if sweep.is_empty() {
            return Err(KError::InvalidParameter("empty sweep type".into()));
        }
        let inv_diag = invert_diagonal(&matrix)?;
        Ok(Self { matrix, inv_diag, omega, sweeps, sweep })
    }

    /// One symmetric sweep with factor `omega`.
    pub fn ssor(matrix: CsrMatrix<T>, omega: T::Real) -> Result<Self, KError> {
        Self::new(matrix, omega, 1, SweepType::SYMMETRIC)
    }

    /// One symmetric Gauss–Seidel sweep.
    pub fn symmetric_gauss_seidel(matrix: CsrMatrix<T>) -> Result<Self, KError> {
        Self::ssor(matrix, T::Real::one())
    }

    pub fn omega(&self) -> T::Real {
        self.omega
    }

    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    pub fn sweep(&self) -> SweepType {
        self.sweep
    }

    #[inline]
    fn relax_row(&self, i: usize, rhs: &[T], x: &mut [T]) {
        let mut sigma = T::zero();
        for (j, v) in self.matrix.row(i) {
            if j != i {
                sigma = sigma + v * x[j];
            }
        }
        let omega = T::from_real(self.omega);
        let gs = (rhs[i] - sigma) * self.inv_diag[i];
        x[i] = (T::one() - omega) * x[i] + omega * gs;
    }
}

impl<T: Scalar + fmt::Display> fmt::Display for Relaxation<T>
where
    T::Real: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOR(omega={}, sweeps={}, sweep={:?})", self.omega, self.sweeps, self.sweep)
    }
}

impl<T: Scalar> Preconditioner<Builtin<T>> for Relaxation<T> {
    type Matrix = CsrMatrix<T>;

    fn apply(&self, rhs: &Vec<T>, x: &mut Vec<T>) -> Result<(), KError> {
        let n = rhs.len();
        x.fill(T::zero());
        for _ in 0..self.sweeps {
            if self.sweep.contains(SweepType::FORWARD) {
                for i in 0..n {
                    self.relax_row(i, rhs, x);
                }
            }
            if self.sweep.contains(SweepType::BACKWARD) {
                for i in (0..n).rev() {
                    self.relax_row(i, rhs, x);
                }
            }
        }
        Ok(())
    }

    fn top_matrix(&self) -> &CsrMatrix<T> {
        &self.matrix
    }
}
