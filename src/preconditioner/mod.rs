//! Preconditioners for linear solvers.
//!
//! This module defines the [`Preconditioner`] trait the Krylov engine is written
//! against, together with a few simple implementations: [`Identity`],
//! [`Jacobi`] and [`Relaxation`] (SOR/SSOR sweeps used as a preconditioner).
//! Heavier preconditioners such as multigrid hierarchies plug in through the
//! same trait.

use crate::core::traits::Backend;
use crate::error::KError;

/// An operator M ≈ A⁻¹ applied on backend `B`.
///
/// `apply` takes `&self`: the solver treats the preconditioner as read-only.
/// Implementations that are also `Sync` may be shared between solvers running
/// on different threads.
pub trait Preconditioner<B: Backend> {
    /// Matrix type the preconditioner was built for.
    type Matrix;

    /// Apply M⁻¹ to `rhs`, writing the result into `x`.
    fn apply(&self, rhs: &B::Vector, x: &mut B::Vector) -> Result<(), KError>;

    /// The system matrix the preconditioner was constructed against.
    fn top_matrix(&self) -> &Self::Matrix;
}

impl<B: Backend, P: Preconditioner<B> + ?Sized> Preconditioner<B> for &P {
    type Matrix = P::Matrix;

    fn apply(&self, rhs: &B::Vector, x: &mut B::Vector) -> Result<(), KError> {
        (**self).apply(rhs, x)
    }

    fn top_matrix(&self) -> &P::Matrix {
        (**self).top_matrix()
    }
}

/// M = I: hands the residual back unchanged, reducing PCG to plain CG.
#[derive(Clone, Debug)]
pub struct Identity<M> {
    matrix: M,
}

impl<M> Identity<M> {
    pub fn new(matrix: M) -> Self {
        Self { matrix }
    }

    pub fn into_inner(self) -> M {
        self.matrix
    }
}

impl<B: Backend, M> Preconditioner<B> for Identity<M> {
    type Matrix = M;

    fn apply(&self, rhs: &B::Vector, x: &mut B::Vector) -> Result<(), KError> {
        B::copy(rhs, x);
        Ok(())
    }

    fn top_matrix(&self) -> &M {
        &self.matrix
    }
}

pub mod jacobi;
pub mod relaxation;

pub use jacobi::Jacobi;
pub use relaxation::{Relaxation, SweepType};
