//! Core linear-algebra traits for krypcg.
//!
//! A backend is a *type*, not a value: it names the vector representation and
//! provides the primitive kernels the Krylov iteration is written against.
//! Operators (sparse, dense, matrix-free) plug in through [`MatrixOps`], one
//! impl per operator type the backend knows how to apply.
//!
//! All primitives must be deterministic for fixed inputs, so that a solve
//! reproduces the same convergence history bit-for-bit on the same backend.
//! Vector lengths are a caller precondition; backends may check them in debug
//! builds only.

use crate::core::scalar::Scalar;

/// Vector storage and vector kernels of a numerical backend.
pub trait Backend {
    /// Value type stored in vectors and matrices.
    type Value: Scalar;
    /// Vector type owned by this backend.
    type Vector;
    /// Construction parameters for vectors (thread pools, chunking, ...).
    type Params: Default;

    /// Allocate a zero-filled vector of length `n`.
    fn create_vector(n: usize, params: &Self::Params) -> Self::Vector;

    /// Euclidean norm ‖v‖₂.
    fn norm(v: &Self::Vector) -> <Self::Value as Scalar>::Real;

    /// Inner product Σ conj(uᵢ)·vᵢ.
    fn inner_product(u: &Self::Vector, v: &Self::Vector) -> Self::Value;

    /// y ← α·x + β·y. When `beta` is zero, `y` is overwritten without being read.
    fn axpby(alpha: Self::Value, x: &Self::Vector, beta: Self::Value, y: &mut Self::Vector);

    /// dst ← src.
    fn copy(src: &Self::Vector, dst: &mut Self::Vector);

    /// v ← 0.
    fn clear(v: &mut Self::Vector);
}

/// Operator kernels for matrix type `M` on backend `Self`.
pub trait MatrixOps<M: ?Sized>: Backend {
    /// y ← α·A·x + β·y. When `beta` is zero, `y` is overwritten without being read.
    fn spmv(
        alpha: Self::Value,
        a: &M,
        x: &Self::Vector,
        beta: Self::Value,
        y: &mut Self::Vector,
    );

    /// out ← rhs − A·x.
    fn residual(rhs: &Self::Vector, a: &M, x: &Self::Vector, out: &mut Self::Vector);
}

/// Real magnitude type of backend `B`.
pub type BackendReal<B> = <<B as Backend>::Value as Scalar>::Real;
