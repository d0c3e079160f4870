//! Value types a backend may compute in.
//!
//! Real scalars (`f32`, `f64`) and their complex counterparts share one trait so
//! the solver can be written once. Norms and tolerances always live in the
//! associated [`Scalar::Real`] type.

use num_complex::Complex;
use num_traits::{Float, Num};
use std::fmt::Debug;
use std::ops::Neg;

/// A field element the backend stores in its vectors and matrices.
pub trait Scalar:
    Num + Neg<Output = Self> + Copy + PartialEq + Debug + Send + Sync + 'static
{
    /// Magnitude type: `Self` for reals, the component type for complex numbers.
    type Real: Float + Debug + Send + Sync + 'static;

    /// Complex conjugate (identity for reals).
    fn conj(self) -> Self;
    /// Squared modulus `|self|²`.
    fn abs_sqr(self) -> Self::Real;
    /// Embed a real number.
    fn from_real(re: Self::Real) -> Self;
}

macro_rules! impl_real_scalar {
    ($($t:ty),*) => {$(
        impl Scalar for $t {
            type Real = $t;
            #[inline]
            fn conj(self) -> Self { self }
            #[inline]
            fn abs_sqr(self) -> Self::Real { self * self }
            #[inline]
            fn from_real(re: Self::Real) -> Self { re }
        }
    )*};
}

impl_real_scalar!(f32, f64);

impl<R> Scalar for Complex<R>
where
    R: Float + Debug + Send + Sync + 'static,
{
    type Real = R;
    #[inline]
    fn conj(self) -> Self {
        Complex::conj(&self)
    }
    #[inline]
    fn abs_sqr(self) -> R {
        self.norm_sqr()
    }
    #[inline]
    fn from_real(re: R) -> Self {
        Complex::new(re, R::zero())
    }
}

/// Real type associated with a scalar.
pub type RealOf<T> = <T as Scalar>::Real;
