//! Single-threaded reference backend over `Vec<T>`.
//!
//! Every kernel is a plain loop in index order, so results depend only on the
//! inputs and the platform's floating-point semantics. Supported operators:
//! [`CsrMatrix<T>`] and dense `faer::Mat<T>`.

use std::marker::PhantomData;

use faer::Mat;
use num_traits::{Float, Zero};

use crate::core::scalar::Scalar;
use crate::core::traits::{Backend, MatrixOps};
use crate::matrix::CsrMatrix;

/// Reference backend for scalar type `T`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Builtin<T>(PhantomData<T>);

/// The builtin backend needs no construction parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BuiltinParams;

impl<T: Scalar> Backend for Builtin<T> {
    type Value = T;
    type Vector = Vec<T>;
    type Params = BuiltinParams;

    fn create_vector(n: usize, _params: &BuiltinParams) -> Vec<T> {
        vec![T::zero(); n]
    }

    fn norm(v: &Vec<T>) -> T::Real {
        let mut sum = T::Real::zero();
        for &vi in v {
            sum = sum + vi.abs_sqr();
        }
        sum.sqrt()
    }

    fn inner_product(u: &Vec<T>, v: &Vec<T>) -> T {
        debug_assert_eq!(u.len(), v.len(), "Vectors must have the same length");
        let mut sum = T::zero();
        for (&ui, &vi) in u.iter().zip(v) {
            sum = sum + ui.conj() * vi;
        }
        sum
    }

    fn axpby(alpha: T, x: &Vec<T>, beta: T, y: &mut Vec<T>) {
        debug_assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        if beta.is_zero() {
            for (yi, &xi) in y.iter_mut().zip(x) {
                *yi = alpha * xi;
            }
        } else {
            for (yi, &xi) in y.iter_mut().zip(x) {
                *yi = alpha * xi + beta * *yi;
            }
        }
    }

    fn copy(src: &Vec<T>, dst: &mut Vec<T>) {
        dst.copy_from_slice(src);
    }

    fn clear(v: &mut Vec<T>) {
        v.fill(T::zero());
    }
}

impl<T: Scalar> MatrixOps<CsrMatrix<T>> for Builtin<T> {
    fn spmv(alpha: T, a: &CsrMatrix<T>, x: &Vec<T>, beta: T, y: &mut Vec<T>) {
        debug_assert_eq!(a.ncols(), x.len(), "Input vector x has incorrect length");
        debug_assert_eq!(a.nrows(), y.len(), "Output vector y has incorrect length");
        if beta.is_zero() {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = alpha * a.row_dot(i, x);
            }
        } else {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = alpha * a.row_dot(i, x) + beta * *yi;
            }
        }
    }

    fn residual(rhs: &Vec<T>, a: &CsrMatrix<T>, x: &Vec<T>, out: &mut Vec<T>) {
        debug_assert_eq!(a.nrows(), out.len(), "Output vector has incorrect length");
        for (i, ri) in out.iter_mut().enumerate() {
            *ri = rhs[i] - a.row_dot(i, x);
        }
    }
}

#[inline]
fn dense_row_dot<T: Scalar>(a: &Mat<T>, i: usize, x: &[T]) -> T {
    let mut sum = T::zero();
    for j in 0..a.ncols() {
        sum = sum + a[(i, j)] * x[j];
    }
    sum
}

/// Dense `faer` matrices, applied row by row.
impl<T: Scalar> MatrixOps<Mat<T>> for Builtin<T> {
    fn spmv(alpha: T, a: &Mat<T>, x: &Vec<T>, beta: T, y: &mut Vec<T>) {
        debug_assert_eq!(a.ncols(), x.len(), "Input vector x has incorrect length");
        debug_assert_eq!(a.nrows(), y.len(), "Output vector y has incorrect length");
        if beta.is_zero() {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = alpha * dense_row_dot(a, i, x);
            }
        } else {
            for (i, yi) in y.iter_mut().enumerate() {
                *yi = alpha * dense_row_dot(a, i, x) + beta * *yi;
            }
        }
    }

    fn residual(rhs: &Vec<T>, a: &Mat<T>, x: &Vec<T>, out: &mut Vec<T>) {
        for (i, ri) in out.iter_mut().enumerate() {
            *ri = rhs[i] - dense_row_dot(a, i, x);
        }
    }
}
