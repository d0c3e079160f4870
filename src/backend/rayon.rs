//! Rayon-based multi-threaded backend.
//!
//! Element-wise kernels and row-wise matrix products run in parallel. Reductions
//! are split into fixed-length chunks, each summed sequentially, and the chunk
//! partials are combined in chunk order. The result therefore depends on
//! `chunk_len` but not on the number of threads or on work-stealing order.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use num_traits::{Float, Zero};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::core::scalar::Scalar;
use crate::core::traits::{Backend, MatrixOps};
use crate::error::KError;
use crate::matrix::CsrMatrix;

/// Default reduction chunk length.
pub const DEFAULT_CHUNK_LEN: usize = 4096;

/// Construction parameters for [`RayonBackend`] vectors.
#[derive(Clone, Debug)]
pub struct RayonParams {
    /// Length of the sequential partial sums in reductions.
    pub chunk_len: usize,
    /// Dedicated pool to run kernels in; `None` uses rayon's global pool.
    pub pool: Option<Arc<ThreadPool>>,
}

impl Default for RayonParams {
    fn default() -> Self {
        Self { chunk_len: DEFAULT_CHUNK_LEN, pool: None }
    }
}

impl RayonParams {
    /// Run kernels in a dedicated pool of `num_threads` threads.
    pub fn with_threads(num_threads: usize) -> Result<Self, KError> {
        let pool = ThreadPoolBuilder::new().num_threads(num_threads).build()?;
        Ok(Self { pool: Some(Arc::new(pool)), ..Self::default() })
    }

    /// Dedicated pool with one thread per logical core.
    pub fn per_core() -> Result<Self, KError> {
        Self::with_threads(num_cpus::get())
    }

    pub fn with_chunk_len(mut self, chunk_len: usize) -> Self {
        self.chunk_len = chunk_len.max(1);
        self
    }
}

/// Vector owned by the rayon backend.
///
/// Carries the reduction chunk length and pool it was created with; binary
/// kernels use those of their first operand.
#[derive(Clone, Debug)]
pub struct ParVector<T> {
    data: Vec<T>,
    chunk_len: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl<T> ParVector<T> {
    pub fn from_vec(data: Vec<T>, params: &RayonParams) -> Self {
        Self { data, chunk_len: params.chunk_len.max(1), pool: params.pool.clone() }
    }

    pub fn into_inner(self) -> Vec<T> {
        self.data
    }

    /// Run `f` in the pool this vector was created with.
    pub(crate) fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        run_in(self.pool.as_deref(), f)
    }
}

fn run_in<R: Send>(pool: Option<&ThreadPool>, f: impl FnOnce() -> R + Send) -> R {
    match pool {
        Some(pool) => pool.install(f),
        None => f(),
    }
}

impl<T> Deref for ParVector<T> {
    type Target = [T];
    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for ParVector<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Multi-threaded backend for scalar type `T`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayonBackend<T>(PhantomData<T>);

impl<T: Scalar> RayonBackend<T> {
    /// Wrap caller data as a backend vector.
    pub fn vector_from(data: Vec<T>, params: &RayonParams) -> ParVector<T> {
        ParVector::from_vec(data, params)
    }
}

impl<T: Scalar> Backend for RayonBackend<T> {
    type Value = T;
    type Vector = ParVector<T>;
    type Params = RayonParams;

    fn create_vector(n: usize, params: &RayonParams) -> ParVector<T> {
        ParVector::from_vec(vec![T::zero(); n], params)
    }

    fn norm(v: &ParVector<T>) -> T::Real {
        let partials: Vec<T::Real> = v.install(|| {
            v.data
                .par_chunks(v.chunk_len)
                .map(|chunk| chunk.iter().fold(T::Real::zero(), |acc, &x| acc + x.abs_sqr()))
                .collect()
        });
        partials.into_iter().fold(T::Real::zero(), |acc, s| acc + s).sqrt()
    }

    fn inner_product(u: &ParVector<T>, v: &ParVector<T>) -> T {
        debug_assert_eq!(u.len(), v.len(), "Vectors must have the same length");
        let partials: Vec<T> = u.install(|| {
            u.data
                .par_chunks(u.chunk_len)
                .zip(v.data.par_chunks(u.chunk_len))
                .map(|(a, b)| {
                    a.iter()
                        .zip(b)
                        .fold(T::zero(), |acc, (&ai, &bi)| acc + ai.conj() * bi)
                })
                .collect()
        });
        partials.into_iter().fold(T::zero(), |acc, s| acc + s)
    }

    fn axpby(alpha: T, x: &ParVector<T>, beta: T, y: &mut ParVector<T>) {
        debug_assert_eq!(x.len(), y.len(), "Vectors must have the same length");
        let xs = &x.data;
        let ys = &mut y.data;
        x.install(|| {
            if beta.is_zero() {
                ys.par_iter_mut().zip(xs.par_iter()).for_each(|(yi, &xi)| *yi = alpha * xi);
            } else {
                ys.par_iter_mut()
                    .zip(xs.par_iter())
                    .for_each(|(yi, &xi)| *yi = alpha * xi + beta * *yi);
            }
        });
    }

    fn copy(src: &ParVector<T>, dst: &mut ParVector<T>) {
        dst.data.copy_from_slice(&src.data);
    }

    fn clear(v: &mut ParVector<T>) {
        let ParVector { data, pool, .. } = v;
        run_in(pool.as_deref(), || data.par_iter_mut().for_each(|vi| *vi = T::zero()));
    }
}

impl<T: Scalar> MatrixOps<CsrMatrix<T>> for RayonBackend<T> {
    fn spmv(alpha: T, a: &CsrMatrix<T>, x: &ParVector<T>, beta: T, y: &mut ParVector<T>) {
        debug_assert_eq!(a.ncols(), x.len(), "Input vector x has incorrect length");
        debug_assert_eq!(a.nrows(), y.len(), "Output vector y has incorrect length");
        let xs = &x.data;
        let ys = &mut y.data;
        x.install(|| {
            ys.par_iter_mut().enumerate().for_each(|(i, yi)| {
                let ax = a.row_dot(i, xs);
                *yi = if beta.is_zero() { alpha * ax } else { alpha * ax + beta * *yi };
            });
        });
    }

    fn residual(rhs: &ParVector<T>, a: &CsrMatrix<T>, x: &ParVector<T>, out: &mut ParVector<T>) {
        let xs = &x.data;
        let bs = &rhs.data;
        let rs = &mut out.data;
        x.install(|| {
            rs.par_iter_mut()
                .enumerate()
                .for_each(|(i, ri)| *ri = bs[i] - a.row_dot(i, xs));
        });
    }
}
