//! krypcg: backend-agnostic preconditioned conjugate gradient.
//!
//! This crate provides a PCG engine for large sparse symmetric positive definite
//! systems, written against a small backend operation contract so the same
//! iteration runs over sequential, multi-threaded or user-supplied kernels, with
//! any preconditioner that can apply itself to a residual.
//!
//! ```
//! use krypcg::{Builtin, BuiltinParams, CsrMatrix, Identity, Pcg, PcgParams};
//!
//! let a = CsrMatrix::from_diagonal(&[2.0, 2.0, 2.0]);
//! let pc = Identity::new(a);
//! let mut solver = Pcg::<Builtin<f64>>::new(3, PcgParams::default(), &BuiltinParams).unwrap();
//! let mut x = vec![0.0; 3];
//! let stats = solver.solve_top(&pc, &vec![2.0; 3], &mut x).unwrap();
//! assert_eq!(stats.iterations, 1);
//! ```

pub mod backend;
pub mod config;
pub mod core;
pub mod error;
pub mod matrix;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use self::backend::*;
pub use self::config::*;
pub use self::core::*;
pub use self::error::*;
pub use self::matrix::*;
pub use self::preconditioner::*;
pub use self::solver::*;
pub use self::utils::*;
