//! Krylov solver engines.
//!
//! Only the preconditioned conjugate gradient method lives here; other Krylov
//! variants would be written against the same [`Backend`](crate::core::Backend)
//! and [`Preconditioner`](crate::preconditioner::Preconditioner) contracts.

pub mod pcg;
pub use pcg::Pcg;
