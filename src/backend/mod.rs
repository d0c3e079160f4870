//! Concrete numerical backends.
//!
//! - [`Builtin`]: sequential reference kernels over `Vec<T>`.
//! - [`RayonBackend`] (feature `rayon`): shared-memory parallel kernels with
//!   deterministic reductions.

pub mod builtin;
pub use builtin::{Builtin, BuiltinParams};

#[cfg(feature = "rayon")]
pub mod rayon;
#[cfg(feature = "rayon")]
pub use self::rayon::{ParVector, RayonBackend, RayonParams};
