//! Matrix module: operator storage types.
//!
//! Dense operators use `faer::Mat<T>` directly; see [`crate::backend::builtin`].

pub mod sparse;
pub use sparse::CsrMatrix;
