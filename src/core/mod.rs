//! Scalar model and backend operation contract.

pub mod scalar;
pub mod traits;

pub use scalar::{RealOf, Scalar};
pub use traits::{Backend, BackendReal, MatrixOps};
