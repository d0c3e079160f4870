use thiserror::Error;

// Unified error type for krypcg

#[derive(Error, Debug)]
pub enum KError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("zero pivot at row {0}")]
    ZeroPivot(usize),
    #[error("malformed matrix: {0}")]
    MalformedMatrix(String),
    #[error("preconditioner error: {0}")]
    Preconditioner(String),
    #[cfg(feature = "rayon")]
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
