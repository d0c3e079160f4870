//! Solver configuration.

pub mod params;
pub use params::PcgParams;
