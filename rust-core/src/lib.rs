//! Random structural defects on domain-decomposed tight-binding lattices
//!
//! Each domain of the lattice places its own defects at random and hands the
//! terms that fall in its ghost layer to the domain owning them, so that every
//! defect term is applied exactly once across the whole lattice.

pub mod config;
pub mod disorder;
pub mod error;
pub mod interfaces;
pub mod lattice;
pub mod scalar;
pub mod simulation;

pub use error::{DisorderError, Result};
pub use simulation::{RealizationSummary, Simulation};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
