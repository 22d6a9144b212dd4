use thiserror::Error;

/// Errors surfaced by lattice construction, configuration, and checkpointing.
///
/// Numerical divergence and tree-depth caps inside the samplers are *not*
/// errors: they are absorbed into the sampling control flow and reported via
/// [`crate::mcmc::SamplerDiagnostics`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported lattice dimension {0}, expected 1, 2, or 3")]
    InvalidDimension(usize),

    #[error("lattice size {n_sites} is not a perfect {dim}-th power of an integer side")]
    InvalidSize { n_sites: usize, dim: usize },

    #[error("state vector has length {got}, expected {expected}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("rng checkpoint (de)serialization failed: {0}")]
    RngState(#[from] serde_json::Error),
}
