pub mod config;
pub mod energy;
pub mod error;
pub mod geometry;
pub mod mcmc;
pub mod model;
pub mod rng;
pub mod trig;

pub use config::{HamiltonianOptions, RunConfig, SamplerConfig, SamplerMethod};
pub use energy::Hamiltonian;
pub use error::Error;
pub use geometry::LatticeIndex;
pub use model::{magnetisation, run_heisenberg, HeisenbergRun};
pub use rng::RngSource;
