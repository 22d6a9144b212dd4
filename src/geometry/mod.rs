pub mod lattice;

pub use lattice::LatticeIndex;
