pub mod hmc;
pub mod leapfrog;
pub mod nuts;

pub use hmc::hmc;
pub use leapfrog::leapfrog_step;
pub use nuts::{nuts, NutsOptions};

/// Kinetic energy of a velocity vector: `½ Σ v²`.
#[inline]
pub fn kinetic_energy(velocity: &[f64]) -> f64 {
    velocity.iter().map(|v| v * v).sum::<f64>() / 2.0
}

/// Non-fatal conditions observed while sampling.
///
/// Divergences and depth-cap hits reduce efficiency but never abort a run;
/// they are absorbed into the tree-building control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplerDiagnostics {
    /// HMC: accepted proposals. NUTS: always equals the sample count.
    pub accepted: usize,
    /// Leaves whose energy blew past the divergence threshold.
    pub divergences: usize,
    /// Outer iterations whose doubling was cut short by the tree-depth cap.
    pub depth_cap_hits: usize,
}

/// One chain's output: per-sample potential energies and reductions.
#[derive(Debug, Clone)]
pub struct SampleRun {
    pub energies: Vec<f64>,
    pub trace: Vec<f64>,
    pub diagnostics: SamplerDiagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinetic_energy() {
        assert_eq!(kinetic_energy(&[1.5, 2.5, -4.0]), 12.25);
        assert_eq!(kinetic_energy(&[]), 0.0);
    }
}
