//! Heisenberg Hamiltonian terms and their analytic gradients.
//!
//! Each site carries a unit spin `s = (sinφ cosθ, sinφ sinθ, cosφ)` where θ
//! is the azimuthal angle (first half of the state vector) and φ the polar
//! angle (second half). The exchange term couples nearest neighbors on the
//! periodic lattice, the Zeeman term couples every spin to an external field
//! along z.

use crate::config::HamiltonianOptions;
use crate::error::Error;
use crate::geometry::LatticeIndex;
use crate::trig::{ShiftSet, TrigFeatures};

/// Exchange energy `-J Σ_i Σ_axis s_i · s_{i+axis}`.
///
/// Expanded over the one-sided trig features:
/// `s_i · s_n = cosφ_i cosφ_n + sinφ_i sinφ_n (cosθ_i cosθ_n + sinθ_i sinθ_n)`.
/// One direction per axis, so each bond is counted once.
pub fn exchange_energy(trig: &TrigFeatures, j: f64) -> f64 {
    let ct = &trig.cos_theta.asis;
    let st = &trig.sin_theta.asis;
    let cp = &trig.cos_phi.asis;
    let sp = &trig.sin_phi.asis;

    let mut dot_sum = 0.0;
    for axis in 0..trig.n_axes {
        let ct_n = trig.cos_theta.fwd(axis);
        let st_n = trig.sin_theta.fwd(axis);
        let cp_n = trig.cos_phi.fwd(axis);
        let sp_n = trig.sin_phi.fwd(axis);
        for i in 0..trig.n_sites {
            dot_sum += cp[i] * cp_n[i] + sp[i] * sp_n[i] * (ct[i] * ct_n[i] + st[i] * st_n[i]);
        }
    }
    -j * dot_sum
}

/// Accumulate `∂E_exchange/∂θ_i` and `∂E_exchange/∂φ_i` into `grad`.
///
/// Every site takes contributions from both neighbors along every axis, so
/// this needs the two-sided trig features. `grad` is laid out like the state
/// vector: θ derivatives in the first half, φ derivatives in the second.
pub fn exchange_gradient(trig: &TrigFeatures, j: f64, grad: &mut [f64]) {
    debug_assert_eq!(trig.shift_set, ShiftSet::TwoSided);
    let n = trig.n_sites;
    let ct = &trig.cos_theta.asis;
    let st = &trig.sin_theta.asis;
    let cp = &trig.cos_phi.asis;
    let sp = &trig.sin_phi.asis;

    for axis in 0..trig.n_axes {
        for forward in [true, false] {
            let (ct_b, st_b, cp_b, sp_b) = if forward {
                (
                    trig.cos_theta.fwd(axis),
                    trig.sin_theta.fwd(axis),
                    trig.cos_phi.fwd(axis),
                    trig.sin_phi.fwd(axis),
                )
            } else {
                (
                    trig.cos_theta.bwd(axis),
                    trig.sin_theta.bwd(axis),
                    trig.cos_phi.bwd(axis),
                    trig.sin_phi.bwd(axis),
                )
            };

            for i in 0..n {
                // d(s_i · s_b)/dθ_i = sinφ_i sinφ_b (cosθ_i sinθ_b − sinθ_i cosθ_b)
                grad[i] -= j * sp[i] * sp_b[i] * (ct[i] * st_b[i] - st[i] * ct_b[i]);
                // d(s_i · s_b)/dφ_i = −sinφ_i cosφ_b
                //                     + cosφ_i sinφ_b (cosθ_i cosθ_b + sinθ_i sinθ_b)
                grad[n + i] -= j
                    * (-sp[i] * cp_b[i]
                        + cp[i] * sp_b[i] * (ct[i] * ct_b[i] + st[i] * st_b[i]));
            }
        }
    }
}

/// Zeeman energy `-H Σ_i s_i,z = -H Σ_i cosφ_i`.
pub fn zeeman_energy(trig: &TrigFeatures, h: f64) -> f64 {
    -h * trig.cos_phi.asis.iter().sum::<f64>()
}

/// Accumulate the Zeeman gradient: `+H sinφ_i` into the φ half of `grad`.
/// The θ half is untouched (the field has no azimuthal dependence).
pub fn zeeman_gradient(trig: &TrigFeatures, h: f64, grad: &mut [f64]) {
    let n = trig.n_sites;
    for (g, sp) in grad[n..].iter_mut().zip(trig.sin_phi.asis.iter()) {
        *g += h * sp;
    }
}

/// One enabled term of the Hamiltonian.
///
/// Terms are instantiated only for nonzero coefficients, so a disabled term
/// is never evaluated (a plain `0.0 * term` could still propagate NaN/Inf
/// from a blown-up state).
enum EnergyTerm {
    Exchange { j: f64 },
    Zeeman { h: f64 },
}

impl EnergyTerm {
    fn energy(&self, trig: &TrigFeatures) -> f64 {
        match *self {
            EnergyTerm::Exchange { j } => exchange_energy(trig, j),
            EnergyTerm::Zeeman { h } => zeeman_energy(trig, h),
        }
    }

    fn accumulate_gradient(&self, trig: &TrigFeatures, grad: &mut [f64]) {
        match *self {
            EnergyTerm::Exchange { j } => exchange_gradient(trig, j, grad),
            EnergyTerm::Zeeman { h } => zeeman_gradient(trig, h, grad),
        }
    }
}

/// Composed lattice Hamiltonian: geometry plus the enabled energy terms.
///
/// Owns the [`LatticeIndex`] for its (size, dim) pair; rebuilding for a new
/// lattice shape means constructing a new `Hamiltonian`. Energies are scaled
/// by `beta`; gradients are not (the integrator works in the beta-absorbed
/// potential, see DESIGN.md).
pub struct Hamiltonian {
    lattice: LatticeIndex,
    terms: Vec<EnergyTerm>,
    beta: f64,
}

impl Hamiltonian {
    /// Build the Hamiltonian for the given per-axis extents and coefficients.
    ///
    /// Zero coefficients structurally disable their term.
    pub fn new(dims: &[usize], options: HamiltonianOptions, beta: f64) -> Result<Self, Error> {
        let lattice = LatticeIndex::from_dims(dims)?;
        let mut terms = Vec::new();
        if options.j != 0.0 {
            terms.push(EnergyTerm::Exchange { j: options.j });
        }
        if options.h != 0.0 {
            terms.push(EnergyTerm::Zeeman { h: options.h });
        }
        Ok(Self {
            lattice,
            terms,
            beta,
        })
    }

    #[inline]
    pub fn lattice(&self) -> &LatticeIndex {
        &self.lattice
    }

    /// Expected state-vector length (`2 * n_sites`).
    #[inline]
    pub fn state_len(&self) -> usize {
        self.lattice.state_len()
    }

    /// Total potential energy `beta * Σ enabled terms`, exactly `0.0` when
    /// no term is enabled.
    pub fn total_energy(&self, state: &[f64]) -> Result<f64, Error> {
        if self.terms.is_empty() {
            return Ok(0.0);
        }
        let trig = TrigFeatures::build(state, &self.lattice, ShiftSet::OneSided)?;
        let sum: f64 = self.terms.iter().map(|t| t.energy(&trig)).sum();
        Ok(self.beta * sum)
    }

    /// Zero `grad` and accumulate the enabled terms' gradients in place.
    pub fn gradient(&self, state: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        if grad.len() != self.state_len() {
            return Err(Error::ShapeMismatch {
                expected: self.state_len(),
                got: grad.len(),
            });
        }
        grad.fill(0.0);
        if self.terms.is_empty() {
            // Still validate the state shape so a bad caller fails loudly.
            if state.len() != self.state_len() {
                return Err(Error::ShapeMismatch {
                    expected: self.state_len(),
                    got: state.len(),
                });
            }
            return Ok(());
        }
        let trig = TrigFeatures::build(state, &self.lattice, ShiftSet::TwoSided)?;
        for term in &self.terms {
            term.accumulate_gradient(&trig, grad);
        }
        Ok(())
    }

    /// Energy closure for the samplers.
    pub fn energy_fn(&self) -> impl Fn(&[f64]) -> Result<f64, Error> + '_ {
        move |state| self.total_energy(state)
    }

    /// Gradient closure for the samplers.
    pub fn grad_fn(&self) -> impl Fn(&[f64], &mut [f64]) -> Result<(), Error> + '_ {
        move |state, grad| self.gradient(state, grad)
    }
}
