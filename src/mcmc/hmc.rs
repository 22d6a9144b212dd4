use crate::error::Error;
use crate::mcmc::{kinetic_energy, leapfrog_step, SampleRun, SamplerDiagnostics};
use crate::rng::RngSource;

/// Fixed-length Hamiltonian Monte Carlo with Metropolis correction.
///
/// Per iteration: draw a fresh standard-normal velocity, integrate
/// `leapfrog_steps` leapfrog steps of size `eps`, and accept the endpoint
/// with probability `min(1, exp(H_current − H_trial))` on the total energy
/// (potential + kinetic). The recorded energy is the *potential* of the
/// post-decision state; `reduce_fn` is recorded every iteration regardless
/// of acceptance. Burn-in and step-size tuning are the caller's business.
///
/// `on_sample` fires once per iteration (progress reporting).
#[allow(clippy::too_many_arguments)]
pub fn hmc<E, G, R>(
    rng: &mut RngSource,
    initial_state: &[f64],
    eps: f64,
    leapfrog_steps: usize,
    n_samples: usize,
    mut energy_fn: E,
    mut grad_fn: G,
    mut reduce_fn: R,
    on_sample: &(dyn Fn()),
) -> Result<SampleRun, Error>
where
    E: FnMut(&[f64]) -> Result<f64, Error>,
    G: FnMut(&[f64], &mut [f64]) -> Result<(), Error>,
    R: FnMut(&[f64]) -> f64,
{
    let size = initial_state.len();
    let mut current = initial_state.to_vec();
    let mut trial = vec![0.0; size];
    let mut velocity = vec![0.0; size];
    let mut grad_work = vec![0.0; size];

    let mut energies = Vec::with_capacity(n_samples);
    let mut trace = Vec::with_capacity(n_samples);
    let mut diagnostics = SamplerDiagnostics::default();

    for _ in 0..n_samples {
        for v in velocity.iter_mut() {
            *v = rng.next_normal(0.0, 1.0);
        }
        let current_total = energy_fn(&current)? + kinetic_energy(&velocity);

        trial.copy_from_slice(&current);
        for _ in 0..leapfrog_steps {
            leapfrog_step(&mut trial, &mut velocity, &mut grad_work, &mut grad_fn, eps)?;
        }
        let trial_total = energy_fn(&trial)? + kinetic_energy(&velocity);

        if rng.next_uniform() < (current_total - trial_total).exp() {
            current.copy_from_slice(&trial);
            diagnostics.accepted += 1;
        }

        energies.push(energy_fn(&current)?);
        trace.push(reduce_fn(&current));
        on_sample();
    }

    Ok(SampleRun {
        energies,
        trace,
        diagnostics,
    })
}
