use crate::error::Error;
use crate::mcmc::{kinetic_energy, leapfrog_step, SampleRun, SamplerDiagnostics};
use crate::rng::RngSource;

/// Knobs for the no-U-turn sampler.
#[derive(Debug, Clone, Copy)]
pub struct NutsOptions {
    /// Hard cap on tree height; hitting it stops doubling for the iteration
    /// but keeps the candidate found so far.
    pub max_tree_depth: usize,
    /// A leaf whose total energy exceeds the slice threshold by more than
    /// this is divergent and prunes its subtree.
    pub divergence_threshold: f64,
}

impl Default for NutsOptions {
    fn default() -> Self {
        Self {
            max_tree_depth: 15,
            divergence_threshold: 1000.0,
        }
    }
}

/// A point on the simulated trajectory.
#[derive(Debug, Clone)]
struct PhasePoint {
    state: Vec<f64>,
    velocity: Vec<f64>,
}

impl PhasePoint {
    fn joint(&self, potential: f64) -> f64 {
        potential + kinetic_energy(&self.velocity)
    }
}

/// Outcome of building one subtree.
struct TreeResult {
    backward: PhasePoint,
    forward: PhasePoint,
    candidate: Vec<f64>,
    /// Leaves inside the slice.
    n_valid: usize,
    /// False once a divergence or an internal U-turn prunes the subtree.
    valid: bool,
}

/// Both endpoint velocities still point away from each other.
fn no_u_turn(backward: &PhasePoint, forward: &PhasePoint) -> bool {
    let mut dot_b = 0.0;
    let mut dot_f = 0.0;
    for i in 0..backward.state.len() {
        let span = forward.state[i] - backward.state[i];
        dot_b += span * backward.velocity[i];
        dot_f += span * forward.velocity[i];
    }
    dot_b >= 0.0 && dot_f >= 0.0
}

struct TreeCtx<'a, E, G> {
    eps: f64,
    log_u: f64,
    divergence_threshold: f64,
    energy_fn: &'a mut E,
    grad_fn: &'a mut G,
    rng: &'a mut RngSource,
    grad_work: &'a mut [f64],
    divergences: &'a mut usize,
}

impl<E, G> TreeCtx<'_, E, G>
where
    E: FnMut(&[f64]) -> Result<f64, Error>,
    G: FnMut(&[f64], &mut [f64]) -> Result<(), Error>,
{
    /// Recursive doubling: a tree of height `h` is two trees of height
    /// `h - 1` glued in the travel direction `dir` (±1).
    fn build_tree(
        &mut self,
        start: &PhasePoint,
        height: usize,
        dir: f64,
    ) -> Result<TreeResult, Error> {
        if height == 0 {
            let mut leaf = start.clone();
            leapfrog_step(
                &mut leaf.state,
                &mut leaf.velocity,
                self.grad_work,
                self.grad_fn,
                dir * self.eps,
            )?;
            let joint = leaf.joint((self.energy_fn)(&leaf.state)?);

            let in_slice = self.log_u < -joint;
            let valid = self.log_u < self.divergence_threshold - joint;
            if !valid {
                *self.divergences += 1;
            }
            return Ok(TreeResult {
                candidate: leaf.state.clone(),
                backward: leaf.clone(),
                forward: leaf,
                n_valid: in_slice as usize,
                valid,
            });
        }

        let mut first = self.build_tree(start, height - 1, dir)?;
        if !first.valid {
            return Ok(first);
        }

        // Grow the second half off the outer edge of the first.
        let edge = if dir > 0.0 {
            first.forward.clone()
        } else {
            first.backward.clone()
        };
        let second = self.build_tree(&edge, height - 1, dir)?;

        let total = first.n_valid + second.n_valid;
        if second.valid && total > 0 {
            let swap = second.n_valid as f64 / total as f64;
            if self.rng.next_uniform() < swap {
                first.candidate = second.candidate;
            }
        }
        if dir > 0.0 {
            first.forward = second.forward;
        } else {
            first.backward = second.backward;
        }
        first.n_valid = total;
        first.valid = second.valid && no_u_turn(&first.backward, &first.forward);
        Ok(first)
    }
}

/// No-U-turn sampler: per iteration, draw a slice under the joint density
/// and double a leapfrog trajectory in random directions until the ends turn
/// back toward each other (or a divergence / the depth cap stops growth),
/// then emit a state drawn uniformly from the slice-valid leaves.
///
/// Records the potential of the emitted state and `reduce_fn` of it every
/// iteration; `on_sample` fires once per iteration.
#[allow(clippy::too_many_arguments)]
pub fn nuts<E, G, R>(
    rng: &mut RngSource,
    initial_state: &[f64],
    eps: f64,
    n_samples: usize,
    options: NutsOptions,
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
    let mut grad_work = vec![0.0; size];

    let mut energies = Vec::with_capacity(n_samples);
    let mut trace = Vec::with_capacity(n_samples);
    let mut diagnostics = SamplerDiagnostics::default();

    for _ in 0..n_samples {
        let velocity: Vec<f64> = (0..size).map(|_| rng.next_normal(0.0, 1.0)).collect();
        let start = PhasePoint {
            state: current.clone(),
            velocity,
        };
        let joint = start.joint(energy_fn(&start.state)?);
        // Slice variable in log space: log u = log(rand) - H.
        let log_u = rng.next_uniform().ln() - joint;

        let mut backward = start.clone();
        let mut forward = start;
        let mut candidate = current.clone();
        let mut n_valid = 1usize;
        let mut height = 0usize;

        loop {
            if height >= options.max_tree_depth {
                diagnostics.depth_cap_hits += 1;
                tracing::debug!(height, "tree depth cap reached");
                break;
            }
            let dir = if rng.next_uniform() < 0.5 { -1.0 } else { 1.0 };
            let edge = if dir > 0.0 {
                forward.clone()
            } else {
                backward.clone()
            };

            let mut ctx = TreeCtx {
                eps,
                log_u,
                divergence_threshold: options.divergence_threshold,
                energy_fn: &mut energy_fn,
                grad_fn: &mut grad_fn,
                rng: &mut *rng,
                grad_work: &mut grad_work,
                divergences: &mut diagnostics.divergences,
            };
            let tree = ctx.build_tree(&edge, height, dir)?;

            let keep_subtree = tree.valid;
            if keep_subtree && tree.n_valid > 0 {
                let swap = tree.n_valid as f64 / (n_valid + tree.n_valid) as f64;
                if rng.next_uniform() < swap {
                    candidate = tree.candidate;
                }
            }
            if dir > 0.0 {
                forward = tree.forward;
            } else {
                backward = tree.backward;
            }
            n_valid += tree.n_valid;
            height += 1;

            if !(keep_subtree && no_u_turn(&backward, &forward)) {
                break;
            }
        }

        current = candidate;
        diagnostics.accepted += 1;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HamiltonianOptions;
    use crate::energy::Hamiltonian;

    fn normal_energy(state: &[f64]) -> Result<f64, Error> {
        let d = state[0] - 1.0;
        Ok(d * d / (2.0 * 0.8 * 0.8))
    }

    fn normal_grad(state: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        grad[0] = (state[0] - 1.0) / (0.8 * 0.8);
        Ok(())
    }

    #[test]
    fn test_chain_explores_normal_target() {
        let mut rng = RngSource::seed_from(11);
        let run = nuts(
            &mut rng,
            &[0.0],
            0.2,
            400,
            NutsOptions::default(),
            normal_energy,
            normal_grad,
            |s: &[f64]| s[0],
            &|| {},
        )
        .unwrap();

        assert_eq!(run.trace.len(), 400);
        assert_eq!(run.diagnostics.accepted, 400);
        assert_eq!(run.diagnostics.divergences, 0);
        // Both tails of a mean-1 target get visited.
        assert!(run.trace.iter().any(|&x| x > 1.5));
        assert!(run.trace.iter().any(|&x| x < 0.5));
    }

    #[test]
    fn test_deterministic_replay() {
        let run_once = |seed: u64| {
            let mut rng = RngSource::seed_from(seed);
            nuts(
                &mut rng,
                &[0.3],
                0.2,
                60,
                NutsOptions::default(),
                normal_energy,
                normal_grad,
                |s: &[f64]| s[0],
                &|| {},
            )
            .unwrap()
        };
        let a = run_once(23);
        let b = run_once(23);
        assert_eq!(a.trace, b.trace);
        assert_eq!(a.energies, b.energies);
    }

    #[test]
    fn test_depth_cap_is_non_fatal() {
        let mut rng = RngSource::seed_from(3);
        // A tiny step size forces long trajectories into the cap.
        let run = nuts(
            &mut rng,
            &[0.0],
            1e-4,
            5,
            NutsOptions {
                max_tree_depth: 3,
                ..NutsOptions::default()
            },
            normal_energy,
            normal_grad,
            |s: &[f64]| s[0],
            &|| {},
        )
        .unwrap();
        assert_eq!(run.trace.len(), 5);
        assert_eq!(run.diagnostics.depth_cap_hits, 5);
    }

    #[test]
    fn test_heisenberg_smoke() {
        let ham = Hamiltonian::new(&[4, 4], HamiltonianOptions { j: 1.0, h: 0.0 }, 0.5).unwrap();
        let n = ham.state_len();

        let mut rng = RngSource::seed_from(77);
        let init: Vec<f64> = (0..n)
            .map(|_| rng.next_uniform() * 2.0 * std::f64::consts::PI)
            .collect();

        let run = nuts(
            &mut rng,
            &init,
            0.05,
            30,
            NutsOptions::default(),
            ham.energy_fn(),
            ham.grad_fn(),
            |_: &[f64]| 0.0,
            &|| {},
        )
        .unwrap();
        assert_eq!(run.energies.len(), 30);
        assert!(run.energies.iter().all(|e| e.is_finite()));
    }
}
