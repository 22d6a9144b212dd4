use crate::error::Error;

/// One symplectic leapfrog step, in place: half-kick, drift, half-kick.
///
/// `grad_work` is caller-provided scratch of the same length as `state`,
/// reused across steps to avoid per-step allocation. The only failure mode
/// is a propagated `grad_fn` error.
///
/// Running a step with `-eps` from the output recovers the input up to
/// floating-point roundoff (reversibility, pinned by a test below).
pub fn leapfrog_step<G>(
    state: &mut [f64],
    velocity: &mut [f64],
    grad_work: &mut [f64],
    grad_fn: &mut G,
    eps: f64,
) -> Result<(), Error>
where
    G: FnMut(&[f64], &mut [f64]) -> Result<(), Error>,
{
    grad_fn(state, grad_work)?;
    for (v, g) in velocity.iter_mut().zip(grad_work.iter()) {
        *v -= eps / 2.0 * g;
    }
    for (x, v) in state.iter_mut().zip(velocity.iter()) {
        *x += eps * v;
    }
    grad_fn(state, grad_work)?;
    for (v, g) in velocity.iter_mut().zip(grad_work.iter()) {
        *v -= eps / 2.0 * g;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HamiltonianOptions;
    use crate::energy::Hamiltonian;
    use crate::rng::RngSource;

    // Harmonic well: U = ½ Σ x², dU/dx = x.
    fn harmonic_grad(state: &[f64], grad: &mut [f64]) -> Result<(), Error> {
        grad.copy_from_slice(state);
        Ok(())
    }

    #[test]
    fn test_single_step_harmonic() {
        let mut state = vec![1.0];
        let mut velocity = vec![0.0];
        let mut work = vec![0.0];
        let eps = 0.1;
        leapfrog_step(&mut state, &mut velocity, &mut work, &mut harmonic_grad, eps).unwrap();

        // v_half = -eps/2 * 1, x' = 1 + eps*v_half, v' = v_half - eps/2 * x'
        let v_half = -eps / 2.0;
        let x1 = 1.0 + eps * v_half;
        let v1 = v_half - eps / 2.0 * x1;
        assert!((state[0] - x1).abs() < 1e-15);
        assert!((velocity[0] - v1).abs() < 1e-15);
    }

    #[test]
    fn test_reversibility_harmonic() {
        let mut state = vec![0.3, -1.2, 2.0];
        let mut velocity = vec![1.0, 0.5, -0.25];
        let orig_state = state.clone();
        let orig_velocity = velocity.clone();
        let mut work = vec![0.0; 3];

        for _ in 0..50 {
            leapfrog_step(&mut state, &mut velocity, &mut work, &mut harmonic_grad, 0.05).unwrap();
        }
        for _ in 0..50 {
            leapfrog_step(&mut state, &mut velocity, &mut work, &mut harmonic_grad, -0.05)
                .unwrap();
        }

        for i in 0..3 {
            assert!((state[i] - orig_state[i]).abs() < 1e-10);
            assert!((velocity[i] - orig_velocity[i]).abs() < 1e-10);
        }
    }

    #[test]
    fn test_reversibility_heisenberg() {
        let ham = Hamiltonian::new(&[3, 3], HamiltonianOptions { j: 1.0, h: 0.4 }, 1.0).unwrap();
        let n = ham.state_len();

        let mut rng = RngSource::seed_from(99);
        let mut state: Vec<f64> = (0..n)
            .map(|_| rng.next_uniform() * 2.0 * std::f64::consts::PI)
            .collect();
        let mut velocity: Vec<f64> = (0..n).map(|_| rng.next_normal(0.0, 1.0)).collect();
        let orig_state = state.clone();
        let orig_velocity = velocity.clone();

        let mut grad_fn = ham.grad_fn();
        let mut work = vec![0.0; n];
        for _ in 0..20 {
            leapfrog_step(&mut state, &mut velocity, &mut work, &mut grad_fn, 0.01).unwrap();
        }
        for _ in 0..20 {
            leapfrog_step(&mut state, &mut velocity, &mut work, &mut grad_fn, -0.01).unwrap();
        }

        for i in 0..n {
            assert!((state[i] - orig_state[i]).abs() < 1e-10);
            assert!((velocity[i] - orig_velocity[i]).abs() < 1e-10);
        }
    }
}
