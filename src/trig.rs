use crate::error::Error;
use crate::geometry::LatticeIndex;

/// Which neighbor shifts to materialize for each trig quantity.
///
/// Energy sums run over one direction per axis (the dot product is symmetric,
/// so visiting both directions would double count). Gradients accumulate
/// contributions from both neighbors of every site and need both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftSet {
    /// Unshifted plus the forward neighbor per axis.
    OneSided,
    /// Unshifted plus forward and backward neighbors per axis.
    TwoSided,
}

/// One trig quantity (e.g. `cos θ`) evaluated at every site, together with
/// its periodically shifted copies.
///
/// `shifted` holds one array per axis (one-sided) or two per axis ordered
/// forward-then-backward (two-sided). Entry `i` of a shifted array is the
/// quantity at the *neighbor* of site `i`, so wrap boundaries carry the
/// far-edge values, never junk.
pub struct ShiftedBlock {
    pub asis: Vec<f64>,
    shifted: Vec<Vec<f64>>,
    per_axis: usize,
}

impl ShiftedBlock {
    fn build(values: Vec<f64>, lattice: &LatticeIndex, shift_set: ShiftSet) -> Self {
        let per_axis = match shift_set {
            ShiftSet::OneSided => 1,
            ShiftSet::TwoSided => 2,
        };
        let mut shifted = Vec::with_capacity(lattice.dim * per_axis);
        for axis in 0..lattice.dim {
            let fwd: Vec<f64> = (0..lattice.n_sites)
                .map(|i| values[lattice.neighbor(i, axis, true)])
                .collect();
            shifted.push(fwd);
            if shift_set == ShiftSet::TwoSided {
                let bwd: Vec<f64> = (0..lattice.n_sites)
                    .map(|i| values[lattice.neighbor(i, axis, false)])
                    .collect();
                shifted.push(bwd);
            }
        }
        Self {
            asis: values,
            shifted,
            per_axis,
        }
    }

    /// Values at each site's forward neighbor along `axis`.
    #[inline]
    pub fn fwd(&self, axis: usize) -> &[f64] {
        &self.shifted[axis * self.per_axis]
    }

    /// Values at each site's backward neighbor along `axis`.
    /// Only present in the two-sided set.
    #[inline]
    pub fn bwd(&self, axis: usize) -> &[f64] {
        debug_assert_eq!(self.per_axis, 2, "backward shifts need ShiftSet::TwoSided");
        &self.shifted[axis * self.per_axis + 1]
    }
}

/// Trigonometric features of a state vector: cos/sin of the θ (azimuthal)
/// half and the φ (polar) half, each with its neighbor-shifted copies.
///
/// The block/shift ordering is a private contract with [`crate::energy`];
/// both sides index shifts through [`ShiftedBlock::fwd`]/[`ShiftedBlock::bwd`].
pub struct TrigFeatures {
    pub shift_set: ShiftSet,
    pub n_sites: usize,
    pub n_axes: usize,
    pub cos_theta: ShiftedBlock,
    pub sin_theta: ShiftedBlock,
    pub cos_phi: ShiftedBlock,
    pub sin_phi: ShiftedBlock,
}

impl TrigFeatures {
    /// Evaluate cos/sin of both angle halves of `state` and gather the
    /// requested neighbor shifts. Pure function of `state` and the geometry.
    ///
    /// Fails with [`Error::ShapeMismatch`] when `state` does not hold exactly
    /// `2 * n_sites` angles for this lattice.
    pub fn build(
        state: &[f64],
        lattice: &LatticeIndex,
        shift_set: ShiftSet,
    ) -> Result<Self, Error> {
        if state.len() != lattice.state_len() {
            return Err(Error::ShapeMismatch {
                expected: lattice.state_len(),
                got: state.len(),
            });
        }
        let n = lattice.n_sites;
        let (thetas, phis) = state.split_at(n);

        let cos_theta = thetas.iter().map(|a| a.cos()).collect();
        let sin_theta = thetas.iter().map(|a| a.sin()).collect();
        let cos_phi = phis.iter().map(|a| a.cos()).collect();
        let sin_phi = phis.iter().map(|a| a.sin()).collect();

        Ok(Self {
            shift_set,
            n_sites: n,
            n_axes: lattice.dim,
            cos_theta: ShiftedBlock::build(cos_theta, lattice, shift_set),
            sin_theta: ShiftedBlock::build(sin_theta, lattice, shift_set),
            cos_phi: ShiftedBlock::build(cos_phi, lattice, shift_set),
            sin_phi: ShiftedBlock::build(sin_phi, lattice, shift_set),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_1d_forward_shift_is_circular() {
        let lat = LatticeIndex::configure(8, 1).unwrap();
        // thetas 0..4, phis 10..14 (angles chosen so cos values are distinct)
        let state: Vec<f64> = vec![0.1, 0.2, 0.3, 0.4, 1.1, 1.2, 1.3, 1.4];
        let trig = TrigFeatures::build(&state, &lat, ShiftSet::OneSided).unwrap();

        for i in 0..4 {
            let next = (i + 1) % 4;
            assert_eq!(trig.cos_theta.fwd(0)[i], trig.cos_theta.asis[next]);
            assert_eq!(trig.sin_phi.fwd(0)[i], trig.sin_phi.asis[next]);
        }
    }

    #[test]
    fn test_2d_two_sided_wrap() {
        let lat = LatticeIndex::configure(18, 2).unwrap(); // 3x3
        let state: Vec<f64> = (0..18).map(|i| 0.37 * i as f64).collect();
        let trig = TrigFeatures::build(&state, &lat, ShiftSet::TwoSided).unwrap();

        // Site 2 = (0,2): forward along axis 1 wraps to (0,0) = site 0
        assert_eq!(trig.cos_theta.fwd(1)[2], trig.cos_theta.asis[0]);
        // Site 0 = (0,0): backward along axis 0 wraps to (2,0) = site 6
        assert_eq!(trig.sin_theta.bwd(0)[0], trig.sin_theta.asis[6]);
        // Interior move: site 4 = (1,1) forward along axis 0 -> (2,1) = site 7
        assert_eq!(trig.cos_phi.fwd(0)[4], trig.cos_phi.asis[7]);
    }

    #[test]
    fn test_shape_mismatch() {
        let lat = LatticeIndex::configure(8, 1).unwrap();
        let state = vec![0.0; 7];
        assert!(matches!(
            TrigFeatures::build(&state, &lat, ShiftSet::OneSided),
            Err(Error::ShapeMismatch {
                expected: 8,
                got: 7
            })
        ));
    }
}
