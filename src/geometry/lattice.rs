use crate::error::Error;

/// Periodic hypercubic lattice with precomputed neighbor tables.
///
/// Sites are indexed in row-major (C) order over a `side^dim` grid. For each
/// site and axis the table stores the flat index of the forward (+1) and
/// backward (−1) periodic neighbor, so a circular shift along any axis is a
/// plain gather. The table folds the interior step (`flat + stride`) and the
/// wraparound edge into one map.
pub struct LatticeIndex {
    /// Grid extent along every axis.
    pub side: usize,
    /// Number of spatial dimensions (1, 2, or 3).
    pub dim: usize,
    /// Total number of sites (`side^dim`).
    pub n_sites: usize,
    /// Row-major strides: `strides[d] = side^(dim - 1 - d)`.
    pub strides: Vec<usize>,
    /// Neighbor table, length `n_sites * dim * 2`.
    /// Layout: `neighbors[(i * dim + axis) * 2 + dir]` with `dir = 0` forward.
    neighbors: Vec<u32>,
}

impl LatticeIndex {
    /// Build the geometry for a flattened state of `total_size = 2 * n_sites`
    /// angles in `dim` dimensions.
    ///
    /// Fails with [`Error::InvalidDimension`] for `dim` outside {1,2,3} and
    /// with [`Error::InvalidSize`] when the site count is odd-sized or not a
    /// perfect `dim`-th power of an integer side length.
    pub fn configure(total_size: usize, dim: usize) -> Result<Self, Error> {
        if !(1..=3).contains(&dim) {
            return Err(Error::InvalidDimension(dim));
        }
        if total_size == 0 || total_size % 2 != 0 {
            return Err(Error::InvalidSize {
                n_sites: total_size / 2,
                dim,
            });
        }
        let n_sites = total_size / 2;

        let side = (n_sites as f64).powf(1.0 / dim as f64).round() as usize;
        if side == 0 || side.pow(dim as u32) != n_sites {
            return Err(Error::InvalidSize { n_sites, dim });
        }

        let mut strides = vec![1usize; dim];
        for d in (0..dim.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * side;
        }

        let mut neighbors = vec![0u32; n_sites * dim * 2];
        for i in 0..n_sites {
            let coords: Vec<usize> = (0..dim).map(|d| (i / strides[d]) % side).collect();

            for axis in 0..dim {
                for (dir, sign) in [(0, 1isize), (1, -1isize)] {
                    let mut flat = 0usize;
                    for d in 0..dim {
                        let off = if d == axis { sign } else { 0 };
                        let c = (coords[d] as isize + off).rem_euclid(side as isize) as usize;
                        flat += c * strides[d];
                    }
                    neighbors[(i * dim + axis) * 2 + dir] = flat as u32;
                }
            }
        }

        Ok(Self {
            side,
            dim,
            n_sites,
            strides,
            neighbors,
        })
    }

    /// Build the geometry from per-axis extents, e.g. `[10, 10, 10]`.
    ///
    /// Only hypercubic grids are supported: all extents must be equal.
    pub fn from_dims(dims: &[usize]) -> Result<Self, Error> {
        let n_sites: usize = dims.iter().product();
        if dims.windows(2).any(|w| w[0] != w[1]) {
            return Err(Error::InvalidSize {
                n_sites,
                dim: dims.len(),
            });
        }
        Self::configure(2 * n_sites, dims.len())
    }

    /// Flat index of the neighbor of `site` along `axis`.
    /// `forward = true` is the +1 direction, `forward = false` the −1.
    #[inline]
    pub fn neighbor(&self, site: usize, axis: usize, forward: bool) -> usize {
        self.neighbors[(site * self.dim + axis) * 2 + (!forward as usize)] as usize
    }

    /// Expected state-vector length (`2 * n_sites`).
    #[inline]
    pub fn state_len(&self) -> usize {
        2 * self.n_sites
    }
}
