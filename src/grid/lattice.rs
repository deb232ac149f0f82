//! Raw volumetric lattice data, as handed over by a cube-style reader.

/// Potential samples on a regular 3-D lattice, prior to any filtering.
///
/// All geometric quantities are atomic units (Bohr) and all values Hartree/e;
/// the lattice is stored exactly as read, with no unit conversion. Values are
/// laid out in scan order: the first axis index varies slowest, the third
/// fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLattice {
    /// Position of the (0, 0, 0) lattice point, in Bohr.
    pub origin: [f64; 3],
    /// The three lattice step vectors, in Bohr.
    pub axes: [[f64; 3]; 3],
    /// Number of points along each axis.
    pub counts: [usize; 3],
    /// Flat value array in scan order; may legitimately be shorter than
    /// `counts` implies for truncated inputs.
    pub values: Vec<f64>,
}

impl RawLattice {
    /// Number of points the axis counts imply.
    pub fn num_expected(&self) -> usize {
        self.counts[0] * self.counts[1] * self.counts[2]
    }

    /// Cartesian position of lattice point (i, j, k), in Bohr.
    pub fn position(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        let mut pos = self.origin;
        for d in 0..3 {
            pos[d] += i as f64 * self.axes[0][d]
                + j as f64 * self.axes[1][d]
                + k as f64 * self.axes[2][d];
        }
        pos
    }

    /// Iterates `(position, value)` pairs in scan order, stopping at the
    /// shorter of the value array and the lattice extent.
    pub fn samples(&self) -> impl Iterator<Item = ([f64; 3], f64)> + '_ {
        let [ni, nj, nk] = self.counts;
        (0..ni)
            .flat_map(move |i| (0..nj).flat_map(move |j| (0..nk).map(move |k| (i, j, k))))
            .zip(self.values.iter().copied())
            .map(|((i, j, k), value)| (self.position(i, j, k), value))
    }
}
