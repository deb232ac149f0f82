//! Construction of the quadratic-form matrices of the ESP least-squares
//! objective.
//!
//! The design matrix `A` has one row per grid point and one column per atom,
//! with entries `1/r` (the Coulomb kernel). Minimizing `‖A·q − v‖²` is posed
//! as the quadratic program `min 0.5·qᵀHq + fᵀq` with `H = 2AᵀA` and
//! `f = −2Aᵀv`. Columns of `A` are normalized by their own Euclidean norm
//! before the products are formed, and `f` is rescaled back through the same
//! norms so the solved variable stays a physical charge; the normalization is
//! there to condition the subsequent factorizations.

use crate::math::constants::{COLUMN_NORM_FLOOR, MIN_COULOMB_DISTANCE_BOHR};
use crate::math::distance;
use crate::types::{EspGrid, Molecule};
use faer::{Col, Mat};
use rayon::prelude::*;
use tracing::debug;

/// A thread-safe wrapper for raw matrix access to enable parallel filling.
///
/// Allows multiple threads to write to disjoint rows of a matrix without
/// locking; safe because the parallel iterator assigns each row to exactly
/// one thread.
struct UnsafeMatView {
    ptr: *mut f64,
    row_stride: isize,
    col_stride: isize,
}

unsafe impl Send for UnsafeMatView {}
unsafe impl Sync for UnsafeMatView {}

impl UnsafeMatView {
    /// Writes a value to the matrix at the specified (row, col) index.
    ///
    /// # Safety
    ///
    /// The caller must ensure that:
    /// 1. The (row, col) indices are within bounds.
    /// 2. No other thread is writing to the same address simultaneously.
    unsafe fn write(&self, row: usize, col: usize, val: f64) {
        let offset = (row as isize) * self.row_stride + (col as isize) * self.col_stride;
        unsafe {
            *self.ptr.offset(offset) = val;
        }
    }
}

/// Builds `H` (n × n) and `f` (length n) for the molecule/grid pair.
///
/// `H` is a Gram matrix and therefore symmetric positive semi-definite;
/// callers add regularization before factorizing. Distances are floored at
/// [`MIN_COULOMB_DISTANCE_BOHR`] so a grid point coinciding with a nucleus
/// cannot produce an infinite kernel entry.
pub fn build_esp_matrices(molecule: &Molecule, grid: &EspGrid) -> (Mat<f64>, Col<f64>) {
    let n_atoms = molecule.num_atoms();
    let n_points = grid.num_points();

    let atom_positions = molecule.positions();
    let grid_positions = grid.positions();

    let mut design: Mat<f64> = Mat::zeros(n_points, n_atoms);

    let mat_view = UnsafeMatView {
        ptr: design.as_ptr_mut(),
        row_stride: design.row_stride(),
        col_stride: design.col_stride(),
    };

    (0..n_points).into_par_iter().for_each(|p| {
        let point = grid_positions[p];
        for (a, atom_position) in atom_positions.iter().enumerate() {
            let r = distance(&point, atom_position).max(MIN_COULOMB_DISTANCE_BOHR);
            // SAFETY: Each row p is handled by exactly one thread, so no two
            // threads write the same entries.
            unsafe {
                mat_view.write(p, a, 1.0 / r);
            }
        }
    });

    // Per-column normalization for conditioning. Degenerate columns (norm
    // under the floor) are left untouched.
    let mut column_norms = vec![0.0_f64; n_atoms];
    for a in 0..n_atoms {
        let norm = design.col(a).norm_l2();
        column_norms[a] = norm;
        if norm > COLUMN_NORM_FLOOR {
            for p in 0..n_points {
                design[(p, a)] /= norm;
            }
        }
    }

    let potentials = Col::from_fn(n_points, |p| grid.point(p).potential);

    let gram = design.transpose() * design.as_ref();
    let projected = design.transpose() * potentials.as_ref();

    let h = Mat::from_fn(n_atoms, n_atoms, |r, c| 2.0 * gram[(r, c)]);
    let f = Col::from_fn(n_atoms, |a| {
        let value = -2.0 * projected[a];
        if column_norms[a] > COLUMN_NORM_FLOOR {
            value / column_norms[a]
        } else {
            value
        }
    });

    debug!(
        atoms = n_atoms,
        grid_points = n_points,
        "ESP quadratic form assembled"
    );

    (h, f)
}
