//! Post-fit validation: how well do the fitted charges reproduce the
//! reference potential, and what molecular properties do they imply.

use crate::math::constants::MIN_COULOMB_DISTANCE_BOHR;
use crate::math::distance;
use crate::types::{EspGrid, Molecule};
use std::fmt;

/// Coarse fit-quality grade derived from the ESP RMSE (atomic units).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitQuality {
    Excellent,
    Good,
    Acceptable,
    Poor,
}

impl fmt::Display for FitQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FitQuality::Excellent => "Excellent",
            FitQuality::Good => "Good",
            FitQuality::Acceptable => "Acceptable",
            FitQuality::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// Summary of how well a fitted molecule reproduces its reference grid.
///
/// All potentials are atomic units; the dipole moment is in Debye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationReport {
    /// Root-mean-square deviation between fitted-charge potential and the
    /// reference potential over all grid points.
    pub esp_rmse: f64,
    /// Largest absolute deviation over the grid.
    pub esp_max_error: f64,
    /// Dipole-moment magnitude implied by the fitted charges, in Debye.
    pub dipole_moment: f64,
    /// Sum of the fitted charges.
    pub total_charge: f64,
}

impl ValidationReport {
    /// Grades the fit from its RMSE.
    pub fn quality(&self) -> FitQuality {
        if self.esp_rmse < 0.01 {
            FitQuality::Excellent
        } else if self.esp_rmse < 0.05 {
            FitQuality::Good
        } else if self.esp_rmse < 0.10 {
            FitQuality::Acceptable
        } else {
            FitQuality::Poor
        }
    }
}

/// Coulomb potential of the molecule's current charges at `point`, in
/// Hartree/e. Distances are floored the same way the design matrix floors
/// them, so validation and fitting see the same kernel.
pub fn coulomb_potential(molecule: &Molecule, point: &[f64; 3]) -> f64 {
    molecule
        .atoms()
        .iter()
        .map(|atom| atom.charge / distance(point, &atom.position).max(MIN_COULOMB_DISTANCE_BOHR))
        .sum()
}

/// Compares the fitted charges against the reference grid.
pub fn validate(molecule: &Molecule, grid: &EspGrid) -> ValidationReport {
    let mut sum_sq_error = 0.0;
    let mut max_error = 0.0_f64;

    for point in grid.points() {
        let fitted = coulomb_potential(molecule, &point.position);
        let error = (fitted - point.potential).abs();
        sum_sq_error += error * error;
        max_error = max_error.max(error);
    }

    let esp_rmse = if grid.is_empty() {
        0.0
    } else {
        (sum_sq_error / grid.num_points() as f64).sqrt()
    };

    ValidationReport {
        esp_rmse,
        esp_max_error: max_error,
        dipole_moment: molecule.dipole_moment(),
        total_charge: molecule.charges().iter().sum(),
    }
}
