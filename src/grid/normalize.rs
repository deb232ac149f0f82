//! Turns raw volumetric potential data into a clean, fit-ready [`EspGrid`].
//!
//! Three heuristics stand between a raw lattice and usable data:
//! near-nucleus samples are numerically divergent and discarded outright,
//! samples with implausibly large magnitudes are treated as artifacts, and a
//! statistical check over the 2–5 Bohr shell corrects the inverted sign
//! convention emitted by some upstream potential generators. Everything is
//! atomic units in and atomic units out; no conversion happens here.

use super::lattice::RawLattice;
use crate::error::EspFitError;
use crate::math::constants::{
    ELECTRONEGATIVE_Z_MIN, FAR_FIELD_POTENTIAL_CEILING, NEAR_FIELD_POTENTIAL_CEILING,
    NEAR_FIELD_RADIUS_BOHR, NEAR_NUCLEUS_CUTOFF_BOHR, SHELL_INNER_RADIUS_BOHR,
    SHELL_MEAN_THRESHOLD, SHELL_MIN_SAMPLES, SHELL_OUTER_RADIUS_BOHR, SHELL_POTENTIAL_CEILING,
};
use crate::math::nearest_distance;
use crate::types::{EspGrid, GridPoint, Molecule};
use tracing::{debug, info};

/// Counters describing what the ingestion filters did to a lattice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Samples discarded for lying within the near-nucleus cutoff.
    pub near_nucleus: usize,
    /// Samples discarded for exceeding the potential ceiling.
    pub extreme_value: usize,
    /// Samples that made it into the grid.
    pub accepted: usize,
    /// Whether the sign-convention heuristic negated the retained values.
    pub sign_flipped: bool,
}

/// Filters a raw lattice against the molecule's nuclei and produces the grid
/// the fit runs on.
///
/// Unit contract: `lattice` must already be in atomic units (Bohr,
/// Hartree/e) and `molecule` positions in Bohr; the output grid is in the
/// same units.
///
/// # Errors
///
/// [`EspFitError::EmptyLattice`] if the lattice holds no values at all, and
/// [`EspFitError::AllPointsFiltered`] if filtering rejects every sample.
pub fn normalize_lattice(
    lattice: &RawLattice,
    molecule: &Molecule,
) -> Result<(EspGrid, FilterStats), EspFitError> {
    if lattice.values.is_empty() {
        return Err(EspFitError::EmptyLattice);
    }

    let nuclei = molecule.positions();
    let sign_flipped = detect_sign_inversion(lattice, molecule, &nuclei);

    let mut grid = EspGrid::new();
    let mut stats = FilterStats {
        sign_flipped,
        ..FilterStats::default()
    };

    for (position, value) in lattice.samples() {
        let dist = nearest_distance(&position, &nuclei);

        if dist < NEAR_NUCLEUS_CUTOFF_BOHR {
            stats.near_nucleus += 1;
            continue;
        }

        let ceiling = if dist < NEAR_FIELD_RADIUS_BOHR {
            NEAR_FIELD_POTENTIAL_CEILING
        } else {
            FAR_FIELD_POTENTIAL_CEILING
        };
        if value.abs() > ceiling {
            stats.extreme_value += 1;
            continue;
        }

        let potential = if sign_flipped { -value } else { value };
        grid.add_point(GridPoint::new(position, potential));
    }

    stats.accepted = grid.num_points();
    debug!(
        accepted = stats.accepted,
        near_nucleus = stats.near_nucleus,
        extreme_value = stats.extreme_value,
        sign_flipped = stats.sign_flipped,
        "lattice ingestion complete"
    );

    if grid.is_empty() {
        return Err(EspFitError::AllPointsFiltered {
            near_nucleus: stats.near_nucleus,
            extreme_value: stats.extreme_value,
        });
    }

    Ok((grid, stats))
}

/// Decides, once per lattice, whether the upstream sign convention is
/// inverted.
///
/// For molecules with at least one appreciably electronegative atom the mean
/// potential over the 2–5 Bohr shell (excluding large-magnitude samples) is
/// expected to be negative; a clearly positive mean over a sufficient sample
/// count indicates an inverted convention.
fn detect_sign_inversion(
    lattice: &RawLattice,
    molecule: &Molecule,
    nuclei: &[[f64; 3]],
) -> bool {
    if !molecule.has_atomic_number_at_least(ELECTRONEGATIVE_Z_MIN) {
        return false;
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for (position, value) in lattice.samples() {
        let dist = nearest_distance(&position, nuclei);
        if (SHELL_INNER_RADIUS_BOHR..=SHELL_OUTER_RADIUS_BOHR).contains(&dist)
            && value.abs() < SHELL_POTENTIAL_CEILING
        {
            sum += value;
            count += 1;
        }
    }

    if count < SHELL_MIN_SAMPLES {
        return false;
    }

    let mean = sum / count as f64;
    if mean > SHELL_MEAN_THRESHOLD {
        info!(
            shell_samples = count,
            shell_mean = mean,
            "shell potential is positive around an electron-rich molecule; flipping sign convention"
        );
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Atom;
    use approx::assert_relative_eq;

    fn carbon_at_origin() -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new("C", [0.0, 0.0, 0.0]));
        mol
    }

    /// 5x5x5 block of points whose distances to the origin all fall inside
    /// the 2-5 Bohr shell.
    fn shell_lattice(value: f64) -> RawLattice {
        RawLattice {
            origin: [2.0, 2.0, 2.0],
            axes: [[0.1, 0.0, 0.0], [0.0, 0.1, 0.0], [0.0, 0.0, 0.1]],
            counts: [5, 5, 5],
            values: vec![value; 125],
        }
    }

    #[test]
    fn test_empty_lattice_is_fatal() {
        let lattice = RawLattice {
            origin: [0.0; 3],
            axes: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            counts: [0, 0, 0],
            values: vec![],
        };
        let result = normalize_lattice(&lattice, &carbon_at_origin());
        assert!(matches!(result, Err(EspFitError::EmptyLattice)));
    }

    #[test]
    fn test_near_nucleus_samples_discarded() {
        // One point at 1.0 Bohr from the nucleus, one at 3.0 Bohr.
        let lattice = RawLattice {
            origin: [1.0, 0.0, 0.0],
            axes: [[2.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            counts: [2, 1, 1],
            values: vec![0.3, 0.01],
        };
        let (grid, stats) = normalize_lattice(&lattice, &carbon_at_origin()).unwrap();
        assert_eq!(grid.num_points(), 1);
        assert_eq!(stats.near_nucleus, 1);
        assert_relative_eq!(grid.point(0).position[0], 3.0);
    }

    #[test]
    fn test_potential_ceilings_are_distance_dependent() {
        // Points at 1.8 Bohr (near field) and 3.0 Bohr (far field).
        let lattice = RawLattice {
            origin: [1.8, 0.0, 0.0],
            axes: [[1.2, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            counts: [2, 1, 1],
            values: vec![45.0, 25.0],
        };
        let (grid, stats) = normalize_lattice(&lattice, &carbon_at_origin()).unwrap();
        // 45 a.u. is legal inside 2 Bohr; 25 a.u. is not legal beyond it.
        assert_eq!(grid.num_points(), 1);
        assert_eq!(stats.extreme_value, 1);
        assert_relative_eq!(grid.point(0).potential, 45.0);
    }

    #[test]
    fn test_all_filtered_is_fatal() {
        let lattice = RawLattice {
            origin: [0.5, 0.0, 0.0],
            axes: [[0.1, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            counts: [2, 1, 1],
            values: vec![0.1, 0.1],
        };
        let result = normalize_lattice(&lattice, &carbon_at_origin());
        assert!(matches!(
            result,
            Err(EspFitError::AllPointsFiltered {
                near_nucleus: 2,
                extreme_value: 0
            })
        ));
    }

    #[test]
    fn test_sign_flip_applied_for_positive_shell() {
        let (grid, stats) = normalize_lattice(&shell_lattice(0.01), &carbon_at_origin()).unwrap();
        assert!(stats.sign_flipped);
        assert_eq!(grid.num_points(), 125);
        for point in grid.points() {
            assert_relative_eq!(point.potential, -0.01);
        }
    }

    #[test]
    fn test_no_sign_flip_for_negative_shell() {
        let (grid, stats) = normalize_lattice(&shell_lattice(-0.01), &carbon_at_origin()).unwrap();
        assert!(!stats.sign_flipped);
        assert_relative_eq!(grid.point(0).potential, -0.01);
    }

    #[test]
    fn test_no_sign_flip_without_electronegative_atom() {
        let mut h2 = Molecule::new();
        h2.add_atom(Atom::new("H", [0.0, 0.0, 0.0]));
        h2.add_atom(Atom::new("H", [1.4, 0.0, 0.0]));
        let (_, stats) = normalize_lattice(&shell_lattice(0.01), &h2).unwrap();
        assert!(!stats.sign_flipped);
    }

    #[test]
    fn test_no_sign_flip_below_sample_quorum() {
        // Same geometry but only 64 shell samples, below the quorum of 100.
        let lattice = RawLattice {
            origin: [2.0, 2.0, 2.0],
            axes: [[0.1, 0.0, 0.0], [0.0, 0.1, 0.0], [0.0, 0.0, 0.1]],
            counts: [4, 4, 4],
            values: vec![0.01; 64],
        };
        let (_, stats) = normalize_lattice(&lattice, &carbon_at_origin()).unwrap();
        assert!(!stats.sign_flipped);
    }
}
