//! espfit: fitting atomic partial charges to electrostatic potential grids.
//!
//! Given a molecule and a reference electrostatic potential sampled on a 3-D
//! grid, this crate solves for the set of atomic point charges whose Coulomb
//! potential best reproduces the reference, subject to equality constraints
//! on the total molecular charge and on chemically equivalent atoms. The
//! constrained least-squares problem is posed as a quadratic program and
//! solved in a single direct KKT solve.

pub mod config;
pub mod error;
pub mod grid;
pub mod math;
pub mod solver;
pub mod symmetry;
pub mod types;
pub mod validate;

pub use config::{FitConfig, SymmetryOptions};
pub use error::EspFitError;
pub use grid::{FilterStats, RawLattice, normalize_lattice};
pub use solver::{Constraints, QpSolution, QpSolver, SolverOptions, build_esp_matrices};
pub use symmetry::detect_equivalent_atoms;
pub use types::{Atom, EspGrid, GridPoint, Molecule};
pub use validate::{FitQuality, ValidationReport, validate};

use tracing::{debug, info};

/// Runs the complete fitting pipeline and writes the fitted charges back
/// into the molecule.
///
/// The pipeline builds the ESP quadratic form, detects symmetry-equivalent
/// atoms (when enabled), assembles the charge-sum and symmetry equality
/// constraints, and performs the constrained QP solve. The molecule's
/// `total_charge` is the charge-sum constraint target.
///
/// # Errors
///
/// Returns [`EspFitError::NoAtoms`] for an empty molecule, or
/// [`EspFitError::LinalgError`] if the dense solve fails outright. A fit
/// that merely misses the convergence tolerance is NOT an error; check
/// [`QpSolution::converged`].
///
/// # Examples
///
/// ```
/// use espfit::{Atom, EspGrid, FitConfig, GridPoint, Molecule, fit_charges};
///
/// // A single "proton" probed at four equidistant points.
/// let mut molecule = Molecule::new();
/// molecule.add_atom(Atom::new("H", [0.0, 0.0, 0.0]));
/// molecule.set_total_charge(1.0);
///
/// let mut grid = EspGrid::new();
/// for position in [
///     [3.0, 0.0, 0.0],
///     [-3.0, 0.0, 0.0],
///     [0.0, 3.0, 0.0],
///     [0.0, -3.0, 0.0],
/// ] {
///     grid.add_point(GridPoint::new(position, 1.0 / 3.0));
/// }
///
/// let solution = fit_charges(&mut molecule, &grid, &FitConfig::default()).unwrap();
/// assert!(solution.converged);
/// assert!((solution.charges[0] - 1.0).abs() < 1e-6);
/// ```
pub fn fit_charges(
    molecule: &mut Molecule,
    grid: &EspGrid,
    config: &FitConfig,
) -> Result<QpSolution, EspFitError> {
    if molecule.is_empty() {
        return Err(EspFitError::NoAtoms);
    }

    info!(
        atoms = molecule.num_atoms(),
        grid_points = grid.num_points(),
        "building ESP least-squares system"
    );
    let (h, f) = solver::build_esp_matrices(molecule, grid);

    let mut constraints = Constraints::new(molecule.num_atoms());
    constraints.add_charge_constraint(molecule.total_charge());

    if config.symmetry.enabled {
        let classes = symmetry::detect_equivalent_atoms(molecule, config.symmetry.tolerance);
        for class in &classes {
            let first = class[0];
            for &other in &class[1..] {
                constraints.add_symmetry_constraint(first, other);
            }
        }
        if !classes.is_empty() {
            debug!(
                classes = classes.len(),
                constraints = constraints.num_constraints(),
                "equivalence classes constrained"
            );
        }
    }

    let solution = QpSolver::new()
        .with_options(config.solver)
        .solve(&h, &f, &constraints)?;

    molecule.set_charges(&solution.charges);
    Ok(solution)
}
