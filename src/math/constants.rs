//! Physical constants and numerical thresholds used throughout the espfit library.
//!
//! Every length handled by the core is in Bohr and every potential in Hartree/e.
//! The thresholds below encode the ingestion heuristics and numerical floors of
//! the charge-fitting pipeline in that unit system.

/// Conversion factor from Bohr radii to angstroms.
///
/// Used only at ingestion boundaries: molecular geometry arrives in angstroms
/// and is converted to Bohr on read. The core itself never stores angstroms.
///
/// The value is approximately 0.529 Å per Bohr radius.
pub const BOHR_TO_ANGSTROM: f64 = 0.529_177_210_903;

/// Conversion factor from the atomic unit of dipole moment (e·Bohr) to Debye.
pub const AU_DIPOLE_TO_DEBYE: f64 = 2.541_746_473;

/// Floor applied to atom-to-grid-point distances in the Coulomb design matrix.
///
/// A grid point coinciding with a nucleus would make the 1/r kernel diverge;
/// distances below this floor are clamped to it. Points this close to a
/// nucleus are normally removed during ingestion, so the floor only matters
/// for synthetic or hand-built grids.
pub const MIN_COULOMB_DISTANCE_BOHR: f64 = 1e-10;

/// Design-matrix columns with a Euclidean norm below this floor are left
/// unnormalized (degenerate atom, e.g. one whose every nearby grid point was
/// filtered out).
pub const COLUMN_NORM_FLOOR: f64 = 1e-10;

/// Grid samples closer than this to any nucleus are discarded during
/// ingestion.
///
/// The reference potential diverges as 1/r at a nucleus, so samples inside
/// this radius are numerically unreliable and would dominate the
/// least-squares objective.
pub const NEAR_NUCLEUS_CUTOFF_BOHR: f64 = 1.5;

/// Radius below which the looser near-field potential ceiling applies.
pub const NEAR_FIELD_RADIUS_BOHR: f64 = 2.0;

/// Maximum |potential| (a.u.) accepted within [`NEAR_FIELD_RADIUS_BOHR`] of a
/// nucleus, where steep but legitimate gradients occur.
pub const NEAR_FIELD_POTENTIAL_CEILING: f64 = 50.0;

/// Maximum |potential| (a.u.) accepted beyond [`NEAR_FIELD_RADIUS_BOHR`] of
/// every nucleus; tighter than the near-field bound to catch artifacts.
pub const FAR_FIELD_POTENTIAL_CEILING: f64 = 20.0;

/// Inner radius of the shell sampled by the sign-convention heuristic.
pub const SHELL_INNER_RADIUS_BOHR: f64 = 2.0;

/// Outer radius of the shell sampled by the sign-convention heuristic.
pub const SHELL_OUTER_RADIUS_BOHR: f64 = 5.0;

/// Samples with |potential| at or above this bound (a.u.) are excluded from
/// the shell statistics.
pub const SHELL_POTENTIAL_CEILING: f64 = 5.0;

/// Minimum number of shell samples required before the sign heuristic is
/// trusted.
pub const SHELL_MIN_SAMPLES: usize = 100;

/// Mean shell potential (a.u.) above which the upstream sign convention is
/// judged inverted and every retained value is negated.
pub const SHELL_MEAN_THRESHOLD: f64 = 1e-3;

/// Smallest atomic number treated as appreciably electronegative.
///
/// The sign-convention heuristic only runs for molecules containing at least
/// one such atom, since only electron-rich molecules have a reliably negative
/// outer shell.
pub const ELECTRONEGATIVE_Z_MIN: u8 = 6;
