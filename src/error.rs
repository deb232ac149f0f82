use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all fallible operations in the `espfit` library.
///
/// Fatal ingestion failures are distinguished from recoverable numerical
/// conditions: a run that merely fails to converge does not produce an error
/// at all (see [`crate::solver::QpSolution::converged`]), while an unusable
/// input grid aborts the pipeline through one of the variants below.
#[derive(Error, Debug)]
pub enum EspFitError {
    /// The input molecule contained no atoms; at least one is required to
    /// pose the fit.
    #[error("Input validation failed: at least one atom is required for a fit")]
    NoAtoms,

    /// The volumetric lattice contained no potential values at all.
    #[error("No potential values present in the volumetric lattice")]
    EmptyLattice,

    /// Every lattice sample was rejected by the ingestion filters, leaving
    /// nothing to fit against. The per-filter counters are carried for
    /// diagnostics.
    #[error(
        "No grid points survived filtering ({near_nucleus} near-nucleus, {extreme_value} extreme-value)"
    )]
    AllPointsFiltered {
        /// Samples discarded for lying too close to a nucleus.
        near_nucleus: usize,
        /// Samples discarded for exceeding the potential ceiling.
        extreme_value: usize,
    },

    /// A failure within the underlying dense linear-algebra solver, for
    /// example a factorization panicking on a pathological system.
    #[error("Failed to solve the linear matrix system: {0}")]
    LinalgError(String),

    /// An I/O error that occurred while reading a configuration file.
    #[error("I/O error at path '{path}': {source}")]
    IoError {
        /// The path of the file that caused the I/O error.
        path: PathBuf,
        /// The underlying `std::io::Error`.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file failed to parse as TOML or did not match the
    /// expected layout.
    #[error("Failed to deserialize TOML configuration: {0}")]
    DeserializationError(#[from] toml::de::Error),
}
