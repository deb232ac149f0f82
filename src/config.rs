//! Fit configuration and utilities for loading it from TOML files.
//!
//! Every knob of the fitting pipeline that a user may reasonably tune lives in
//! [`FitConfig`]: the QP solver settings and the symmetry-detection settings.
//! All fields are defaulted, so an empty file (or no file at all) yields the
//! standard configuration.

use crate::error::EspFitError;
use crate::solver::SolverOptions;
use crate::symmetry::DEFAULT_SYMMETRY_TOLERANCE;
use serde::Deserialize;
use std::path::Path;

/// Settings for the symmetry-equivalence detector.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SymmetryOptions {
    /// Whether equivalent atoms are detected and constrained to equal charge.
    pub enabled: bool,
    /// Distance-profile matching tolerance in Bohr.
    pub tolerance: f64,
}

impl Default for SymmetryOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance: DEFAULT_SYMMETRY_TOLERANCE,
        }
    }
}

/// Complete configuration of a charge-fitting run.
///
/// Deserializes from a TOML document of the form:
///
/// ```toml
/// [solver]
/// tolerance = 1e-6
/// regularization = 5e-4
///
/// [symmetry]
/// enabled = true
/// tolerance = 0.1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitConfig {
    /// QP solver settings.
    pub solver: SolverOptions,
    /// Symmetry-detection settings.
    pub symmetry: SymmetryOptions,
}

impl FitConfig {
    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EspFitError::IoError`] if the file cannot be read, or
    /// [`EspFitError::DeserializationError`] if the content is not valid
    /// TOML or does not match the expected layout.
    pub fn load_from_file(path: &Path) -> Result<Self, EspFitError> {
        let content = std::fs::read_to_string(path).map_err(|io_error| EspFitError::IoError {
            path: path.to_path_buf(),
            source: io_error,
        })?;
        Self::load_from_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`EspFitError::DeserializationError`] if the content is not
    /// valid TOML or does not match the expected layout.
    pub fn load_from_str(toml_str: &str) -> Result<Self, EspFitError> {
        toml::from_str(toml_str).map_err(EspFitError::from)
    }
}
