//! Configuration options for the constrained QP solver.

use serde::Deserialize;

/// Numerical settings of the charge-fitting QP solve.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverOptions {
    /// Convergence tolerance on the equality-constraint residual norm.
    ///
    /// The solve is direct, so this does not control an iteration count; it
    /// only decides whether the returned solution is reported as converged.
    pub tolerance: f64,
    /// Tikhonov regularization strength λ.
    ///
    /// Added to the quadratic form as `H + 2λI`, which conditions the solve
    /// and shrinks fitted charges toward zero. Must be non-negative; zero
    /// disables regularization entirely.
    pub regularization: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            tolerance: 1.0e-6,
            regularization: 5.0e-4,
        }
    }
}
