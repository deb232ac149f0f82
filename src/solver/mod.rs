//! The charge-fitting core: constraint assembly, quadratic-form
//! construction, and the equality-constrained QP solve.

mod constraints;
mod matrices;
mod options;
mod qp;

pub use constraints::Constraints;
pub use matrices::build_esp_matrices;
pub use options::SolverOptions;
pub use qp::{QpSolution, QpSolver};
