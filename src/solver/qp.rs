//! The equality-constrained quadratic-program solver.
//!
//! Despite its pedigree in general QP codes, this solver has exactly one job:
//! minimize `0.5·qᵀHq + fᵀq` subject to `A·q = b`, which for an
//! equality-only system reduces to a single direct solve of the KKT
//! saddle-point system. There is no iteration loop and no inequality
//! machinery; `iterations` is reported as 1 for interface compatibility with
//! downstream tooling.

use super::constraints::Constraints;
use super::options::SolverOptions;
use crate::error::EspFitError;
use faer::{Col, Mat, Side, prelude::*};
use tracing::debug;

/// The terminal artifact of a charge fit.
#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    /// Fitted charge vector, one entry per atom in molecule order.
    pub charges: Vec<f64>,
    /// The true ESP-mismatch objective `0.5·qᵀHq + fᵀq`, evaluated with the
    /// unregularized `H` and `f` so fit quality can be judged independently
    /// of the regularization strength.
    pub objective_value: f64,
    /// Whether the equality-constraint residual met the configured
    /// tolerance. A `false` here is a reportable outcome, not an error.
    pub converged: bool,
    /// Always 1: the equality-only problem is solved in one direct solve.
    pub iterations: u32,
}

/// Solver for the equality-constrained charge-fitting QP.
pub struct QpSolver {
    options: SolverOptions,
}

impl QpSolver {
    /// Creates a solver with default options.
    pub fn new() -> Self {
        Self {
            options: SolverOptions::default(),
        }
    }

    /// Replaces the solver options, consuming and returning the solver.
    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Solves `min 0.5·qᵀHq + fᵀq` subject to the given equality system.
    ///
    /// `H` is regularized to `H + 2λI` before factorization. Numerical
    /// near-singularity never raises: the unconstrained branch falls back
    /// from Cholesky to a symmetric-indefinite factorization, and the KKT
    /// branch uses a minimum-norm solve that tolerates rank deficiency.
    /// The only error path is a factorization panic on a pathological
    /// system, surfaced as [`EspFitError::LinalgError`].
    pub fn solve(
        &self,
        h: &Mat<f64>,
        f: &Col<f64>,
        constraints: &Constraints,
    ) -> Result<QpSolution, EspFitError> {
        let n = h.nrows();
        let m = constraints.num_constraints();

        let mut h_reg = h.clone();
        for i in 0..n {
            h_reg[(i, i)] += 2.0 * self.options.regularization;
        }

        debug!(variables = n, constraints = m, "solving equality-constrained QP");

        let primal = if m == 0 {
            self.solve_unconstrained(&h_reg, f)
        } else {
            self.solve_kkt(&h_reg, f, constraints)?
        };

        let charges: Vec<f64> = (0..n).map(|i| primal[i]).collect();
        let converged = constraints.is_satisfied(&charges, self.options.tolerance);

        // Objective against the unregularized quadratic form.
        let mut objective_value = 0.0;
        for i in 0..n {
            let mut hq_i = 0.0;
            for j in 0..n {
                hq_i += h[(i, j)] * primal[j];
            }
            objective_value += 0.5 * primal[i] * hq_i + f[i] * primal[i];
        }

        debug!(
            converged,
            objective = objective_value,
            residual = constraints.residual_norm(&charges),
            "QP solve finished"
        );

        Ok(QpSolution {
            charges,
            objective_value,
            converged,
            iterations: 1,
        })
    }

    /// Solves `H_reg·q = −f` by Cholesky, falling back to a
    /// symmetric-indefinite (Bunch-Kaufman) factorization when `H_reg` is
    /// not numerically positive definite.
    fn solve_unconstrained(&self, h_reg: &Mat<f64>, f: &Col<f64>) -> Col<f64> {
        let rhs = Col::from_fn(f.nrows(), |i| -f[i]);
        match h_reg.llt(Side::Lower) {
            Ok(cholesky) => cholesky.solve(&rhs),
            Err(_) => {
                debug!("Cholesky factorization failed; using symmetric-indefinite fallback");
                h_reg.lblt(Side::Lower).solve(&rhs)
            }
        }
    }

    /// Assembles and solves the KKT saddle-point system
    ///
    /// ```text
    /// [ H_reg  Aᵀ ] [ q ]   [ −f ]
    /// [  A     0  ] [ λ ] = [  b ]
    /// ```
    ///
    /// with a minimum-norm SVD solve, which handles the redundant symmetry
    /// rows a chain of equivalence constraints can produce (duplicated rows
    /// make the saddle-point matrix exactly singular, so a plain LU would
    /// divide by a zero pivot).
    fn solve_kkt(
        &self,
        h_reg: &Mat<f64>,
        f: &Col<f64>,
        constraints: &Constraints,
    ) -> Result<Col<f64>, EspFitError> {
        let n = h_reg.nrows();
        let m = constraints.num_constraints();
        let a = constraints.matrix();
        let b = constraints.targets();

        let size = n + m;
        let mut kkt: Mat<f64> = Mat::zeros(size, size);
        for r in 0..n {
            for c in 0..n {
                kkt[(r, c)] = h_reg[(r, c)];
            }
        }
        for r in 0..m {
            for c in 0..n {
                kkt[(n + r, c)] = a[(r, c)];
                kkt[(c, n + r)] = a[(r, c)];
            }
        }

        let rhs = Col::from_fn(size, |i| if i < n { -f[i] } else { b[i - n] });

        let svd = kkt.svd().map_err(|_| {
            EspFitError::LinalgError(
                "SVD of the KKT saddle-point system failed to converge".to_string(),
            )
        })?;
        let solution = svd.pseudoinverse() * &rhs;

        Ok(Col::from_fn(n, |i| solution[i]))
    }
}

impl Default for QpSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn options_without_regularization() -> SolverOptions {
        SolverOptions {
            regularization: 0.0,
            ..SolverOptions::default()
        }
    }

    /// H, f for min ‖A·q − v‖² with a hand-picked design matrix, plus the
    /// normal-equations solution computed independently.
    fn quadratic_form_from_design(
        design: &[[f64; 2]],
        v: &[f64],
    ) -> (Mat<f64>, Col<f64>, [f64; 2]) {
        let m = design.len();
        let mut ata = [[0.0; 2]; 2];
        let mut atv = [0.0; 2];
        for p in 0..m {
            for i in 0..2 {
                for j in 0..2 {
                    ata[i][j] += design[p][i] * design[p][j];
                }
                atv[i] += design[p][i] * v[p];
            }
        }

        let h = Mat::from_fn(2, 2, |r, c| 2.0 * ata[r][c]);
        let f = Col::from_fn(2, |i| -2.0 * atv[i]);

        // Solve AᵀA q = Aᵀv by hand (2x2 Cramer).
        let det = ata[0][0] * ata[1][1] - ata[0][1] * ata[1][0];
        let q = [
            (atv[0] * ata[1][1] - ata[0][1] * atv[1]) / det,
            (ata[0][0] * atv[1] - atv[0] * ata[1][0]) / det,
        ];
        (h, f, q)
    }

    #[test]
    fn test_unconstrained_solve_matches_normal_equations() {
        let design = [[1.0, 0.2], [0.5, 1.0], [0.3, 0.7], [0.9, 0.1]];
        let v = [0.8, 0.4, 0.3, 0.6];
        let (h, f, expected) = quadratic_form_from_design(&design, &v);

        let solver = QpSolver::new().with_options(options_without_regularization());
        let solution = solver.solve(&h, &f, &Constraints::new(2)).unwrap();

        assert!(solution.converged);
        assert_eq!(solution.iterations, 1);
        assert_relative_eq!(solution.charges[0], expected[0], epsilon = 1e-10);
        assert_relative_eq!(solution.charges[1], expected[1], epsilon = 1e-10);
    }

    #[test]
    fn test_charge_sum_constraint_enforced() {
        let design = [[1.0, 0.2], [0.5, 1.0], [0.3, 0.7]];
        let v = [0.8, 0.4, 0.3];
        let (h, f, _) = quadratic_form_from_design(&design, &v);

        let mut constraints = Constraints::new(2);
        constraints.add_charge_constraint(1.0);

        let solver = QpSolver::new().with_options(options_without_regularization());
        let solution = solver.solve(&h, &f, &constraints).unwrap();

        assert!(solution.converged);
        let total: f64 = solution.charges.iter().sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-8);
    }

    #[test]
    fn test_symmetry_constraint_forces_equal_charges() {
        // Deliberately asymmetric objective.
        let design = [[1.0, 0.1], [0.2, 1.0], [0.4, 0.6]];
        let v = [0.9, 0.1, 0.5];
        let (h, f, _) = quadratic_form_from_design(&design, &v);

        let mut constraints = Constraints::new(2);
        constraints.add_charge_constraint(0.4);
        constraints.add_symmetry_constraint(0, 1);

        let solution = QpSolver::new().solve(&h, &f, &constraints).unwrap();
        assert!(solution.converged);
        assert_relative_eq!(solution.charges[0], solution.charges[1], epsilon = 1e-8);
        assert_relative_eq!(solution.charges[0], 0.2, epsilon = 1e-8);
    }

    #[test]
    fn test_redundant_constraint_rows_survive_kkt() {
        let design = [[1.0, 0.0], [0.0, 1.0], [0.5, 0.5]];
        let v = [0.5, 0.5, 0.5];
        let (h, f, _) = quadratic_form_from_design(&design, &v);

        let mut constraints = Constraints::new(2);
        constraints.add_charge_constraint(1.0);
        constraints.add_symmetry_constraint(0, 1);
        // The same row twice: rank-deficient KKT, still solvable.
        constraints.add_symmetry_constraint(0, 1);

        let solution = QpSolver::new().solve(&h, &f, &constraints).unwrap();
        assert!(solution.converged);
        assert_relative_eq!(solution.charges[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(solution.charges[1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_objective_reported_against_unregularized_form() {
        // H = 2I, f = [-2, -2]: unconstrained optimum q = [1, 1] with
        // objective 0.5·qᵀHq + fᵀq = 2 − 4 = −2 regardless of λ used in the
        // solve itself (λ = 0 here so the optimum is exact).
        let h = Mat::from_fn(2, 2, |r, c| if r == c { 2.0 } else { 0.0 });
        let f = Col::from_fn(2, |_| -2.0);

        let solver = QpSolver::new().with_options(options_without_regularization());
        let solution = solver.solve(&h, &f, &Constraints::new(2)).unwrap();
        assert_relative_eq!(solution.objective_value, -2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_semidefinite_h_falls_back_without_error() {
        // A rank-1 H with λ = 0: Cholesky cannot succeed, and the
        // symmetric-indefinite fallback must still complete without raising.
        let h = Mat::from_fn(2, 2, |_, _| 2.0);
        let f = Col::from_fn(2, |_| -2.0);

        let solver = QpSolver::new().with_options(options_without_regularization());
        let solution = solver.solve(&h, &f, &Constraints::new(2)).unwrap();
        assert_eq!(solution.charges.len(), 2);
    }

    #[test]
    fn test_infeasible_constraints_report_non_convergence() {
        let h = Mat::from_fn(2, 2, |r, c| if r == c { 2.0 } else { 0.0 });
        let f = Col::from_fn(2, |_| 0.0);

        // Two mutually inconsistent charge-sum rows.
        let mut constraints = Constraints::new(2);
        constraints.add_charge_constraint(1.0);
        constraints.add_charge_constraint(-1.0);

        let solution = QpSolver::new().solve(&h, &f, &constraints).unwrap();
        // An infeasible system is a reported outcome, not a crash.
        assert!(!solution.converged);
    }
}
