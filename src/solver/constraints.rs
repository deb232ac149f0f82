//! Assembly of the dense equality-constraint system `A·q = b`.
//!
//! Two row kinds exist: the charge-sum row tying all charges to the total
//! molecular charge, and pairwise symmetry rows tying two equivalent atoms to
//! the same charge. Rows are appended, never removed. No rank checking is
//! performed; redundant rows are legal and survive the KKT solve unharmed.

use faer::{Col, Mat};

/// A dense equality-constraint system over a fixed number of variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    num_vars: usize,
    rows: Vec<Vec<f64>>,
    targets: Vec<f64>,
}

impl Constraints {
    /// Creates an empty system over `num_vars` variables (one per atom).
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            rows: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// Appends the charge-sum row: all coefficients one, target equal to the
    /// total molecular charge.
    pub fn add_charge_constraint(&mut self, total_charge: f64) {
        self.rows.push(vec![1.0; self.num_vars]);
        self.targets.push(total_charge);
    }

    /// Appends a symmetry row forcing variables `i` and `j` to be equal:
    /// +1 at `i`, −1 at `j`, target zero.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range or `i == j`.
    pub fn add_symmetry_constraint(&mut self, i: usize, j: usize) {
        assert!(
            i < self.num_vars && j < self.num_vars && i != j,
            "symmetry constraint indices must be distinct and in range"
        );
        let mut row = vec![0.0; self.num_vars];
        row[i] = 1.0;
        row[j] = -1.0;
        self.rows.push(row);
        self.targets.push(0.0);
    }

    /// The constraint matrix `A` as a dense faer matrix (m × n).
    pub fn matrix(&self) -> Mat<f64> {
        Mat::from_fn(self.rows.len(), self.num_vars, |r, c| self.rows[r][c])
    }

    /// The target vector `b` (length m).
    pub fn targets(&self) -> Col<f64> {
        Col::from_fn(self.targets.len(), |r| self.targets[r])
    }

    /// Euclidean norm of `A·q − b`; zero when the system has no rows.
    pub fn residual_norm(&self, q: &[f64]) -> f64 {
        self.rows
            .iter()
            .zip(&self.targets)
            .map(|(row, target)| {
                let lhs: f64 = row.iter().zip(q).map(|(a, x)| a * x).sum();
                let r = lhs - target;
                r * r
            })
            .sum::<f64>()
            .sqrt()
    }

    /// True when the residual norm is within `tol`; trivially true with no
    /// rows. An exactly satisfied system passes even at `tol = 0`.
    pub fn is_satisfied(&self, q: &[f64], tol: f64) -> bool {
        if self.rows.is_empty() {
            return true;
        }
        self.residual_norm(q) <= tol
    }
}
