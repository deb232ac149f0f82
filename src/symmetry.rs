//! Detection of symmetry-equivalent atoms from pairwise-distance environments.
//!
//! Two atoms of the same element are treated as equivalent when their sorted
//! distances to every other atom agree within a tolerance. This is a
//! necessary-but-not-sufficient graph-invariant test: it can conflate atoms in
//! rare degenerate geometries, but it is deterministic, parameter-free beyond
//! the tolerance, and cheap (O(n³)) — which is what charge fitting needs,
//! since a spurious equality constraint merely averages two nearly equal
//! charges.

use crate::math::distance;
use crate::types::Molecule;

/// Default matching tolerance for sorted distance profiles, in Bohr.
pub const DEFAULT_SYMMETRY_TOLERANCE: f64 = 0.1;

/// Partitions the molecule's atoms into equivalence classes.
///
/// Returns only classes of size ≥ 2 (singleton atoms are unconstrained and
/// omitted). Classes are in ascending order of their earliest member index,
/// and members within a class are ascending. Assignment is greedy in index
/// order, so the result is deterministic for a given atom ordering.
pub fn detect_equivalent_atoms(molecule: &Molecule, tolerance: f64) -> Vec<Vec<usize>> {
    let n = molecule.num_atoms();
    let mut assigned = vec![false; n];
    let mut classes = Vec::new();

    for i in 0..n {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let mut class = vec![i];

        for j in (i + 1)..n {
            if assigned[j] {
                continue;
            }
            if molecule.atom(i).element != molecule.atom(j).element {
                continue;
            }
            if equivalent_environment(molecule, i, j, tolerance) {
                assigned[j] = true;
                class.push(j);
            }
        }

        if class.len() > 1 {
            classes.push(class);
        }
    }

    classes
}

/// Compares the sorted multisets of distances from atoms `i` and `j` to every
/// atom other than the pair itself.
fn equivalent_environment(molecule: &Molecule, i: usize, j: usize, tolerance: f64) -> bool {
    let n = molecule.num_atoms();
    let pos_i = molecule.atom(i).position;
    let pos_j = molecule.atom(j).position;

    let mut dist_i = Vec::with_capacity(n.saturating_sub(2));
    let mut dist_j = Vec::with_capacity(n.saturating_sub(2));

    for k in 0..n {
        if k == i || k == j {
            continue;
        }
        let pos_k = molecule.atom(k).position;
        dist_i.push(distance(&pos_i, &pos_k));
        dist_j.push(distance(&pos_j, &pos_k));
    }

    dist_i.sort_by(f64::total_cmp);
    dist_j.sort_by(f64::total_cmp);

    dist_i
        .iter()
        .zip(&dist_j)
        .all(|(di, dj)| (di - dj).abs() <= tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Atom;

    fn water() -> Molecule {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new("O", [0.0, 0.0, 0.0]));
        mol.add_atom(Atom::new("H", [1.43, 1.11, 0.0]));
        mol.add_atom(Atom::new("H", [-1.43, 1.11, 0.0]));
        mol
    }

    fn methane() -> Molecule {
        let s = 1.19;
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new("C", [0.0, 0.0, 0.0]));
        mol.add_atom(Atom::new("H", [s, s, s]));
        mol.add_atom(Atom::new("H", [s, -s, -s]));
        mol.add_atom(Atom::new("H", [-s, s, -s]));
        mol.add_atom(Atom::new("H", [-s, -s, s]));
        mol
    }

    #[test]
    fn test_water_hydrogens_equivalent() {
        let classes = detect_equivalent_atoms(&water(), DEFAULT_SYMMETRY_TOLERANCE);
        assert_eq!(classes, vec![vec![1, 2]]);
    }

    #[test]
    fn test_methane_hydrogens_equivalent() {
        let classes = detect_equivalent_atoms(&methane(), DEFAULT_SYMMETRY_TOLERANCE);
        assert_eq!(classes, vec![vec![1, 2, 3, 4]]);
    }

    #[test]
    fn test_different_elements_never_equivalent() {
        // Symmetric positions but mixed elements.
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new("O", [0.0, 0.0, 0.0]));
        mol.add_atom(Atom::new("H", [1.8, 0.0, 0.0]));
        mol.add_atom(Atom::new("F", [-1.8, 0.0, 0.0]));
        let classes = detect_equivalent_atoms(&mol, DEFAULT_SYMMETRY_TOLERANCE);
        assert!(classes.is_empty());
    }

    #[test]
    fn test_tolerance_separates_distorted_pair() {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new("O", [0.0, 0.0, 0.0]));
        mol.add_atom(Atom::new("H", [1.8, 0.0, 0.0]));
        mol.add_atom(Atom::new("H", [-2.5, 0.0, 0.0]));
        assert!(detect_equivalent_atoms(&mol, 0.1).is_empty());
        // A generous tolerance reunites them.
        assert_eq!(detect_equivalent_atoms(&mol, 1.0), vec![vec![1, 2]]);
    }

    #[test]
    fn test_singletons_omitted() {
        let classes = detect_equivalent_atoms(&water(), DEFAULT_SYMMETRY_TOLERANCE);
        assert!(classes.iter().all(|class| class.len() >= 2));
    }

    #[test]
    fn test_single_atom_molecule() {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new("He", [0.0, 0.0, 0.0]));
        assert!(detect_equivalent_atoms(&mol, DEFAULT_SYMMETRY_TOLERANCE).is_empty());
    }
}
