mod common;

use common::build_molecule;
use espfit::detect_equivalent_atoms;
use espfit::symmetry::DEFAULT_SYMMETRY_TOLERANCE;

/// Memberships as sets of sorted classes, for order-insensitive comparison.
fn normalized_classes(classes: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = classes
        .iter()
        .map(|class| {
            let mut c = class.clone();
            c.sort_unstable();
            c
        })
        .collect();
    out.sort();
    out
}

#[test]
fn test_hexagonal_ring_is_one_class() {
    let r = 2.6;
    let atoms: Vec<(&str, [f64; 3])> = (0..6)
        .map(|i| {
            let angle = std::f64::consts::PI * f64::from(i) / 3.0;
            ("C", [r * angle.cos(), r * angle.sin(), 0.0])
        })
        .collect();
    let molecule = build_molecule(&atoms);

    let classes = detect_equivalent_atoms(&molecule, DEFAULT_SYMMETRY_TOLERANCE);
    assert_eq!(classes, vec![vec![0, 1, 2, 3, 4, 5]]);
}

#[test]
fn test_permuting_atom_order_preserves_memberships() {
    let s = 1.19;
    let original = [
        ("C", [0.0, 0.0, 0.0]),
        ("H", [s, s, s]),
        ("H", [s, -s, -s]),
        ("H", [-s, s, -s]),
        ("H", [-s, -s, s]),
    ];
    // Position 'permutation[i]' of the original atom list moves to slot i.
    let permutation = [3usize, 0, 4, 1, 2];
    let permuted: Vec<(&str, [f64; 3])> = permutation.iter().map(|&p| original[p]).collect();

    let classes_original =
        detect_equivalent_atoms(&build_molecule(&original), DEFAULT_SYMMETRY_TOLERANCE);
    let classes_permuted =
        detect_equivalent_atoms(&build_molecule(&permuted), DEFAULT_SYMMETRY_TOLERANCE);

    // Relabel the permuted result back into original indices.
    let relabeled: Vec<Vec<usize>> = classes_permuted
        .iter()
        .map(|class| class.iter().map(|&i| permutation[i]).collect())
        .collect();

    assert_eq!(
        normalized_classes(&classes_original),
        normalized_classes(&relabeled)
    );
}

#[test]
fn test_distinct_environments_yield_no_classes() {
    // A bent heteronuclear chain: every atom sees a different distance
    // profile.
    let molecule = build_molecule(&[
        ("H", [0.0, 0.0, 0.0]),
        ("C", [2.0, 0.0, 0.0]),
        ("N", [4.2, 0.8, 0.0]),
    ]);
    let classes = detect_equivalent_atoms(&molecule, DEFAULT_SYMMETRY_TOLERANCE);
    assert!(classes.is_empty());
}

#[test]
fn test_two_separate_classes() {
    // A planar X2Y2 arrangement: two equivalent "O"s on the x axis, two
    // equivalent "H"s on the y axis.
    let molecule = build_molecule(&[
        ("O", [2.0, 0.0, 0.0]),
        ("O", [-2.0, 0.0, 0.0]),
        ("H", [0.0, 1.2, 0.0]),
        ("H", [0.0, -1.2, 0.0]),
    ]);
    let classes = detect_equivalent_atoms(&molecule, DEFAULT_SYMMETRY_TOLERANCE);
    assert_eq!(classes, vec![vec![0, 1], vec![2, 3]]);
}
