#![allow(dead_code)]

use espfit::{Atom, EspGrid, GridPoint, Molecule};

/// Builds a molecule from `(element, position)` pairs; positions in Bohr.
pub fn build_molecule(atoms: &[(&str, [f64; 3])]) -> Molecule {
    let mut molecule = Molecule::new();
    for (element, position) in atoms {
        molecule.add_atom(Atom::new(*element, *position));
    }
    molecule
}

/// Deterministic, roughly uniform points on a sphere (golden-spiral layout).
pub fn sphere_points(center: [f64; 3], radius: f64, count: usize) -> Vec<[f64; 3]> {
    let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..count)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / count as f64;
            let ring = (1.0 - z * z).sqrt();
            let theta = golden_angle * i as f64;
            [
                center[0] + radius * ring * theta.cos(),
                center[1] + radius * ring * theta.sin(),
                center[2] + radius * z,
            ]
        })
        .collect()
}

/// Synthesizes the exact Coulomb potential of the given point charges at the
/// given probe positions, yielding a grid an exact fit can reproduce.
pub fn grid_from_point_charges(
    molecule: &Molecule,
    charges: &[f64],
    points: &[[f64; 3]],
) -> EspGrid {
    assert_eq!(molecule.num_atoms(), charges.len());
    let mut grid = EspGrid::new();
    for point in points {
        let mut potential = 0.0;
        for (atom, &q) in molecule.atoms().iter().zip(charges) {
            let dx = point[0] - atom.position[0];
            let dy = point[1] - atom.position[1];
            let dz = point[2] - atom.position[2];
            potential += q / (dx * dx + dy * dy + dz * dz).sqrt();
        }
        grid.add_point(GridPoint::new(*point, potential));
    }
    grid
}
