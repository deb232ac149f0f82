//! Core data types of the espfit library: atoms, molecules, and ESP grids.
//!
//! These are plain owned containers with a small accessor surface. All stored
//! lengths are in Bohr and all stored potentials in Hartree/e; functions that
//! ingest data in other units convert at their own boundary and document it.

use crate::math::constants::AU_DIPOLE_TO_DEBYE;

/// A single atom: element symbol, position, and the partial charge being
/// solved for.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Element symbol as read from the input geometry (e.g. "C", "Cl").
    pub element: String,
    /// Cartesian position in Bohr.
    pub position: [f64; 3],
    /// Fitted partial charge in units of e; zero until a fit writes it.
    pub charge: f64,
    /// Stable 0-based index equal to this atom's position in the owning
    /// molecule's atom sequence.
    pub index: usize,
}

impl Atom {
    /// Creates an atom with zero charge and a placeholder index; the index is
    /// assigned when the atom is added to a [`Molecule`].
    pub fn new(element: impl Into<String>, position: [f64; 3]) -> Self {
        Self {
            element: element.into(),
            position,
            charge: 0.0,
            index: 0,
        }
    }

    /// Atomic number derived from the element symbol, or `None` for symbols
    /// outside the supported table.
    pub fn atomic_number(&self) -> Option<u8> {
        element_to_atomic_number(&self.element)
    }
}

/// An ordered collection of atoms plus the externally supplied total-charge
/// constraint target.
///
/// Atoms are owned exclusively; after construction the only mutation is
/// [`Molecule::set_charges`] once a fit has produced a solution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    atoms: Vec<Atom>,
    total_charge: f64,
}

impl Molecule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an atom, assigning it the next stable index.
    pub fn add_atom(&mut self, mut atom: Atom) {
        atom.index = self.atoms.len();
        self.atoms.push(atom);
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atom(&self, i: usize) -> &Atom {
        &self.atoms[i]
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn set_total_charge(&mut self, charge: f64) {
        self.total_charge = charge;
    }

    pub fn total_charge(&self) -> f64 {
        self.total_charge
    }

    /// All atom positions, in index order.
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// Current charges, in index order.
    pub fn charges(&self) -> Vec<f64> {
        self.atoms.iter().map(|a| a.charge).collect()
    }

    /// Writes a fitted charge vector back onto the atoms.
    ///
    /// # Panics
    ///
    /// Panics if `charges` does not have exactly one entry per atom.
    pub fn set_charges(&mut self, charges: &[f64]) {
        assert_eq!(
            charges.len(),
            self.atoms.len(),
            "charge vector length must equal atom count"
        );
        for (atom, &q) in self.atoms.iter_mut().zip(charges) {
            atom.charge = q;
        }
    }

    /// True if any atom is at least as electronegative as the given atomic
    /// number threshold.
    pub fn has_atomic_number_at_least(&self, z_min: u8) -> bool {
        self.atoms
            .iter()
            .filter_map(Atom::atomic_number)
            .any(|z| z >= z_min)
    }

    /// Center of mass in Bohr, with the atomic number standing in for the
    /// isotope-averaged mass. Atoms with unknown symbols contribute nothing.
    pub fn center_of_mass(&self) -> [f64; 3] {
        let mut com = [0.0; 3];
        let mut total_mass = 0.0;
        for atom in &self.atoms {
            let mass = f64::from(atom.atomic_number().unwrap_or(0));
            for d in 0..3 {
                com[d] += mass * atom.position[d];
            }
            total_mass += mass;
        }
        if total_mass > 0.0 {
            for c in &mut com {
                *c /= total_mass;
            }
        }
        com
    }

    /// Magnitude of the dipole moment of the current charges, in Debye.
    pub fn dipole_moment(&self) -> f64 {
        let mut dipole = [0.0; 3];
        for atom in &self.atoms {
            for d in 0..3 {
                dipole[d] += atom.charge * atom.position[d];
            }
        }
        let norm = (dipole[0] * dipole[0] + dipole[1] * dipole[1] + dipole[2] * dipole[2]).sqrt();
        norm * AU_DIPOLE_TO_DEBYE
    }
}

/// One reference-potential sample: position and potential value.
///
/// Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPoint {
    /// Sample position in Bohr.
    pub position: [f64; 3],
    /// Reference electrostatic potential in Hartree/e.
    pub potential: f64,
}

impl GridPoint {
    pub fn new(position: [f64; 3], potential: f64) -> Self {
        Self {
            position,
            potential,
        }
    }
}

/// An ordered set of ESP samples.
///
/// Order is irrelevant to the fit itself but stable, so repeated runs over
/// the same input produce identical output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EspGrid {
    points: Vec<GridPoint>,
}

impl EspGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, point: GridPoint) {
        self.points.push(point);
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, i: usize) -> &GridPoint {
        &self.points[i]
    }

    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// All sample positions, in storage order.
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// All reference potentials, in storage order.
    pub fn potentials(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.potential).collect()
    }

    pub fn min_potential(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.potential)
            .fold(f64::INFINITY, f64::min)
    }

    pub fn max_potential(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.potential)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Converts an element symbol (case-sensitive, e.g. "Cl") to its atomic
/// number. Covers the elements that occur in ESP fitting practice; returns
/// `None` for anything else.
pub fn element_to_atomic_number(symbol: &str) -> Option<u8> {
    match symbol {
        "H" => Some(1),
        "He" => Some(2),
        "Li" => Some(3),
        "Be" => Some(4),
        "B" => Some(5),
        "C" => Some(6),
        "N" => Some(7),
        "O" => Some(8),
        "F" => Some(9),
        "Ne" => Some(10),
        "Na" => Some(11),
        "Mg" => Some(12),
        "Al" => Some(13),
        "Si" => Some(14),
        "P" => Some(15),
        "S" => Some(16),
        "Cl" => Some(17),
        "Ar" => Some(18),
        "K" => Some(19),
        "Ca" => Some(20),
        "Ti" => Some(22),
        "Cr" => Some(24),
        "Mn" => Some(25),
        "Fe" => Some(26),
        "Co" => Some(27),
        "Ni" => Some(28),
        "Cu" => Some(29),
        "Zn" => Some(30),
        "Ga" => Some(31),
        "Ge" => Some(32),
        "As" => Some(33),
        "Se" => Some(34),
        "Br" => Some(35),
        "Kr" => Some(36),
        "Ru" => Some(44),
        "Rh" => Some(45),
        "Pd" => Some(46),
        "Ag" => Some(47),
        "Cd" => Some(48),
        "Sn" => Some(50),
        "Sb" => Some(51),
        "Te" => Some(52),
        "I" => Some(53),
        "Xe" => Some(54),
        "Pt" => Some(78),
        "Au" => Some(79),
        "Hg" => Some(80),
        "Pb" => Some(82),
        _ => None,
    }
}
