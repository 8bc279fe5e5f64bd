use super::atom::Atom;
use super::topology::{Bond, BondOrder};
use crate::core::elements::{self, UnknownElementError};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Bond ({atom1}, {atom2}) references an atom outside molecule '{molecule}' ({len} atoms)")]
    BondOutOfRange {
        molecule: String,
        atom1: usize,
        atom2: usize,
        len: usize,
    },
    #[error("Bond in molecule '{molecule}' connects atom {atom} to itself")]
    SelfBond { molecule: String, atom: usize },
}

/// A rigid group of atoms that is moved, copied and removed as a unit.
///
/// The molecule name doubles as the residue name in structure files
/// (e.g. "H2O", "HEX", "C"). Bonds refer to atoms by their index in
/// [`Molecule::atoms`].
#[derive(Debug, Clone, PartialEq)]
pub struct Molecule {
    name: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Molecule {
    /// Creates a molecule from its atoms and bonds, checking that every bond
    /// refers to two distinct atoms of this molecule.
    ///
    /// # Errors
    ///
    /// Returns [`MoleculeError`] if a bond index is out of range or a bond is a self-loop.
    pub fn new(name: &str, atoms: Vec<Atom>, bonds: Vec<Bond>) -> Result<Self, MoleculeError> {
        for bond in &bonds {
            if bond.atom1 >= atoms.len() || bond.atom2 >= atoms.len() {
                return Err(MoleculeError::BondOutOfRange {
                    molecule: name.to_string(),
                    atom1: bond.atom1,
                    atom2: bond.atom2,
                    len: atoms.len(),
                });
            }
            if bond.atom1 == bond.atom2 {
                return Err(MoleculeError::SelfBond {
                    molecule: name.to_string(),
                    atom: bond.atom1,
                });
            }
        }
        Ok(Self {
            name: name.to_string(),
            atoms,
            bonds,
        })
    }

    /// Creates a molecule from bonds that are known to be valid, such as those
    /// of a built-in template.
    pub(crate) fn from_parts(name: &str, atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        debug_assert!(
            bonds
                .iter()
                .all(|b| b.atom1 < atoms.len() && b.atom2 < atoms.len() && b.atom1 != b.atom2)
        );
        Self {
            name: name.to_string(),
            atoms,
            bonds,
        }
    }

    /// Creates an unbonded molecule.
    pub fn from_atoms(name: &str, atoms: Vec<Atom>) -> Self {
        Self {
            name: name.to_string(),
            atoms,
            bonds: Vec::new(),
        }
    }

    /// Creates a one-atom molecule at the origin, the usual lattice compound.
    pub fn single_atom(name: &str, element: &str) -> Self {
        Self::from_atoms(name, vec![Atom::new(name, element, Point3::origin())])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.atoms.iter().map(|a| &a.position)
    }

    /// Returns the bond order between two atoms, if they are bonded.
    pub fn bond_between(&self, atom1: usize, atom2: usize) -> Option<BondOrder> {
        self.bonds
            .iter()
            .find(|b| b.partner(atom1) == Some(atom2))
            .map(|b| b.order)
    }

    /// Geometric centre of the atoms, or `None` for an empty molecule.
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.atoms.is_empty() {
            return None;
        }
        let sum = self
            .positions()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / self.atoms.len() as f64))
    }

    pub fn min_z(&self) -> Option<f64> {
        self.positions().map(|p| p.z).reduce(f64::min)
    }

    pub fn max_z(&self) -> Option<f64> {
        self.positions().map(|p| p.z).reduce(f64::max)
    }

    /// Largest distance from the centroid to any atom. Invariant under rotation.
    pub fn bounding_radius(&self) -> f64 {
        let Some(center) = self.centroid() else {
            return 0.0;
        };
        self.positions()
            .map(|p| (p - center).norm())
            .fold(0.0, f64::max)
    }

    /// Molar mass in g/mol (amu), summed from the element table.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownElementError`] for the first atom whose element has no tabulated mass.
    pub fn mass(&self) -> Result<f64, UnknownElementError> {
        self.atoms
            .iter()
            .map(|a| elements::atomic_mass(&a.element))
            .sum()
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            name: self.name.clone(),
            atoms: self.atoms.iter().map(|a| a.translated(offset)).collect(),
            bonds: self.bonds.clone(),
        }
    }

    /// Returns a copy with every atom replaced by `f(atom)`; bonds are kept.
    pub fn map_atoms(&self, f: impl FnMut(&Atom) -> Atom) -> Self {
        Self {
            name: self.name.clone(),
            atoms: self.atoms.iter().map(f).collect(),
            bonds: self.bonds.clone(),
        }
    }

    pub fn rotated_about_centroid(&self, rotation: &UnitQuaternion<f64>) -> Self {
        let Some(center) = self.centroid() else {
            return self.clone();
        };
        Self {
            name: self.name.clone(),
            atoms: self
                .atoms
                .iter()
                .map(|a| a.with_position(center + rotation * (a.position - center)))
                .collect(),
            bonds: self.bonds.clone(),
        }
    }

    /// Returns a copy whose centroid sits at `target`.
    pub fn placed_at(&self, target: &Point3<f64>) -> Self {
        match self.centroid() {
            Some(center) => self.translated(&(target - center)),
            None => self.clone(),
        }
    }

    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }
}
