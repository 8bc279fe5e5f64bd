use super::atom::Atom;
use super::molecule::Molecule;
use nalgebra::{Point3, Vector3};

/// A named, ordered collection of molecules, such as the substrate slab ("LAT")
/// or the fluid droplet ("FLD").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    name: String,
    molecules: Vec<Molecule>,
}

impl Component {
    pub fn new(name: &str, molecules: Vec<Molecule>) -> Self {
        Self {
            name: name.to_string(),
            molecules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    pub fn into_molecules(self) -> Vec<Molecule> {
        self.molecules
    }

    pub fn len(&self) -> usize {
        self.molecules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.molecules.is_empty()
    }

    pub fn atom_count(&self) -> usize {
        self.molecules.iter().map(Molecule::len).sum()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.molecules.iter().flat_map(|m| m.atoms().iter())
    }

    pub fn min_z(&self) -> Option<f64> {
        self.atoms().map(|a| a.position.z).reduce(f64::min)
    }

    pub fn max_z(&self) -> Option<f64> {
        self.atoms().map(|a| a.position.z).reduce(f64::max)
    }

    /// Axis-aligned bounding box as `(min, max)` corners.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut atoms = self.atoms();
        let first = atoms.next()?.position;
        Some(atoms.fold((first, first), |(lo, hi), a| {
            (lo.inf(&a.position), hi.sup(&a.position))
        }))
    }

    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            name: self.name.clone(),
            molecules: self.molecules.iter().map(|m| m.translated(offset)).collect(),
        }
    }

    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            molecules: self.molecules.clone(),
        }
    }

    /// Returns a component holding only the molecules for which `keep` is true,
    /// in their original order.
    pub fn retain(&self, mut keep: impl FnMut(&Molecule) -> bool) -> Self {
        Self {
            name: self.name.clone(),
            molecules: self.molecules.iter().filter(|m| keep(*m)).cloned().collect(),
        }
    }
}
