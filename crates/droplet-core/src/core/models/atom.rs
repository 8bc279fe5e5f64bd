use crate::core::elements;
use nalgebra::{Point3, Vector3};

/// Represents a single atom of a molecule.
///
/// Atoms are plain values: a name as it appears in structure files, the element
/// symbol used for mass lookup, and a position in nanometres.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The name of the atom (e.g., "OW", "HW1", "C1").
    pub name: String,
    /// The element symbol (e.g., "O", "H", "Au").
    pub element: String,
    /// The 3D coordinates of the atom in nanometres.
    pub position: Point3<f64>,
}

impl Atom {
    /// Creates a new `Atom` with an explicit element symbol.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the atom.
    /// * `element` - The element symbol of the atom.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
        }
    }

    /// Creates a new `Atom`, inferring its element from the atom name.
    ///
    /// Names such as "OW", "HW1" or "Au" resolve to "O", "H" and "Au".
    pub fn from_name(name: &str, position: Point3<f64>) -> Self {
        Self::new(name, &elements::infer_element(name), position)
    }

    /// Returns a copy of this atom moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            position: self.position + offset,
            ..self.clone()
        }
    }

    /// Returns a copy of this atom at a new position.
    pub fn with_position(&self, position: Point3<f64>) -> Self {
        Self {
            position,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_atom_keeps_given_fields() {
        let atom = Atom::new("OW", "O", Point3::new(1.0, 2.0, 3.0));
        assert_eq!(atom.name, "OW");
        assert_eq!(atom.element, "O");
        assert_eq!(atom.position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn from_name_infers_element() {
        assert_eq!(Atom::from_name("HW1", Point3::origin()).element, "H");
        assert_eq!(Atom::from_name("Au", Point3::origin()).element, "Au");
        assert_eq!(Atom::from_name("C12", Point3::origin()).element, "C");
    }

    #[test]
    fn translated_returns_new_atom_and_leaves_original() {
        let atom = Atom::new("C", "C", Point3::new(0.0, 0.0, 0.0));
        let moved = atom.translated(&Vector3::new(0.1, 0.2, 0.3));
        assert_eq!(moved.position, Point3::new(0.1, 0.2, 0.3));
        assert_eq!(atom.position, Point3::origin());
        assert_eq!(moved.name, atom.name);
    }

    #[test]
    fn with_position_replaces_only_position() {
        let atom = Atom::new("Au", "Au", Point3::new(1.0, 1.0, 1.0));
        let placed = atom.with_position(Point3::new(2.0, 0.0, -1.0));
        assert_eq!(placed.position, Point3::new(2.0, 0.0, -1.0));
        assert_eq!(placed.element, "Au");
    }
}
