use super::component::Component;
use nalgebra::Vector3;

/// Residue-group name given to the substrate component.
pub const SUBSTRATE_NAME: &str = "LAT";
/// Residue-group name given to the fluid component.
pub const FLUID_NAME: &str = "FLD";

/// The finished two-body system: a substrate slab and the droplet resting on it.
///
/// An assembly always holds exactly two components, substrate first and fluid
/// second, together with the periodic box lengths and the height of the topmost
/// substrate atom.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    substrate: Component,
    fluid: Component,
    periodicity: Vector3<f64>,
    surface_height: f64,
}

impl Assembly {
    pub fn new(
        substrate: Component,
        fluid: Component,
        periodicity: Vector3<f64>,
        surface_height: f64,
    ) -> Self {
        Self {
            substrate,
            fluid,
            periodicity,
            surface_height,
        }
    }

    pub fn substrate(&self) -> &Component {
        &self.substrate
    }

    pub fn fluid(&self) -> &Component {
        &self.fluid
    }

    /// Both components in output order.
    pub fn components(&self) -> [&Component; 2] {
        [&self.substrate, &self.fluid]
    }

    /// Box lengths in x, y and z (nm).
    pub fn periodicity(&self) -> &Vector3<f64> {
        &self.periodicity
    }

    pub fn surface_height(&self) -> f64 {
        self.surface_height
    }

    pub fn molecule_count(&self) -> usize {
        self.substrate.len() + self.fluid.len()
    }

    pub fn atom_count(&self) -> usize {
        self.substrate.atom_count() + self.fluid.atom_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::molecule::Molecule;

    #[test]
    fn components_are_ordered_substrate_then_fluid() {
        let substrate = Component::new(SUBSTRATE_NAME, vec![Molecule::single_atom("C", "C")]);
        let fluid = Component::new(FLUID_NAME, Vec::new());
        let assembly = Assembly::new(substrate, fluid, Vector3::new(1.0, 2.0, 3.0), 0.67);

        let [first, second] = assembly.components();
        assert_eq!(first.name(), "LAT");
        assert_eq!(second.name(), "FLD");
        assert_eq!(assembly.molecule_count(), 1);
        assert_eq!(assembly.atom_count(), 1);
        assert_eq!(assembly.periodicity().z, 3.0);
        assert_eq!(assembly.surface_height(), 0.67);
    }
}
