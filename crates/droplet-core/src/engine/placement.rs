use crate::core::lattice::Substrate;
use crate::core::models::assembly::Assembly;
use crate::core::models::component::Component;
use nalgebra::Vector3;

/// Gap (nm) between the topmost substrate atom and the lowest fluid atom.
pub const SURFACE_CLEARANCE: f64 = 0.3;
/// Box height as a multiple of the droplet radius.
pub const VACUUM_FACTOR: f64 = 5.0;

/// Moves the carved droplet so that its lowest atom sits
/// [`SURFACE_CLEARANCE`] above `surface_height`. Only z changes.
pub fn seat_on_surface(fluid: &Component, surface_height: f64) -> Component {
    match fluid.min_z() {
        Some(min_z) => fluid.translated(&Vector3::new(
            0.0,
            0.0,
            surface_height + SURFACE_CLEARANCE - min_z,
        )),
        None => fluid.clone(),
    }
}

/// Combines substrate and droplet into the final periodic system.
///
/// The box keeps the substrate's lateral periodicity and is
/// `VACUUM_FACTOR × radius` tall.
pub fn assemble(substrate: Substrate, fluid: Component, radius: f64) -> Assembly {
    let surface_height = substrate.surface_height();
    let (component, lateral) = substrate.into_parts();
    let periodicity = Vector3::new(lateral.x, lateral.y, radius * VACUUM_FACTOR);
    Assembly::new(component, fluid, periodicity, surface_height)
}
