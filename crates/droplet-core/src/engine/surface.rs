use super::config::SurfaceSpec;
use crate::core::lattice::{LatticeError, Substrate, cubic_slab, graphene_sheet};
use tracing::debug;

/// Builds the substrate slab covering roughly `x × y` nm.
pub fn build_substrate(surface: &SurfaceSpec, x: f64, y: f64) -> Result<Substrate, LatticeError> {
    let substrate = match surface {
        SurfaceSpec::Graphene => graphene_sheet(x, y)?,
        SurfaceSpec::Custom { lattice, compound } => cubic_slab(lattice, compound, x, y)?,
    };
    debug!(
        molecules = substrate.component().len(),
        surface_height = substrate.surface_height(),
        "Built substrate."
    );
    Ok(substrate)
}
