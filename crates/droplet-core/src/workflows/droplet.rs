use crate::core::fill::{Sphere, fill_sphere};
use crate::core::models::assembly::Assembly;
use crate::engine::cap::{CarveSummary, carve_cap};
use crate::engine::config::DropletConfig;
use crate::engine::error::EngineError;
use crate::engine::placement::{assemble, seat_on_surface};
use crate::engine::progress::{Phase, ProgressReporter};
use crate::engine::surface::build_substrate;
use nalgebra::Point3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct DropletResult {
    pub assembly: Assembly,
    pub carve: CarveSummary,
    pub cap_height: f64,
}

/// Builds a droplet on its substrate.
///
/// The substrate is generated first, a sphere of radius `r` centred over the
/// middle of the slab (spanning `z ∈ [0, 2r]`) is filled with fluid, the cap
/// is carved out of it, and the droplet is lowered onto the surface.
///
/// # Errors
///
/// Returns [`EngineError`] if the substrate cannot be tiled or the sphere
/// cannot hold the requested molecules.
#[instrument(skip_all, name = "droplet_workflow")]
pub fn run(config: &DropletConfig, reporter: &ProgressReporter) -> Result<DropletResult, EngineError> {
    let radius = config.radius();
    info!(
        radius,
        angle = config.angle(),
        x = config.x(),
        y = config.y(),
        fluids = config.fluids().len(),
        "Starting droplet build."
    );

    let substrate = reporter.phase(Phase::Substrate, || {
        build_substrate(config.surface(), config.x(), config.y())
    })?;
    let surface_height = substrate.surface_height();
    let lateral = *substrate.periodicity();
    info!(
        atoms = substrate.component().atom_count(),
        px = lateral.x,
        py = lateral.y,
        surface_height,
        "Substrate ready."
    );

    let sphere = Sphere::new(Point3::new(lateral.x / 2.0, lateral.y / 2.0, radius), radius);
    let bulk = reporter.phase(Phase::Fill, || {
        let mut rng = StdRng::seed_from_u64(config.seed());
        fill_sphere(config.fluids(), &sphere, &mut rng)
    })?;
    info!(molecules = bulk.len(), "Sphere filled.");

    let cap_height = config.cap_height();
    let (cap, carve) = reporter.phase(Phase::Carve, || carve_cap(&bulk, radius, cap_height));
    info!(
        cap_height,
        retained = carve.retained,
        removed = carve.removed,
        "Cap carved."
    );
    if carve.retained == 0 {
        warn!("No fluid molecules survived carving; the droplet is empty.");
    }
    reporter.message(format!(
        "Retained {} of {} fluid molecules",
        carve.retained, carve.initial
    ));

    let assembly = reporter.phase(Phase::Assemble, || {
        let droplet = seat_on_surface(&cap, surface_height);
        assemble(substrate, droplet, radius)
    });
    info!(
        atoms = assembly.atom_count(),
        box_z = assembly.periodicity().z,
        "Droplet build complete."
    );

    Ok(DropletResult {
        assembly,
        carve,
        cap_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::templates::water;
    use crate::engine::config::DropletConfigBuilder;
    use crate::engine::progress::Progress;
    use std::sync::{Arc, Mutex};

    #[test]
    fn reports_every_phase_in_order() {
        let config = DropletConfigBuilder::new()
            .radius(0.8)
            .fluid(water())
            .density(997.0)
            .build()
            .unwrap();
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&phases);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::PhaseStart { phase } = event {
                sink.lock().unwrap().push(phase);
            }
        }));

        let result = run(&config, &reporter).unwrap();

        assert_eq!(*phases.lock().unwrap(), Phase::ALL.to_vec());
        assert_eq!(result.assembly.fluid().len(), result.carve.retained);
        assert!((result.cap_height - 0.8).abs() < 1e-12);
    }
}
