use crate::cli::HeightArgs;
use crate::error::Result;
use dropletbuilder::engine::cap::{cap_cutoff, cap_height};
use dropletbuilder::engine::config::{DEFAULT_ANGLE, DEFAULT_RADIUS, ValidationError};
use tracing::info;

/// Cap height and carve plane for a radius and contact angle.
fn cap_geometry(radius: f64, angle: f64) -> Result<(f64, f64)> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ValidationError::InvalidRadius(radius).into());
    }
    if !(angle > 0.0 && angle <= 180.0) {
        return Err(ValidationError::InvalidAngle(angle).into());
    }
    let height = cap_height(radius, angle);
    Ok((height, cap_cutoff(radius, height)))
}

pub fn run(args: HeightArgs) -> Result<()> {
    let radius = args.radius.unwrap_or(DEFAULT_RADIUS);
    let angle = args.angle.unwrap_or(DEFAULT_ANGLE);
    let (height, cutoff) = cap_geometry(radius, angle)?;
    info!(radius, angle, height, cutoff, "Computed cap geometry.");

    println!("Radius:        {:.4} nm", radius);
    println!("Contact angle: {:.2}°", angle);
    println!("Cap height:    {:.4} nm", height);
    println!("Carve plane:   z = {:.4} nm", cutoff);
    Ok(())
}
