use crate::core::fill::{FillAmount, FluidSpecies};
use crate::core::lattice::{CUBIC_SLAB_THICKNESS, Lattice};
use crate::core::models::molecule::Molecule;
use super::cap::cap_height;
use thiserror::Error;

/// Default droplet radius (nm).
pub const DEFAULT_RADIUS: f64 = 2.0;
/// Default contact angle (degrees).
pub const DEFAULT_ANGLE: f64 = 90.0;
/// Default seed for the sphere filler.
pub const DEFAULT_SEED: u64 = 12345;
/// Lateral box edges must be at least this many radii long.
pub const MIN_DIMENSION_RADII: f64 = 4.0;
/// Largest accepted lateral box edge (nm).
pub const MAX_DIMENSION: f64 = 100.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ValidationError {
    #[error("No fluid specified: at least one fluid template is required")]
    MissingFluid,
    #[error("No density or count specified for fluid '{fluid}'")]
    MissingDensity { fluid: String },
    #[error("{amounts} densities or counts given for only {fluids} fluids")]
    FluidDensityMismatch { fluids: usize, amounts: usize },
    #[error("Radius must be a positive number of nm, got {0}")]
    InvalidRadius(f64),
    #[error("Contact angle must lie in (0, 180] degrees, got {0}")]
    InvalidAngle(f64),
    #[error("Fluid '{fluid}' needs a positive density or molecule count")]
    InvalidDensity { fluid: String },
    #[error("Dimension {axis} = {value} nm is smaller than 4 × radius ({minimum} nm)")]
    DimensionTooSmall { axis: char, value: f64, minimum: f64 },
    #[error("Dimension {axis} = {value} nm exceeds the maximum of {maximum} nm")]
    DimensionTooLarge { axis: char, value: f64, maximum: f64 },
    #[error("A custom lattice requires a lattice compound")]
    MissingLatticeCompound,
    #[error("Only cubic lattices are supported for custom substrates, got angles {angles:?}")]
    UnsupportedLatticeGeometry { angles: [f64; 3] },
    #[error("Lattice compound '{compound}' given without a custom lattice")]
    UnexpectedLatticeCompound { compound: String },
    #[error("Lattice compound '{compound}' does not appear in the lattice basis")]
    LatticeCompoundNotInBasis { compound: String },
    #[error("Lattice basis also lists {others:?}, but only '{compound}' can be placed")]
    ExtraBasisSpecies { compound: String, others: Vec<String> },
    #[error("Lattice spacing must be positive, got {spacing:?}")]
    InvalidLatticeSpacing { spacing: [f64; 3] },
    #[error("Lattice spacing {spacing} nm along {axis} does not fit in {extent} nm")]
    LatticeCellTooLarge { axis: char, spacing: f64, extent: f64 },
}

/// The crystalline surface the droplet rests on.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceSpec {
    /// Three AA-stacked graphene layers.
    Graphene,
    /// A cubic lattice populated with a single compound.
    Custom { lattice: Lattice, compound: Molecule },
}

/// A validated droplet configuration. Only obtainable through
/// [`DropletConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct DropletConfig {
    radius: f64,
    angle: f64,
    x: f64,
    y: f64,
    surface: SurfaceSpec,
    fluids: Vec<FluidSpecies>,
    seed: u64,
}

impl DropletConfig {
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Requested lateral x extent (nm).
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Requested lateral y extent (nm).
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn surface(&self) -> &SurfaceSpec {
        &self.surface
    }

    pub fn fluids(&self) -> &[FluidSpecies] {
        &self.fluids
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn cap_height(&self) -> f64 {
        cap_height(self.radius, self.angle)
    }
}

/// Builder for [`DropletConfig`].
///
/// Fluids and their amounts are paired by position: the n-th call to
/// [`density`](Self::density) or [`count`](Self::count) belongs to the n-th
/// call to [`fluid`](Self::fluid).
#[derive(Default)]
pub struct DropletConfigBuilder {
    radius: Option<f64>,
    angle: Option<f64>,
    x: Option<f64>,
    y: Option<f64>,
    fluids: Vec<Molecule>,
    amounts: Vec<FillAmount>,
    lattice: Option<Lattice>,
    lattice_compound: Option<Molecule>,
    seed: Option<u64>,
}

impl DropletConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }
    pub fn x(mut self, x: f64) -> Self {
        self.x = Some(x);
        self
    }
    pub fn y(mut self, y: f64) -> Self {
        self.y = Some(y);
        self
    }
    pub fn fluid(mut self, template: Molecule) -> Self {
        self.fluids.push(template);
        self
    }
    /// Adds a density in kg/m³ for the next fluid without an amount.
    pub fn density(mut self, density: f64) -> Self {
        self.amounts.push(FillAmount::Density(density));
        self
    }
    /// Adds an explicit molecule count for the next fluid without an amount.
    pub fn count(mut self, count: usize) -> Self {
        self.amounts.push(FillAmount::Count(count));
        self
    }
    pub fn lattice(mut self, lattice: Lattice) -> Self {
        self.lattice = Some(lattice);
        self
    }
    pub fn lattice_compound(mut self, compound: Molecule) -> Self {
        self.lattice_compound = Some(compound);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the collected parameters, failing on the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking fluids, then
    /// radius and angle, then the x and y extents, then the lattice.
    pub fn build(self) -> Result<DropletConfig, ValidationError> {
        if self.fluids.is_empty() {
            return Err(ValidationError::MissingFluid);
        }
        if self.amounts.len() < self.fluids.len() {
            return Err(ValidationError::MissingDensity {
                fluid: self.fluids[self.amounts.len()].name().to_string(),
            });
        }
        if self.amounts.len() > self.fluids.len() {
            return Err(ValidationError::FluidDensityMismatch {
                fluids: self.fluids.len(),
                amounts: self.amounts.len(),
            });
        }

        let radius = self.radius.unwrap_or(DEFAULT_RADIUS);
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ValidationError::InvalidRadius(radius));
        }
        let angle = self.angle.unwrap_or(DEFAULT_ANGLE);
        if !(angle > 0.0 && angle <= 180.0) {
            return Err(ValidationError::InvalidAngle(angle));
        }
        for (template, amount) in self.fluids.iter().zip(&self.amounts) {
            let valid = match *amount {
                FillAmount::Density(d) => d.is_finite() && d > 0.0,
                FillAmount::Count(n) => n > 0,
            };
            if !valid {
                return Err(ValidationError::InvalidDensity {
                    fluid: template.name().to_string(),
                });
            }
        }

        let x = lateral_extent('x', self.x, radius)?;
        let y = lateral_extent('y', self.y, radius)?;

        let surface = match (self.lattice, self.lattice_compound) {
            (None, None) => SurfaceSpec::Graphene,
            (Some(_), None) => return Err(ValidationError::MissingLatticeCompound),
            (None, Some(compound)) => {
                return Err(ValidationError::UnexpectedLatticeCompound {
                    compound: compound.name().to_string(),
                });
            }
            (Some(lattice), Some(compound)) => {
                if !lattice.is_cubic() {
                    return Err(ValidationError::UnsupportedLatticeGeometry {
                        angles: lattice.angles,
                    });
                }
                check_basis(&lattice, &compound)?;
                if lattice.spacing.iter().any(|s| !s.is_finite() || *s <= 0.0) {
                    return Err(ValidationError::InvalidLatticeSpacing {
                        spacing: lattice.spacing,
                    });
                }
                for (axis, spacing, extent) in [
                    ('x', lattice.spacing[0], x),
                    ('y', lattice.spacing[1], y),
                    ('z', lattice.spacing[2], CUBIC_SLAB_THICKNESS),
                ] {
                    if spacing > extent {
                        return Err(ValidationError::LatticeCellTooLarge {
                            axis,
                            spacing,
                            extent,
                        });
                    }
                }
                SurfaceSpec::Custom { lattice, compound }
            }
        };

        let fluids = self
            .fluids
            .into_iter()
            .zip(self.amounts)
            .map(|(template, amount)| FluidSpecies::new(template, amount))
            .collect();

        Ok(DropletConfig {
            radius,
            angle,
            x,
            y,
            surface,
            fluids,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
        })
    }
}

/// The compound must own basis points and be the only species in the basis.
fn check_basis(lattice: &Lattice, compound: &Molecule) -> Result<(), ValidationError> {
    let name = compound.name();
    if lattice.basis.get(name).is_none_or(Vec::is_empty) {
        return Err(ValidationError::LatticeCompoundNotInBasis {
            compound: name.to_string(),
        });
    }
    let others: Vec<String> = lattice
        .basis
        .keys()
        .filter(|key| key.as_str() != name)
        .cloned()
        .collect();
    if !others.is_empty() {
        return Err(ValidationError::ExtraBasisSpecies {
            compound: name.to_string(),
            others,
        });
    }
    Ok(())
}

/// Checks a requested lateral extent, defaulting to four radii.
fn lateral_extent(axis: char, value: Option<f64>, radius: f64) -> Result<f64, ValidationError> {
    let minimum = MIN_DIMENSION_RADII * radius;
    let Some(value) = value else {
        return Ok(minimum);
    };
    if value.is_nan() || value < minimum {
        return Err(ValidationError::DimensionTooSmall {
            axis,
            value,
            minimum,
        });
    }
    if value > MAX_DIMENSION {
        return Err(ValidationError::DimensionTooLarge {
            axis,
            value,
            maximum: MAX_DIMENSION,
        });
    }
    Ok(value)
}
