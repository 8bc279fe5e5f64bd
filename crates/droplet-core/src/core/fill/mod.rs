//! Bulk filling of a sphere with fluid molecules.
//!
//! Molecules are seated on a cubic grid of candidate centres that lie far
//! enough inside the sphere for any orientation of the template to fit. The
//! grid is tightened until it offers enough sites, then the sites and the
//! species labels are shuffled and every molecule receives a random rotation,
//! preferring one that keeps it clear of the molecules already placed.

use crate::core::elements::UnknownElementError;
use crate::core::models::assembly::FLUID_NAME;
use crate::core::models::component::Component;
use crate::core::models::molecule::Molecule;
use crate::core::utils::geometry::random_rotation;
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::f64::consts::PI;
use thiserror::Error;
use tracing::{debug, warn};

/// Atomic mass unit in kilograms.
pub const AMU_KG: f64 = 1.660_539_066_60e-27;
/// Cubic nanometres to cubic metres.
const NM3_TO_M3: f64 = 1e-27;

const GRID_SHRINK_FACTOR: f64 = 0.98;
const MAX_GRID_ATTEMPTS: usize = 50;
const MAX_ROTATION_ATTEMPTS: usize = 10;
/// Closest approach (nm) tolerated between atoms of different molecules.
const CLASH_DISTANCE: f64 = 0.15;

#[derive(Debug, Error)]
pub enum FillError {
    #[error("No fluid molecules were requested")]
    EmptyRequest,
    #[error("Fluid template '{0}' has no atoms")]
    EmptyTemplate(String),
    #[error("Cannot compute the mass of template '{template}': {source}")]
    UnknownMass {
        template: String,
        #[source]
        source: UnknownElementError,
    },
    #[error("Sphere has room for {available} molecules but {requested} were requested")]
    InsufficientSpace { requested: usize, available: usize },
}

/// How much of a species goes into the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillAmount {
    /// Mass density in kg/m³.
    Density(f64),
    /// Exact number of molecules.
    Count(usize),
}

/// A fluid species: the molecule to replicate and how many copies to use.
#[derive(Debug, Clone, PartialEq)]
pub struct FluidSpecies {
    pub template: Molecule,
    pub amount: FillAmount,
}

impl FluidSpecies {
    pub fn new(template: Molecule, amount: FillAmount) -> Self {
        Self { template, amount }
    }

    /// Number of molecules this species contributes to a volume of `volume` nm³.
    pub fn molecule_count(&self, volume: f64) -> Result<usize, FillError> {
        match self.amount {
            FillAmount::Count(n) => Ok(n),
            FillAmount::Density(density) => {
                let mass = self
                    .template
                    .mass()
                    .map_err(|source| FillError::UnknownMass {
                        template: self.template.name().to_string(),
                        source,
                    })?;
                Ok((density * volume * NM3_TO_M3 / (mass * AMU_KG)).round() as usize)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Point3<f64>,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self { center, radius }
    }

    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * self.radius.powi(3)
    }
}

/// Grid sites at least `margin` inside the sphere, for a given grid spacing.
fn grid_sites(sphere: &Sphere, spacing: f64, margin: f64) -> Vec<Point3<f64>> {
    let limit = sphere.radius - margin;
    if limit < 0.0 {
        return Vec::new();
    }
    let steps = (limit / spacing).floor() as i64;
    let mut sites = Vec::new();
    for i in -steps..=steps {
        for j in -steps..=steps {
            for k in -steps..=steps {
                let offset = Vector3::new(i as f64, j as f64, k as f64) * spacing;
                if offset.norm() <= limit {
                    sites.push(sphere.center + offset);
                }
            }
        }
    }
    sites
}

/// Spatial hash of already placed atoms, with cells as wide as the clash distance.
#[derive(Default)]
struct AtomGrid {
    cells: HashMap<(i64, i64, i64), Vec<Point3<f64>>>,
}

impl AtomGrid {
    fn key(p: &Point3<f64>) -> (i64, i64, i64) {
        (
            (p.x / CLASH_DISTANCE).floor() as i64,
            (p.y / CLASH_DISTANCE).floor() as i64,
            (p.z / CLASH_DISTANCE).floor() as i64,
        )
    }

    fn insert(&mut self, molecule: &Molecule) {
        for p in molecule.positions() {
            self.cells.entry(Self::key(p)).or_default().push(*p);
        }
    }

    /// Closest distance between `molecule` and any stored atom within one cell,
    /// or `CLASH_DISTANCE` if nothing is that close.
    fn closest_approach(&self, molecule: &Molecule) -> f64 {
        let mut closest = CLASH_DISTANCE;
        for p in molecule.positions() {
            let (x, y, z) = Self::key(p);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        if let Some(points) = self.cells.get(&(x + dx, y + dy, z + dz)) {
                            for q in points {
                                closest = closest.min((p - q).norm());
                            }
                        }
                    }
                }
            }
        }
        closest
    }
}

/// Orients `template` at `site`, taking the first random rotation that clears
/// every placed atom, or the least crowded one tried.
fn orient(
    template: &Molecule,
    site: &Point3<f64>,
    placed: &AtomGrid,
    rng: &mut impl Rng,
) -> Molecule {
    let centered = template.placed_at(site);
    let mut best: Option<(f64, Molecule)> = None;
    for _ in 0..MAX_ROTATION_ATTEMPTS {
        let rotation: UnitQuaternion<f64> = random_rotation(rng);
        let candidate = centered.rotated_about_centroid(&rotation);
        let approach = placed.closest_approach(&candidate);
        if approach >= CLASH_DISTANCE {
            return candidate;
        }
        if best.as_ref().is_none_or(|(d, _)| approach > *d) {
            best = Some((approach, candidate));
        }
    }
    best.map(|(_, molecule)| molecule).unwrap_or(centered)
}

/// Share of molecules left overlapping a neighbour, or `None` when all cleared.
fn crowded_fraction(crowded: usize, total: usize) -> Option<f64> {
    (crowded > 0 && total > 0).then(|| crowded as f64 / total as f64)
}

/// Fills `sphere` with the requested species and returns them as the fluid
/// component. Species are mixed randomly across the sphere; the result is
/// reproducible for a given RNG state.
///
/// # Errors
///
/// Returns [`FillError::EmptyRequest`] if no molecules are requested,
/// [`FillError::InsufficientSpace`] if the grid cannot be tightened enough to
/// hold them, and template errors for templates with no atoms or unknown masses.
pub fn fill_sphere(
    species: &[FluidSpecies],
    sphere: &Sphere,
    rng: &mut impl Rng,
) -> Result<Component, FillError> {
    let volume = sphere.volume();
    let mut counts = Vec::with_capacity(species.len());
    for s in species {
        if s.template.is_empty() {
            return Err(FillError::EmptyTemplate(s.template.name().to_string()));
        }
        counts.push(s.molecule_count(volume)?);
    }
    let requested: usize = counts.iter().sum();
    if requested == 0 {
        return Err(FillError::EmptyRequest);
    }

    let margin = species
        .iter()
        .map(|s| s.template.bounding_radius())
        .fold(0.0, f64::max);

    let mut spacing = (volume / requested as f64).cbrt();
    let mut sites = grid_sites(sphere, spacing, margin);
    let mut attempts = 1;
    while sites.len() < requested && attempts < MAX_GRID_ATTEMPTS {
        spacing *= GRID_SHRINK_FACTOR;
        sites = grid_sites(sphere, spacing, margin);
        attempts += 1;
    }
    if sites.len() < requested {
        return Err(FillError::InsufficientSpace {
            requested,
            available: sites.len(),
        });
    }
    debug!(
        requested,
        sites = sites.len(),
        spacing,
        attempts,
        "Generated fill grid."
    );

    sites.shuffle(rng);
    let mut labels: Vec<usize> = counts
        .iter()
        .enumerate()
        .flat_map(|(index, &count)| std::iter::repeat_n(index, count))
        .collect();
    labels.shuffle(rng);

    let mut placed = AtomGrid::default();
    let mut molecules = Vec::with_capacity(requested);
    let mut crowded = 0usize;
    for (label, site) in labels.iter().zip(&sites) {
        let molecule = orient(&species[*label].template, site, &placed, rng);
        if placed.closest_approach(&molecule) < CLASH_DISTANCE {
            crowded += 1;
        }
        placed.insert(&molecule);
        molecules.push(molecule);
    }
    if let Some(fraction) = crowded_fraction(crowded, molecules.len()) {
        warn!(
            crowded,
            total = molecules.len(),
            "{:.1}% of fluid molecules sit closer than {} nm to a neighbour.",
            fraction * 100.0,
            CLASH_DISTANCE
        );
    }

    Ok(Component::new(FLUID_NAME, molecules))
}
