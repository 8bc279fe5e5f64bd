//! Crystalline substrate generation.
//!
//! A [`Lattice`] tiles a unit-cell basis across x, y and z, placing a copy of a
//! named compound at every basis point. Two ready-made slabs are provided:
//! [`graphene_sheet`] (hexagonal, three AA-stacked layers) and [`cubic_slab`]
//! for any lattice whose cell angles are all 90°.

use crate::core::models::assembly::SUBSTRATE_NAME;
use crate::core::models::component::Component;
use crate::core::models::molecule::Molecule;
use crate::core::utils::geometry::lattice_vectors;
use nalgebra::Vector3;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Lattice constant of graphene (nm).
pub const GRAPHENE_SPACING: f64 = 0.2456;
/// Interlayer spacing of graphite (nm).
pub const GRAPHITE_INTERLAYER: f64 = 0.335;
/// Number of stacked graphene layers in the default substrate.
pub const GRAPHENE_LAYERS: usize = 3;
/// Target slab thickness (nm) used to choose the layer count of a cubic lattice.
pub const CUBIC_SLAB_THICKNESS: f64 = 1.5;
/// Lattice constant of FCC gold (nm).
pub const GOLD_SPACING: f64 = 0.40788;

const RIGHT_ANGLE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error)]
pub enum LatticeError {
    #[error("Lattice basis names '{0}' but no compound was supplied for it")]
    UnknownCompound(String),
    #[error("Lattice basis is empty")]
    EmptyBasis,
    #[error("Replication count along {axis} is zero (dimension {dimension} nm, spacing {spacing} nm)")]
    ZeroReplication {
        axis: char,
        dimension: f64,
        spacing: f64,
    },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// A crystal lattice: edge lengths, cell angles and the fractional positions of
/// each named compound within the unit cell.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Lattice {
    /// Edge lengths `[a, b, c]` in nm.
    pub spacing: [f64; 3],
    /// Cell angles `[alpha, beta, gamma]` in degrees.
    #[serde(default = "right_angles")]
    pub angles: [f64; 3],
    /// Fractional coordinates of each compound in the unit cell.
    pub basis: BTreeMap<String, Vec<[f64; 3]>>,
}

fn right_angles() -> [f64; 3] {
    [90.0, 90.0, 90.0]
}

/// A generated substrate slab and its lateral periodicity.
#[derive(Debug, Clone, PartialEq)]
pub struct Substrate {
    component: Component,
    periodicity: Vector3<f64>,
}

impl Substrate {
    pub fn new(component: Component, periodicity: Vector3<f64>) -> Self {
        Self {
            component,
            periodicity,
        }
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn periodicity(&self) -> &Vector3<f64> {
        &self.periodicity
    }

    /// z-coordinate of the topmost substrate atom, 0 for an empty slab.
    pub fn surface_height(&self) -> f64 {
        self.component.max_z().unwrap_or(0.0)
    }

    pub fn into_parts(self) -> (Component, Vector3<f64>) {
        (self.component, self.periodicity)
    }
}

impl Lattice {
    pub fn new(spacing: [f64; 3], angles: [f64; 3], basis: BTreeMap<String, Vec<[f64; 3]>>) -> Self {
        Self {
            spacing,
            angles,
            basis,
        }
    }

    /// Hexagonal graphene lattice with two carbons per cell.
    pub fn graphene() -> Self {
        let mut basis = BTreeMap::new();
        basis.insert(
            "C".to_string(),
            vec![[0.0, 0.0, 0.0], [2.0 / 3.0, 1.0 / 3.0, 0.0]],
        );
        Self::new(
            [GRAPHENE_SPACING, GRAPHENE_SPACING, GRAPHITE_INTERLAYER],
            [90.0, 90.0, 120.0],
            basis,
        )
    }

    /// Face-centred cubic gold.
    pub fn gold() -> Self {
        let mut basis = BTreeMap::new();
        basis.insert(
            "Au".to_string(),
            vec![
                [0.0, 0.0, 0.0],
                [0.5, 0.5, 0.0],
                [0.5, 0.0, 0.5],
                [0.0, 0.5, 0.5],
            ],
        );
        Self::new([GOLD_SPACING; 3], right_angles(), basis)
    }

    /// Loads a lattice definition from a TOML file.
    pub fn load(path: &Path) -> Result<Self, LatticeError> {
        let content = std::fs::read_to_string(path).map_err(|e| LatticeError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| LatticeError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn is_cubic(&self) -> bool {
        self.angles
            .iter()
            .all(|angle| (angle - 90.0).abs() < RIGHT_ANGLE_TOLERANCE)
    }

    /// Tiles the unit cell `nx × ny × nz` times.
    ///
    /// Each compound is translated by the Cartesian position of its basis point,
    /// so a one-atom compound at the origin lands exactly on the lattice site.
    /// The periodicity of the result is `(nx·a, ny·b, nz·c)`; no wrap correction
    /// is applied here.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::EmptyBasis`] for a basis without points and
    /// [`LatticeError::UnknownCompound`] when a basis name has no compound.
    pub fn populate(
        &self,
        compounds: &HashMap<String, Molecule>,
        nx: usize,
        ny: usize,
        nz: usize,
    ) -> Result<Substrate, LatticeError> {
        if self.basis.values().all(Vec::is_empty) {
            return Err(LatticeError::EmptyBasis);
        }
        let placements: Vec<(&Molecule, &Vec<[f64; 3]>)> = self
            .basis
            .iter()
            .map(|(name, points)| {
                compounds
                    .get(name)
                    .map(|compound| (compound, points))
                    .ok_or_else(|| LatticeError::UnknownCompound(name.clone()))
            })
            .collect::<Result<_, _>>()?;

        let vectors = lattice_vectors(&self.spacing, &self.angles);
        let mut molecules = Vec::new();
        for (compound, points) in &placements {
            for i in 0..nx {
                for j in 0..ny {
                    for k in 0..nz {
                        for frac in points.iter() {
                            let fractional = Vector3::new(
                                i as f64 + frac[0],
                                j as f64 + frac[1],
                                k as f64 + frac[2],
                            );
                            molecules.push(compound.translated(&(vectors * fractional)));
                        }
                    }
                }
            }
        }

        let periodicity = Vector3::new(
            nx as f64 * self.spacing[0],
            ny as f64 * self.spacing[1],
            nz as f64 * self.spacing[2],
        );
        debug!(
            nx,
            ny,
            nz,
            molecules = molecules.len(),
            "Populated lattice."
        );
        Ok(Substrate::new(
            Component::new(SUBSTRATE_NAME, molecules),
            periodicity,
        ))
    }
}

/// Returns a copy of `component` with every atom's x folded into
/// `[0, period_x)`, however many periods it lies outside.
pub fn wrap_x(component: &Component, period_x: f64) -> Component {
    let molecules = component
        .molecules()
        .iter()
        .map(|molecule| {
            molecule.map_atoms(|atom| {
                let x = atom.position.x;
                let folded = x.rem_euclid(period_x);
                if folded == x {
                    atom.clone()
                } else {
                    atom.translated(&Vector3::new(folded - x, 0.0, 0.0))
                }
            })
        })
        .collect();
    Component::new(component.name(), molecules)
}

fn replication(axis: char, dimension: f64, spacing: f64) -> Result<usize, LatticeError> {
    let count = (dimension / spacing).floor();
    if count < 1.0 {
        return Err(LatticeError::ZeroReplication {
            axis,
            dimension,
            spacing,
        });
    }
    Ok(count as usize)
}

/// Builds the default graphene substrate covering roughly `x × y` nm.
///
/// The hexagonal cell leans towards negative x as rows are added along b, so
/// every atom is wrapped back into the box along x and the y period is
/// scaled by cos 30° to the true row spacing.
pub fn graphene_sheet(x: f64, y: f64) -> Result<Substrate, LatticeError> {
    let factor = (std::f64::consts::PI / 6.0).cos();
    let lattice = Lattice::graphene();
    let nx = replication('x', x, GRAPHENE_SPACING)?;
    let ny_cells = replication('y', y, GRAPHENE_SPACING)?;
    let ny = (ny_cells as f64 / factor).floor() as usize;

    let mut compounds = HashMap::new();
    compounds.insert("C".to_string(), Molecule::single_atom("C", "C"));

    let (component, mut periodicity) = lattice
        .populate(&compounds, nx, ny, GRAPHENE_LAYERS)?
        .into_parts();
    let wrapped = wrap_x(&component, periodicity.x);
    periodicity.y *= factor;

    debug!(nx, ny, px = periodicity.x, py = periodicity.y, "Built graphene sheet.");
    Ok(Substrate::new(wrapped, periodicity))
}

/// Builds a slab of a cubic lattice covering roughly `x × y` nm and about
/// 1.5 nm deep. The single `compound` must match the lattice basis name.
pub fn cubic_slab(
    lattice: &Lattice,
    compound: &Molecule,
    x: f64,
    y: f64,
) -> Result<Substrate, LatticeError> {
    let nx = replication('x', x, lattice.spacing[0])?;
    let ny = replication('y', y, lattice.spacing[1])?;
    let nz = replication('z', CUBIC_SLAB_THICKNESS, lattice.spacing[2])?;

    let mut compounds = HashMap::new();
    compounds.insert(compound.name().to_string(), compound.clone());
    let substrate = lattice.populate(&compounds, nx, ny, nz)?;
    debug!(nx, ny, nz, "Built cubic slab.");
    Ok(substrate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn gold_atom() -> Molecule {
        Molecule::single_atom("Au", "Au")
    }

    #[test]
    fn graphene_is_not_cubic_and_gold_is() {
        assert!(!Lattice::graphene().is_cubic());
        assert!(Lattice::gold().is_cubic());
    }

    #[test]
    fn populate_places_one_compound_per_basis_point_per_cell() {
        let mut compounds = HashMap::new();
        compounds.insert("Au".to_string(), gold_atom());
        let substrate = Lattice::gold().populate(&compounds, 2, 3, 1).unwrap();
        assert_eq!(substrate.component().len(), 2 * 3 * 4);
        let p = substrate.periodicity();
        assert!((p.x - 2.0 * GOLD_SPACING).abs() < 1e-12);
        assert!((p.y - 3.0 * GOLD_SPACING).abs() < 1e-12);
        assert!((p.z - GOLD_SPACING).abs() < 1e-12);
        assert_eq!(substrate.component().name(), "LAT");
    }

    #[test]
    fn populate_fails_for_missing_compound() {
        let compounds = HashMap::new();
        let result = Lattice::gold().populate(&compounds, 1, 1, 1);
        assert!(matches!(result, Err(LatticeError::UnknownCompound(name)) if name == "Au"));
    }

    #[test]
    fn populate_fails_for_empty_basis() {
        let lattice = Lattice::new([0.3; 3], right_angles(), BTreeMap::new());
        let result = lattice.populate(&HashMap::new(), 1, 1, 1);
        assert!(matches!(result, Err(LatticeError::EmptyBasis)));
    }

    #[test]
    fn populate_translates_multi_atom_compound_rigidly() {
        let dimer = Molecule::from_atoms(
            "Au",
            vec![
                Atom::new("Au1", "Au", Point3::new(0.0, 0.0, 0.0)),
                Atom::new("Au2", "Au", Point3::new(0.0, 0.0, 0.1)),
            ],
        );
        let mut basis = BTreeMap::new();
        basis.insert("Au".to_string(), vec![[0.5, 0.5, 0.5]]);
        let lattice = Lattice::new([1.0; 3], right_angles(), basis);
        let mut compounds = HashMap::new();
        compounds.insert("Au".to_string(), dimer);
        let substrate = lattice.populate(&compounds, 1, 1, 1).unwrap();
        let mol = &substrate.component().molecules()[0];
        assert!((mol.atoms()[0].position - Point3::new(0.5, 0.5, 0.5)).norm() < 1e-12);
        assert!((mol.atoms()[1].position.z - 0.6).abs() < 1e-12);
    }

    #[test]
    fn wrap_x_folds_atoms_several_periods_away() {
        let comp = Component::new(
            "LAT",
            [-0.5, 0.5, -4.5, 5.0]
                .iter()
                .map(|&x| Molecule::single_atom("C", "C").translated(&Vector3::new(x, 0.0, 0.0)))
                .collect(),
        );
        let wrapped = wrap_x(&comp, 2.0);
        let xs: Vec<f64> = wrapped.atoms().map(|a| a.position.x).collect();
        assert_eq!(xs, vec![1.5, 0.5, 1.5, 1.0]);
        assert_eq!(comp.atoms().next().unwrap().position.x, -0.5);
    }

    #[test]
    fn tall_graphene_sheet_stays_inside_box() {
        let sheet = graphene_sheet(8.0, 16.0).unwrap();
        let p = *sheet.periodicity();
        assert!(p.y > 2.0 * p.x - 1.0);
        for atom in sheet.component().atoms() {
            assert!(
                atom.position.x >= 0.0 && atom.position.x <= p.x,
                "x = {} outside [0, {}]",
                atom.position.x,
                p.x
            );
            assert!(atom.position.y >= 0.0 && atom.position.y <= p.y);
        }
    }

    #[test]
    fn graphene_sheet_covers_requested_area_inside_box() {
        let sheet = graphene_sheet(8.0, 8.0).unwrap();
        let p = *sheet.periodicity();
        assert!((p.x - 32.0 * GRAPHENE_SPACING).abs() < 1e-9);
        let factor = (std::f64::consts::PI / 6.0).cos();
        assert!((p.y - 36.0 * GRAPHENE_SPACING * factor).abs() < 1e-9);
        assert_eq!(sheet.component().len(), 32 * 36 * 2 * GRAPHENE_LAYERS);

        for atom in sheet.component().atoms() {
            assert!(atom.position.x >= 0.0 && atom.position.x <= p.x);
            assert!(atom.position.y >= 0.0 && atom.position.y <= p.y);
        }
        let expected_top = (GRAPHENE_LAYERS - 1) as f64 * GRAPHITE_INTERLAYER;
        assert!((sheet.surface_height() - expected_top).abs() < 1e-9);
    }

    #[test]
    fn cubic_slab_is_about_one_and_a_half_nm_deep() {
        let slab = cubic_slab(&Lattice::gold(), &gold_atom(), 2.0, 2.0).unwrap();
        assert_eq!(slab.component().len(), 4 * 4 * 3 * 4);
        assert!(slab.surface_height() < CUBIC_SLAB_THICKNESS);
    }

    #[test]
    fn cubic_slab_rejects_dimension_smaller_than_cell() {
        let result = cubic_slab(&Lattice::gold(), &gold_atom(), 0.1, 2.0);
        assert!(matches!(
            result,
            Err(LatticeError::ZeroReplication { axis: 'x', .. })
        ));
    }

    #[test]
    fn load_reads_lattice_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
spacing = [0.3, 0.3, 0.3]
[basis]
Cu = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]]
"#
        )
        .unwrap();
        let lattice = Lattice::load(file.path()).unwrap();
        assert_eq!(lattice.angles, [90.0, 90.0, 90.0]);
        assert_eq!(lattice.basis["Cu"].len(), 2);
    }

    #[test]
    fn load_reports_toml_errors_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "spacing = 'oops'").unwrap();
        let result = Lattice::load(file.path());
        assert!(matches!(result, Err(LatticeError::Toml { .. })));
    }
}
