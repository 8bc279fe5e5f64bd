//! Fluid molecule templates.
//!
//! Built-in templates cover TIP3P water and all-atom n-alkanes. Any other fluid
//! (ionic liquids, solvents) is read from a BGF or GRO file, whose first residue
//! becomes the template.

use crate::core::io::bgf::{BgfError, BgfFile};
use crate::core::io::gro::{GroError, GroFile};
use crate::core::io::traits::TemplateReader;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::{Molecule, MoleculeError};
use crate::core::models::topology::{Bond, BondOrder};
use crate::core::utils::geometry::{TETRAHEDRAL_ANGLE, sp3_hydrogen_directions};
use nalgebra::{Point3, Vector3};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// TIP3P O–H bond length (nm).
pub const WATER_OH_BOND: f64 = 0.09572;
/// TIP3P H–O–H angle (degrees).
pub const WATER_HOH_ANGLE: f64 = 104.52;
/// Alkane C–C bond length (nm).
pub const CC_BOND: f64 = 0.154;
/// Alkane C–H bond length (nm).
pub const CH_BOND: f64 = 0.109;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("An alkane needs at least one carbon")]
    InvalidAlkaneLength,
    #[error("Unknown template '{0}' (expected 'water', 'alkane:N' or a .bgf/.gro file)")]
    Unknown(String),
    #[error("Template file '{}' contains no molecules", .0.display())]
    EmptyFile(PathBuf),
    #[error("Failed to read BGF template: {0}")]
    Bgf(#[from] BgfError),
    #[error("Failed to read GRO template: {0}")]
    Gro(#[from] GroError),
    #[error("Invalid template geometry: {0}")]
    Molecule(#[from] MoleculeError),
}

/// TIP3P water: oxygen at the origin, both hydrogens in the xy plane.
pub fn water() -> Molecule {
    let theta = WATER_HOH_ANGLE.to_radians();
    let atoms = vec![
        Atom::new("OW", "O", Point3::origin()),
        Atom::new("HW1", "H", Point3::new(WATER_OH_BOND, 0.0, 0.0)),
        Atom::new(
            "HW2",
            "H",
            Point3::new(WATER_OH_BOND * theta.cos(), WATER_OH_BOND * theta.sin(), 0.0),
        ),
    ];
    let bonds = vec![
        Bond::new(0, 1, BondOrder::Single),
        Bond::new(0, 2, BondOrder::Single),
    ];
    Molecule::from_parts("H2O", atoms, bonds)
}

/// Residue name used for an n-alkane.
pub fn alkane_residue_name(carbons: usize) -> &'static str {
    match carbons {
        6 => "HEX",
        _ => "ALK",
    }
}

/// All-atom n-alkane with `carbons` carbons in an all-trans zig-zag along x.
///
/// Carbons come first (C1..Cn), followed by hydrogens (H1..Hm) in the order
/// of the carbon they are bonded to.
///
/// # Errors
///
/// Returns [`TemplateError::InvalidAlkaneLength`] for zero carbons.
pub fn alkane(carbons: usize) -> Result<Molecule, TemplateError> {
    if carbons == 0 {
        return Err(TemplateError::InvalidAlkaneLength);
    }
    let half = (TETRAHEDRAL_ANGLE / 2.0).to_radians();
    let carbon_positions: Vec<Point3<f64>> = (0..carbons)
        .map(|i| {
            let rise = if i % 2 == 0 { 0.0 } else { CC_BOND * half.cos() };
            Point3::new(i as f64 * CC_BOND * half.sin(), rise, 0.0)
        })
        .collect();

    let mut atoms: Vec<Atom> = carbon_positions
        .iter()
        .enumerate()
        .map(|(i, p)| Atom::new(&format!("C{}", i + 1), "C", *p))
        .collect();
    let mut bonds: Vec<Bond> = (1..carbons)
        .map(|i| Bond::new(i - 1, i, BondOrder::Single))
        .collect();

    for (i, carbon) in carbon_positions.iter().enumerate() {
        let neighbors: Vec<Vector3<f64>> = [i.checked_sub(1), Some(i + 1)]
            .into_iter()
            .flatten()
            .filter(|&j| j < carbons)
            .map(|j| (carbon_positions[j] - carbon).normalize())
            .collect();
        let directions = if neighbors.is_empty() {
            methane_directions()
        } else {
            sp3_hydrogen_directions(&neighbors)
        };
        for direction in directions {
            let index = atoms.len();
            let name = format!("H{}", index - carbons + 1);
            atoms.push(Atom::new(&name, "H", carbon + direction * CH_BOND));
            bonds.push(Bond::new(i, index, BondOrder::Single));
        }
    }

    Ok(Molecule::new(alkane_residue_name(carbons), atoms, bonds)?)
}

fn methane_directions() -> Vec<Vector3<f64>> {
    [
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(1.0, -1.0, -1.0),
        Vector3::new(-1.0, 1.0, -1.0),
        Vector3::new(-1.0, -1.0, 1.0),
    ]
    .iter()
    .map(Vector3::normalize)
    .collect()
}

/// Reads the first residue of a BGF or GRO file as a template.
pub fn load_file(path: &Path) -> Result<Molecule, TemplateError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let molecules = match extension.as_deref() {
        Some("bgf") => BgfFile::read_from_path(path)?,
        Some("gro") => GroFile::read_from_path(path)?,
        _ => return Err(TemplateError::Unknown(path.display().to_string())),
    };
    molecules
        .into_iter()
        .next()
        .ok_or_else(|| TemplateError::EmptyFile(path.to_path_buf()))
}

/// Where a fluid template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Water,
    Alkane(usize),
    File(PathBuf),
}

impl TemplateSource {
    /// Builds or reads the template molecule.
    pub fn load(&self) -> Result<Molecule, TemplateError> {
        match self {
            Self::Water => Ok(water()),
            Self::Alkane(n) => alkane(*n),
            Self::File(path) => load_file(path),
        }
    }
}

impl FromStr for TemplateSource {
    type Err = TemplateError;

    /// Accepts `water`, `tip3p`, `hexane`, `alkane:N`, or a path ending in
    /// `.bgf` or `.gro`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "water" | "tip3p" => return Ok(Self::Water),
            "hexane" => return Ok(Self::Alkane(6)),
            lower => {
                if let Some(n) = lower.strip_prefix("alkane:") {
                    return n
                        .trim()
                        .parse()
                        .map(Self::Alkane)
                        .map_err(|_| TemplateError::Unknown(trimmed.to_string()));
                }
                if lower.ends_with(".bgf") || lower.ends_with(".gro") {
                    return Ok(Self::File(PathBuf::from(trimmed)));
                }
            }
        }
        Err(TemplateError::Unknown(trimmed.to_string()))
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Water => write!(f, "water"),
            Self::Alkane(n) => write!(f, "alkane:{}", n),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn distance(m: &Molecule, a: usize, b: usize) -> f64 {
        (m.atoms()[a].position - m.atoms()[b].position).norm()
    }

    #[test]
    fn water_has_tip3p_geometry() {
        let w = water();
        assert_eq!(w.name(), "H2O");
        let names: Vec<_> = w.atoms().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["OW", "HW1", "HW2"]);
        assert!((distance(&w, 0, 1) - WATER_OH_BOND).abs() < 1e-12);
        assert!((distance(&w, 0, 2) - WATER_OH_BOND).abs() < 1e-12);
        let h1 = w.atoms()[1].position - w.atoms()[0].position;
        let h2 = w.atoms()[2].position - w.atoms()[0].position;
        assert!((h1.angle(&h2).to_degrees() - WATER_HOH_ANGLE).abs() < 1e-9);
        assert!((w.mass().unwrap() - 18.015).abs() < 1e-3);
    }

    #[test]
    fn hexane_has_expected_composition_and_bonds() {
        let hexane = alkane(6).unwrap();
        assert_eq!(hexane.name(), "HEX");
        let carbons = hexane.atoms().iter().filter(|a| a.element == "C").count();
        let hydrogens = hexane.atoms().iter().filter(|a| a.element == "H").count();
        assert_eq!((carbons, hydrogens), (6, 14));
        assert_eq!(hexane.bonds().len(), 5 + 14);
        assert!((distance(&hexane, 0, 1) - CC_BOND).abs() < 1e-12);
        for bond in hexane.bonds().iter().skip(5) {
            assert!((distance(&hexane, bond.atom1, bond.atom2) - CH_BOND).abs() < 1e-12);
        }
    }

    #[test]
    fn alkane_hydrogens_do_not_overlap() {
        let octane = alkane(8).unwrap();
        assert_eq!(octane.name(), "ALK");
        let n = octane.len();
        for a in 0..n {
            for b in (a + 1)..n {
                assert!(distance(&octane, a, b) > 0.08, "atoms {} and {} overlap", a, b);
            }
        }
    }

    #[test]
    fn methane_and_invalid_lengths() {
        let methane = alkane(1).unwrap();
        assert_eq!(methane.len(), 5);
        assert!(matches!(alkane(0), Err(TemplateError::InvalidAlkaneLength)));
    }

    #[test]
    fn source_parses_known_names() {
        assert_eq!("water".parse::<TemplateSource>().unwrap(), TemplateSource::Water);
        assert_eq!("TIP3P".parse::<TemplateSource>().unwrap(), TemplateSource::Water);
        assert_eq!(
            "alkane:12".parse::<TemplateSource>().unwrap(),
            TemplateSource::Alkane(12)
        );
        assert_eq!(
            "hexane".parse::<TemplateSource>().unwrap(),
            TemplateSource::Alkane(6)
        );
        assert_eq!(
            "data/bmim.bgf".parse::<TemplateSource>().unwrap(),
            TemplateSource::File(PathBuf::from("data/bmim.bgf"))
        );
        assert!("alkane:x".parse::<TemplateSource>().is_err());
        assert!("honey".parse::<TemplateSource>().is_err());
    }

    #[test]
    fn source_display_round_trips_names() {
        assert_eq!(TemplateSource::Alkane(6).to_string(), "alkane:6");
        assert_eq!(TemplateSource::Water.to_string(), "water");
    }

    #[test]
    fn load_file_reads_first_gro_residue() {
        let mut file = Builder::new().suffix(".gro").tempfile().unwrap();
        write!(
            file,
            "methanol\n    3\n    1MOH      C    1   0.000   0.000   0.000\n    1MOH      O    2   0.143   0.000   0.000\n    2MOH      C    3   1.000   0.000   0.000\n   1.00000   1.00000   1.00000\n"
        )
        .unwrap();
        let template = TemplateSource::File(file.path().to_path_buf()).load().unwrap();
        assert_eq!(template.name(), "MOH");
        assert_eq!(template.len(), 2);
        assert_eq!(template.atoms()[1].element, "O");
    }

    #[test]
    fn load_file_rejects_unknown_extension() {
        let result = load_file(Path::new("fluid.xyz"));
        assert!(matches!(result, Err(TemplateError::Unknown(_))));
    }
}
