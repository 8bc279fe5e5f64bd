use crate::core::models::component::Component;
use tracing::debug;

/// Height of a spherical cap of radius `radius` (nm) meeting a flat surface at
/// contact angle `angle` (degrees): `h = r - r cos θ`.
pub fn cap_height(radius: f64, angle: f64) -> f64 {
    radius - radius * angle.to_radians().cos()
}

/// The z plane below which molecules are removed from a sphere spanning
/// `[0, 2r]`.
///
/// Caps taller than the radius cut at `h - r`; all others cut at `h`.
pub fn cap_cutoff(radius: f64, height: f64) -> f64 {
    if height > radius {
        height - radius
    } else {
        height
    }
}

/// Molecule counts before and after carving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarveSummary {
    pub initial: usize,
    pub removed: usize,
    pub retained: usize,
    pub cutoff_z: f64,
}

/// Removes every molecule with at least one atom below the cap cutoff.
///
/// Molecules are kept or dropped whole and survivors keep their order. The
/// input is expected in the sphere frame, with the sphere spanning `z ∈ [0, 2r]`.
pub fn carve_cap(sphere: &Component, radius: f64, height: f64) -> (Component, CarveSummary) {
    let cutoff_z = cap_cutoff(radius, height);
    let carved = sphere.retain(|molecule| molecule.positions().all(|p| p.z >= cutoff_z));
    let summary = CarveSummary {
        initial: sphere.len(),
        removed: sphere.len() - carved.len(),
        retained: carved.len(),
        cutoff_z,
    };
    debug!(
        initial = summary.initial,
        removed = summary.removed,
        retained = summary.retained,
        cutoff_z,
        "Carved spherical cap."
    );
    (carved, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::molecule::Molecule;
    use nalgebra::Point3;

    fn column(zs: &[f64]) -> Component {
        Component::new(
            "FLD",
            zs.iter()
                .map(|&z| Molecule::single_atom("AR", "Ar").placed_at(&Point3::new(0.0, 0.0, z)))
                .collect(),
        )
    }

    #[test]
    fn height_matches_reference_angles() {
        assert!((cap_height(2.0, 90.0) - 2.0).abs() < 1e-12);
        assert!((cap_height(1.0, 180.0) - 2.0).abs() < 1e-12);
        assert!(cap_height(1.0, 1e-6) < 1e-12);
        assert!((cap_height(1.0, 60.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn height_increases_monotonically_with_angle() {
        let mut previous = cap_height(1.5, 0.5);
        for step in 1..360 {
            let angle = 0.5 + step as f64 * 0.5;
            if angle >= 180.0 {
                break;
            }
            let h = cap_height(1.5, angle);
            assert!(h > previous, "not increasing at {}", angle);
            previous = h;
        }
    }

    #[test]
    fn cutoff_uses_both_branches() {
        assert_eq!(cap_cutoff(1.0, 0.5), 0.5);
        assert_eq!(cap_cutoff(1.0, 1.0), 1.0);
        assert!((cap_cutoff(1.0, 1.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn carve_keeps_molecules_at_or_above_cutoff() {
        let sphere = column(&[0.2, 0.9, 1.0, 1.4, 1.9]);
        let (cap, summary) = carve_cap(&sphere, 1.0, 1.0);
        let zs: Vec<f64> = cap.molecules().iter().filter_map(Molecule::min_z).collect();
        assert_eq!(zs, vec![1.0, 1.4, 1.9]);
        assert_eq!(
            summary,
            CarveSummary {
                initial: 5,
                removed: 2,
                retained: 3,
                cutoff_z: 1.0
            }
        );
    }

    #[test]
    fn molecule_straddling_cutoff_is_removed_whole() {
        let straddling = Molecule::from_atoms(
            "H2",
            vec![
                Atom::new("H1", "H", Point3::new(0.0, 0.0, 0.45)),
                Atom::new("H2", "H", Point3::new(0.0, 0.0, 0.55)),
            ],
        );
        let sphere = Component::new("FLD", vec![straddling]);
        let (cap, summary) = carve_cap(&sphere, 1.0, 0.5);
        assert!(cap.is_empty());
        assert_eq!(summary.removed, 1);
        assert_eq!(cap.name(), "FLD");
    }

    #[test]
    fn tall_cap_cuts_at_height_minus_radius() {
        let sphere = column(&[0.1, 0.3, 0.6, 1.8]);
        let height = cap_height(1.0, 120.0);
        let (cap, summary) = carve_cap(&sphere, 1.0, height);
        assert!((summary.cutoff_z - 0.5).abs() < 1e-12);
        assert_eq!(cap.len(), 2);
    }
}
