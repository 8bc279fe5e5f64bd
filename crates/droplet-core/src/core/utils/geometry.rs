use nalgebra::{Matrix3, Quaternion, Rotation3, Unit, UnitQuaternion, Vector3};
use rand::Rng;
use std::f64::consts::PI;

/// Ideal tetrahedral angle in degrees.
pub const TETRAHEDRAL_ANGLE: f64 = 109.4712206;

pub fn rotation_from_axis_angle(axis: &Vector3<f64>, angle_degrees: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle_degrees.to_radians())
}

/// Draws a rotation uniformly from SO(3) (Shoemake's method).
pub fn random_rotation(rng: &mut impl Rng) -> UnitQuaternion<f64> {
    let u1: f64 = rng.r#gen();
    let u2: f64 = rng.r#gen();
    let u3: f64 = rng.r#gen();
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    let q = Quaternion::new(
        b * (2.0 * PI * u3).cos(),
        a * (2.0 * PI * u2).sin(),
        a * (2.0 * PI * u2).cos(),
        b * (2.0 * PI * u3).sin(),
    );
    UnitQuaternion::from_quaternion(q)
}

/// Lattice vectors as matrix columns, built from edge lengths `[a, b, c]` and
/// angles `[alpha, beta, gamma]` in degrees. Vector `a` lies along x and `b`
/// lies in the xy plane.
pub fn lattice_vectors(spacing: &[f64; 3], angles: &[f64; 3]) -> Matrix3<f64> {
    let [a, b, c] = *spacing;
    let [alpha, beta, gamma] = angles.map(f64::to_radians);

    let (cos_a, cos_b, cos_g) = (alpha.cos(), beta.cos(), gamma.cos());
    let sin_g = gamma.sin();

    let va = Vector3::new(a, 0.0, 0.0);
    let vb = Vector3::new(b * cos_g, b * sin_g, 0.0);
    let cx = c * cos_b;
    let cy = c * (cos_a - cos_b * cos_g) / sin_g;
    let cz = (c * c - cx * cx - cy * cy).max(0.0).sqrt();
    let vc = Vector3::new(cx, cy, cz);

    Matrix3::from_columns(&[va, vb, vc])
}

/// Unit directions of the hydrogens completing a tetrahedral centre, given the
/// unit directions towards its heavy-atom neighbours.
///
/// One neighbour yields three hydrogens, two yield two and three yield one.
/// Any other neighbour count yields none.
pub fn sp3_hydrogen_directions(neighbors: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
    match neighbors {
        [n1] => {
            let n1 = n1.normalize();
            let helper = if n1.x.abs() < 0.9 {
                Vector3::x()
            } else {
                Vector3::y()
            };
            let perp = (helper - n1 * n1.dot(&helper)).normalize();
            let h1 = rotation_from_axis_angle(&n1.cross(&perp), TETRAHEDRAL_ANGLE) * n1;
            let spin = rotation_from_axis_angle(&n1, 120.0);
            let h2 = spin * h1;
            let h3 = spin * h2;
            vec![h1, h2, h3]
        }
        [n1, n2] => {
            let bisector = (n1.normalize() + n2.normalize()).normalize();
            let normal = n1.cross(n2).normalize();
            let half = (TETRAHEDRAL_ANGLE / 2.0).to_radians();
            let back = -bisector * half.cos();
            vec![
                (back + normal * half.sin()).normalize(),
                (back - normal * half.sin()).normalize(),
            ]
        }
        [n1, n2, n3] => vec![-(n1.normalize() + n2.normalize() + n3.normalize()).normalize()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn angle_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        a.angle(b).to_degrees()
    }

    #[test]
    fn cubic_lattice_vectors_are_axis_aligned() {
        let m = lattice_vectors(&[0.4, 0.5, 0.6], &[90.0, 90.0, 90.0]);
        assert!((m.column(0) - Vector3::new(0.4, 0.0, 0.0)).norm() < 1e-12);
        assert!((m.column(1) - Vector3::new(0.0, 0.5, 0.0)).norm() < 1e-12);
        assert!((m.column(2) - Vector3::new(0.0, 0.0, 0.6)).norm() < 1e-12);
    }

    #[test]
    fn hexagonal_lattice_vector_b_is_at_120_degrees() {
        let m = lattice_vectors(&[0.2456, 0.2456, 0.335], &[90.0, 90.0, 120.0]);
        let a: Vector3<f64> = m.column(0).into_owned();
        let b: Vector3<f64> = m.column(1).into_owned();
        let c: Vector3<f64> = m.column(2).into_owned();
        assert!((angle_deg(&a, &b) - 120.0).abs() < 1e-9);
        assert!((b.norm() - 0.2456).abs() < 1e-12);
        assert!((c - Vector3::new(0.0, 0.0, 0.335)).norm() < 1e-12);
    }

    #[test]
    fn random_rotation_is_unit_and_reproducible() {
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let q1 = random_rotation(&mut rng1);
        let q2 = random_rotation(&mut rng2);
        assert!((q1.quaternion().norm() - 1.0).abs() < 1e-12);
        assert_eq!(q1, q2);
    }

    #[test]
    fn single_neighbor_gives_three_tetrahedral_hydrogens() {
        let n = Vector3::new(0.0, 0.0, 1.0);
        let hs = sp3_hydrogen_directions(&[n]);
        assert_eq!(hs.len(), 3);
        for h in &hs {
            assert!((angle_deg(h, &n) - TETRAHEDRAL_ANGLE).abs() < 1e-6);
        }
        assert!((angle_deg(&hs[0], &hs[1]) - TETRAHEDRAL_ANGLE).abs() < 1e-6);
    }

    #[test]
    fn two_neighbors_give_two_hydrogens_away_from_bisector() {
        let n1 = Vector3::new(1.0, 0.0, 0.0);
        let n2 = rotation_from_axis_angle(&Vector3::z(), TETRAHEDRAL_ANGLE) * n1;
        let hs = sp3_hydrogen_directions(&[n1, n2]);
        assert_eq!(hs.len(), 2);
        assert!((angle_deg(&hs[0], &hs[1]) - TETRAHEDRAL_ANGLE).abs() < 1e-6);
        let bisector = (n1 + n2).normalize();
        for h in &hs {
            assert!(h.dot(&bisector) < 0.0);
        }
    }

    #[test]
    fn unsupported_neighbor_count_gives_no_hydrogens() {
        assert!(sp3_hydrogen_directions(&[]).is_empty());
        let v = Vector3::x();
        assert!(sp3_hydrogen_directions(&[v, v, v, v]).is_empty());
    }
}
