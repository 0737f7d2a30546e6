// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

//! Rotations pinned down by two pairs of directions.

use std::f64::consts::PI;

use nalgebra::{Rotation3, Unit, Vector3};

use crate::astro_util::angle_between;

/// Radians. Source and target directions closer than this (or this close to
/// antipodal) are treated as exactly aligned (or exactly opposite).
pub const ALIGNED_ANGLE_TOLERANCE: f64 = 1e-8;

/// When the primary directions are antipodal, the rotation axis is taken
/// perpendicular to world X, unless the source direction is within this
/// cosine of X, in which case world Y is used.
pub const PERPENDICULAR_AXIS_SWITCH: f64 = 0.9;

/// A secondary direction whose projection onto the plane perpendicular to
/// the primary target is shorter than this has no usable orientation; the
/// twist step is then skipped.
pub const DEGENERATE_PROJECTION_NORM: f64 = 1e-15;

/// Rotation about `axis` (need not be normalized) by `angle` radians,
/// counter-clockwise looking down the axis.
pub fn rodrigues(axis: &Vector3<f64>, angle: f64) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), angle)
}

/// Returns the rotation R with R*a = a_prime and R*b lying in the half plane
/// spanned by a_prime and b_prime on b_prime's side. Inputs need not be
/// normalized but must be nonzero.
///
/// The rotation is built in two steps: first the shortest rotation taking
/// a to a_prime, then a twist about a_prime that brings the rotated b into
/// the plane of a_prime and b_prime.
pub fn rotation_from_two_vectors(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    a_prime: &Vector3<f64>,
    b_prime: &Vector3<f64>,
) -> Rotation3<f64> {
    let a = a.normalize();
    let b = b.normalize();
    let a_prime = a_prime.normalize();
    let b_prime = b_prime.normalize();

    let r1 = align(&a, &a_prime);

    // Twist about a_prime.
    let b1 = r1 * b;
    let p1 = b1 - a_prime.dot(&b1) * a_prime;
    let p2 = b_prime - a_prime.dot(&b_prime) * a_prime;
    let (p1_norm, p2_norm) = (p1.norm(), p2.norm());
    if p1_norm < DEGENERATE_PROJECTION_NORM
        || p2_norm < DEGENERATE_PROJECTION_NORM
    {
        return r1;
    }
    let p1 = p1 / p1_norm;
    let p2 = p2 / p2_norm;
    let sin_phi = a_prime.dot(&p1.cross(&p2));
    let cos_phi = p1.dot(&p2);
    let r2 = rodrigues(&a_prime, sin_phi.atan2(cos_phi));

    r2 * r1
}

// Shortest rotation taking unit vector `from` to unit vector `to`.
fn align(from: &Vector3<f64>, to: &Vector3<f64>) -> Rotation3<f64> {
    let omega = angle_between(from, to);
    if omega < ALIGNED_ANGLE_TOLERANCE {
        return Rotation3::identity();
    }
    if PI - omega < ALIGNED_ANGLE_TOLERANCE {
        // Any axis perpendicular to `from` works for a half turn.
        let mut perp = Vector3::x();
        if from.dot(&perp).abs() > PERPENDICULAR_AXIS_SWITCH {
            perp = Vector3::y();
        }
        return rodrigues(&from.cross(&perp), PI);
    }
    rodrigues(&from.cross(to), omega)
}

#[cfg(test)]
mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn random_unit_vector(rng: &mut SmallRng) -> Vector3<f64> {
        loop {
            let v = Vector3::new(rng.gen_range(-1.0..1.0),
                                 rng.gen_range(-1.0..1.0),
                                 rng.gen_range(-1.0..1.0));
            let norm = v.norm();
            if norm > 0.1 && norm <= 1.0 {
                return v / norm;
            }
        }
    }

    fn assert_vec_eq(v1: &Vector3<f64>, v2: &Vector3<f64>, epsilon: f64) {
        assert_abs_diff_eq!(v1.x, v2.x, epsilon = epsilon);
        assert_abs_diff_eq!(v1.y, v2.y, epsilon = epsilon);
        assert_abs_diff_eq!(v1.z, v2.z, epsilon = epsilon);
    }

    fn assert_proper_rotation(r: &Rotation3<f64>) {
        let m = r.matrix();
        assert_abs_diff_eq!(m.determinant(), 1.0, epsilon = 1e-12);
        let should_be_identity = m * m.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(should_be_identity[(i, j)], expected,
                                    epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_rodrigues_quarter_turn() {
        let r = rodrigues(&Vector3::new(0.0, 0.0, 5.0), PI / 2.0);
        assert_vec_eq(&(r * Vector3::x()), &Vector3::y(), 1e-15);
    }

    #[test]
    fn test_identity_target_gives_identity() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let a = random_unit_vector(&mut rng);
            let b = random_unit_vector(&mut rng);
            let r = rotation_from_two_vectors(&a, &b, &a, &b);
            let m = r.matrix();
            for i in 0..3 {
                for j in 0..3 {
                    let expected = if i == j { 1.0 } else { 0.0 };
                    assert_abs_diff_eq!(m[(i, j)], expected, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_maps_both_pairs() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let a = random_unit_vector(&mut rng);
            let b = random_unit_vector(&mut rng);
            // Construct a target pair with the same angle between them.
            let truth = rodrigues(&random_unit_vector(&mut rng),
                                  rng.gen_range(-PI..PI));
            let (a_prime, b_prime) = (truth * a, truth * b);

            let r = rotation_from_two_vectors(&a, &b, &a_prime, &b_prime);
            assert_proper_rotation(&r);
            assert_vec_eq(&(r * a), &a_prime, 1e-12);
            assert_vec_eq(&(r * b), &b_prime, 1e-9);
        }
    }

    #[test]
    fn test_secondary_lands_in_target_half_plane() {
        // b and b_prime subtend different angles from the primary, so only
        // the half plane can match.
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(1.0, 1.0, 0.0);
        let a_prime = Vector3::z();
        let b_prime = Vector3::new(0.0, 1.0, 3.0);
        let r = rotation_from_two_vectors(&a, &b, &a_prime, &b_prime);
        assert_vec_eq(&(r * a), &a_prime, 1e-12);
        let rb = r * b.normalize();
        assert_abs_diff_eq!(rb.x, 0.0, epsilon = 1e-12);
        assert!(rb.y > 0.0);
        assert_abs_diff_eq!(rb.z, 1.0 / 2_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_antipodal_primary() {
        let a = Vector3::x();
        let b = Vector3::y();
        let a_prime = -Vector3::x();
        let b_prime = Vector3::z();
        let r = rotation_from_two_vectors(&a, &b, &a_prime, &b_prime);
        assert_proper_rotation(&r);
        assert_vec_eq(&(r * a), &a_prime, 1e-12);
        assert_vec_eq(&(r * b), &b_prime, 1e-12);

        // Source along Y exercises the X axis choice; along X the Y axis.
        for a in [Vector3::y(), Vector3::new(0.95, 0.3, 0.0).normalize()] {
            let r = rotation_from_two_vectors(
                &a, &Vector3::z(), &-a, &Vector3::z());
            assert_vec_eq(&(r * a), &-a, 1e-12);
            assert_vec_eq(&(r * Vector3::z()), &Vector3::z(), 1e-12);
        }
    }

    #[test]
    fn test_degenerate_secondary_skips_twist() {
        // b parallel to a: nothing to twist against.
        let a = Vector3::new(0.0, 1.0, 1.0);
        let r = rotation_from_two_vectors(&a, &(2.0 * a), &Vector3::z(),
                                          &Vector3::y());
        assert_proper_rotation(&r);
        assert_vec_eq(&(r * a.normalize()), &Vector3::z(), 1e-12);
    }
}
