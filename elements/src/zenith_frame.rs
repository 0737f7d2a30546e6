// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

// Builds the rotation from catalog (equatorial) coordinates to the local
// East-North-Up frame of an observer at a given instant.

use canonical_error::{CanonicalError, invalid_argument_error};
use chrono::{DateTime, Utc};
use log::debug;
use nalgebra::{Rotation3, Vector3};

use crate::astro_util::{angle_between, radec_deg_to_vector,
                        EarthOrientation, MeanSiderealOrientation};
use crate::rotation::rotation_from_two_vectors;

/// Degrees. Latitude displacement of the auxiliary observer whose zenith
/// fixes the direction of local north. Must be nonzero.
pub const AUXILIARY_LATITUDE_OFFSET_DEG: f64 = 1e-4;

/// Where and when the sky is observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeographicObserver {
    pub latitude: f64,  // -90..90
    pub longitude: f64,  // -180..180, positive east.
    pub instant: DateTime<Utc>,
}

impl GeographicObserver {
    pub fn new(latitude: f64, longitude: f64, instant: DateTime<Utc>)
               -> Result<Self, CanonicalError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(invalid_argument_error(
                format!("latitude must be in [-90, 90]; got {}",
                        latitude).as_str()));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(invalid_argument_error(
                format!("longitude must be in [-180, 180]; got {}",
                        longitude).as_str()));
        }
        Ok(GeographicObserver{latitude, longitude, instant})
    }

    pub fn build_frame(&self, orientation: &dyn EarthOrientation)
                       -> ZenithFrame {
        build_frame(self.latitude, self.longitude, &self.instant, orientation)
    }
}

/// Proper rotation taking catalog-frame unit vectors to (east, north, up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    rotation: Rotation3<f64>,
}

impl LocalFrame {
    pub fn new(rotation: Rotation3<f64>) -> Self {
        LocalFrame{rotation}
    }

    pub fn rotation(&self) -> &Rotation3<f64> {
        &self.rotation
    }

    /// Returns the ENU vector (east, north, up) for a catalog-frame vector.
    pub fn apply(&self, catalog_vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * catalog_vector
    }

    /// True if the rows are unit length and mutually orthogonal, and the
    /// determinant is +1, all within `tolerance`.
    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        let m = self.rotation.matrix();
        let gram = m * m.transpose();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                if (gram[(i, j)] - expected).abs() > tolerance {
                    return false;
                }
            }
        }
        (m.determinant() - 1.0).abs() <= tolerance
    }
}

/// Everything derived once per request: the zenith and the local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZenithFrame {
    pub zenith_ra: f64,  // Degrees, 0..360.
    pub zenith_dec: f64,  // Degrees.

    // Angle (degrees) between the primary and auxiliary zenith directions.
    pub auxiliary_separation: f64,

    pub frame: LocalFrame,
}

/// Computes the zenith of the observer at lat/long (degrees) and the
/// rotation into its ENU frame. Latitude/longitude ranges are the caller's
/// responsibility.
pub fn build_frame(lat: f64, long: f64, instant: &DateTime<Utc>,
                   orientation: &dyn EarthOrientation) -> ZenithFrame {
    let (zenith_ra, zenith_dec) = orientation.zenith(lat, long, instant);

    // Displace the auxiliary observer north, unless that would run past the
    // pole; then displace south and aim the reference at ENU south.
    let northward = lat + AUXILIARY_LATITUDE_OFFSET_DEG <= 90.0;
    let aux_lat = if northward {
        lat + AUXILIARY_LATITUDE_OFFSET_DEG
    } else {
        lat - AUXILIARY_LATITUDE_OFFSET_DEG
    };
    let (aux_ra, aux_dec) = orientation.zenith(aux_lat, long, instant);

    let zenith = radec_deg_to_vector(zenith_ra, zenith_dec);
    let auxiliary = radec_deg_to_vector(aux_ra, aux_dec);
    let delta = angle_between(&zenith, &auxiliary);

    let up = Vector3::z();
    let north_sign = if northward { 1.0 } else { -1.0 };
    let reference = Vector3::new(0.0, north_sign * delta.sin(), delta.cos());

    let rotation = rotation_from_two_vectors(&zenith, &auxiliary,
                                             &up, &reference);
    debug!("Zenith ra {:.6} dec {:.6}; auxiliary separation {:.3e} deg",
           zenith_ra, zenith_dec, delta.to_degrees());

    ZenithFrame {
        zenith_ra,
        zenith_dec,
        auxiliary_separation: delta.to_degrees(),
        frame: LocalFrame::new(rotation),
    }
}

/// As build_frame(), using the mean sidereal Earth orientation.
pub fn build_frame_default(lat: f64, long: f64, instant: &DateTime<Utc>)
                           -> ZenithFrame {
    build_frame(lat, long, instant, &MeanSiderealOrientation)
}

#[cfg(test)]
mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;

    use super::*;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap()
    }

    // Zenith that ignores the clock: ra is longitude, dec is latitude.
    struct FixedSky;

    impl EarthOrientation for FixedSky {
        fn zenith(&self, lat: f64, long: f64, _instant: &DateTime<Utc>)
                  -> (f64, f64) {
            (long.rem_euclid(360.0), lat)
        }
    }

    #[test]
    fn test_observer_validation() {
        assert!(GeographicObserver::new(6.47, -83.22, instant()).is_ok());
        assert!(GeographicObserver::new(90.0, 180.0, instant()).is_ok());
        assert!(GeographicObserver::new(90.5, 0.0, instant()).is_err());
        assert!(GeographicObserver::new(0.0, -180.01, instant()).is_err());
        assert!(GeographicObserver::new(f64::NAN, 0.0, instant()).is_err());
        assert!(GeographicObserver::new(0.0, f64::INFINITY, instant()).is_err());
    }

    #[test]
    fn test_zenith_maps_to_up() {
        for lat in [-89.0, -45.0, 0.0, 6.47, 51.5, 89.9999, 90.0] {
            let zf = build_frame_default(lat, 276.78, &instant());
            assert!(zf.frame.is_orthonormal(1e-12));
            let enu = zf.frame.apply(
                &radec_deg_to_vector(zf.zenith_ra, zf.zenith_dec));
            assert_abs_diff_eq!(enu.x, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(enu.y, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(enu.z, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_auxiliary_separation() {
        let zf = build_frame_default(6.47, 276.78, &instant());
        assert_abs_diff_eq!(zf.auxiliary_separation,
                            AUXILIARY_LATITUDE_OFFSET_DEG, epsilon = 1e-9);
    }

    #[test]
    fn test_celestial_pole_is_north() {
        // From mid northern latitudes the north celestial pole sits due
        // north at altitude equal to the latitude.
        let zf = build_frame(40.0, 0.0, &instant(), &FixedSky);
        let enu = zf.frame.apply(&Vector3::z());
        assert_abs_diff_eq!(enu.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(enu.y, 50_f64.to_radians().sin(), epsilon = 1e-9);
        assert_abs_diff_eq!(enu.z, 40_f64.to_radians().sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_east_is_increasing_ra() {
        let zf = build_frame(0.0, 100.0, &instant(), &FixedSky);
        let enu = zf.frame.apply(&radec_deg_to_vector(101.0, 0.0));
        assert!(enu.x > 0.0);
        assert_abs_diff_eq!(enu.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_near_pole_displaces_auxiliary_south() {
        let zf = build_frame(89.99995, 10.0, &instant(), &FixedSky);
        assert!(zf.frame.is_orthonormal(1e-12));
        // Increasing declination still reads as north.
        let enu = zf.frame.apply(&radec_deg_to_vector(190.0, 89.9999));
        assert!(enu.y > 0.0);
    }

    #[test]
    fn test_idempotent() {
        let zf1 = build_frame_default(-33.9, 18.4, &instant());
        let zf2 = build_frame_default(-33.9, 18.4, &instant());
        assert_eq!(zf1, zf2);
    }

    #[test]
    fn test_observer_build_frame() {
        let observer = GeographicObserver::new(51.5, -0.1, instant()).unwrap();
        let zf = observer.build_frame(&MeanSiderealOrientation);
        assert_eq!(zf, build_frame_default(51.5, -0.1, &instant()));
        // Catalog-frame zenith: the mean-of-date latitude, precessed back to
        // J2000.
        assert_abs_diff_eq!(zf.zenith_ra, 260.5688, epsilon = 1e-3);
        assert_abs_diff_eq!(zf.zenith_dec, 51.5221, epsilon = 1e-3);
    }
}
