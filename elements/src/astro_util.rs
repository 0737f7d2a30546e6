// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

use std::f64::consts::PI;

use astro::{
    angle::limit_to_two_PI,
    coords::hr_angl_frm_hz,
    time::{julian_day, mn_sidr, CalType, Date},
};
use chrono::{DateTime, Datelike, Timelike, Utc};
use nalgebra::{Rotation3, Vector3};

pub const J2000_JD: f64 = 2451545.0;
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36525.0;
pub const ARCSEC_TO_RAD: f64 = PI / (180.0 * 3600.0);

/// Convert ra/dec (radians) to x/y/z on unit sphere.
pub fn to_unit_vector(ra: f64, dec: f64) -> [f64; 3] {
    [
        (ra.cos() * dec.cos()), // x
        (ra.sin() * dec.cos()), // y
        dec.sin(),
    ] // z
}

/// Convert x/y/z on unit sphere to ra/dec (radians). Returned ra is 0..2pi.
pub fn from_unit_vector(v: &[f64; 3]) -> (f64, f64) {
    let x = v[0];
    let y = v[1];
    let z = v[2];
    let dec = z.clamp(-1.0, 1.0).asin();
    let mut ra = y.atan2(x);
    if ra < 0.0 {
        ra += 2.0 * PI;
    }
    (ra, dec)
}

/// Catalog-frame unit vector for the given ra/dec (degrees).
pub fn radec_deg_to_vector(ra_deg: f64, dec_deg: f64) -> Vector3<f64> {
    let [x, y, z] = to_unit_vector(ra_deg.to_radians(), dec_deg.to_radians());
    Vector3::new(x, y, z)
}

/// Angle (radians) between two vectors. Accurate for tiny and for
/// near-antipodal separations.
pub fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    v1.cross(v2).norm().atan2(v1.dot(v2))
}

/// Returns (ra, dec) in radians.
/// alt: elevation in radians
/// az: radians, clockwise from north
/// lat: observer latitude in radians.
/// long: observer longitude in radians.
pub fn equatorial_from_alt_az(
    alt: f64,
    az: f64,
    lat: f64,
    long: f64,
    instant: &DateTime<Utc>,
) -> (f64, f64) {
    let meeus_az = limit_to_two_PI(az - PI);
    let gmst = greenwich_mean_sidereal_time(instant);

    // astro::coords::dec_frm_hz() is incorrect.
    let dec = (lat.sin() * alt.sin() - lat.cos() * alt.cos() * meeus_az.cos())
        .clamp(-1.0, 1.0)
        .asin();
    let hour_angle = hr_angl_frm_hz(meeus_az, alt, lat);
    let ra = limit_to_two_PI(gmst + long - hour_angle);

    (ra, dec)
}

/// Greenwich mean sidereal time (radians, 0..2pi) at the given instant.
pub fn greenwich_mean_sidereal_time(instant: &DateTime<Utc>) -> f64 {
    let date = Date {
        year: instant.date_naive().year() as i16,
        month: instant.date_naive().month() as u8,
        decimal_day: instant.date_naive().day() as f64,
        cal_type: CalType::Gregorian,
    };
    let jd = julian_day(&date);

    let utc_seconds = instant.time().num_seconds_from_midnight() as f64
        + instant.time().nanosecond() as f64 * 1e-9;
    let utc_hours = utc_seconds / 3600.0;
    let gmst_hours =
        mn_sidr(jd).to_degrees() / 15.0 + utc_hours * 1.00273790935;

    limit_to_two_PI((gmst_hours * 15.0).to_radians())
}

/// Julian date of `instant`, including the fraction of the day. UTC is used
/// in place of TT; the difference is about a minute of time.
pub fn julian_date(instant: &DateTime<Utc>) -> f64 {
    let seconds = instant.time().num_seconds_from_midnight() as f64
        + instant.time().nanosecond() as f64 * 1e-9;
    let date = Date {
        year: instant.date_naive().year() as i16,
        month: instant.date_naive().month() as u8,
        decimal_day: instant.date_naive().day() as f64 + seconds / 86400.0,
        cal_type: CalType::Gregorian,
    };
    julian_day(&date)
}

/// IAU 1976 precession. Returns the rotation taking J2000 (ICRS to within
/// the 20 mas frame bias) unit vectors to the mean equator and equinox at
/// `instant`. Its inverse takes mean-of-date vectors back to the catalog
/// frame.
pub fn precession_from_j2000(instant: &DateTime<Utc>) -> Rotation3<f64> {
    let t = (julian_date(instant) - J2000_JD) / DAYS_PER_JULIAN_CENTURY;
    let zeta = (2306.2181 + (0.30188 + 0.017998 * t) * t) * t * ARCSEC_TO_RAD;
    let z = (2306.2181 + (1.09468 + 0.018203 * t) * t) * t * ARCSEC_TO_RAD;
    let theta = (2004.3109 + (-0.42665 - 0.041833 * t) * t) * t * ARCSEC_TO_RAD;

    Rotation3::from_axis_angle(&Vector3::z_axis(), z)
        * Rotation3::from_axis_angle(&Vector3::y_axis(), -theta)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), zeta)
}

/// Converts "straight up" for an observer into catalog coordinates. The
/// Earth rotation model lives behind this trait so the frame geometry can be
/// exercised independently of it.
pub trait EarthOrientation {
    /// Returns the (ra, dec) in degrees of the zenith seen from the given
    /// latitude/longitude (degrees) at `instant`, in the catalog (J2000 /
    /// ICRS) frame. Ra is 0..360.
    fn zenith(&self, lat: f64, long: f64, instant: &DateTime<Utc>)
              -> (f64, f64);
}

/// Mean sidereal time rotation about the celestial pole, then precession
/// back to J2000. Nutation (up to ~17 arcsec), aberration (~20 arcsec) and
/// polar motion are not modeled.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanSiderealOrientation;

impl MeanSiderealOrientation {
    /// Zenith (ra, dec) in degrees, referred to the mean equator and
    /// equinox of `instant`.
    pub fn zenith_of_date(&self, lat: f64, long: f64, instant: &DateTime<Utc>)
                          -> (f64, f64) {
        let (ra, dec) = equatorial_from_alt_az(
            PI / 2.0, 0.0, lat.to_radians(), long.to_radians(), instant);
        (ra.to_degrees() % 360.0, dec.to_degrees())
    }
}

impl EarthOrientation for MeanSiderealOrientation {
    fn zenith(&self, lat: f64, long: f64, instant: &DateTime<Utc>)
              -> (f64, f64) {
        let (ra, dec) = self.zenith_of_date(lat, long, instant);
        let of_date = radec_deg_to_vector(ra, dec);
        let catalog = precession_from_j2000(instant).inverse() * of_date;
        let (ra, dec) = from_unit_vector(&[catalog.x, catalog.y, catalog.z]);
        (ra.to_degrees() % 360.0, dec.to_degrees())
    }
}
