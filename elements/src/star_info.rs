// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

// Facts about a single star derived from its Gaia measurements, for the
// commemorative document.

use serde::Serialize;

use crate::star_record::StarRecord;

pub const LIGHT_YEARS_PER_PARSEC: f64 = 3.26156;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distance {
    pub parsecs: f64,
    pub light_years: f64,
}

/// Distance from parallax (milliarcseconds). None unless parallax is
/// positive.
pub fn distance_from_parallax(parallax_mas: f64) -> Option<Distance> {
    if !parallax_mas.is_finite() || parallax_mas <= 0.0 {
        return None;
    }
    let parsecs = 1000.0 / parallax_mas;
    Some(Distance{parsecs, light_years: parsecs * LIGHT_YEARS_PER_PARSEC})
}

/// Absolute G magnitude from apparent G magnitude and parallax (mas).
/// Extinction is ignored.
pub fn absolute_magnitude(g_mag: f64, parallax_mas: f64) -> Option<f64> {
    if parallax_mas.is_nan() || parallax_mas <= 0.0 {
        return None;
    }
    Some(g_mag + 5.0 * parallax_mas.log10() - 10.0)
}

/// Total proper motion (mas/yr).
pub fn proper_motion_total(pmra: f64, pmdec: f64) -> f64 {
    pmra.hypot(pmdec)
}

/// Effective temperature (K) estimated from Gaia BP-RP colour.
pub fn bp_rp_to_temperature(bp_rp: f64) -> f64 {
    4600.0 * (1.0 / (0.92 * bp_rp + 1.7) + 1.0 / (0.92 * bp_rp + 0.62))
}

// Colour index (BP-RP) bounds of each spectral class.
const SPECTRAL_CLASSES: [(char, f64, f64); 7] = [
    ('O', -1.0, -0.3),
    ('B', -0.3, 0.0),
    ('A', 0.0, 0.3),
    ('F', 0.3, 0.7),
    ('G', 0.7, 1.1),
    ('K', 1.1, 1.8),
    ('M', 1.8, 3.0),
];

/// Coarse spectral type such as "G2 V" from colour index and absolute
/// magnitude. Luminosity class is V (dwarf) or III (giant) only.
pub fn classify_spectral_type(color_index: f64, abs_mag: f64) -> String {
    let (class, lo, hi) = SPECTRAL_CLASSES.iter().copied()
        .find(|&(_, _, hi)| color_index < hi)
        .unwrap_or(SPECTRAL_CLASSES[SPECTRAL_CLASSES.len() - 1]);
    let frac = (color_index - lo) / (hi - lo);
    let digit = ((frac * 10.0).floor() as i64).clamp(0, 9);
    let luminosity = if abs_mag > 2.0 { "V" } else { "III" };
    format!("{}{} {}", class, digit, luminosity)
}

/// Derived facts for one catalog record; each is None when the inputs are
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StarInfo {
    pub distance: Option<Distance>,
    pub color_index: Option<f64>,
    pub abs_mag: Option<f64>,
    pub temperature: Option<f64>,
    pub spectral_type: Option<String>,
    pub proper_motion: Option<f64>,  // mas/yr.
}

impl StarInfo {
    pub fn from_record(record: &StarRecord) -> Self {
        let parallax = record.get_f64("parallax")
            .or_else(|| record.get_f64("parallax_mas"));
        let color_index = record.get_f64("color_index")
            .or_else(|| record.get_f64("bp_rp"));
        let abs_mag = match (record.get_f64("phot_g_mean_mag"), parallax) {
            (Some(g), Some(p)) => absolute_magnitude(g, p),
            _ => None,
        };
        let spectral_type = match (color_index, abs_mag) {
            (Some(c), Some(m)) => Some(classify_spectral_type(c, m)),
            _ => None,
        };
        let proper_motion = match (record.get_f64("pmra"), record.get_f64("pmdec")) {
            (Some(pmra), Some(pmdec)) => Some(proper_motion_total(pmra, pmdec)),
            _ => None,
        };
        StarInfo {
            distance: parallax.and_then(distance_from_parallax),
            color_index,
            abs_mag,
            temperature: color_index.map(bp_rp_to_temperature),
            spectral_type,
            proper_motion,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate approx;
    use approx::assert_abs_diff_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_distance_from_parallax() {
        let d = distance_from_parallax(10.0).unwrap();
        assert_abs_diff_eq!(d.parsecs, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.light_years, 326.156, epsilon = 1e-6);
        assert!(distance_from_parallax(0.0).is_none());
        assert!(distance_from_parallax(-0.3).is_none());
        assert!(distance_from_parallax(f64::NAN).is_none());
    }

    #[test]
    fn test_absolute_magnitude() {
        // At 10 parsecs absolute and apparent magnitude agree.
        assert_abs_diff_eq!(absolute_magnitude(4.83, 100.0).unwrap(), 4.83,
                            epsilon = 1e-9);
        assert_abs_diff_eq!(absolute_magnitude(10.0, 1.0).unwrap(), 0.0,
                            epsilon = 1e-9);
        assert!(absolute_magnitude(10.0, 0.0).is_none());
    }

    #[test]
    fn test_spectral_type() {
        assert_eq!(classify_spectral_type(0.85, 4.7), "G3 V");
        assert_eq!(classify_spectral_type(1.5, 0.5), "K5 III");
        assert_eq!(classify_spectral_type(-2.0, 5.0), "O0 V");
        assert_eq!(classify_spectral_type(4.0, 12.0), "M9 V");
        assert_eq!(classify_spectral_type(0.0, 2.0), "A0 III");
    }

    #[test]
    fn test_temperature() {
        let t = bp_rp_to_temperature(0.82);
        assert!(t > 5000.0 && t < 5500.0, "{}", t);
        assert!(bp_rp_to_temperature(0.0) > bp_rp_to_temperature(2.0));
    }

    #[test]
    fn test_from_record() {
        let record = StarRecord::new(serde_json::from_value(json!({
            "ra": 1.0, "dec": 2.0, "phot_g_mean_mag": 10.0,
            "parallax_mas": 1.0, "bp_rp": 0.85, "pmra": 3.0, "pmdec": -4.0
        })).unwrap());
        let info = StarInfo::from_record(&record);
        assert_abs_diff_eq!(info.distance.unwrap().parsecs, 1000.0,
                            epsilon = 1e-9);
        assert_eq!(info.abs_mag, Some(0.0));
        assert_eq!(info.color_index, Some(0.85));
        assert_eq!(info.spectral_type.as_deref(), Some("G3 III"));
        assert_abs_diff_eq!(info.proper_motion.unwrap(), 5.0, epsilon = 1e-12);

        let bare = StarInfo::from_record(&StarRecord::from_position(1.0, 2.0, None));
        assert_eq!(bare, StarInfo::default());
    }
}
