// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

// Projects catalog positions onto a flat map centered on the zenith.

use serde::{Deserialize, Serialize};

use crate::astro_util::radec_deg_to_vector;
use crate::zenith_frame::LocalFrame;

/// Radians. Stars closer than this to the zenith project to the origin.
pub const ZENITH_EPSILON_RAD: f64 = 1e-8;

/// Horizontal (east, north) components shorter than this have no direction.
pub const HORIZONTAL_NORM_EPSILON: f64 = 1e-12;

/// Degrees. Beyond this |latitude| the longitude stretch uses
/// COS_LATITUDE_FLOOR instead of cos(latitude).
pub const POLE_LATITUDE_LIMIT_DEG: f64 = 89.999;

pub const COS_LATITUDE_FLOOR: f64 = 1e-6;

/// Displacement (degrees) of a star from the zenith. `east` is expressed in
/// degrees of longitude at the observer latitude, `north` in degrees of
/// latitude. Valid only near the zenith.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkyOffset {
    pub east: f64,  // Negative is west.
    pub north: f64,  // Negative is south.
}

impl SkyOffset {
    pub fn magnitude(&self) -> f64 {
        self.east.hypot(self.north)
    }
}

/// Offset from the zenith of the star at ra/dec (degrees) for an observer
/// at `observer_lat` (degrees) whose ENU frame is `frame`.
pub fn project(frame: &LocalFrame, ra: f64, dec: f64, observer_lat: f64)
               -> SkyOffset {
    let enu = frame.apply(&radec_deg_to_vector(ra, dec));
    let horizontal_norm = enu.x.hypot(enu.y);

    // Same angle as acos(up), without its loss of precision near 1.
    let theta = horizontal_norm.atan2(enu.z.clamp(-1.0, 1.0));
    if theta < ZENITH_EPSILON_RAD || horizontal_norm < HORIZONTAL_NORM_EPSILON {
        return SkyOffset::default();
    }

    let distance = theta.to_degrees();
    let east = distance * enu.x / horizontal_norm;
    let north = distance * enu.y / horizontal_norm;

    SkyOffset {
        east: east / longitude_stretch(observer_lat),
        north,
    }
}

fn longitude_stretch(observer_lat: f64) -> f64 {
    if observer_lat.abs() < POLE_LATITUDE_LIMIT_DEG {
        observer_lat.to_radians().cos()
    } else {
        COS_LATITUDE_FLOOR
    }
}

/// First-order offset from plain coordinate differences: north is the
/// declination difference and east the ra difference scaled by
/// cos(center_dec). Agrees with project() near the zenith at low latitude
/// and drifts away from it with distance.
#[deprecated(note = "use project(), which is exact away from the zenith")]
pub fn linear_offset(center_ra: f64, center_dec: f64, ra: f64, dec: f64)
                     -> SkyOffset {
    let mut ra_diff = (ra - center_ra).rem_euclid(360.0);
    if ra_diff > 180.0 {
        ra_diff -= 360.0;
    }
    SkyOffset {
        east: ra_diff * center_dec.to_radians().cos(),
        north: dec - center_dec,
    }
}
