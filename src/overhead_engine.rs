// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

// Answers "which stars were overhead": builds the observer's zenith frame,
// queries the catalog around the zenith, and attaches each star's offset
// from the zenith.

use std::time::Instant;

use canonical_error::{CanonicalError, invalid_argument_error};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use gaiamaps_elements::astro_util::EarthOrientation;
use gaiamaps_elements::catalog_trait::{BrightnessMode, CatalogQuery, CatalogTrait,
                                        MAX_ROW_LIMIT};
use gaiamaps_elements::star_record::{annotate, StarRecord};
use gaiamaps_elements::zenith_frame::GeographicObserver;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadRequest {
    pub lat: f64,  // -90..90
    pub lon: f64,  // -180..180
    pub datetime_iso: String,  // UTC unless an offset is given.
    #[serde(default)]
    pub brightness_mode: BrightnessMode,
    #[serde(default)]
    pub include_velocity: bool,
    #[serde(default = "default_include_distance")]
    pub include_distance: bool,
    // Overrides the row limit (naked-eye mode only).
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_include_distance() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CelestialCenter {
    pub ra: f64,
    pub dec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverheadResponse {
    // The zenith, degrees.
    pub center: CelestialCenter,
    pub stars: Vec<StarRecord>,
}

/// Parses an ISO 8601 date-time. Without a UTC offset the time is taken to
/// be UTC.
pub fn parse_instant(datetime_iso: &str) -> Result<DateTime<Utc>, CanonicalError> {
    let s = datetime_iso.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f",
                   "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }
    Err(invalid_argument_error(
        format!("Invalid datetime {:?}; use ISO format \
                 (e.g. 2024-06-01T12:00:00Z)", datetime_iso).as_str()))
}

pub struct OverheadEngine<'a> {
    catalog: &'a dyn CatalogTrait,
    orientation: &'a dyn EarthOrientation,
}

impl<'a> OverheadEngine<'a> {
    pub fn new(catalog: &'a dyn CatalogTrait,
               orientation: &'a dyn EarthOrientation) -> Self {
        OverheadEngine{catalog, orientation}
    }

    /// Returns invalid_argument error for an out of range latitude,
    /// longitude or row limit, or an unparseable datetime. Catalog errors are
    /// passed through.
    pub fn process(&self, request: &OverheadRequest)
                   -> Result<OverheadResponse, CanonicalError> {
        info!("Overhead request lat={} lon={} datetime={}",
              request.lat, request.lon, request.datetime_iso);
        let start = Instant::now();
        let instant = parse_instant(&request.datetime_iso)?;
        let observer = GeographicObserver::new(request.lat, request.lon, instant)?;
        if let Some(limit) = request.limit {
            if !(1..=MAX_ROW_LIMIT).contains(&limit) {
                return Err(invalid_argument_error(
                    format!("limit must be in [1, {}]; got {}",
                            MAX_ROW_LIMIT, limit).as_str()));
            }
        }

        // Fresh frame every request.
        let zenith_frame = observer.build_frame(self.orientation);

        let query = CatalogQuery {
            center_ra: zenith_frame.zenith_ra,
            center_dec: zenith_frame.zenith_dec,
            mode: request.brightness_mode,
            include_distance: request.include_distance,
            include_velocity: request.include_velocity,
            limit: request.limit,
        };
        debug!("Catalog query: {}", query.to_adql());
        let mut stars = self.catalog.query_stars(&query)?;
        annotate(&mut stars, &zenith_frame.frame, observer.latitude);

        info!("Query returned {} stars in {:?}", stars.len(), start.elapsed());
        Ok(OverheadResponse {
            center: CelestialCenter {
                ra: zenith_frame.zenith_ra,
                dec: zenith_frame.zenith_dec,
            },
            stars,
        })
    }
}
