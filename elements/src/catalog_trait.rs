// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

use std::str::FromStr;

use canonical_error::{CanonicalError, invalid_argument_error};
use serde::{Deserialize, Serialize};

use crate::star_record::StarRecord;

/// Largest row count a caller may request.
pub const MAX_ROW_LIMIT: usize = 10000;

/// Selects how deep (and how wide) the catalog search around the zenith
/// goes. Fainter limits use smaller radii to keep the row count sane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrightnessMode {
    NakedEye,  // G < 6
    Bright,  // G < 13
    Faint,  // G < 19
    #[default]
    All,  // No magnitude limit.
}

impl FromStr for BrightnessMode {
    type Err = CanonicalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naked-eye" => Ok(BrightnessMode::NakedEye),
            "bright" => Ok(BrightnessMode::Bright),
            "faint" => Ok(BrightnessMode::Faint),
            "all" => Ok(BrightnessMode::All),
            _ => Err(invalid_argument_error(
                format!("brightness mode must be one of naked-eye, bright, \
                         faint, all; got {:?}", s).as_str())),
        }
    }
}

impl BrightnessMode {
    /// Faintest G magnitude returned, if limited.
    pub fn magnitude_cut(&self) -> Option<f64> {
        match self {
            BrightnessMode::NakedEye => Some(6.0),
            BrightnessMode::Bright => Some(13.0),
            BrightnessMode::Faint => Some(19.0),
            BrightnessMode::All => None,
        }
    }

    /// Search radius around the zenith, degrees.
    pub fn radius(&self) -> f64 {
        match self {
            BrightnessMode::NakedEye => 20.0,
            BrightnessMode::Bright => 10.0,
            BrightnessMode::Faint => 2.0,
            BrightnessMode::All => 400.0 / 3600.0,
        }
    }

    /// Maximum rows. Only the naked-eye mode honors a caller's override.
    pub fn row_limit(&self, requested: Option<usize>) -> usize {
        match self {
            BrightnessMode::NakedEye => requested.unwrap_or(MAX_ROW_LIMIT),
            _ => 400,
        }
    }
}

/// A cone search around the zenith.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub center_ra: f64,  // Degrees.
    pub center_dec: f64,  // Degrees.
    pub mode: BrightnessMode,

    // Require the fields needed to derive distance / velocity.
    pub include_distance: bool,
    pub include_velocity: bool,

    pub limit: Option<usize>,
}

impl CatalogQuery {
    pub fn radius(&self) -> f64 {
        self.mode.radius()
    }

    pub fn magnitude_cut(&self) -> Option<f64> {
        self.mode.magnitude_cut()
    }

    pub fn row_limit(&self) -> usize {
        self.mode.row_limit(self.limit)
    }

    /// ADQL for the Gaia archive, nearest stars first.
    pub fn to_adql(&self) -> String {
        let mut where_clauses = vec![format!(
            "1=CONTAINS(POINT('ICRS', ra, dec), CIRCLE('ICRS', {}, {}, {}))",
            self.center_ra, self.center_dec, self.radius())];
        if let Some(g_cut) = self.magnitude_cut() {
            where_clauses.push(format!("phot_g_mean_mag < {}", g_cut));
        }
        if self.include_distance {
            where_clauses.push("parallax IS NOT NULL".to_string());
        }
        if self.include_velocity {
            where_clauses.push("pmra IS NOT NULL AND pmdec IS NOT NULL".to_string());
        }

        format!(
            "SELECT TOP {} *, DISTANCE(POINT('ICRS', ra, dec), \
             POINT('ICRS', {}, {})) AS ang_dist \
             FROM gaiadr3.gaia_source WHERE {} ORDER BY ang_dist ASC",
            self.row_limit(), self.center_ra, self.center_dec,
            where_clauses.join(" AND "))
    }
}

/// Source of catalog rows. Implementations own the connection or file
/// handle; callers hand one to each request rather than sharing a global
/// session.
pub trait CatalogTrait {
    /// Returns the rows matching `query`, ordered by increasing angular
    /// distance from its center and truncated to `query.row_limit()`.
    /// Returns unavailable error if the catalog cannot be reached, and
    /// invalid_argument error if it rejects the query.
    fn query_stars(&self, query: &CatalogQuery)
                   -> Result<Vec<StarRecord>, CanonicalError>;
}
