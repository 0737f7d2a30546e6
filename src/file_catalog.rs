// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

use std::fs;
use std::path::Path;

use canonical_error::{CanonicalError, invalid_argument_error, unavailable_error};
use log::info;
use serde_json::{Map, Value};

use gaiamaps_elements::astro_util::{angle_between, radec_deg_to_vector};
use gaiamaps_elements::catalog_trait::{CatalogQuery, CatalogTrait};
use gaiamaps_elements::star_record::StarRecord;

/// Catalog rows exported ahead of time (e.g. a Gaia archive JSON dump),
/// searched in memory.
pub struct FileCatalog {
    rows: Vec<StarRecord>,
}

impl FileCatalog {
    pub fn new(rows: Vec<StarRecord>) -> Self {
        FileCatalog{rows}
    }

    /// Reads a JSON array of row objects.
    pub fn load(path: &Path) -> Result<Self, CanonicalError> {
        let text = fs::read_to_string(path).map_err(|e| unavailable_error(
            format!("Could not read catalog {:?}: {:?}", path, e).as_str()))?;
        let catalog = Self::from_json(&text)?;
        info!("Loaded {} catalog rows from {:?}", catalog.rows.len(), path);
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self, CanonicalError> {
        let rows: Vec<Map<String, Value>> = serde_json::from_str(text)
            .map_err(|e| invalid_argument_error(
                format!("Malformed catalog JSON: {}", e).as_str()))?;
        Ok(FileCatalog::new(rows.into_iter().map(StarRecord::new).collect()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CatalogTrait for FileCatalog {
    fn query_stars(&self, query: &CatalogQuery)
                   -> Result<Vec<StarRecord>, CanonicalError> {
        let center = radec_deg_to_vector(query.center_ra, query.center_dec);
        let mut selected: Vec<(f64, StarRecord)> = Vec::new();
        for row in &self.rows {
            let (Some(ra), Some(dec)) = (row.ra(), row.dec()) else {
                continue;
            };
            if let Some(g_cut) = query.magnitude_cut() {
                match row.get_f64("phot_g_mean_mag") {
                    Some(g) if g < g_cut => {},
                    _ => continue,
                }
            }
            if query.include_distance && row.get_f64("parallax").is_none() {
                continue;
            }
            if query.include_velocity
                && (row.get_f64("pmra").is_none() || row.get_f64("pmdec").is_none())
            {
                continue;
            }
            let ang_dist =
                angle_between(&center, &radec_deg_to_vector(ra, dec)).to_degrees();
            if ang_dist > query.radius() {
                continue;
            }
            let mut row = row.clone();
            row.insert("ang_dist", Value::from(ang_dist));
            selected.push((ang_dist, row));
        }
        selected.sort_by(|a, b| a.0.total_cmp(&b.0));
        selected.truncate(query.row_limit());
        Ok(selected.into_iter().map(|(_, row)| row).collect())
    }
}
