// Copyright (c) 2025 The gaiamaps authors.
// See LICENSE file in root directory for license terms.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::projector::{project, SkyOffset};
use crate::zenith_frame::LocalFrame;

/// Field receiving the east (+) / west (-) offset, degrees.
pub const EAST_OFFSET_FIELD: &str = "az_diff";
/// Field receiving the north (+) / south (-) offset, degrees.
pub const NORTH_OFFSET_FIELD: &str = "alt_diff";

/// One catalog row. The fields are whatever the catalog returned; only `ra`
/// and `dec` (degrees) are interpreted here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarRecord {
    fields: Map<String, Value>,
}

impl StarRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        let mut record = StarRecord{fields};
        // Renderers key on either spelling of the source identifier.
        for key in ["source_id", "SOURCE_ID"] {
            record.fields.entry(key).or_insert(Value::Null);
        }
        record
    }

    /// Convenience for rows that carry nothing but a position and G magnitude.
    pub fn from_position(ra: f64, dec: f64, phot_g_mean_mag: Option<f64>)
                         -> Self {
        let mut fields = Map::new();
        fields.insert("ra".to_string(), Value::from(ra));
        fields.insert("dec".to_string(), Value::from(dec));
        if let Some(mag) = phot_g_mean_mag {
            fields.insert("phot_g_mean_mag".to_string(), Value::from(mag));
        }
        StarRecord::new(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Numeric field value. Null, missing and string fields are None.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }

    pub fn ra(&self) -> Option<f64> {
        self.get_f64("ra")
    }

    pub fn dec(&self) -> Option<f64> {
        self.get_f64("dec")
    }

    pub fn offset(&self) -> Option<SkyOffset> {
        Some(SkyOffset {
            east: self.get_f64(EAST_OFFSET_FIELD)?,
            north: self.get_f64(NORTH_OFFSET_FIELD)?,
        })
    }

    pub fn set_offset(&mut self, offset: &SkyOffset) {
        self.insert(EAST_OFFSET_FIELD, Value::from(offset.east));
        self.insert(NORTH_OFFSET_FIELD, Value::from(offset.north));
    }
}

/// Attaches zenith offsets to each of `records`. Returns the number of
/// records skipped for lack of a numeric position.
pub fn annotate(records: &mut [StarRecord], frame: &LocalFrame,
                observer_lat: f64) -> usize {
    let mut skipped = 0;
    for record in records.iter_mut() {
        let (Some(ra), Some(dec)) = (record.ra(), record.dec()) else {
            skipped += 1;
            continue;
        };
        let offset = project(frame, ra, dec, observer_lat);
        record.set_offset(&offset);
    }
    if skipped > 0 {
        warn!("{} of {} catalog records lack ra/dec", skipped, records.len());
    }
    skipped
}
