//! Named default values.
//!
//! The default table is an immutable value passed explicitly to the
//! validation pipeline. It can be loaded from a YAML or JSON file; keys
//! missing from the file keep their built-in value.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::pipeline::{MaliciousRole, ValidationError};

/// Fallback values for every campaign parameter, keyed like the descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub title: String,
    pub goal: String,
    pub notes: String,
    pub duration: u32,
    #[serde(rename = "number-motes")]
    pub number_motes: u32,
    pub repeat: u32,
    pub target: String,
    #[serde(rename = "type")]
    pub malicious_type: MaliciousRole,
    #[serde(rename = "building-blocks")]
    pub building_blocks: Vec<String>,
    #[serde(rename = "external-library")]
    pub external_library: Option<PathBuf>,
    #[serde(rename = "minimum-distance-between-motes")]
    pub dmin: f64,
    #[serde(rename = "transmitting_range")]
    pub tx_range: f64,
    #[serde(rename = "interference_range")]
    pub int_range: f64,
    #[serde(rename = "maximum-distance-between-motes")]
    pub dmax: f64,
    #[serde(rename = "area-square-side")]
    pub area_side: f64,
    #[serde(rename = "maximum-range-from-root")]
    pub max_range: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            title: "Default title".to_string(),
            goal: String::new(),
            notes: String::new(),
            duration: 300,
            number_motes: 10,
            repeat: 1,
            target: "z1".to_string(),
            malicious_type: MaliciousRole::Sensor,
            building_blocks: Vec::new(),
            external_library: None,
            dmin: 20.0,
            tx_range: 50.0,
            int_range: 50.0,
            dmax: 50.0,
            area_side: 200.0,
            max_range: 100.0,
        }
    }
}

impl Defaults {
    /// Load defaults from a YAML file (JSON is accepted as well)
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading defaults from: {:?}", path);
        let file = File::open(path).wrap_err_with(|| format!("Failed to open defaults file '{}'", path.display()))?;
        let defaults: Defaults = serde_yaml::from_reader(file)
            .wrap_err_with(|| format!("Failed to parse defaults file '{}'", path.display()))?;
        defaults.validate()?;
        Ok(defaults)
    }

    /// Check that the defaults are consistent with each other.
    ///
    /// Defaults are substituted without being re-checked, so an inconsistent
    /// table would leak into every validated parameter set.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fail = |msg: String| -> Result<(), ValidationError> { Err(ValidationError::InvalidDefaults(msg)) };

        if self.duration == 0 || self.number_motes == 0 || self.repeat == 0 {
            return fail("duration, number-motes and repeat must be greater than 0".to_string());
        }
        if !(self.dmin > 0.0) {
            return fail(format!("minimum distance {} must be greater than 0", self.dmin));
        }
        if !(self.tx_range > self.dmin) {
            return fail(format!("transmitting range {} must exceed minimum distance {}", self.tx_range, self.dmin));
        }
        if !(self.int_range >= self.tx_range) {
            return fail(format!("interference range {} must be at least transmitting range {}", self.int_range, self.tx_range));
        }
        if !(self.dmin < self.dmax && self.dmax <= self.tx_range) {
            return fail(format!("maximum distance {} must be in ]{}, {}]", self.dmax, self.dmin, self.tx_range));
        }
        if !(self.area_side >= std::f64::consts::SQRT_2 * self.dmin) {
            return fail(format!("area side {} must be at least sqrt(2)*{}", self.area_side, self.dmin));
        }
        if !(self.dmin <= self.max_range && self.max_range <= self.area_side) {
            return fail(format!("maximum range from root {} must be in [{}, {}]", self.max_range, self.dmin, self.area_side));
        }
        Ok(())
    }

    /// The defaults as a `key -> value` table
    pub fn table(&self) -> Result<Map<String, Value>, ValidationError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(ValidationError::InvalidDefaults(format!("defaults serialized to {}", other))),
        }
    }
}
