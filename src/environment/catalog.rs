//! Building-block catalog.
//!
//! A building block is a named set of preprocessor constants that shape the
//! malicious mote's behaviour. Selecting several blocks merges their
//! constants; the first block to set a constant wins.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use super::EnvironmentError;

/// Block name -> (constant name -> value)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingBlockCatalog {
    blocks: BTreeMap<String, BTreeMap<String, Value>>,
}

/// A constant set by an earlier block and ignored for a later one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantCollision {
    pub block: String,
    pub constant: String,
    pub kept: Value,
    pub ignored: Value,
}

/// Constants derived from the selected building blocks, in selection order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaliciousConstants {
    pub constants: Vec<(String, Value)>,
    pub collisions: Vec<ConstantCollision>,
}

impl BuildingBlockCatalog {
    pub fn new(blocks: BTreeMap<String, BTreeMap<String, Value>>) -> Self {
        Self { blocks }
    }

    /// Load the catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self, EnvironmentError> {
        let file = File::open(path).map_err(|source| EnvironmentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_reader(file).map_err(|source| EnvironmentError::Catalog {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn contains(&self, block: &str) -> bool {
        self.blocks.contains_key(block)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.blocks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Merge the constants of `selected` blocks, first writer wins.
    ///
    /// Unknown block names are skipped with a warning.
    pub fn constants<S: AsRef<str>>(&self, selected: &[S]) -> MaliciousConstants {
        let mut merged = MaliciousConstants::default();

        for block in selected {
            let block = block.as_ref();
            let Some(constants) = self.blocks.get(block) else {
                warn!("Building-block '{}' is not in the catalog (skipped)", block);
                continue;
            };
            for (name, value) in constants {
                match merged.constants.iter().find(|(existing, _)| existing == name) {
                    Some((_, kept)) => {
                        let collision = ConstantCollision {
                            block: block.to_string(),
                            constant: name.clone(),
                            kept: kept.clone(),
                            ignored: value.clone(),
                        };
                        warn!(
                            "Building-block '{}': '{}' is already set to {} (ignoring {})",
                            collision.block, collision.constant, collision.kept, collision.ignored
                        );
                        merged.collisions.push(collision);
                    }
                    None => merged.constants.push((name.clone(), value.clone())),
                }
            }
        }

        merged
    }
}

impl MaliciousConstants {
    /// `#define NAME VALUE` lines for the malicious mote's firmware
    pub fn render_defines(&self) -> Vec<String> {
        self.constants
            .iter()
            .map(|(name, value)| match value {
                Value::String(s) => format!("#define {} {}", name, s),
                other => format!("#define {} {}", name, other),
            })
            .collect()
    }
}
