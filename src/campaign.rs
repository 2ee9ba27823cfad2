//! Campaign file loading.
//!
//! A campaign file maps experiment names to experiment descriptors. Files
//! are JSON by default; `.yaml`/`.yml` files are parsed as YAML. Unlike
//! parameter validation, loading is fail-stop: a missing or unparsable file
//! is an error.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::params::{Defaults, Descriptor, STEPS};

/// Experiments of a campaign, by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Campaign {
    pub experiments: BTreeMap<String, Descriptor>,
}

impl Campaign {
    /// A campaign with a single experiment filled with the defaults
    pub fn template(experiment: &str, defaults: &Defaults) -> Result<Self> {
        let table = defaults.table()?;
        let mut descriptor = Descriptor::default();
        for step in STEPS {
            let key = step.param.key();
            let value = table.get(key).cloned().unwrap_or(Value::Null);
            descriptor.set(step.param.section(), key, value);
        }

        let mut experiments = BTreeMap::new();
        experiments.insert(experiment.to_string(), descriptor);
        Ok(Self { experiments })
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Write the campaign as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create campaign directory '{}'", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).wrap_err_with(|| format!("Failed to write campaign file '{}'", path.display()))?;
        info!("Campaign written to: {:?}", path);
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
}

/// Resolve a campaign name or path.
///
/// A bare name is looked up in `campaign_dir`; a name without extension
/// gets `.json` appended.
pub fn resolve_campaign_path(name: &Path, campaign_dir: &Path) -> PathBuf {
    let mut path = if name.parent().map_or(true, |p| p.as_os_str().is_empty()) {
        campaign_dir.join(name)
    } else {
        name.to_path_buf()
    };
    if path.extension().is_none() {
        path.set_extension("json");
    }
    path
}

/// Load and parse a campaign file
pub fn load_campaign(path: &Path) -> Result<Campaign> {
    info!("Loading campaign from: {:?}", path);

    if !path.exists() {
        return Err(eyre!(
            "Simulation campaign file '{}' does not exist (create one with the 'prepare' command)",
            path.display()
        ));
    }

    let file = File::open(path).wrap_err_with(|| format!("Failed to open campaign file '{}'", path.display()))?;
    let campaign: Campaign = if is_yaml(path) {
        serde_yaml::from_reader(file).wrap_err_with(|| format!("Failed to parse campaign file '{}'", path.display()))?
    } else {
        serde_json::from_reader(file).wrap_err_with(|| format!("Failed to parse campaign file '{}'", path.display()))?
    };

    if campaign.is_empty() {
        warn!("Campaign {:?} contains no experiment", path);
    }
    info!("Loaded {} experiment(s)", campaign.len());
    Ok(campaign)
}

/// Sorted file names of the parseable campaigns in `dir`
pub fn list_campaigns(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).wrap_err_with(|| format!("Failed to read campaign directory '{}'", dir.display()))?;

    let mut names = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_campaign_file = path.is_file()
            && matches!(path.extension().and_then(|e| e.to_str()), Some("json") | Some("yaml") | Some("yml"));
        if !is_campaign_file {
            continue;
        }
        match load_campaign(&path) {
            Ok(_) => {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
            Err(e) => debug!("Skipping {:?}: {}", path, e),
        }
    }

    names.sort();
    Ok(names)
}
