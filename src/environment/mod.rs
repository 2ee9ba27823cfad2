//! Execution environment.
//!
//! What a campaign is validated against besides its own values: the
//! platforms available in the simulator tree and the catalog of
//! building blocks for the malicious mote.

pub mod catalog;
pub mod platforms;

use std::collections::BTreeSet;
use std::path::PathBuf;

pub use catalog::{BuildingBlockCatalog, ConstantCollision, MaliciousConstants};
pub use platforms::discover_platforms;

/// Errors while discovering the environment
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid building-block catalog {path}: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Platform directory not found: {0}")]
    MissingPlatformDir(PathBuf),
}

/// Platforms and building blocks known to this run
#[derive(Debug, Clone, Default)]
pub struct Environment {
    platforms: BTreeSet<String>,
    catalog: BuildingBlockCatalog,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms.extend(platforms.into_iter().map(Into::into));
        self
    }

    pub fn with_catalog(mut self, catalog: BuildingBlockCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn has_platform(&self, platform: &str) -> bool {
        self.platforms.contains(platform)
    }

    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.platforms.iter().map(String::as_str)
    }

    pub fn catalog(&self) -> &BuildingBlockCatalog {
        &self.catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_merges_platforms() {
        let env = Environment::new().with_platforms(["z1"]).with_platforms(vec!["sky".to_string()]);
        assert!(env.has_platform("z1"));
        assert!(env.has_platform("sky"));
        assert!(!env.has_platform("wismote"));
        assert_eq!(env.platforms().count(), 2);
        assert!(env.catalog().is_empty());
    }
}
