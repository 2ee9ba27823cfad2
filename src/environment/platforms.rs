//! Target platform discovery.
//!
//! The platforms a campaign may target are the subdirectories of the
//! simulator tree's `platform/` folder.

use log::debug;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::EnvironmentError;

/// List the platform names under `<root>/platform`
pub fn discover_platforms(root: &Path) -> Result<BTreeSet<String>, EnvironmentError> {
    let platform_dir = root.join("platform");
    if !platform_dir.is_dir() {
        return Err(EnvironmentError::MissingPlatformDir(platform_dir));
    }

    let entries = fs::read_dir(&platform_dir).map_err(|source| EnvironmentError::Io {
        path: platform_dir.clone(),
        source,
    })?;

    let mut platforms = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|source| EnvironmentError::Io {
            path: platform_dir.clone(),
            source,
        })?;
        if entry.path().is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                platforms.insert(name.to_string());
            }
        }
    }

    debug!("Discovered {} platforms in {:?}", platforms.len(), platform_dir);
    Ok(platforms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_only_directories() {
        let root = TempDir::new().unwrap();
        let platform_dir = root.path().join("platform");
        fs::create_dir_all(platform_dir.join("z1")).unwrap();
        fs::create_dir_all(platform_dir.join("sky")).unwrap();
        fs::write(platform_dir.join("README"), "not a platform").unwrap();

        let platforms = discover_platforms(root.path()).unwrap();
        assert_eq!(platforms.into_iter().collect::<Vec<_>>(), vec!["sky".to_string(), "z1".to_string()]);
    }

    #[test]
    fn test_missing_platform_dir() {
        let root = TempDir::new().unwrap();
        assert!(matches!(discover_platforms(root.path()), Err(EnvironmentError::MissingPlatformDir(_))));
    }
}
