//! Initialization of the `.rule47/` directory.
//!
//! ```text
//! .rule47/
//! ├── rule47.toml          # Agent endpoint, storage and UI settings
//! └── local_storage.json   # Key/value storage holding the product catalog
//! ```
//!
//! The storage file is created lazily on the first catalog write.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::rule47_config::{CONFIG_FILE, Rule47Toml};

/// The name of the configuration directory.
pub const CONFIG_DIR: &str = ".rule47";

/// Result of initializing a project.
#[derive(Debug)]
pub struct InitResult {
    pub config_dir: PathBuf,
    /// Whether the directory was newly created (false if it already existed)
    pub created: bool,
}

/// Create `.rule47/` with a default `rule47.toml`. Existing files are kept.
pub fn init_project(project_dir: &Path) -> Result<InitResult> {
    let config_dir = get_config_dir(project_dir);
    let created = !config_dir.exists();

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create directory: {}", config_dir.display()))?;

    let config_file = config_dir.join(CONFIG_FILE);
    if !config_file.exists() {
        Rule47Toml::default().save(&config_file)?;
    }

    Ok(InitResult {
        config_dir,
        created,
    })
}

pub fn is_initialized(project_dir: &Path) -> bool {
    project_dir.join(CONFIG_DIR).exists()
}

pub fn get_config_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_project_creates_config_directory() {
        let dir = tempdir().unwrap();
        let result = init_project(dir.path()).unwrap();

        assert!(result.created);
        assert_eq!(result.config_dir, dir.path().join(".rule47"));
        assert!(result.config_dir.join("rule47.toml").exists());
        assert!(is_initialized(dir.path()));
    }

    #[test]
    fn test_init_project_is_idempotent_and_keeps_config() {
        let dir = tempdir().unwrap();
        init_project(dir.path()).unwrap();
        let config_file = dir.path().join(".rule47/rule47.toml");
        std::fs::write(&config_file, "[agents]\nmanager_agent_id = \"custom\"\n").unwrap();

        let result = init_project(dir.path()).unwrap();
        assert!(!result.created);
        let content = std::fs::read_to_string(&config_file).unwrap();
        assert!(content.contains("custom"));
    }

    #[test]
    fn test_not_initialized_by_default() {
        let dir = tempdir().unwrap();
        assert!(!is_initialized(dir.path()));
    }
}
