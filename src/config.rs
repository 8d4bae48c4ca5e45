use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::init::get_config_dir;
use crate::rule47_config::Rule47Toml;
use crate::session::AgentIds;

pub const ENV_AGENT_ENDPOINT: &str = "RULE47_AGENT_ENDPOINT";
pub const ENV_API_KEY: &str = "RULE47_API_KEY";
pub const ENV_MANAGER_AGENT_ID: &str = "RULE47_MANAGER_AGENT_ID";
pub const ENV_PUBLISHER_AGENT_ID: &str = "RULE47_PUBLISHER_AGENT_ID";

/// Runtime configuration.
///
/// Bridges `rule47.toml` with environment overrides and resolves paths
/// against the project directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub project_dir: PathBuf,
    pub config_dir: PathBuf,
    pub storage_file: PathBuf,
    pub agent_endpoint: String,
    pub api_key: Option<String>,
    pub agents: AgentIds,
    pub verbose: bool,
    toml: Rule47Toml,
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration for a project (file → environment).
    pub fn new(project_dir: &Path, verbose: bool) -> Result<Self> {
        let project_dir = project_dir
            .canonicalize()
            .context("Failed to resolve project directory")?;
        let config_dir = get_config_dir(&project_dir);
        let toml = Rule47Toml::load_or_default(&config_dir)?;

        let storage_file = {
            let file = PathBuf::from(&toml.storage.file);
            if file.is_absolute() {
                file
            } else {
                config_dir.join(file)
            }
        };

        let agent_endpoint =
            env_override(ENV_AGENT_ENDPOINT).unwrap_or_else(|| toml.agents.endpoint.clone());
        let agents = AgentIds {
            manager: env_override(ENV_MANAGER_AGENT_ID)
                .unwrap_or_else(|| toml.agents.manager_agent_id.clone()),
            publisher: env_override(ENV_PUBLISHER_AGENT_ID)
                .unwrap_or_else(|| toml.agents.publisher_agent_id.clone()),
        };

        Ok(Self {
            project_dir,
            config_dir,
            storage_file,
            agent_endpoint,
            api_key: env_override(ENV_API_KEY),
            agents,
            verbose,
            toml,
        })
    }

    pub fn toml(&self) -> &Rule47Toml {
        &self.toml
    }

    pub fn quota_bytes(&self) -> usize {
        self.toml.storage.quota_bytes
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.toml.agents.request_timeout_secs.map(Duration::from_secs)
    }

    /// Delays for the cosmetic generation steps; at most two are used.
    pub fn step_delays(&self) -> Vec<Duration> {
        self.toml
            .ui
            .step_delays_secs
            .iter()
            .take(2)
            .map(|s| Duration::from_secs(*s))
            .collect()
    }

    pub fn draft_redirect(&self) -> Duration {
        Duration::from_millis(self.toml.ui.draft_redirect_ms)
    }

    pub fn storefront_url(&self) -> &str {
        &self.toml.storefront.url
    }

    pub fn validate(&self) -> Vec<String> {
        self.toml.validate()
    }
}
