//! Configuration file for the product factory.
//!
//! Settings live in `.rule47/rule47.toml`. Every key is optional; missing keys
//! take the defaults shown here. Environment variables override the file (see
//! [`crate::config::Config`]).
//!
//! # Configuration File Format
//!
//! ```toml
//! [agents]
//! endpoint = "http://localhost:3000/api/agent"
//! manager_agent_id = "product-manager"
//! publisher_agent_id = "payhip-publisher"
//! # request_timeout_secs = 300
//!
//! [storage]
//! file = "local_storage.json"
//! quota_bytes = 5242880
//!
//! [ui]
//! step_delays_secs = [8, 20]
//! draft_redirect_ms = 1500
//! layout = "grid"
//! sample_data = false
//!
//! [storefront]
//! url = "https://payhip.com/RULE47"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::storage::DEFAULT_QUOTA_BYTES;

pub const CONFIG_FILE: &str = "rule47.toml";
pub const DEFAULT_STOREFRONT_URL: &str = "https://payhip.com/RULE47";

/// Agent endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_manager_agent_id")]
    pub manager_agent_id: String,
    #[serde(default = "default_publisher_agent_id")]
    pub publisher_agent_id: String,
    /// No timeout when unset; a hung request keeps the spinner running.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    "http://localhost:3000/api/agent".to_string()
}

fn default_manager_agent_id() -> String {
    "product-manager".to_string()
}

fn default_publisher_agent_id() -> String {
    "payhip-publisher".to_string()
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            manager_agent_id: default_manager_agent_id(),
            publisher_agent_id: default_publisher_agent_id(),
            request_timeout_secs: None,
        }
    }
}

/// Local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    /// Storage file, relative to the `.rule47` directory unless absolute.
    #[serde(default = "default_storage_file")]
    pub file: String,
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: usize,
}

fn default_storage_file() -> String {
    "local_storage.json".to_string()
}

fn default_quota_bytes() -> usize {
    DEFAULT_QUOTA_BYTES
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            file: default_storage_file(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

/// Terminal UI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSection {
    #[serde(default = "default_step_delays_secs")]
    pub step_delays_secs: Vec<u64>,
    #[serde(default = "default_draft_redirect_ms")]
    pub draft_redirect_ms: u64,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default)]
    pub sample_data: bool,
}

fn default_step_delays_secs() -> Vec<u64> {
    vec![8, 20]
}

fn default_draft_redirect_ms() -> u64 {
    1500
}

fn default_layout() -> String {
    "grid".to_string()
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            step_delays_secs: default_step_delays_secs(),
            draft_redirect_ms: default_draft_redirect_ms(),
            layout: default_layout(),
            sample_data: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontSection {
    #[serde(default = "default_storefront_url")]
    pub url: String,
}

fn default_storefront_url() -> String {
    DEFAULT_STOREFRONT_URL.to_string()
}

impl Default for StorefrontSection {
    fn default() -> Self {
        Self {
            url: default_storefront_url(),
        }
    }
}

/// Parsed `rule47.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Rule47Toml {
    #[serde(default)]
    pub agents: AgentsSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub ui: UiSection,
    #[serde(default)]
    pub storefront: StorefrontSection,
}

impl Rule47Toml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse rule47.toml")
    }

    /// Load `.rule47/rule47.toml`, or defaults when the file doesn't exist.
    pub fn load_or_default(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize rule47.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Problems worth mentioning that don't stop the tool from running.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let endpoint = &self.agents.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            warnings.push(format!(
                "agents.endpoint '{}' is not an http(s) URL",
                self.agents.endpoint
            ));
        }
        if self.agents.manager_agent_id.trim().is_empty() {
            warnings.push("agents.manager_agent_id is empty".to_string());
        }
        if self.agents.publisher_agent_id.trim().is_empty() {
            warnings.push("agents.publisher_agent_id is empty".to_string());
        }
        if self.agents.request_timeout_secs == Some(0) {
            warnings.push("agents.request_timeout_secs = 0 fails every request".to_string());
        }
        if !self
            .ui
            .step_delays_secs
            .windows(2)
            .all(|pair| pair[0] <= pair[1])
        {
            warnings.push("ui.step_delays_secs should be in increasing order".to_string());
        }
        if self.ui.step_delays_secs.len() > 2 {
            warnings.push(format!(
                "ui.step_delays_secs has {} entries; only the first 2 are used",
                self.ui.step_delays_secs.len()
            ));
        }
        if !matches!(self.ui.layout.as_str(), "grid" | "list") {
            warnings.push(format!(
                "ui.layout '{}' is not 'grid' or 'list'; using grid",
                self.ui.layout
            ));
        }
        if self.storage.quota_bytes == 0 {
            warnings.push("storage.quota_bytes = 0 means nothing will ever be saved".to_string());
        }

        warnings
    }
}
