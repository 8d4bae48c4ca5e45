//! Configuration view and validation commands — `rule47 config`.

use anyhow::Result;

use super::super::ConfigCommands;

pub fn cmd_config(project_dir: &std::path::Path, command: Option<ConfigCommands>) -> Result<()> {
    use rule47::config::Config;
    use rule47::init::get_config_dir;
    use rule47::rule47_config::{CONFIG_FILE, Rule47Toml};

    let config_dir = get_config_dir(project_dir);
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("RULE 47 Configuration");
            println!("=====================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No rule47.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let config = Config::new(project_dir, false)?;
            let toml = config.toml();

            println!("[agents]");
            println!("  endpoint = \"{}\"", toml.agents.endpoint);
            println!("  manager_agent_id = \"{}\"", toml.agents.manager_agent_id);
            println!("  publisher_agent_id = \"{}\"", toml.agents.publisher_agent_id);
            if let Some(secs) = toml.agents.request_timeout_secs {
                println!("  request_timeout_secs = {}", secs);
            }
            println!();
            println!("[storage]");
            println!("  file = \"{}\"", toml.storage.file);
            println!("  quota_bytes = {}", toml.storage.quota_bytes);
            println!();
            println!("[ui]");
            println!("  step_delays_secs = {:?}", toml.ui.step_delays_secs);
            println!("  draft_redirect_ms = {}", toml.ui.draft_redirect_ms);
            println!("  layout = \"{}\"", toml.ui.layout);
            println!("  sample_data = {}", toml.ui.sample_data);
            println!();
            println!("[storefront]");
            println!("  url = \"{}\"", toml.storefront.url);
            println!();

            println!("Effective values (with env overrides):");
            println!("  endpoint = \"{}\"", config.agent_endpoint);
            println!("  manager_agent_id = \"{}\"", config.agents.manager);
            println!("  publisher_agent_id = \"{}\"", config.agents.publisher);
            println!(
                "  api_key = {}",
                if config.api_key.is_some() { "set" } else { "not set" }
            );
            println!("  storage = {}", config.storage_file.display());
            println!();

            if !config_path.exists() {
                println!("Run 'rule47 config init' to create a rule47.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No rule47.toml found. Using defaults (valid).");
                return Ok(());
            }

            let toml = Rule47Toml::load(&config_path)?;
            let warnings = toml.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("rule47.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if !config_dir.exists() {
                std::fs::create_dir_all(&config_dir)?;
            }

            Rule47Toml::default().save(&config_path)?;

            println!("Created rule47.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [agents] endpoint, manager_agent_id, publisher_agent_id");
            println!("  - [storage] file, quota_bytes");
            println!("  - [ui] step_delays_secs, draft_redirect_ms, layout, sample_data");
            println!();
        }
    }

    Ok(())
}
