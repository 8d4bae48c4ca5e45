//! Project initialization and the offline notice.

use anyhow::Result;

pub fn cmd_init(project_dir: &std::path::Path) -> Result<()> {
    use rule47::init::{init_project, is_initialized};

    let was_initialized = is_initialized(project_dir);
    let result = init_project(project_dir)?;

    if result.created {
        println!(
            "Initialized RULE 47 project at {}",
            result.config_dir.display()
        );
        println!();
        println!("Created directory structure:");
        println!("  .rule47/");
        println!("  ├── rule47.toml          # Agent endpoint, storage and UI settings");
        println!("  └── local_storage.json   # Product catalog (created on first save)");
        println!();
        println!("Next steps:");
        println!("  1. Set RULE47_API_KEY (or add it to .env)");
        println!("  2. Run `rule47 create` to generate your first product");
        println!("  3. Run `rule47 catalog list` to browse saved products");
    } else if was_initialized {
        println!(
            "RULE 47 project already initialized at {}",
            result.config_dir.display()
        );
        println!("Configuration kept.");
    }

    Ok(())
}

pub fn cmd_offline(project_dir: &std::path::Path) -> Result<()> {
    use rule47::rule47_config::Rule47Toml;
    use rule47::ui::render::offline_notice;

    let toml = Rule47Toml::load_or_default(&rule47::init::get_config_dir(project_dir))?;
    for line in offline_notice(&toml.storefront.url) {
        println!("{line}");
    }
    Ok(())
}
