use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "rule47")]
#[command(version, about = "RULE 47 digital product factory")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a .rule47 directory with a default rule47.toml
    Init,
    /// Generate a product package, review it, then publish or save a draft
    Create {
        /// Product idea; skips the intake prompts when given
        #[arg(long)]
        idea: Option<String>,

        /// Product type (defaults to "Digital Product")
        #[arg(long = "type")]
        product_type: Option<String>,

        /// Target audience (defaults to "General")
        #[arg(long)]
        audience: Option<String>,

        /// Price range (defaults to "Mid-range ($15-$49)")
        #[arg(long)]
        price_range: Option<String>,

        /// Publish right after generation without review prompts
        #[arg(long, conflicts_with = "draft")]
        publish: bool,

        /// Save as a draft right after generation without review prompts
        #[arg(long)]
        draft: bool,
    },
    /// Browse, inspect and delete saved products
    Catalog {
        #[command(subcommand)]
        command: Option<CatalogCommands>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show the service-offline notice
    Offline,
}

#[derive(Subcommand, Clone)]
pub enum CatalogCommands {
    /// List products
    List {
        /// Status filter: all, live, draft
        #[arg(long, default_value = "all")]
        status: String,

        /// Case-insensitive text to match against name and title
        #[arg(short, long)]
        search: Option<String>,

        /// Layout: grid or list (defaults to the configured layout)
        #[arg(long)]
        layout: Option<String>,

        /// Show built-in sample products instead of saved ones
        #[arg(long)]
        samples: bool,
    },
    /// Show one product with its research, content and listing
    Show {
        id: String,

        /// Look the id up among the sample products
        #[arg(long)]
        samples: bool,
    },
    /// Delete a saved product
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default rule47.toml file
    Init,
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "rule47=debug" } else { "rule47=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Init => cmd::cmd_init(&project_dir)?,
        Commands::Create {
            idea,
            product_type,
            audience,
            price_range,
            publish,
            draft,
        } => {
            let options = cmd::CreateOptions {
                idea: idea.clone(),
                product_type: product_type.clone(),
                audience: audience.clone(),
                price_range: price_range.clone(),
                finish: if *publish {
                    Some(cmd::Finish::Publish)
                } else if *draft {
                    Some(cmd::Finish::Draft)
                } else {
                    None
                },
            };
            cmd::cmd_create(&project_dir, cli.verbose, options).await?;
        }
        Commands::Catalog { command } => {
            cmd::cmd_catalog(&project_dir, cli.verbose, command.clone())?
        }
        Commands::Config { command } => cmd::cmd_config(&project_dir, command.clone())?,
        Commands::Offline => cmd::cmd_offline(&project_dir)?,
    }

    Ok(())
}
