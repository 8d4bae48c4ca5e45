//! The product workflow — `rule47 create`.
//!
//! Intake → Generation → Review/Edit → Publish | Draft → Catalog. Any error
//! escaping a screen lands on a recoverable error screen that offers to start
//! over; saved products are never touched by it.

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Confirm, Input, Select};

use rule47::agent::HttpAgentClient;
use rule47::catalog::CatalogFilter;
use rule47::config::Config;
use rule47::errors::SessionError;
use rule47::intake::{
    DEFAULT_AUDIENCE, DEFAULT_PRICE_RANGE, DEFAULT_PRODUCT_TYPE, IntakeForm, PRICE_RANGES,
    PRODUCT_TYPES,
};
use rule47::session::Session;
use rule47::storage::FileStorage;
use rule47::ui::icons::{CHECK, CROSS, DRAFT, WARN};
use rule47::ui::render::{content_tab, error_banner, listing_tab, research_tab, terminal_width};
use rule47::ui::{CatalogLayout, GenerationUI};

use super::catalog::{open_catalog, print_catalog};

type FactorySession = Session<HttpAgentClient, FileStorage>;

/// How a scripted run ends once the package is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    Publish,
    Draft,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub idea: Option<String>,
    pub product_type: Option<String>,
    pub audience: Option<String>,
    pub price_range: Option<String>,
    pub finish: Option<Finish>,
}

enum Outcome {
    Done,
    StartOver,
}

const REVIEW_ACTIONS: &[&str] = &[
    "View listing",
    "View market research",
    "View product content",
    "Edit title",
    "Edit tagline",
    "Edit description",
    "Edit price",
    "Add feature bullet",
    "Edit feature bullet",
    "Remove feature bullet",
    "Add tag",
    "Remove tag",
    "Publish to Payhip",
    "Save as draft",
    "Start over",
    "Quit",
];

pub async fn cmd_create(
    project_dir: &std::path::Path,
    verbose: bool,
    options: CreateOptions,
) -> Result<()> {
    let config = Config::new(project_dir, verbose)?;
    for warning in config.validate() {
        tracing::warn!(%warning, "configuration");
    }
    if config.api_key.is_none() {
        println!(
            "{}{}",
            WARN,
            style("RULE47_API_KEY is not set; the agent service may reject requests.").yellow()
        );
    }

    let agent = HttpAgentClient::new(
        &config.agent_endpoint,
        config.api_key.clone(),
        config.request_timeout(),
    )?;
    let mut session = Session::new(agent, config.agents.clone(), open_catalog(&config))
        .with_step_delays(config.step_delays());

    loop {
        match run_flow(&config, &mut session, &options).await {
            Ok(Outcome::Done) => return Ok(()),
            Ok(Outcome::StartOver) => session.start_over(),
            Err(e) => {
                print_error_screen(&e);
                if options.finish.is_some() {
                    return Err(e);
                }
                let again = Confirm::new()
                    .with_prompt("Start over?")
                    .default(true)
                    .interact()
                    .unwrap_or(false);
                if !again {
                    return Ok(());
                }
                session.start_over();
            }
        }
    }
}

fn print_error_screen(err: &anyhow::Error) {
    eprintln!();
    eprintln!("{}{}", CROSS, style("Something went wrong").red().bold());
    eprintln!("  {:#}", err);
    eprintln!(
        "  {}",
        style("Saved products are unaffected. You can start over with a new idea.").dim()
    );
    eprintln!();
}

async fn run_flow(
    config: &Config,
    session: &mut FactorySession,
    options: &CreateOptions,
) -> Result<Outcome> {
    let form = loop {
        let form = collect_intake(options)?;
        match form.validate() {
            Ok(()) => break form,
            Err(e) if options.idea.is_some() => bail!(e),
            Err(e) => println!("{}", error_banner(&e.to_string())),
        }
    };

    loop {
        let ui = GenerationUI::new("manager");
        let result = session
            .generate(&form, Some(ui.bar()))
            .await
            .map(|package| package.product_name.clone());
        match result {
            Ok(name) => {
                ui.success(&format!("Package ready: {}", name));
                break;
            }
            Err(e) => {
                let message = session
                    .error()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string());
                ui.failed(&message);
                if options.finish.is_some() {
                    bail!(message);
                }
                let choice = Select::new()
                    .with_prompt("Generation failed")
                    .items(&["Retry", "Start over", "Quit"])
                    .default(0)
                    .interact()
                    .context("Failed to read selection")?;
                match choice {
                    0 => continue,
                    1 => return Ok(Outcome::StartOver),
                    _ => return Ok(Outcome::Done),
                }
            }
        }
    }

    match options.finish {
        Some(Finish::Publish) => {
            if !publish(session).await {
                bail!(
                    "{}",
                    session.error().unwrap_or("Publishing failed").to_string()
                );
            }
            show_catalog(config, session);
            Ok(Outcome::Done)
        }
        Some(Finish::Draft) => {
            save_draft(config, session).await?;
            Ok(Outcome::Done)
        }
        None => review(config, session).await,
    }
}

fn collect_intake(options: &CreateOptions) -> Result<IntakeForm> {
    if let Some(idea) = &options.idea {
        return Ok(IntakeForm {
            idea: idea.clone(),
            product_type: options.product_type.clone(),
            target_audience: options.audience.clone(),
            price_range: options.price_range.clone(),
        });
    }

    println!();
    println!("{}", style("New product").bold());
    let idea: String = Input::new()
        .with_prompt("Describe your product idea")
        .allow_empty(true)
        .interact_text()
        .context("Failed to read product idea")?;

    let product_type = match &options.product_type {
        Some(t) => Some(t.clone()),
        None => select_optional("Product type", PRODUCT_TYPES, DEFAULT_PRODUCT_TYPE)?,
    };
    let target_audience = match &options.audience {
        Some(a) => Some(a.clone()),
        None => {
            let audience: String = Input::new()
                .with_prompt(format!("Target audience (blank for {})", DEFAULT_AUDIENCE))
                .allow_empty(true)
                .interact_text()
                .context("Failed to read target audience")?;
            Some(audience)
        }
    };
    let price_range = match &options.price_range {
        Some(p) => Some(p.clone()),
        None => select_optional("Price range", PRICE_RANGES, DEFAULT_PRICE_RANGE)?,
    };

    Ok(IntakeForm {
        idea,
        product_type,
        target_audience,
        price_range,
    })
}

fn select_optional(prompt: &str, items: &[&str], default: &str) -> Result<Option<String>> {
    let default_index = items.iter().position(|i| *i == default).unwrap_or(0);
    let index = Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default_index)
        .interact()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))?;
    Ok(items.get(index).map(|s| s.to_string()))
}

fn print_lines(lines: Vec<String>) {
    println!();
    for line in lines {
        println!("{line}");
    }
    println!();
}

async fn review(config: &Config, session: &mut FactorySession) -> Result<Outcome> {
    let width = terminal_width();
    if let Some(package) = session.package() {
        print_lines(listing_tab(session.editor(), &package.listing_view(), width));
    }

    loop {
        let choice = Select::new()
            .with_prompt("Review")
            .items(REVIEW_ACTIONS)
            .default(0)
            .interact()
            .context("Failed to read selection")?;

        let Some(package) = session.package() else {
            return Ok(Outcome::StartOver);
        };

        match REVIEW_ACTIONS[choice] {
            "View listing" => print_lines(listing_tab(
                session.editor(),
                &package.listing_view(),
                width,
            )),
            "View market research" => print_lines(research_tab(&package.research(), width)),
            "View product content" => print_lines(content_tab(&package.content(), width)),
            "Edit title" => {
                let current = session.editor().title.clone();
                session.editor_mut().title = prompt_text("Title", &current)?;
            }
            "Edit tagline" => {
                let current = session.editor().tagline.clone();
                session.editor_mut().tagline = prompt_text("Tagline", &current)?;
            }
            "Edit description" => {
                let current = session.editor().description.clone();
                session.editor_mut().description = prompt_text("Description", &current)?;
            }
            "Edit price" => {
                let current = format!("{:.2}", session.editor().price());
                let raw = prompt_text("Price (USD)", &current)?;
                match raw.trim().trim_start_matches('$').parse::<f64>() {
                    Ok(price) => {
                        if let Err(e) = session.editor_mut().set_price(price) {
                            println!("{}", error_banner(&e.to_string()));
                        }
                    }
                    Err(_) => println!("{}", error_banner(&format!("'{}' is not a price", raw))),
                }
            }
            "Add feature bullet" => {
                let text = prompt_text("New feature bullet", "")?;
                if !text.trim().is_empty() {
                    session.editor_mut().add_bullet(text);
                }
            }
            "Edit feature bullet" => {
                if let Some(index) = pick("Bullet to edit", session.editor().bullets())? {
                    let current = session.editor().bullets()[index].clone();
                    let text = prompt_text("Feature bullet", &current)?;
                    if let Err(e) = session.editor_mut().edit_bullet(index, text) {
                        println!("{}", error_banner(&e.to_string()));
                    }
                }
            }
            "Remove feature bullet" => {
                if let Some(index) = pick("Bullet to remove", session.editor().bullets())? {
                    if let Err(e) = session.editor_mut().remove_bullet(index) {
                        println!("{}", error_banner(&e.to_string()));
                    }
                }
            }
            "Add tag" => {
                let tag = prompt_text("New tag", "")?;
                session.editor_mut().add_tag(tag);
            }
            "Remove tag" => {
                if let Some(index) = pick("Tag to remove", session.editor().tags())? {
                    if let Err(e) = session.editor_mut().remove_tag(index) {
                        println!("{}", error_banner(&e.to_string()));
                    }
                }
            }
            "Publish to Payhip" => {
                if publish(session).await {
                    show_catalog(config, session);
                    return Ok(Outcome::Done);
                }
            }
            "Save as draft" => {
                save_draft(config, session).await?;
                return Ok(Outcome::Done);
            }
            "Start over" => return Ok(Outcome::StartOver),
            _ => {
                let discard = Confirm::new()
                    .with_prompt("Quit without saving this package?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if discard {
                    return Ok(Outcome::Done);
                }
            }
        }
    }
}

fn prompt_text(prompt: &str, initial: &str) -> Result<String> {
    Input::new()
        .with_prompt(prompt)
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("Failed to read {}", prompt.to_lowercase()))
}

fn pick(prompt: &str, items: &[String]) -> Result<Option<usize>> {
    if items.is_empty() {
        println!("Nothing to choose from.");
        return Ok(None);
    }
    let index = Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact_opt()
        .context("Failed to read selection")?;
    Ok(index)
}

/// Publish the current listing. Failures are shown inline and leave the
/// review screen as it was.
async fn publish(session: &mut FactorySession) -> bool {
    let ui = GenerationUI::new("publisher");
    ui.set_message("Publishing to Payhip...");
    let result = session
        .publish()
        .await
        .map(|record| record.title.clone());
    match result {
        Ok(title) => {
            ui.success(&format!("Published: {}", title));
            true
        }
        Err(SessionError::PublishInFlight) => {
            ui.failed("A publish is already in progress");
            false
        }
        Err(e) => {
            let message = session
                .error()
                .map(str::to_string)
                .unwrap_or_else(|| e.to_string());
            ui.failed(&message);
            false
        }
    }
}

async fn save_draft(config: &Config, session: &mut FactorySession) -> Result<()> {
    let title = session
        .save_draft()
        .map(|record| record.title.clone())
        .context("Failed to save draft")?;
    println!("{}{} {}", CHECK, DRAFT, style(format!("Draft saved: {}", title)).green());
    println!("{}", style("Opening catalog...").dim());
    tokio::time::sleep(config.draft_redirect()).await;
    show_catalog(config, session);
    Ok(())
}

fn show_catalog(config: &Config, session: &FactorySession) {
    print_catalog(
        session.catalog().records(),
        &CatalogFilter::default(),
        CatalogLayout::parse(&config.toml().ui.layout),
        false,
    );
}
