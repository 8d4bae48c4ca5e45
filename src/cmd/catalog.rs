//! Catalog browsing and deletion — `rule47 catalog`.

use anyhow::{Context, Result};
use console::style;
use dialoguer::Confirm;

use rule47::catalog::samples::display_records;
use rule47::catalog::{CatalogFilter, CatalogStore, ProductRecord, ProductStatus, StatusFilter};
use rule47::config::Config;
use rule47::storage::FileStorage;
use rule47::ui::CatalogLayout;
use rule47::ui::render::{catalog_grid, catalog_list, record_detail, terminal_width};

use super::super::CatalogCommands;

pub fn open_catalog(config: &Config) -> CatalogStore<FileStorage> {
    CatalogStore::load(FileStorage::new(&config.storage_file, config.quota_bytes()))
}

/// Print the catalog screen: counts, the filtered records, and a hint when
/// nothing matches.
pub fn print_catalog(
    records: &[ProductRecord],
    filter: &CatalogFilter,
    layout: CatalogLayout,
    is_sample: bool,
) {
    let live = records
        .iter()
        .filter(|r| r.status == ProductStatus::Live)
        .count();
    let drafts = records.len() - live;

    println!();
    println!(
        "{}  {} total, {} live, {} drafts",
        style("Product Catalog").bold(),
        records.len(),
        live,
        drafts
    );
    if is_sample {
        println!(
            "{}",
            style("Showing sample products. Nothing here is saved.").yellow()
        );
    }
    println!();

    if records.is_empty() {
        println!("No products yet.");
        println!("Run `rule47 create` to generate one, or add --samples to preview the catalog.");
        return;
    }

    let shown = filter.apply(records);
    if shown.is_empty() {
        println!("No products match the current filter.");
        return;
    }

    let lines = match layout {
        CatalogLayout::Grid => catalog_grid(&shown, terminal_width()),
        CatalogLayout::List => catalog_list(&shown),
    };
    for line in lines {
        println!("{line}");
    }
    println!();
}

pub fn cmd_catalog(
    project_dir: &std::path::Path,
    verbose: bool,
    command: Option<CatalogCommands>,
) -> Result<()> {
    let config = Config::new(project_dir, verbose)?;
    let command = command.unwrap_or(CatalogCommands::List {
        status: "all".to_string(),
        search: None,
        layout: None,
        samples: false,
    });

    match command {
        CatalogCommands::List {
            status,
            search,
            layout,
            samples,
        } => {
            let status: StatusFilter = status.parse().map_err(anyhow::Error::msg)?;
            let filter = CatalogFilter {
                status,
                search: search.unwrap_or_default(),
            };
            let layout =
                CatalogLayout::parse(layout.as_deref().unwrap_or(&config.toml().ui.layout));

            let catalog = open_catalog(&config);
            let (records, is_sample) =
                display_records(catalog.records(), samples || config.toml().ui.sample_data);
            print_catalog(&records, &filter, layout, is_sample);
        }
        CatalogCommands::Show { id, samples } => {
            let catalog = open_catalog(&config);
            let (records, _) =
                display_records(catalog.records(), samples || config.toml().ui.sample_data);
            let record = records
                .iter()
                .find(|r| r.id == id)
                .with_context(|| format!("Product '{}' not found", id))?;
            println!();
            for line in record_detail(record, terminal_width()) {
                println!("{line}");
            }
            println!();
        }
        CatalogCommands::Delete { id, force } => {
            let mut catalog = open_catalog(&config);
            let Some(record) = catalog.get(&id) else {
                println!("Product '{}' not found.", id);
                return Ok(());
            };

            if !force {
                let confirm = Confirm::new()
                    .with_prompt(format!("Delete '{}'?", record.display_name()))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirm {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }

            if let Some(removed) = catalog.remove(&id) {
                println!("Deleted '{}'", removed.display_name());
            }
        }
    }

    Ok(())
}
