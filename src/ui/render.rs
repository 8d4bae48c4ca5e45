//! Text rendering for the review tabs, the catalog and the offline notice.
//!
//! Everything here returns strings so commands decide where output goes.

use console::style;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::catalog::{ProductRecord, ProductStatus};
use crate::editor::ListingEditor;
use crate::normalize::display_text;
use crate::package::{ContentView, ListingView, ResearchView};
use crate::ui::icons::{
    CONTENT, DRAFT, FILE, LINK, LISTING, LIVE, LOCK, PACKAGE, RESEARCH, SPARKLE, WARN,
};

const CARD_WIDTH: usize = 38;
const DEFAULT_WIDTH: usize = 80;

static BOLD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());

/// Catalog layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogLayout {
    #[default]
    Grid,
    List,
}

impl std::str::FromStr for CatalogLayout {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "list" => Self::List,
            _ => Self::Grid,
        })
    }
}

impl CatalogLayout {
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

/// Terminal width, or 80 columns when it can't be determined.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Minimal markdown for agent-written text: headings, bullets, **bold**.
pub fn render_markdown(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();
        if let Some(heading) = trimmed.strip_prefix('#') {
            let heading = heading.trim_start_matches('#').trim();
            lines.push(format!("{}", style(heading).bold().underlined()));
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            let indent = line.len() - trimmed.len();
            let prefix = format!("{}• ", " ".repeat(indent));
            let wrapped = textwrap::fill(
                &emphasize(item),
                textwrap::Options::new(width).initial_indent(&prefix).subsequent_indent(
                    &" ".repeat(prefix.chars().count()),
                ),
            );
            lines.extend(wrapped.lines().map(str::to_string));
        } else if trimmed.is_empty() {
            lines.push(String::new());
        } else {
            lines.extend(
                textwrap::wrap(&emphasize(line), width)
                    .into_iter()
                    .map(|l| l.into_owned()),
            );
        }
    }
    lines
}

fn emphasize(text: &str) -> String {
    BOLD_REGEX.replace_all(text, |caps: &regex::Captures<'_>| {
        style(&caps[1]).bold().to_string()
    })
    .into_owned()
}

fn section(title: &str) -> String {
    format!("{}", style(title).cyan().bold())
}

fn field(label: &str, value: &str) -> String {
    format!("  {} {}", style(format!("{label}:")).dim(), value)
}

fn describe_entry(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let name = ["name", "title", "product", "source"]
                .iter()
                .find_map(|k| map.get(*k).and_then(display_text));
            let rest: Vec<String> = map
                .iter()
                .filter(|(k, _)| !matches!(k.as_str(), "name" | "title" | "product" | "source"))
                .filter_map(|(k, v)| display_text(v).map(|v| format!("{k}: {v}")))
                .collect();
            match (name, rest.is_empty()) {
                (Some(name), true) => name,
                (Some(name), false) => format!("{name} ({})", rest.join(", ")),
                (None, _) => rest.join(", "),
            }
        }
        other => display_text(other).unwrap_or_default(),
    }
}

fn list_or_none(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let items: Vec<String> = items.into_iter().map(|i| format!("    • {i}")).collect();
    if items.is_empty() {
        vec![format!("    {}", style("None listed").dim())]
    } else {
        items
    }
}

/// The market research tab.
pub fn research_tab(research: &ResearchView, width: usize) -> Vec<String> {
    let mut lines = vec![format!("{}{}", RESEARCH, section("Market Research"))];
    lines.push(field("Overview", &research.market_overview));
    lines.push(field("Target audience", &research.target_audience));
    lines.push(field("Market size", &research.market_size));
    lines.push(field("Demand", &research.demand_level));
    lines.push(field("Recommended price", &research.recommended_price));
    lines.push(String::new());
    lines.push(format!("  {}", style("Competitors").bold()));
    lines.extend(list_or_none(research.competitors.iter().map(describe_entry)));
    lines.push(format!("  {}", style("Pricing benchmarks").bold()));
    lines.extend(list_or_none(research.pricing_benchmarks.iter().map(describe_entry)));
    if !research.opportunities.is_empty() {
        lines.push(format!("  {}", style("Opportunities").bold()));
        for item in &research.opportunities {
            lines.extend(
                textwrap::wrap(item, width.saturating_sub(6).max(20))
                    .into_iter()
                    .map(|l| format!("    • {l}")),
            );
        }
    }
    lines
}

/// The product content tab.
pub fn content_tab(content: &ContentView, width: usize) -> Vec<String> {
    let mut lines = vec![format!("{}{}", CONTENT, section("Product Content"))];
    lines.push(field("Format", &content.format));
    if !content.summary.is_empty() {
        lines.push(field("Summary", &content.summary));
    }
    let stack = if content.tech_stack.is_empty() {
        "N/A".to_string()
    } else {
        content.tech_stack.join(", ")
    };
    lines.push(field("Tech stack", &stack));
    lines.push(String::new());
    lines.push(format!("  {}", style(format!("Files ({})", content.files.len())).bold()));
    if content.files.is_empty() {
        lines.push(format!("    {}", style("No files").dim()));
    }
    for file in &content.files {
        match &file.description {
            Some(desc) => lines.push(format!("    {}{} {}", FILE, file.name, style(desc).dim())),
            None => lines.push(format!("    {}{}", FILE, file.name)),
        }
    }
    if !content.body.is_empty() {
        lines.push(String::new());
        lines.extend(render_markdown(&content.body, width));
    }
    lines
}

/// The listing tab, showing the editable copy alongside generated SEO keywords.
pub fn listing_tab(editor: &ListingEditor, generated: &ListingView, width: usize) -> Vec<String> {
    let mut lines = vec![format!("{}{}", LISTING, section("Listing"))];
    lines.push(field("Title", &editor.title));
    lines.push(field("Tagline", &editor.tagline));
    lines.push(field("Price", &format!("${:.2}", editor.price())));
    lines.push(format!("  {}", style("Description:").dim()));
    lines.extend(
        render_markdown(&editor.description, width.saturating_sub(4).max(20))
            .into_iter()
            .map(|l| format!("    {l}")),
    );
    lines.push(format!("  {}", style("Feature bullets").bold()));
    lines.extend(list_or_none(
        editor
            .bullets()
            .iter()
            .enumerate()
            .map(|(i, b)| format!("{}. {b}", i + 1)),
    ));
    let tags = if editor.tags().is_empty() {
        style("none").dim().to_string()
    } else {
        editor
            .tags()
            .iter()
            .map(|t| format!("#{t}"))
            .collect::<Vec<_>>()
            .join(" ")
    };
    lines.push(field("Tags", &tags));
    if !generated.seo_keywords.is_empty() {
        lines.push(field("SEO keywords", &generated.seo_keywords.join(", ")));
    }
    lines
}

fn status_badge(status: ProductStatus) -> String {
    match status {
        ProductStatus::Live => format!("{}{}", LIVE, style("Live").green()),
        ProductStatus::Draft => format!("{}{}", DRAFT, style("Draft").yellow()),
    }
}

fn short_date(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.format("%b %d, %Y").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

fn pad(text: &str, width: usize) -> String {
    let visible = console::measure_text_width(text);
    format!("{text}{}", " ".repeat(width.saturating_sub(visible)))
}

fn card(record: &ProductRecord) -> Vec<String> {
    let inner = CARD_WIDTH - 4;
    let body = [
        style(truncate(record.display_name(), inner)).bold().to_string(),
        style(truncate(&record.product_type, inner)).dim().to_string(),
        format!("{}  ${:.2}", status_badge(record.status), record.price),
        style(truncate(&record.tagline, inner)).italic().to_string(),
        style(truncate(&record.id, inner)).dim().to_string(),
    ];
    let mut lines = vec![format!("┌{}┐", "─".repeat(CARD_WIDTH - 2))];
    lines.extend(body.iter().map(|l| format!("│ {} │", pad(l, inner))));
    lines.push(format!("└{}┘", "─".repeat(CARD_WIDTH - 2)));
    lines
}

/// Catalog cards laid out in as many columns as fit.
pub fn catalog_grid(records: &[&ProductRecord], width: usize) -> Vec<String> {
    let columns = (width / (CARD_WIDTH + 1)).max(1);
    let mut lines = Vec::new();
    for row in records.chunks(columns) {
        let cards: Vec<Vec<String>> = row.iter().map(|r| card(r)).collect();
        let height = cards.iter().map(Vec::len).max().unwrap_or(0);
        for i in 0..height {
            let line: Vec<&str> = cards
                .iter()
                .map(|c| c.get(i).map(String::as_str).unwrap_or(""))
                .collect();
            lines.push(line.join(" "));
        }
    }
    lines
}

/// One row per record.
pub fn catalog_list(records: &[&ProductRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                "{} {} {} {} {}",
                pad(&status_badge(r.status), 12),
                pad(&style(truncate(r.display_name(), 36)).bold().to_string(), 36),
                pad(&format!("${:.2}", r.price), 9),
                pad(&style(short_date(&r.created_at)).dim().to_string(), 13),
                style(&r.id).dim()
            )
        })
        .collect()
}

/// Full detail for one record: header plus the three tabs.
pub fn record_detail(record: &ProductRecord, width: usize) -> Vec<String> {
    let mut lines = vec![
        format!("{}{}", PACKAGE, style(record.display_name()).bold()),
        field("Status", &status_badge(record.status)),
        field("Type", &record.product_type),
        field("Created", &short_date(&record.created_at)),
    ];
    if let Some(at) = &record.published_at {
        lines.push(field("Published", &short_date(at)));
    }
    lines.push(field("ID", &record.id));
    lines.push(String::new());

    let (editor, view) = {
        let mut view = ListingView::from_value(&record.listing);
        view.title = record.title.clone();
        view.tagline = record.tagline.clone();
        view.description = record.description.clone();
        view.price = record.price;
        view.feature_bullets = record.feature_bullets.clone();
        view.category_tags = record.category_tags.clone();
        (ListingEditor::seed(&view), view)
    };
    lines.extend(listing_tab(&editor, &view, width));
    lines.push(String::new());
    lines.extend(research_tab(&ResearchView::from_value(&record.market_research), width));
    lines.push(String::new());
    lines.extend(content_tab(&ContentView::from_value(&record.product_content), width));

    if let Some(response) = &record.publisher_response {
        lines.push(String::new());
        lines.push(section("Publisher response"));
        let pretty =
            serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string());
        lines.extend(pretty.lines().map(|l| format!("  {}", style(l).dim())));
    }
    lines
}

/// The inline error banner.
pub fn error_banner(message: &str) -> String {
    format!("{}{}", WARN, style(message).red())
}

/// The static "service offline" notice.
pub fn offline_notice(storefront_url: &str) -> Vec<String> {
    vec![
        String::new(),
        format!("  {}{}", SPARKLE, style("RULE 47").bold()),
        format!("  {}", style("Digital Product Factory").dim()),
        String::new(),
        format!("  {}{}", LOCK, style("App Unavailable").red().bold()),
        "  This application has been taken offline and is no longer available on the marketplace."
            .to_string(),
        String::new(),
        format!("  {}{}", WARN, style("Delisted from marketplace").bold()),
        format!(
            "  {}",
            style("The RULE 47 Digital Product Factory is no longer accepting new visitors.").dim()
        ),
        format!(
            "  {}",
            style("All existing products remain accessible through the Payhip store.").dim()
        ),
        String::new(),
        format!("  {}", style("[Status: Offline]").dim()),
        String::new(),
        format!(
            "  {}{} {}",
            LINK,
            style("RULE 47 Store").green().bold(),
            style(storefront_url).green().underlined()
        ),
        format!("  {}", style("Existing products are still available on Payhip").green()),
        String::new(),
    ]
}
