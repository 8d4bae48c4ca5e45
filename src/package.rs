//! The product package returned by the manager agent.
//!
//! The agent's response shape is producer-defined. [`ProductPackage::from_response`]
//! finds the package at either of the depths the agent has been seen to use and
//! back-fills every missing field, so rendering never has to deal with nulls.
//! The typed views below are read-only projections used for display and for
//! seeding the listing editor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::{parse_list, parse_object, parse_price, parse_string_list, text_field};

/// Placeholder for scalar research fields the agent left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// Normalized result of one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPackage {
    pub product_name: String,
    pub product_type: String,
    pub market_research: Value,
    pub product_content: Value,
    pub listing: Value,
    pub status: String,
    pub created_at: String,
}

impl ProductPackage {
    /// Extract a package from a manager agent response payload.
    ///
    /// The payload is `response.result` when that is an object, otherwise the
    /// response itself. Within it, the package is `product_package` when
    /// present, otherwise the payload is taken to be the package.
    pub fn from_response(response: &Value) -> Self {
        let payload = match response.get("result") {
            Some(result @ Value::Object(_)) => result,
            _ => response,
        };
        let package = match payload.get("product_package") {
            Some(inner @ Value::Object(_)) => inner,
            _ => payload,
        };
        let fields = package.as_object().cloned().unwrap_or_default();

        let listing = Value::Object(parse_object(fields.get("listing")));
        let product_name = text_field(&fields, "product_name")
            .or_else(|| text_field(&listing_map(&listing), "title"))
            .unwrap_or_default();

        Self {
            product_name,
            product_type: text_field(&fields, "product_type").unwrap_or_default(),
            market_research: Value::Object(parse_object(fields.get("market_research"))),
            product_content: Value::Object(parse_object(fields.get("product_content"))),
            listing,
            status: text_field(&fields, "status").unwrap_or_else(|| "generated".to_string()),
            created_at: text_field(&fields, "created_at")
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn research(&self) -> ResearchView {
        ResearchView::from_value(&self.market_research)
    }

    pub fn content(&self) -> ContentView {
        ContentView::from_value(&self.product_content)
    }

    pub fn listing_view(&self) -> ListingView {
        ListingView::from_value(&self.listing)
    }
}

fn listing_map(listing: &Value) -> Map<String, Value> {
    listing.as_object().cloned().unwrap_or_default()
}

fn text_or_na(map: &Map<String, Value>, key: &str) -> String {
    text_field(map, key).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Market research tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchView {
    pub market_overview: String,
    pub target_audience: String,
    pub market_size: String,
    pub demand_level: String,
    pub recommended_price: String,
    pub competitors: Vec<Value>,
    pub pricing_benchmarks: Vec<Value>,
    pub opportunities: Vec<String>,
}

impl ResearchView {
    pub fn from_value(value: &Value) -> Self {
        let map = parse_object(Some(value));
        Self {
            market_overview: text_or_na(&map, "market_overview"),
            target_audience: text_or_na(&map, "target_audience"),
            market_size: text_or_na(&map, "market_size"),
            demand_level: text_or_na(&map, "demand_level"),
            recommended_price: text_or_na(&map, "recommended_price"),
            competitors: parse_list(map.get("competitors")),
            pricing_benchmarks: parse_list(map.get("pricing_benchmarks")),
            opportunities: parse_string_list(map.get("opportunities")),
        }
    }
}

/// One file shipped with the product.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentFile {
    pub name: String,
    pub description: Option<String>,
}

/// Product content tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentView {
    pub format: String,
    pub summary: String,
    pub body: String,
    pub tech_stack: Vec<String>,
    pub files: Vec<ContentFile>,
}

impl ContentView {
    pub fn from_value(value: &Value) -> Self {
        let map = parse_object(Some(value));
        let files = parse_list(map.get("files"))
            .iter()
            .filter_map(|entry| match entry {
                Value::String(name) if !name.trim().is_empty() => Some(ContentFile {
                    name: name.clone(),
                    description: None,
                }),
                Value::Object(file) => {
                    let name = text_field(file, "name")
                        .or_else(|| text_field(file, "file_name"))
                        .or_else(|| text_field(file, "filename"))?;
                    Some(ContentFile {
                        name,
                        description: text_field(file, "description"),
                    })
                }
                _ => None,
            })
            .collect();

        Self {
            format: text_or_na(&map, "format"),
            summary: text_field(&map, "summary").unwrap_or_default(),
            body: text_field(&map, "content").unwrap_or_default(),
            tech_stack: parse_string_list(map.get("tech_stack")),
            files,
        }
    }

    /// File names to mention when publishing, capped at `limit`.
    pub fn file_names(&self, limit: usize) -> Vec<String> {
        self.files.iter().take(limit).map(|f| f.name.clone()).collect()
    }
}

/// Listing tab, as generated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListingView {
    pub title: String,
    pub tagline: String,
    pub description: String,
    pub price: f64,
    pub feature_bullets: Vec<String>,
    pub category_tags: Vec<String>,
    pub seo_keywords: Vec<String>,
}

impl ListingView {
    pub fn from_value(value: &Value) -> Self {
        let map = parse_object(Some(value));
        Self {
            title: text_field(&map, "title").unwrap_or_default(),
            tagline: text_field(&map, "tagline").unwrap_or_default(),
            description: text_field(&map, "description").unwrap_or_default(),
            price: parse_price(map.get("price")),
            feature_bullets: parse_string_list(map.get("feature_bullets")),
            category_tags: parse_string_list(map.get("category_tags")),
            seo_keywords: parse_string_list(map.get("seo_keywords")),
        }
    }
}
