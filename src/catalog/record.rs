use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::editor::ListingEditor;
use crate::normalize::parse_price;
use crate::package::ProductPackage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Live,
    Draft,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Draft => "draft",
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prices written by older builds or by hand may be strings such as `"19"`.
fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_price(Some(&value)))
}

/// A persisted product. Only [`ProductRecord::live`] and [`ProductRecord::draft`]
/// create one, which keeps `published_at` set exactly when the status is live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub product_type: String,
    pub status: ProductStatus,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub feature_bullets: Vec<String>,
    #[serde(default)]
    pub category_tags: Vec<String>,
    #[serde(default)]
    pub market_research: Value,
    #[serde(default)]
    pub product_content: Value,
    #[serde(default)]
    pub listing: Value,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_response: Option<Value>,
}

impl ProductRecord {
    fn from_edit(package: &ProductPackage, edits: &ListingEditor, status: ProductStatus) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: package.product_name.clone(),
            product_type: package.product_type.clone(),
            status,
            price: edits.price(),
            title: edits.title.clone(),
            tagline: edits.tagline.clone(),
            description: edits.description.clone(),
            feature_bullets: edits.bullets().to_vec(),
            category_tags: edits.tags().to_vec(),
            market_research: package.market_research.clone(),
            product_content: package.product_content.clone(),
            listing: package.listing.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            published_at: None,
            publisher_response: None,
        }
    }

    /// A published record. `published_at` falls back to now when the
    /// publisher did not report one.
    pub fn live(
        package: &ProductPackage,
        edits: &ListingEditor,
        publisher_response: Value,
        published_at: Option<String>,
    ) -> Self {
        let mut record = Self::from_edit(package, edits, ProductStatus::Live);
        record.published_at = Some(
            published_at
                .filter(|at| !at.trim().is_empty())
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        );
        record.publisher_response = Some(publisher_response);
        record
    }

    pub fn draft(package: &ProductPackage, edits: &ListingEditor) -> Self {
        Self::from_edit(package, edits, ProductStatus::Draft)
    }

    /// Name shown in lists; the title when the package had no name.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.title
        } else {
            &self.name
        }
    }

    pub fn is_consistent(&self) -> bool {
        match self.status {
            ProductStatus::Live => self.published_at.is_some(),
            ProductStatus::Draft => self.published_at.is_none(),
        }
    }
}
