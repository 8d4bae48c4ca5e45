//! Illustrative records shown when the real catalog is empty.
//!
//! These are built fresh on every call and never handed to a `CatalogStore`,
//! so they cannot reach storage.

use serde_json::json;

use super::{ProductRecord, ProductStatus};

fn sample(
    id: &str,
    name: &str,
    product_type: &str,
    status: ProductStatus,
    price: f64,
    tagline: &str,
    bullets: &[&str],
    tags: &[&str],
    created_at: &str,
) -> ProductRecord {
    let published_at = match status {
        ProductStatus::Live => Some(created_at.to_string()),
        ProductStatus::Draft => None,
    };
    ProductRecord {
        id: id.to_string(),
        name: name.to_string(),
        product_type: product_type.to_string(),
        status,
        price,
        title: name.to_string(),
        tagline: tagline.to_string(),
        description: format!("{tagline}. Sample product shown while your catalog is empty."),
        feature_bullets: bullets.iter().map(|s| s.to_string()).collect(),
        category_tags: tags.iter().map(|s| s.to_string()).collect(),
        market_research: json!({}),
        product_content: json!({}),
        listing: json!({}),
        created_at: created_at.to_string(),
        publisher_response: published_at
            .as_ref()
            .map(|_| json!({"status": "published", "sample": true})),
        published_at,
    }
}

/// The four sample records.
pub fn sample_records() -> Vec<ProductRecord> {
    vec![
        sample(
            "sample-1",
            "Notion Productivity Kit",
            "Template",
            ProductStatus::Live,
            27.0,
            "Plan your week in one workspace",
            &["Weekly planner", "Habit tracker", "Goal dashboard"],
            &["productivity", "notion"],
            "2025-01-12T09:00:00Z",
        ),
        sample(
            "sample-2",
            "Freelancer Pricing Guide",
            "E-book / Guide",
            ProductStatus::Live,
            19.0,
            "Charge what your work is worth",
            &["Rate calculator", "Proposal scripts"],
            &["freelance", "business"],
            "2025-01-08T14:30:00Z",
        ),
        sample(
            "sample-3",
            "Social Media Content Calendar",
            "Printable",
            ProductStatus::Draft,
            12.0,
            "Ninety days of post ideas",
            &["90 prompts", "Canva templates"],
            &["marketing", "social"],
            "2025-01-05T11:15:00Z",
        ),
        sample(
            "sample-4",
            "Python Automation Starter Kit",
            "Software / Script",
            ProductStatus::Live,
            49.0,
            "Automate the boring parts",
            &["12 scripts", "Setup guide", "Video walkthrough"],
            &["python", "automation"],
            "2024-12-28T16:45:00Z",
        ),
    ]
}

/// Records to display: the real ones, or the samples when there are none and
/// sample mode is on.
pub fn display_records(real: &[ProductRecord], sample_mode: bool) -> (Vec<ProductRecord>, bool) {
    if real.is_empty() && sample_mode {
        (sample_records(), true)
    } else {
        (real.to_vec(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogStore, PRODUCTS_KEY};
    use crate::storage::{LocalStorage, MemoryStorage};

    #[test]
    fn there_are_four_consistent_samples() {
        let samples = sample_records();
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(ProductRecord::is_consistent));
    }

    #[test]
    fn samples_only_replace_an_empty_catalog() {
        let (shown, is_sample) = display_records(&[], true);
        assert!(is_sample);
        assert_eq!(shown.len(), 4);

        let (shown, is_sample) = display_records(&[], false);
        assert!(!is_sample);
        assert!(shown.is_empty());

        let real = vec![sample_records().remove(0)];
        let (shown, is_sample) = display_records(&real, true);
        assert!(!is_sample);
        assert_eq!(shown, real);
    }

    #[test]
    fn displaying_samples_never_writes_storage() {
        let store = CatalogStore::load(MemoryStorage::default());
        let _ = display_records(store.records(), true);
        assert_eq!(store.storage().get_item(PRODUCTS_KEY).unwrap(), None);
    }
}
