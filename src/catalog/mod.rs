//! The local product catalog.
//!
//! Records are kept most-recent-first in insertion order. Every mutation
//! re-serializes the whole collection under a single storage key; a failed
//! write is logged and otherwise ignored, so the in-memory catalog stays
//! authoritative for the rest of the session.

mod record;
pub mod samples;

pub use record::{ProductRecord, ProductStatus};

use serde_json::Value;

use crate::storage::LocalStorage;

/// Storage key holding the JSON-encoded record array.
pub const PRODUCTS_KEY: &str = "rule47_products";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Live,
    Draft,
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "live" => Ok(Self::Live),
            "draft" => Ok(Self::Draft),
            _ => Err(format!("Invalid status filter: {} (expected all, live or draft)", s)),
        }
    }
}

/// Catalog filter: status and free-text search over name and title.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    pub status: StatusFilter,
    pub search: String,
}

impl CatalogFilter {
    pub fn matches(&self, record: &ProductRecord) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Live => record.status == ProductStatus::Live,
            StatusFilter::Draft => record.status == ProductStatus::Draft,
        };
        if !status_ok {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || record.name.to_lowercase().contains(&needle)
            || record.title.to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, records: &'a [ProductRecord]) -> Vec<&'a ProductRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Decode the stored catalog. Anything unreadable is an empty catalog.
pub fn decode_records(raw: Option<&str>) -> Vec<ProductRecord> {
    decode_entries(raw).0
}

/// Decode the stored catalog into readable records and the raw entries that
/// could not be read. Unreadable entries are kept so a later write can store
/// them back unchanged.
fn decode_entries(raw: Option<&str>) -> (Vec<ProductRecord>, Vec<Value>) {
    let Some(raw) = raw else {
        return (Vec::new(), Vec::new());
    };
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            tracing::warn!("stored catalog is not an array, starting empty");
            return (Vec::new(), Vec::new());
        }
        Err(e) => {
            tracing::warn!(error = %e, "stored catalog is not valid JSON, starting empty");
            return (Vec::new(), Vec::new());
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut unreadable = Vec::new();
    for item in items {
        match serde_json::from_value::<ProductRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(error = %e, "keeping unreadable catalog entry as stored");
                unreadable.push(item);
            }
        }
    }
    (records, unreadable)
}

#[derive(Debug)]
pub struct CatalogStore<S: LocalStorage> {
    storage: S,
    records: Vec<ProductRecord>,
    /// Stored entries that did not decode; written back after `records`.
    unreadable: Vec<Value>,
}

impl<S: LocalStorage> CatalogStore<S> {
    /// Load every stored record.
    pub fn load(storage: S) -> Self {
        let raw = match storage.get_item(PRODUCTS_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "could not read catalog, starting empty");
                None
            }
        };
        let (records, unreadable) = decode_entries(raw.as_deref());
        tracing::debug!(
            count = records.len(),
            unreadable = unreadable.len(),
            "catalog loaded"
        );
        Self {
            storage,
            records,
            unreadable,
        }
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    /// Number of stored entries that could not be read.
    pub fn unreadable_count(&self) -> usize {
        self.unreadable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ProductRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Put a new record at the front and persist.
    pub fn prepend(&mut self, record: ProductRecord) {
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record);
        next.extend(self.records.iter().cloned());
        self.records = next;
        self.persist();
    }

    /// Delete by id and persist. Returns the removed record.
    pub fn remove(&mut self, id: &str) -> Option<ProductRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let removed = self.records.remove(index);
        self.persist();
        Some(removed)
    }

    fn persist(&mut self) {
        let mut entries = Vec::with_capacity(self.records.len() + self.unreadable.len());
        for record in &self.records {
            match serde_json::to_value(record) {
                Ok(value) => entries.push(value),
                Err(e) => {
                    tracing::warn!(error = %e, "could not encode catalog");
                    return;
                }
            }
        }
        entries.extend(self.unreadable.iter().cloned());

        let body = match serde_json::to_string(&entries) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "could not encode catalog");
                return;
            }
        };
        if let Err(e) = self.storage.set_item(PRODUCTS_KEY, &body) {
            tracing::warn!(error = %e, "catalog not persisted; changes kept in memory only");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::ListingEditor;
    use crate::package::ProductPackage;
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn package(name: &str) -> ProductPackage {
        ProductPackage::from_response(&json!({
            "product_name": name,
            "product_type": "Template",
            "listing": {"title": format!("{name} listing"), "price": 12}
        }))
    }

    fn draft(name: &str) -> ProductRecord {
        let pkg = package(name);
        ProductRecord::draft(&pkg, &ListingEditor::seed(&pkg.listing_view()))
    }

    fn live(name: &str) -> ProductRecord {
        let pkg = package(name);
        ProductRecord::live(
            &pkg,
            &ListingEditor::seed(&pkg.listing_view()),
            json!({"ok": true}),
            None,
        )
    }

    #[test]
    fn missing_key_loads_empty() {
        let store = CatalogStore::load(MemoryStorage::default());
        assert!(store.is_empty());
    }

    #[test]
    fn malformed_or_non_array_value_loads_empty() {
        for raw in ["{not json", "{\"a\": 1}", "42", "\"text\""] {
            let mut storage = MemoryStorage::default();
            storage.set_item(PRODUCTS_KEY, raw).unwrap();
            assert!(CatalogStore::load(storage).is_empty(), "raw = {raw}");
        }
    }

    #[test]
    fn unreadable_entries_are_hidden_from_records() {
        let good = serde_json::to_value(draft("Good")).unwrap();
        let raw = serde_json::to_string(&json!([good, {"id": 5}])).unwrap();
        let mut storage = MemoryStorage::default();
        storage.set_item(PRODUCTS_KEY, &raw).unwrap();
        let store = CatalogStore::load(storage);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].name, "Good");
        assert_eq!(store.unreadable_count(), 1);
    }

    fn stored_entries(store: &CatalogStore<MemoryStorage>) -> Vec<Value> {
        let raw = store.storage().get_item(PRODUCTS_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn unreadable_entries_survive_prepend_and_remove() {
        let legacy = json!({"id": "legacy-1", "name": "Old format", "status": "archived"});
        let good = serde_json::to_value(draft("Good")).unwrap();
        let raw = serde_json::to_string(&json!([good, legacy.clone()])).unwrap();
        let mut storage = MemoryStorage::default();
        storage.set_item(PRODUCTS_KEY, &raw).unwrap();

        let mut store = CatalogStore::load(storage);
        store.prepend(draft("New"));
        let stored = stored_entries(&store);
        assert_eq!(stored.len(), 3);
        assert!(stored.contains(&legacy));

        let good_id = store.records()[1].id.clone();
        store.remove(&good_id);
        let stored = stored_entries(&store);
        assert_eq!(stored.len(), 2);
        assert!(stored.contains(&legacy));

        let reloaded = CatalogStore::load(store.storage().clone());
        assert_eq!(reloaded.records().len(), 1);
        assert_eq!(reloaded.unreadable_count(), 1);
    }

    #[test]
    fn string_price_record_loads_and_survives_prepend() {
        let mut legacy = serde_json::to_value(draft("Legacy")).unwrap();
        legacy["id"] = json!("legacy-1");
        legacy["price"] = json!("19");
        let raw = serde_json::to_string(&json!([legacy])).unwrap();
        let mut storage = MemoryStorage::default();
        storage.set_item(PRODUCTS_KEY, &raw).unwrap();

        let mut store = CatalogStore::load(storage);
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.records()[0].price, 19.0);

        store.prepend(draft("New"));
        let ids: Vec<_> = stored_entries(&store)
            .iter()
            .map(|e| e["id"].as_str().unwrap_or_default().to_string())
            .collect();
        assert!(ids.contains(&"legacy-1".to_string()));
    }

    #[test]
    fn save_then_load_preserves_records_and_order() {
        let mut store = CatalogStore::load(MemoryStorage::default());
        for name in ["One", "Two", "Three"] {
            store.prepend(draft(name));
        }
        let saved = store.records().to_vec();

        let reloaded = CatalogStore::load(store.storage().clone());
        assert_eq!(reloaded.records(), saved.as_slice());
        let names: Vec<_> = reloaded.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Three", "Two", "One"]);
    }

    #[test]
    fn loading_twice_is_idempotent() {
        let mut store = CatalogStore::load(MemoryStorage::default());
        store.prepend(live("A"));
        store.prepend(draft("B"));
        let first = CatalogStore::load(store.storage().clone());
        let second = CatalogStore::load(store.storage().clone());
        assert_eq!(first.records(), second.records());
    }

    #[test]
    fn remove_deletes_exactly_one_and_keeps_order() {
        let mut store = CatalogStore::load(MemoryStorage::default());
        for name in ["A", "B", "C", "D"] {
            store.prepend(draft(name));
        }
        let target = store.records()[1].id.clone();
        let removed = store.remove(&target).unwrap();
        assert_eq!(removed.name, "C");
        let names: Vec<_> = store.records().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["D", "B", "A"]);
        assert!(store.remove("missing").is_none());

        let reloaded = CatalogStore::load(store.storage().clone());
        assert_eq!(reloaded.records().len(), 3);
    }

    #[test]
    fn prepend_puts_new_record_first() {
        let mut store = CatalogStore::load(MemoryStorage::default());
        store.prepend(draft("Old1"));
        store.prepend(draft("Old0"));
        let before: Vec<_> = store.records().iter().map(|r| r.id.clone()).collect();
        store.prepend(live("New"));
        assert_eq!(store.records()[0].name, "New");
        let after: Vec<_> = store.records()[1..].iter().map(|r| r.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn persistence_failure_keeps_memory_state() {
        let mut store = CatalogStore::load(MemoryStorage::with_quota(10));
        store.prepend(draft("Too big for quota"));
        assert_eq!(store.records().len(), 1);
        assert_eq!(store.storage().get_item(PRODUCTS_KEY).unwrap(), None);
    }

    #[test]
    fn live_and_draft_status_invariants() {
        let l = live("L");
        assert_eq!(l.status, ProductStatus::Live);
        assert!(l.published_at.as_deref().is_some_and(|at| !at.is_empty()));
        assert!(l.is_consistent());

        let d = draft("D");
        assert_eq!(d.status, ProductStatus::Draft);
        assert!(d.published_at.is_none());
        assert!(d.publisher_response.is_none());
        assert!(d.is_consistent());
    }

    #[test]
    fn records_serialize_with_camel_case_keys() {
        let value = serde_json::to_value(draft("Kit")).unwrap();
        assert!(value.get("featureBullets").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["type"], "Template");
        assert_eq!(value["status"], "draft");
        assert!(value.get("publishedAt").is_none());
    }

    #[test]
    fn filter_live_kit_matches_name_or_title_case_insensitively() {
        let pkg_a = package("Starter KIT");
        let mut by_title = package("Planner");
        by_title.listing = json!({"title": "Habit kit bundle"});
        let records = vec![
            ProductRecord::live(
                &pkg_a,
                &ListingEditor::seed(&pkg_a.listing_view()),
                json!({}),
                None,
            ),
            ProductRecord::live(
                &by_title,
                &ListingEditor::seed(&by_title.listing_view()),
                json!({}),
                None,
            ),
            draft("Draft kit"),
            live("Unrelated"),
        ];
        let filter = CatalogFilter {
            status: StatusFilter::Live,
            search: "kit".into(),
        };
        let names: Vec<_> = filter.apply(&records).iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Starter KIT", "Planner"]);
    }

    #[test]
    fn empty_filter_passes_everything() {
        let records = vec![draft("A"), live("B")];
        assert_eq!(CatalogFilter::default().apply(&records).len(), 2);
        let drafts = CatalogFilter {
            status: StatusFilter::Draft,
            search: String::new(),
        };
        assert_eq!(drafts.apply(&records).len(), 1);
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("LIVE".parse::<StatusFilter>().unwrap(), StatusFilter::Live);
        assert!("published".parse::<StatusFilter>().is_err());
    }
}
