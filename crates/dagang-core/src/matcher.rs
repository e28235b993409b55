//! # Catalog Matcher
//!
//! Classifies aggregated import items against a read-only snapshot of the
//! current catalog.
//!
//! ## Snapshot Semantics
//! A [`CatalogSnapshot`] is built once per import session and never
//! refreshed mid-session. Matching the same item against the same snapshot
//! is therefore deterministic, even while other terminals edit the catalog.
//!
//! ## Match Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each AggregatedItem:                                               │
//! │                                                                         │
//! │  1. key == product.id          (case-insensitive)  → recognized         │
//! │  2. display_name == product.name (case-insensitive) → recognized        │
//! │  3. otherwise                                       → is_new = true     │
//! │                                                                         │
//! │  First match wins.                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::aggregate::AggregatedItem;
use crate::types::Product;

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// Read-only in-memory view of the current catalog, indexed for
/// case-insensitive lookup by product id and by product name.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: Vec<Product>,
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

impl CatalogSnapshot {
    /// Builds a snapshot from the current product list.
    ///
    /// When two products collide on a lowercased id or name, the first one
    /// wins, mirroring the first-match rule of classification.
    pub fn new(products: Vec<Product>) -> Self {
        let mut by_id = HashMap::with_capacity(products.len());
        let mut by_name = HashMap::with_capacity(products.len());

        for (idx, product) in products.iter().enumerate() {
            by_id.entry(product.id.to_lowercase()).or_insert(idx);
            by_name
                .entry(product.name.trim().to_lowercase())
                .or_insert(idx);
        }

        CatalogSnapshot {
            products,
            by_id,
            by_name,
        }
    }

    /// Number of products in the snapshot.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// True when the snapshot holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All products in the snapshot.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Looks up a product by id, case-insensitively.
    pub fn by_id(&self, id: &str) -> Option<&Product> {
        self.by_id
            .get(&id.to_lowercase())
            .map(|&idx| &self.products[idx])
    }

    /// Looks up a product by display name, case-insensitively.
    pub fn by_name(&self, name: &str) -> Option<&Product> {
        self.by_name
            .get(&name.trim().to_lowercase())
            .map(|&idx| &self.products[idx])
    }

    /// Resolves an import key / display-name pair to a product:
    /// id match first, then name match.
    pub fn match_key(&self, key: &str, display_name: &str) -> Option<&Product> {
        self.by_id(key).or_else(|| self.by_name(display_name))
    }

    /// Classifies aggregated items in place: recognized items get their
    /// matched product id, the rest are flagged `is_new`.
    ///
    /// Returns the unrecognized keys in item order, ready for the mapping
    /// resolver.
    pub fn classify(&self, items: &mut [AggregatedItem]) -> Vec<String> {
        let mut unrecognized = Vec::new();

        for item in items.iter_mut() {
            match self.match_key(&item.key, &item.display_name) {
                Some(product) => {
                    item.is_new = false;
                    item.matched_product_id = Some(product.id.clone());
                }
                None => {
                    item.is_new = true;
                    item.matched_product_id = None;
                    unrecognized.push(item.key.clone());
                }
            }
        }

        unrecognized
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            cost_price: Money::from_units(800),
            selling_price: Money::from_units(1000),
            stock: 10,
            category: "Minuman".to_string(),
            subcategory: None,
        }
    }

    fn item(key: &str, name: &str) -> AggregatedItem {
        AggregatedItem {
            key: key.to_string(),
            display_name: name.to_string(),
            total_quantity: 1,
            total_value: Money::from_units(1000),
            is_new: false,
            matched_product_id: None,
        }
    }

    #[test]
    fn test_match_by_id_case_insensitive() {
        let snapshot = CatalogSnapshot::new(vec![product("SKU-1", "Teh Botol")]);
        assert!(snapshot.match_key("sku-1", "whatever").is_some());
    }

    #[test]
    fn test_match_by_name_when_id_misses() {
        let snapshot = CatalogSnapshot::new(vec![product("p-77", "Teh Botol")]);
        let matched = snapshot.match_key("UNKNOWN-SKU", "teh botol").unwrap();
        assert_eq!(matched.id, "p-77");
    }

    #[test]
    fn test_classify_splits_recognized_and_new() {
        let snapshot = CatalogSnapshot::new(vec![product("SKU-1", "Teh Botol")]);
        let mut items = vec![item("SKU-1", "Teh Botol"), item("SKU-9", "Kecap Manis")];

        let unrecognized = snapshot.classify(&mut items);

        assert_eq!(unrecognized, vec!["SKU-9".to_string()]);
        assert!(!items[0].is_new);
        assert_eq!(items[0].matched_product_id.as_deref(), Some("SKU-1"));
        assert!(items[1].is_new);
        assert!(items[1].matched_product_id.is_none());
    }

    /// Property 2: classification against a fixed snapshot is deterministic.
    #[test]
    fn test_classification_is_deterministic() {
        let snapshot = CatalogSnapshot::new(vec![
            product("SKU-1", "Teh Botol"),
            product("SKU-2", "Kopi Sachet"),
        ]);

        let mut first = vec![item("SKU-1", "Teh Botol"), item("SKU-9", "Kecap Manis")];
        let mut second = first.clone();

        let a = snapshot.classify(&mut first);
        let b = snapshot.classify(&mut second);

        assert_eq!(a, b);
        for (x, y) in first.iter().zip(second.iter()) {
            assert_eq!(x.is_new, y.is_new);
            assert_eq!(x.matched_product_id, y.matched_product_id);
        }
    }

    #[test]
    fn test_first_match_wins_on_name_collision() {
        let snapshot = CatalogSnapshot::new(vec![
            product("p-1", "Gula Pasir"),
            product("p-2", "Gula Pasir"),
        ]);
        assert_eq!(snapshot.by_name("gula pasir").unwrap().id, "p-1");
    }
}
