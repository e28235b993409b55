//! # Mapping Resolver
//!
//! Pre-fills resolutions for unrecognized keys from persisted SKU mappings
//! and turns confirmed `MapTo` choices back into durable mappings.
//!
//! ## Mapping Reuse
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  First import:   "MP-SKU-7" unrecognized → operator maps to p-1        │
//! │                  └── SkuMapping { importSku: "MP-SKU-7", → p-1 } saved │
//! │                                                                         │
//! │  Later imports:  "mp-sku-7" unrecognized → mapping found (CI lookup)   │
//! │                  └── resolution pre-filled, no operator action needed  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use dagang_core::matcher::CatalogSnapshot;
use dagang_core::types::SkuMapping;

use crate::session::{ImportSession, Resolution};

/// Pre-fills resolutions for unrecognized keys from stored mappings.
///
/// Lookup is case-insensitive on `import_sku`. A mapping whose target
/// product no longer exists in the catalog is skipped; the operator must
/// re-resolve that key.
pub fn prefill_resolutions(
    mappings: &[SkuMapping],
    unrecognized: &[String],
    catalog: &CatalogSnapshot,
) -> HashMap<String, Resolution> {
    let by_sku: HashMap<String, &SkuMapping> = mappings
        .iter()
        .map(|m| (m.import_sku.to_lowercase(), m))
        .collect();

    let mut resolutions = HashMap::new();
    for key in unrecognized {
        let Some(mapping) = by_sku.get(&key.to_lowercase()) else {
            continue;
        };
        if catalog.by_id(&mapping.mapped_product_id).is_none() {
            debug!(
                key = %key,
                product_id = %mapping.mapped_product_id,
                "Stored mapping targets a missing product, skipping prefill"
            );
            continue;
        }
        resolutions.insert(
            key.clone(),
            Resolution::MapTo {
                product_id: mapping.mapped_product_id.clone(),
            },
        );
    }
    resolutions
}

/// Builds the SkuMapping upserts for every confirmed `MapTo` resolution.
///
/// An existing mapping for the same key (case-insensitive) keeps its id so
/// the upsert replaces it instead of accumulating duplicates.
pub fn mapping_upserts(session: &ImportSession) -> Vec<SkuMapping> {
    let existing_ids: HashMap<String, &str> = session
        .mappings()
        .iter()
        .map(|m| (m.import_sku.to_lowercase(), m.id.as_str()))
        .collect();

    session
        .resolutions()
        .iter()
        .filter_map(|(key, resolution)| {
            let Resolution::MapTo { product_id } = resolution else {
                return None;
            };
            let mapped_product_name = session
                .catalog()
                .by_id(product_id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            let id = existing_ids
                .get(&key.to_lowercase())
                .map(|id| id.to_string())
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            Some(SkuMapping {
                id,
                import_sku: key.clone(),
                mapped_product_id: product_id.clone(),
                mapped_product_name,
            })
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dagang_core::money::Money;
    use dagang_core::types::Product;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            cost_price: Money::from_units(800),
            selling_price: Money::from_units(1000),
            stock: 10,
            category: "Test".to_string(),
            subcategory: None,
        }
    }

    fn mapping(sku: &str, product_id: &str) -> SkuMapping {
        SkuMapping {
            id: format!("m-{sku}"),
            import_sku: sku.to_string(),
            mapped_product_id: product_id.to_string(),
            mapped_product_name: "Mapped".to_string(),
        }
    }

    #[test]
    fn test_prefill_is_case_insensitive() {
        let catalog = CatalogSnapshot::new(vec![product("p-1", "Known")]);
        let mappings = vec![mapping("mp-sku-7", "p-1")];
        let unrecognized = vec!["MP-SKU-7".to_string()];

        let resolutions = prefill_resolutions(&mappings, &unrecognized, &catalog);
        assert_eq!(
            resolutions.get("MP-SKU-7"),
            Some(&Resolution::MapTo {
                product_id: "p-1".to_string()
            })
        );
    }

    #[test]
    fn test_prefill_skips_missing_targets() {
        let catalog = CatalogSnapshot::new(vec![]);
        let mappings = vec![mapping("mp-sku-7", "deleted-product")];
        let unrecognized = vec!["mp-sku-7".to_string()];

        let resolutions = prefill_resolutions(&mappings, &unrecognized, &catalog);
        assert!(resolutions.is_empty());
    }

    #[test]
    fn test_prefill_only_covers_unrecognized() {
        let catalog = CatalogSnapshot::new(vec![product("p-1", "Known")]);
        let mappings = vec![mapping("other-sku", "p-1")];
        let unrecognized = vec!["MP-SKU-7".to_string()];

        let resolutions = prefill_resolutions(&mappings, &unrecognized, &catalog);
        assert!(resolutions.is_empty());
    }
}
