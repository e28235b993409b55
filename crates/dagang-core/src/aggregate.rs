//! # SKU Aggregator
//!
//! Collapses raw extracted rows into one record per SKU (or product-name
//! fallback) key.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Aggregation Pipeline Position                       │
//! │                                                                         │
//! │  ExtractionOutput.rows                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  aggregate_rows()  ← THIS MODULE                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<AggregatedItem> ──► CatalogSnapshot::classify() ──► resolution    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - Deterministic: items come out in first-seen key order.
//! - Sum preservation: total quantity and total value per key are exact
//!   integer sums over the contributing rows; nothing is rounded here.
//!
//! ## Price Averaging Caveat
//! When the same SKU appears with different unit prices across orders in
//! one batch, the quantity-weighted average silently flattens the
//! difference. This is intentional and surfaced to operators through
//! [`AggregatedItem::average_unit_price`]; the underlying per-order prices
//! are still used verbatim when sales are materialized.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::RawExtractedRow;

// =============================================================================
// Aggregated Item
// =============================================================================

/// One aggregated record per import key. Derived, recomputed per import
/// session; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedItem {
    /// Grouping key: the row's SKU if non-empty, else its product name.
    pub key: String,

    /// Name shown to the operator during review.
    pub display_name: String,

    /// Sum of quantities over all rows sharing the key.
    pub total_quantity: i64,

    /// Sum of `unit_price × quantity` over all rows sharing the key.
    /// Kept as an exact integer total so nothing rounds mid-pipeline.
    pub total_value: Money,

    /// True when the catalog matcher found no product for this key.
    pub is_new: bool,

    /// Catalog product id when recognized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_product_id: Option<String>,
}

impl AggregatedItem {
    /// Quantity-weighted average unit price, for operator display.
    ///
    /// Zero total quantity yields 0 rather than a division error.
    pub fn average_unit_price(&self) -> f64 {
        if self.total_quantity == 0 {
            return 0.0;
        }
        self.total_value.units() as f64 / self.total_quantity as f64
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// Groups raw rows by SKU (falling back to product name) and sums quantity
/// and value per group.
///
/// Rows with neither SKU nor product name are dropped. Rows violating the
/// extraction contract (negative quantity or price) are rejected as a
/// whole, since they indicate a broken collaborator rather than a bad line.
///
/// ## Example
/// ```rust
/// use dagang_core::aggregate::aggregate_rows;
/// use dagang_core::money::Money;
/// use dagang_core::types::RawExtractedRow;
///
/// let rows = vec![
///     RawExtractedRow {
///         order_id: "A".into(),
///         sku: "KOPI-01".into(),
///         product_name: "Kopi Bubuk".into(),
///         quantity: 2,
///         unit_price: Money::from_units(15000),
///     },
///     RawExtractedRow {
///         order_id: "B".into(),
///         sku: "KOPI-01".into(),
///         product_name: "Kopi Bubuk".into(),
///         quantity: 1,
///         unit_price: Money::from_units(12000),
///     },
/// ];
///
/// let items = aggregate_rows(&rows).unwrap();
/// assert_eq!(items.len(), 1);
/// assert_eq!(items[0].total_quantity, 3);
/// assert_eq!(items[0].total_value.units(), 42000);
/// ```
pub fn aggregate_rows(rows: &[RawExtractedRow]) -> CoreResult<Vec<AggregatedItem>> {
    let mut items: Vec<AggregatedItem> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();

    for row in rows {
        if row.quantity < 0 {
            return Err(CoreError::InvalidRow {
                order_id: row.order_id.clone(),
                reason: format!("negative quantity {}", row.quantity),
            });
        }
        if row.unit_price.is_negative() {
            return Err(CoreError::InvalidRow {
                order_id: row.order_id.clone(),
                reason: format!("negative unit price {}", row.unit_price),
            });
        }

        let key = row_key(row);
        let key = match key {
            Some(k) => k,
            // No SKU and no name: nothing to reconcile against.
            None => continue,
        };

        let line_value = row.unit_price.multiply_quantity(row.quantity);

        match index_by_key.get(&key) {
            Some(&idx) => {
                let item = &mut items[idx];
                item.total_quantity += row.quantity;
                item.total_value += line_value;
            }
            None => {
                index_by_key.insert(key.clone(), items.len());
                items.push(AggregatedItem {
                    display_name: if row.product_name.trim().is_empty() {
                        key.clone()
                    } else {
                        row.product_name.trim().to_string()
                    },
                    key,
                    total_quantity: row.quantity,
                    total_value: line_value,
                    is_new: false,
                    matched_product_id: None,
                });
            }
        }
    }

    Ok(items)
}

/// The grouping key for a row: trimmed SKU if non-empty, else trimmed
/// product name, else `None`.
pub fn row_key(row: &RawExtractedRow) -> Option<String> {
    let sku = row.sku.trim();
    if !sku.is_empty() {
        return Some(sku.to_string());
    }
    let name = row.product_name.trim();
    if !name.is_empty() {
        return Some(name.to_string());
    }
    None
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn row(order: &str, sku: &str, name: &str, qty: i64, price: i64) -> RawExtractedRow {
        RawExtractedRow {
            order_id: order.to_string(),
            sku: sku.to_string(),
            product_name: name.to_string(),
            quantity: qty,
            unit_price: Money::from_units(price),
        }
    }

    #[test]
    fn test_groups_by_sku_with_name_fallback() {
        let rows = vec![
            row("A", "SKU-1", "Teh Celup", 2, 5000),
            row("A", "", "Gula Pasir", 1, 12000),
            row("B", "SKU-1", "Teh Celup", 3, 5000),
            row("B", "", "Gula Pasir", 2, 12000),
        ];

        let items = aggregate_rows(&rows).unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].key, "SKU-1");
        assert_eq!(items[0].total_quantity, 5);
        assert_eq!(items[1].key, "Gula Pasir");
        assert_eq!(items[1].total_quantity, 3);
    }

    #[test]
    fn test_drops_keyless_rows() {
        let rows = vec![row("A", "", "  ", 4, 1000), row("A", "SKU-2", "X", 1, 1000)];
        let items = aggregate_rows(&rows).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].key, "SKU-2");
    }

    /// Property 1: quantity and value sums are preserved across grouping.
    #[test]
    fn test_sum_preservation() {
        let rows = vec![
            row("A", "SKU-1", "X", 2, 15000),
            row("B", "SKU-1", "X", 1, 12000),
            row("B", "SKU-2", "Y", 7, 900),
            row("C", "", "Z", 3, 250),
        ];

        let items = aggregate_rows(&rows).unwrap();

        let raw_qty: i64 = rows.iter().map(|r| r.quantity).sum();
        let raw_value: Money = rows
            .iter()
            .map(|r| r.unit_price.multiply_quantity(r.quantity))
            .sum();
        let agg_qty: i64 = items.iter().map(|i| i.total_quantity).sum();
        let agg_value: Money = items.iter().map(|i| i.total_value).sum();

        assert_eq!(agg_qty, raw_qty);
        assert_eq!(agg_value, raw_value);
    }

    #[test]
    fn test_weighted_average_price() {
        let rows = vec![row("A", "SKU-1", "X", 2, 15000), row("B", "SKU-1", "X", 1, 12000)];
        let items = aggregate_rows(&rows).unwrap();
        // (2·15000 + 1·12000) / 3 = 14000
        assert!((items[0].average_unit_price() - 14000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_quantity_average_is_zero() {
        let rows = vec![row("A", "SKU-1", "X", 0, 15000)];
        let items = aggregate_rows(&rows).unwrap();
        assert_eq!(items[0].total_quantity, 0);
        assert_eq!(items[0].average_unit_price(), 0.0);
    }

    #[test]
    fn test_first_seen_order_is_deterministic() {
        let rows = vec![
            row("A", "B-SKU", "B", 1, 100),
            row("A", "A-SKU", "A", 1, 100),
            row("B", "B-SKU", "B", 1, 100),
        ];
        let items = aggregate_rows(&rows).unwrap();
        let keys: Vec<&str> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["B-SKU", "A-SKU"]);
    }

    #[test]
    fn test_contract_violation_rejected() {
        let rows = vec![row("A", "SKU-1", "X", -1, 100)];
        assert!(aggregate_rows(&rows).is_err());
    }
}
