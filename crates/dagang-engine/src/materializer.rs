//! # Sale Materializer
//!
//! Turns a confirmed import session into concrete store documents: one Sale
//! per source order, plus the consolidated per-file cost expense, newly
//! created products, refreshed SKU mappings, and stock decrements.
//!
//! ## Commit Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      ONE store transaction                              │
//! │                                                                         │
//! │   put  products/<key>         (CreateNew resolutions)                   │
//! │   put  skuMappings/<id>       (MapTo resolutions, upsert)               │
//! │   put  sales/<uuid>           (one per source order)                    │
//! │   put  expenses/<uuid>        ┐ only when the idempotency guard         │
//! │   put  importedFiles/<uuid>   ┘ has not seen this filename              │
//! │   inc  products/<id> $.stock  (atomic decrement per sold item)          │
//! │   put  activityLogs/<uuid>    (audit trail)                             │
//! │                                                                         │
//! │   Either all of it lands or none of it does.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Resolution Priority
//! 1. direct catalog match (id or name, from the session's snapshot)
//! 2. operator `MapTo` mapping
//! 3. product created by a `CreateNew` resolution
//!
//! Lines that still cannot resolve are dropped from their sale; a sale
//! with zero resolvable lines is discarded entirely. Neither blocks the
//! rest of the import.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use dagang_core::aggregate::row_key;
use dagang_core::money::Money;
use dagang_core::types::{
    ActivityLog, Product, RawExtractedRow, Sale, SaleItem, IMPORTED_CATEGORY,
};
use dagang_store::{names, Batch, Store};

use crate::error::{ImportError, ImportResult};
use crate::guard::{self, CostPosting};
use crate::resolver;
use crate::session::{ImportSession, Resolution};

// =============================================================================
// Import Outcome
// =============================================================================

/// What one confirmed import actually did.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    /// Ids of the sales written, in source-order order.
    pub sale_ids: Vec<String>,
    pub sales_created: usize,
    /// Lines dropped because they resolved to nothing.
    pub items_dropped: usize,
    pub products_created: usize,
    pub mappings_saved: usize,
    /// False when the idempotency guard skipped the expense.
    pub expense_posted: bool,
    /// True when the filename had been imported before (soft notice).
    pub duplicate_file: bool,
}

// =============================================================================
// Materialization
// =============================================================================

/// Commits a confirmed session to the store.
///
/// The session is consumed: on success there is nothing left to re-commit,
/// and on failure the transaction rolled back and the operator restarts
/// from analysis.
pub async fn materialize(store: &Store, session: ImportSession) -> ImportResult<ImportOutcome> {
    // Completeness gate (§ review step): every unrecognized key needs a
    // resolution before anything is written.
    let unresolved = session.unresolved_keys().len();
    if unresolved > 0 {
        return Err(ImportError::UnresolvedItems { count: unresolved });
    }

    let settings = store.load_settings().await?;
    let now = Utc::now();

    // Products born from CreateNew resolutions: id = import key,
    // category "Imported", zero stock and cost. Selling price starts at
    // the observed average so the catalog entry is not blank.
    let mut created: HashMap<String, Product> = HashMap::new();
    for item in session.items() {
        if !item.is_new {
            continue;
        }
        if session.resolution(&item.key) == Some(&Resolution::CreateNew) {
            created.insert(
                item.key.clone(),
                Product {
                    id: item.key.clone(),
                    name: item.display_name.clone(),
                    cost_price: Money::zero(),
                    selling_price: Money::from_units(item.average_unit_price().round() as i64),
                    stock: 0,
                    category: IMPORTED_CATEGORY.to_string(),
                    subcategory: None,
                },
            );
        }
    }

    // Final product id per aggregation key, in resolution priority order.
    let mut product_id_by_key: HashMap<String, String> = HashMap::new();
    for item in session.items() {
        let resolved = match (&item.matched_product_id, session.resolution(&item.key)) {
            (Some(product_id), _) => Some(product_id.clone()),
            (None, Some(Resolution::MapTo { product_id })) => Some(product_id.clone()),
            (None, Some(Resolution::CreateNew)) => Some(item.key.clone()),
            (None, None) => None, // unreachable past the gate
        };
        if let Some(product_id) = resolved {
            product_id_by_key.insert(item.key.clone(), product_id);
        }
    }

    let mappings = resolver::mapping_upserts(&session);

    // Walk the ORIGINAL per-order groupings, not the aggregation, so one
    // source order becomes one sale.
    let mut sales: Vec<Sale> = Vec::new();
    let mut items_dropped = 0usize;
    let mut stock_deltas: HashMap<String, i64> = HashMap::new();

    for (order_id, rows) in group_by_order(session.rows()) {
        let mut items: Vec<SaleItem> = Vec::new();

        for row in rows {
            let Some(key) = row_key(row) else {
                items_dropped += 1;
                continue;
            };
            let Some(product_id) = product_id_by_key.get(&key) else {
                items_dropped += 1;
                continue;
            };

            // Cost snapshot comes from the resolved product as it exists
            // right now; created products carry zero cost.
            let (name, cost_price, current_stock) = if let Some(p) = created.get(product_id) {
                (p.name.clone(), p.cost_price, None)
            } else if let Some(p) = session.catalog().by_id(product_id) {
                (p.name.clone(), p.cost_price, Some(p.stock))
            } else {
                // A MapTo aimed at a product that vanished from the
                // catalog; drop the line like any other unresolvable one.
                warn!(order = %order_id, key = %key, product_id = %product_id,
                      "Resolved product missing from catalog, dropping line");
                items_dropped += 1;
                continue;
            };

            if let Some(stock) = current_stock {
                let already = stock_deltas.get(product_id).copied().unwrap_or(0);
                if stock + already - row.quantity < 0 {
                    warn!(product_id = %product_id, stock, quantity = row.quantity,
                          "Sale drives stock negative");
                }
            }
            *stock_deltas.entry(product_id.clone()).or_insert(0) -= row.quantity;

            items.push(SaleItem {
                product_id: product_id.clone(),
                name,
                quantity: row.quantity,
                unit_price: row.unit_price,
                cost_price_at_sale: Some(cost_price),
            });
        }

        // A sale with zero resolvable lines is discarded entirely.
        if items.is_empty() {
            continue;
        }

        let subtotal: Money = items.iter().map(|i| i.line_total()).sum();
        let final_total = subtotal.apply_percentage_discount(settings.default_discount_bps);

        sales.push(Sale {
            id: Uuid::new_v4().to_string(),
            items,
            subtotal,
            discount_bps: settings.default_discount_bps,
            final_total,
            date: now,
        });
    }

    // Cost posting is gated on the filename, not on the sales.
    let posting = guard::prepare_cost_posting(
        store,
        session.file_name(),
        session.order_count(),
        &settings,
        now,
    )
    .await?;

    // Everything commits in one transaction.
    let mut batch = Batch::new();
    for product in created.values() {
        batch.put(names::PRODUCTS, &product.id, product)?;
    }
    for mapping in &mappings {
        batch.put(names::SKU_MAPPINGS, &mapping.id, mapping)?;
    }
    for sale in &sales {
        batch.put(names::SALES, &sale.id, sale)?;
    }
    if let CostPosting::Posted { expense, record } = &posting {
        batch.put(names::EXPENSES, &expense.id, expense)?;
        batch.put(names::IMPORTED_FILES, &record.id, record)?;
    }
    for (product_id, delta) in &stock_deltas {
        batch.increment(names::PRODUCTS, product_id, "$.stock", *delta);
    }
    let log = ActivityLog {
        id: Uuid::new_v4().to_string(),
        action: "import".to_string(),
        detail: format!(
            "Imported {}: {} sales from {} orders",
            session.file_name(),
            sales.len(),
            session.order_count()
        ),
        date: now,
    };
    batch.put(names::ACTIVITY_LOGS, &log.id, &log)?;

    store.commit_batch(batch).await?;

    let outcome = ImportOutcome {
        sale_ids: sales.iter().map(|s| s.id.clone()).collect(),
        sales_created: sales.len(),
        items_dropped,
        products_created: created.len(),
        mappings_saved: mappings.len(),
        expense_posted: posting.posts_expense(),
        duplicate_file: !posting.posts_expense(),
    };

    info!(
        file = %session.file_name(),
        sales = outcome.sales_created,
        dropped = outcome.items_dropped,
        new_products = outcome.products_created,
        expense_posted = outcome.expense_posted,
        "Import materialized"
    );

    Ok(outcome)
}

/// Groups rows by order id, preserving first-seen order of both orders and
/// their lines.
fn group_by_order(rows: &[RawExtractedRow]) -> Vec<(String, Vec<&RawExtractedRow>)> {
    let mut orders: Vec<(String, Vec<&RawExtractedRow>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        match index.get(row.order_id.as_str()) {
            Some(&idx) => orders[idx].1.push(row),
            None => {
                index.insert(row.order_id.as_str(), orders.len());
                orders.push((row.order_id.clone(), vec![row]));
            }
        }
    }
    orders
}

// =============================================================================
// Unit Tests
// =============================================================================
