//! # Domain Types
//!
//! Core domain types used throughout Dagang.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Expense      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  cost_price     │   │  items[]        │   │  amount         │       │
//! │  │  selling_price  │   │  final_total    │   │  category       │       │
//! │  │  stock          │   │  date           │   │  date           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Import-side inputs:   RawExtractedRow, ExtractionSummary              │
//! │  Import-side records:  SkuMapping, ImportedFileRecord                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `SaleItem` freezes product identity and `cost_price_at_sale` at the
//! moment of sale. Historical profit figures read the frozen value and are
//! therefore immune to later catalog price edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Document id of singleton documents (`settings`, `flashSales`).
pub const SINGLETON_ID: &str = "main";

/// Category assigned to products created during mapping resolution.
pub const IMPORTED_CATEGORY: &str = "Imported";

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier. Catalog products use UUIDs; products created
    /// during import resolution reuse the import key as their id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Cost price per unit.
    pub cost_price: Money,

    /// Selling price per unit.
    pub selling_price: Money,

    /// Current stock level. May go negative under import decrements.
    pub stock: i64,

    /// Category (e.g. "Imported" for resolution-created products).
    pub category: String,

    /// Optional subcategory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    /// Resolved catalog product id.
    pub product_id: String,

    /// Product name at time of sale (frozen).
    pub name: String,

    /// Quantity sold.
    pub quantity: i64,

    /// Unit selling price at time of sale (frozen).
    pub unit_price: Money,

    /// Unit cost at time of sale (frozen). `None` only on legacy records
    /// written before cost snapshots existed; profit math then falls back
    /// to the current catalog cost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price_at_sale: Option<Money>,
}

impl SaleItem {
    /// Line total before discount (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A committed sale transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub items: Vec<SaleItem>,
    /// Sum of line totals before discount.
    pub subtotal: Money,
    /// Store-wide discount in basis points (250 = 2.5%).
    pub discount_bps: u32,
    /// Subtotal after discount, rounded to the nearest unit.
    pub final_total: Money,
    pub date: DateTime<Utc>,
}

impl Sale {
    /// The discount amount implied by subtotal and final total.
    #[inline]
    pub fn discount_amount(&self) -> Money {
        self.subtotal - self.final_total
    }
}

// =============================================================================
// Returns
// =============================================================================

/// A line item on a return, carrying the same cost snapshot as the
/// originating sale item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price_at_sale: Option<Money>,
}

/// A customer return against an earlier sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReturn {
    pub id: String,
    /// Originating sale, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_id: Option<String>,
    pub items: Vec<ReturnItem>,
    pub total_refund: Money,
    pub date: DateTime<Utc>,
}

// =============================================================================
// Expenses & Other Income
// =============================================================================

/// An operational expense.
///
/// The import pipeline creates exactly one expense per imported file,
/// representing aggregate marketplace shipping/handling cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: Money,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub date: DateTime<Utc>,
}

/// Income outside of sales (e.g. cashback, interest).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherIncome {
    pub id: String,
    pub name: String,
    pub amount: Money,
    pub date: DateTime<Utc>,
}

// =============================================================================
// Import-Side Records
// =============================================================================

/// A durable mapping from an import SKU to an existing catalog product.
///
/// Created/updated whenever an operator resolves an unrecognized key to an
/// existing product. Looked up case-insensitively by `import_sku` on
/// subsequent imports to pre-fill resolutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkuMapping {
    pub id: String,
    pub import_sku: String,
    pub mapped_product_id: String,
    pub mapped_product_name: String,
}

/// Idempotency marker for cost posting.
///
/// Existence of a record with a given `name` means the per-file operational
/// cost expense has already been posted. Sales themselves are NOT gated on
/// this record: reprocessing a file re-imports its sales.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedFileRecord {
    pub id: String,
    pub name: String,
    pub imported_at: DateTime<Utc>,
}

// =============================================================================
// Extraction Collaborator Contract
// =============================================================================

/// One row produced by the external extraction step (spreadsheet export or
/// AI text extraction). Immutable once produced.
///
/// `unit_price` is the net per-unit price. The collaborator is responsible
/// for dividing gross line totals by quantity before handing rows over.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtractedRow {
    pub order_id: String,
    pub sku: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Advisory totals reported by the extraction collaborator.
///
/// Treated as display hints only; every figure is recomputed downstream.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub total_orders: usize,
    pub total_items: i64,
    pub total_revenue: Money,
}

/// The full output of the extraction collaborator: rows plus advisory
/// summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutput {
    pub rows: Vec<RawExtractedRow>,
    #[serde(default)]
    pub summary: ExtractionSummary,
}

// =============================================================================
// Settings & Singletons
// =============================================================================

/// Store-wide settings singleton (`id = "main"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: String,
    pub store_name: String,
    /// Default discount applied to imported sales, in basis points.
    pub default_discount_bps: u32,
    /// Fixed operational cost charged per imported order.
    pub per_order_import_cost: Money,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            id: SINGLETON_ID.to_string(),
            store_name: "Dagang".to_string(),
            default_discount_bps: 0,
            per_order_import_cost: Money::from_units(1250),
        }
    }
}

/// Flash sale singleton (`id = "main"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashSale {
    pub id: String,
    pub active: bool,
    pub product_ids: Vec<String>,
    pub discount_bps: u32,
}

impl Default for FlashSale {
    fn default() -> Self {
        FlashSale {
            id: SINGLETON_ID.to_string(),
            active: false,
            product_ids: Vec::new(),
            discount_bps: 0,
        }
    }
}

// =============================================================================
// Audit Records
// =============================================================================

/// Audit trail entry for operator-visible mutations (imports, opnames).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,
    pub action: String,
    pub detail: String,
    pub date: DateTime<Utc>,
}

/// Record of a mass stock-zeroing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockOpnameLog {
    pub id: String,
    /// Number of products whose stock was reset.
    pub products_affected: usize,
    pub date: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
