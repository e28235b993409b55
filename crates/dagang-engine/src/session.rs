//! # Import Session
//!
//! The analysis result handed across the review suspension point.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Import Session Lifecycle                            │
//! │                                                                         │
//! │  ImportSession::analyze(file, extraction, catalog, mappings)           │
//! │       │   aggregate rows → classify against catalog →                  │
//! │       │   pre-fill resolutions from stored SkuMappings                 │
//! │       ▼                                                                 │
//! │  SessionSlot::park(session)   ← review UI is a separate nav step       │
//! │       │                                                                 │
//! │       │  set_resolution(key, CreateNew | MapTo)  (operator-paced,      │
//! │       │  unbounded duration; nothing written yet)                      │
//! │       ▼                                                                 │
//! │  ├── confirm: SessionSlot::take() → materializer (sole write boundary) │
//! │  └── cancel:  SessionSlot::clear() → all analysis discarded            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The session is an explicit immutable-ish value, not ambient global
//! state: the slot has exactly one teardown path (`take`/`clear`), and the
//! store is untouched until materialization.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dagang_core::aggregate::{aggregate_rows, AggregatedItem};
use dagang_core::matcher::CatalogSnapshot;
use dagang_core::types::{ExtractionOutput, ExtractionSummary, RawExtractedRow, SkuMapping};

use crate::error::{ImportError, ImportResult};
use crate::resolver;

// =============================================================================
// Resolution
// =============================================================================

/// The operator's choice for one unrecognized import key.
///
/// A tagged variant rather than a string sentinel: the "create new" case
/// cannot be confused with a product id that happens to match the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Resolution {
    /// Create a new catalog product from the import key
    /// (id = key, category = "Imported", zero stock and cost).
    CreateNew,
    /// Map the key to an existing catalog product; persisted as a
    /// reusable SkuMapping.
    MapTo { product_id: String },
}

// =============================================================================
// Import Session
// =============================================================================

/// Analysis state for one import, parked between the analysis step and the
/// operator's confirmation.
#[derive(Debug, Clone)]
pub struct ImportSession {
    file_name: String,
    rows: Vec<RawExtractedRow>,
    summary: ExtractionSummary,
    catalog: CatalogSnapshot,
    items: Vec<AggregatedItem>,
    unrecognized: Vec<String>,
    mappings: Vec<SkuMapping>,
    resolutions: HashMap<String, Resolution>,
}

impl ImportSession {
    /// Runs the read-only half of the pipeline: aggregation, catalog
    /// matching, and resolution pre-fill from persisted SKU mappings.
    ///
    /// Fails with [`ImportError::EmptyExtraction`] when the collaborator
    /// delivered nothing usable. Nothing is written to the store here.
    pub fn analyze(
        file_name: impl Into<String>,
        extraction: ExtractionOutput,
        catalog: CatalogSnapshot,
        mappings: Vec<SkuMapping>,
    ) -> ImportResult<Self> {
        let file_name = file_name.into();

        if extraction.rows.is_empty() {
            return Err(ImportError::EmptyExtraction);
        }

        let mut items = aggregate_rows(&extraction.rows)?;
        if items.is_empty() {
            return Err(ImportError::EmptyExtraction);
        }

        let unrecognized = catalog.classify(&mut items);
        let resolutions = resolver::prefill_resolutions(&mappings, &unrecognized, &catalog);

        debug!(
            file = %file_name,
            items = items.len(),
            unrecognized = unrecognized.len(),
            prefilled = resolutions.len(),
            "Import session analyzed"
        );

        Ok(ImportSession {
            file_name,
            rows: extraction.rows,
            summary: extraction.summary,
            catalog,
            items,
            unrecognized,
            mappings,
            resolutions,
        })
    }

    /// Source filename of this session.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The raw rows, in original order. Materialization walks these, not
    /// the aggregation, so per-order grouping survives.
    pub fn rows(&self) -> &[RawExtractedRow] {
        &self.rows
    }

    /// Advisory totals from the extraction collaborator (display only).
    pub fn summary(&self) -> &ExtractionSummary {
        &self.summary
    }

    /// The catalog snapshot this session was analyzed against.
    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    /// Aggregated items, classified.
    pub fn items(&self) -> &[AggregatedItem] {
        &self.items
    }

    /// Keys the catalog matcher could not recognize, in item order.
    pub fn unrecognized(&self) -> &[String] {
        &self.unrecognized
    }

    /// SKU mappings loaded at analysis time.
    pub fn mappings(&self) -> &[SkuMapping] {
        &self.mappings
    }

    /// The current resolution for a key, if any.
    pub fn resolution(&self, key: &str) -> Option<&Resolution> {
        self.resolutions.get(key)
    }

    /// All recorded resolutions.
    pub fn resolutions(&self) -> &HashMap<String, Resolution> {
        &self.resolutions
    }

    /// Records the operator's choice for one unrecognized key, replacing
    /// any earlier choice (including a pre-filled one).
    pub fn set_resolution(&mut self, key: &str, resolution: Resolution) -> ImportResult<()> {
        if !self.unrecognized.iter().any(|k| k == key) {
            return Err(ImportError::UnknownKey {
                key: key.to_string(),
            });
        }
        self.resolutions.insert(key.to_string(), resolution);
        Ok(())
    }

    /// Unrecognized keys still lacking a resolution, in item order.
    pub fn unresolved_keys(&self) -> Vec<&str> {
        self.unrecognized
            .iter()
            .filter(|k| !self.resolutions.contains_key(k.as_str()))
            .map(|k| k.as_str())
            .collect()
    }

    /// Completeness gate: true iff every unrecognized key has a
    /// resolution. Materialization is refused until this holds.
    pub fn is_ready(&self) -> bool {
        self.unresolved_keys().is_empty()
    }

    /// Number of distinct source orders, recomputed from the rows (the
    /// collaborator's summary is advisory only). Drives the per-order
    /// operational cost.
    pub fn order_count(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.rows.iter().filter(|r| seen.insert(r.order_id.as_str())).count()
    }
}

// =============================================================================
// Session Slot
// =============================================================================

/// Holds the session across the review suspension point.
///
/// The review UI is a separate navigational step, so the session cannot
/// live on anyone's call stack. The slot is the single place it parks;
/// `take` (confirm) and `clear` (cancel) are the only teardown paths.
#[derive(Debug, Default)]
pub struct SessionSlot {
    inner: Mutex<Option<ImportSession>>,
}

impl SessionSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        SessionSlot::default()
    }

    /// Parks a session, replacing any abandoned one.
    pub fn park(&self, session: ImportSession) {
        let mut guard = self.inner.lock().expect("Session mutex poisoned");
        *guard = Some(session);
    }

    /// Takes the session out for materialization. The slot is empty
    /// afterwards.
    pub fn take(&self) -> Option<ImportSession> {
        self.inner.lock().expect("Session mutex poisoned").take()
    }

    /// Discards the parked session (operator cancelled). Nothing has been
    /// written to the store at this point.
    pub fn clear(&self) {
        let mut guard = self.inner.lock().expect("Session mutex poisoned");
        *guard = None;
    }

    /// Runs `f` with read access to the parked session.
    pub fn with_session<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Option<&ImportSession>) -> R,
    {
        let guard = self.inner.lock().expect("Session mutex poisoned");
        f(guard.as_ref())
    }

    /// Runs `f` with write access to the parked session (e.g. recording a
    /// resolution from the review UI).
    pub fn with_session_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(Option<&mut ImportSession>) -> R,
    {
        let mut guard = self.inner.lock().expect("Session mutex poisoned");
        f(guard.as_mut())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dagang_core::money::Money;
    use dagang_core::types::Product;

    fn row(order: &str, sku: &str, name: &str, qty: i64, price: i64) -> RawExtractedRow {
        RawExtractedRow {
            order_id: order.to_string(),
            sku: sku.to_string(),
            product_name: name.to_string(),
            quantity: qty,
            unit_price: Money::from_units(price),
        }
    }

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

    fn extraction(rows: Vec<RawExtractedRow>) -> ExtractionOutput {
        ExtractionOutput {
            rows,
            summary: ExtractionSummary::default(),
        }
    }

    fn analyze(rows: Vec<RawExtractedRow>, products: Vec<Product>) -> ImportResult<ImportSession> {
        ImportSession::analyze(
            "oct.xlsx",
            extraction(rows),
            CatalogSnapshot::new(products),
            Vec::new(),
        )
    }

    #[test]
    fn test_empty_extraction_rejected() {
        let err = analyze(vec![], vec![]).unwrap_err();
        assert!(matches!(err, ImportError::EmptyExtraction));

        // All rows keyless counts as empty too.
        let err = analyze(vec![row("A", "", "", 1, 100)], vec![]).unwrap_err();
        assert!(matches!(err, ImportError::EmptyExtraction));
    }

    /// Property 3: the gate holds iff at least one unrecognized item lacks
    /// a resolution.
    #[test]
    fn test_resolution_wire_format() {
        let mapped = Resolution::MapTo {
            product_id: "p-1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&mapped).unwrap(),
            serde_json::json!({ "type": "mapTo", "productId": "p-1" })
        );
        assert_eq!(
            serde_json::to_value(Resolution::CreateNew).unwrap(),
            serde_json::json!({ "type": "createNew" })
        );
    }

    #[test]
    fn test_completeness_gate() {
        let rows = vec![
            row("A", "SKU-1", "Known", 1, 100),
            row("A", "SKU-9", "Mystery", 1, 100),
        ];
        let mut session = analyze(rows, vec![product("SKU-1", "Known")]).unwrap();

        assert!(!session.is_ready());
        assert_eq!(session.unresolved_keys(), vec!["SKU-9"]);

        session.set_resolution("SKU-9", Resolution::CreateNew).unwrap();
        assert!(session.is_ready());
    }

    #[test]
    fn test_fully_recognized_session_is_ready() {
        let rows = vec![row("A", "SKU-1", "Known", 1, 100)];
        let session = analyze(rows, vec![product("SKU-1", "Known")]).unwrap();
        assert!(session.is_ready());
    }

    #[test]
    fn test_resolution_for_recognized_key_rejected() {
        let rows = vec![row("A", "SKU-1", "Known", 1, 100)];
        let mut session = analyze(rows, vec![product("SKU-1", "Known")]).unwrap();

        let err = session
            .set_resolution("SKU-1", Resolution::CreateNew)
            .unwrap_err();
        assert!(matches!(err, ImportError::UnknownKey { .. }));
    }

    #[test]
    fn test_prefill_from_stored_mapping() {
        let rows = vec![row("A", "MP-SKU-7", "Marketplace Item", 1, 100)];
        let mappings = vec![SkuMapping {
            id: "m-1".to_string(),
            import_sku: "mp-sku-7".to_string(), // case differs on purpose
            mapped_product_id: "p-1".to_string(),
            mapped_product_name: "Known".to_string(),
        }];
        let session = ImportSession::analyze(
            "oct.xlsx",
            extraction(rows),
            CatalogSnapshot::new(vec![product("p-1", "Known")]),
            mappings,
        )
        .unwrap();

        assert!(session.is_ready());
        assert_eq!(
            session.resolution("MP-SKU-7"),
            Some(&Resolution::MapTo {
                product_id: "p-1".to_string()
            })
        );
    }

    #[test]
    fn test_order_count_is_distinct_orders() {
        let rows = vec![
            row("A", "SKU-1", "X", 1, 100),
            row("A", "SKU-2", "Y", 1, 100),
            row("B", "SKU-1", "X", 1, 100),
        ];
        let session = analyze(rows, vec![product("SKU-1", "X"), product("SKU-2", "Y")]).unwrap();
        assert_eq!(session.order_count(), 2);
    }

    #[test]
    fn test_slot_park_take_clear() {
        let slot = SessionSlot::new();
        let rows = vec![row("A", "SKU-1", "Known", 1, 100)];
        let session = analyze(rows, vec![product("SKU-1", "Known")]).unwrap();

        slot.park(session);
        assert!(slot.with_session(|s| s.is_some()));

        // Cancel path: everything discarded.
        slot.clear();
        assert!(slot.take().is_none());
    }
}
