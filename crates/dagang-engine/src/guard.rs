//! # Idempotency Guard
//!
//! Ensures the consolidated per-file operational cost is posted at most
//! once per source filename.
//!
//! ## Scope of the Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Re-importing "oct.xlsx":                                               │
//! │                                                                         │
//! │  Sales          → created again (reprocessing a file re-imports sales)  │
//! │  Cost expense   → posted ONCE: importedFiles record for "oct.xlsx"      │
//! │                   already exists, so the expense is skipped             │
//! │                                                                         │
//! │  The duplicate case is a soft skip with a notice, never an error.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use dagang_core::types::{Expense, ImportedFileRecord, Settings};
use dagang_store::Store;

use crate::error::ImportResult;

/// Outcome of the cost-posting check for one import.
#[derive(Debug, Clone)]
pub enum CostPosting {
    /// First import of this filename: the expense and its idempotency
    /// marker are ready to join the import batch.
    Posted {
        expense: Expense,
        record: ImportedFileRecord,
    },
    /// The filename was imported before; no expense this time.
    DuplicateFile { file_name: String },
}

impl CostPosting {
    /// True when this import posts an operational-cost expense.
    pub fn posts_expense(&self) -> bool {
        matches!(self, CostPosting::Posted { .. })
    }
}

/// Checks the idempotency marker for `file_name` and, on first sight,
/// builds the consolidated expense (`orders × per-order cost`) plus the
/// marker record.
///
/// Nothing is written here; the caller adds both documents to the import
/// batch so they commit together with the sales.
pub async fn prepare_cost_posting(
    store: &Store,
    file_name: &str,
    order_count: usize,
    settings: &Settings,
    now: DateTime<Utc>,
) -> ImportResult<CostPosting> {
    let already_imported = store
        .imported_files()
        .list()
        .await?
        .iter()
        .any(|record| record.name == file_name);

    if already_imported {
        info!(file = %file_name, "File already imported, skipping cost posting");
        return Ok(CostPosting::DuplicateFile {
            file_name: file_name.to_string(),
        });
    }

    let amount = settings
        .per_order_import_cost
        .multiply_quantity(order_count as i64);

    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        name: format!("Biaya operasional import {file_name}"),
        amount,
        category: "Operasional".to_string(),
        subcategory: Some("Import".to_string()),
        date: now,
    };
    let record = ImportedFileRecord {
        id: Uuid::new_v4().to_string(),
        name: file_name.to_string(),
        imported_at: now,
    };

    info!(
        file = %file_name,
        orders = order_count,
        amount = %amount,
        "Posting consolidated import cost"
    );

    Ok(CostPosting::Posted { expense, record })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dagang_core::types::Settings;
    use dagang_store::StoreConfig;

    #[tokio::test]
    async fn test_first_import_posts_expense() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let settings = Settings::default(); // 1250 per order

        let posting = prepare_cost_posting(&store, "oct.xlsx", 10, &settings, Utc::now())
            .await
            .unwrap();

        match posting {
            CostPosting::Posted { expense, record } => {
                assert_eq!(expense.amount.units(), 12500);
                assert_eq!(record.name, "oct.xlsx");
            }
            CostPosting::DuplicateFile { .. } => panic!("expected first import to post"),
        }
    }

    #[tokio::test]
    async fn test_known_filename_is_soft_skip() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let record = ImportedFileRecord {
            id: "f-1".to_string(),
            name: "oct.xlsx".to_string(),
            imported_at: Utc::now(),
        };
        store.imported_files().put(&record.id, &record).await.unwrap();

        let posting =
            prepare_cost_posting(&store, "oct.xlsx", 10, &Settings::default(), Utc::now())
                .await
                .unwrap();

        assert!(!posting.posts_expense());
    }

    #[tokio::test]
    async fn test_different_filename_still_posts() {
        let store = Store::open(StoreConfig::in_memory()).await.unwrap();
        let record = ImportedFileRecord {
            id: "f-1".to_string(),
            name: "oct.xlsx".to_string(),
            imported_at: Utc::now(),
        };
        store.imported_files().put(&record.id, &record).await.unwrap();

        let posting =
            prepare_cost_posting(&store, "nov.xlsx", 4, &Settings::default(), Utc::now())
                .await
                .unwrap();

        assert!(posting.posts_expense());
    }
}
