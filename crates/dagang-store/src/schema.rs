//! # Store Schema
//!
//! Embedded DDL for the document table, applied at store open.
//!
//! ## Why One Table?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The store models Firestore-style document collections:                 │
//! │                                                                         │
//! │  documents                                                              │
//! │  ┌────────────┬──────────┬──────────────────────────────┬────────────┐ │
//! │  │ collection │ id       │ body (JSON)                  │ updated_at │ │
//! │  ├────────────┼──────────┼──────────────────────────────┼────────────┤ │
//! │  │ products   │ p-1      │ {"id":"p-1","stock":12,...}  │ ...        │ │
//! │  │ sales      │ s-9      │ {"id":"s-9","items":[...]}   │ ...        │ │
//! │  │ settings   │ main     │ {"id":"main",...}            │ ...        │ │
//! │  └────────────┴──────────┴──────────────────────────────┴────────────┘ │
//! │                                                                         │
//! │  Every read deserializes the JSON body into a typed struct; every      │
//! │  write serializes back. Cross-collection batches commit in one         │
//! │  SQLite transaction.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The DDL is idempotent (`IF NOT EXISTS`), so applying it on every open is
//! safe and replaces a versioned migration set.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{StoreError, StoreResult};

/// Idempotent schema for the document table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT NOT NULL,
    id          TEXT NOT NULL,
    body        TEXT NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection
    ON documents (collection);
"#;

/// Applies the embedded schema.
///
/// ## Safety
/// - Idempotent: safe to run on every open
/// - Additive only: existing documents are never touched
pub async fn apply_schema(pool: &SqlitePool) -> StoreResult<()> {
    info!("Applying document store schema");

    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| StoreError::SchemaFailed(e.to_string()))?;

    Ok(())
}
