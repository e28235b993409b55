//! # Typed Collections & Batches
//!
//! Generic document collection access plus the all-or-nothing `Batch`.
//!
//! ## Access Patterns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Collection Operations                               │
//! │                                                                         │
//! │  Single document:    get / put (upsert) / delete                        │
//! │  Whole collection:   list (insert order) / count                        │
//! │  Atomic field math:  increment(id, "$.stock", -3)                       │
//! │                                                                         │
//! │  Multi-document:     Batch { put, delete, increment, ... }              │
//! │                      └── Store::commit_batch() → ONE transaction        │
//! │                                                                         │
//! │  The batch boundary is the store's atomicity guarantee: either every    │
//! │  operation in the batch lands, or none do.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomic Increment
//! `increment` executes a single UPDATE using SQLite's JSON functions, so
//! concurrent writers never race a read-modify-write cycle on fields like
//! product stock.

use std::marker::PhantomData;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Collection Names
// =============================================================================

/// Canonical collection names.
pub mod names {
    pub const PRODUCTS: &str = "products";
    pub const SALES: &str = "sales";
    pub const RETURNS: &str = "returns";
    pub const EXPENSES: &str = "expenses";
    pub const OTHER_INCOMES: &str = "otherIncomes";
    pub const SKU_MAPPINGS: &str = "skuMappings";
    pub const IMPORTED_FILES: &str = "importedFiles";
    pub const STOCK_OPNAME_LOGS: &str = "stockOpnameLogs";
    pub const ACTIVITY_LOGS: &str = "activityLogs";
    pub const SETTINGS: &str = "settings";
    pub const FLASH_SALES: &str = "flashSales";
}

// =============================================================================
// Collection
// =============================================================================

/// Typed handle onto one document collection.
///
/// ## Usage
/// ```rust,ignore
/// let products = store.products();
/// products.put(&product.id.clone(), &product).await?;
/// let found = products.get("p-1").await?;
/// ```
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pool: SqlitePool,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a handle for `name` over the given pool.
    pub fn new(pool: SqlitePool, name: &'static str) -> Self {
        Collection {
            pool,
            name,
            _marker: PhantomData,
        }
    }

    /// The collection name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fetches one document by id.
    pub async fn get(&self, id: &str) -> StoreResult<Option<T>> {
        let body: Option<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
        )
        .bind(self.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match body {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Upserts one document.
    pub async fn put(&self, id: &str, doc: &T) -> StoreResult<()> {
        debug!(collection = self.name, id = %id, "Writing document");

        let body = serde_json::to_string(doc)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
            "#,
        )
        .bind(self.name)
        .bind(id)
        .bind(body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes one document. Missing documents are reported as NotFound.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(self.name)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(self.name, id));
        }
        Ok(())
    }

    /// Lists every document in the collection, in insertion order.
    ///
    /// Collections here are small (a shop's catalog and ledgers), so range
    /// filtering happens in memory at the caller.
    pub async fn list(&self) -> StoreResult<Vec<T>> {
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid",
        )
        .bind(self.name)
        .fetch_all(&self.pool)
        .await?;

        let mut docs = Vec::with_capacity(bodies.len());
        for json in bodies {
            docs.push(serde_json::from_str(&json)?);
        }
        Ok(docs)
    }

    /// Number of documents in the collection.
    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
                .bind(self.name)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Atomically adds `delta` to a numeric field inside the document body.
    ///
    /// ## Arguments
    /// * `path` - JSON path of the field, e.g. `"$.stock"`
    ///
    /// Executes as a single UPDATE (`json_set` over `json_extract`), so two
    /// concurrent increments on the same document serialize inside SQLite
    /// instead of racing a client-side read-then-write.
    pub async fn increment(&self, id: &str, path: &str, delta: i64) -> StoreResult<()> {
        debug!(collection = self.name, id = %id, path = %path, delta, "Incrementing field");

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET body = json_set(body, ?3, COALESCE(json_extract(body, ?3), 0) + ?4),
                updated_at = ?5
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(self.name)
        .bind(id)
        .bind(path)
        .bind(delta)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(self.name, id));
        }
        Ok(())
    }
}

// =============================================================================
// Batch
// =============================================================================

/// One operation inside a batch.
#[derive(Debug, Clone)]
pub(crate) enum BatchOp {
    Put {
        collection: String,
        id: String,
        body: String,
    },
    Delete {
        collection: String,
        id: String,
    },
    Increment {
        collection: String,
        id: String,
        path: String,
        delta: i64,
    },
}

/// A set of write operations committed in one transaction.
///
/// ## Usage
/// ```rust,ignore
/// let mut batch = Batch::new();
/// for sale in &sales {
///     batch.put(names::SALES, &sale.id, sale)?;
/// }
/// batch.increment(names::PRODUCTS, "p-1", "$.stock", -3);
/// store.commit_batch(batch).await?;
/// ```
#[derive(Debug, Default)]
pub struct Batch {
    pub(crate) ops: Vec<BatchOp>,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Batch::default()
    }

    /// Queues an upsert. The document is serialized immediately, so a bad
    /// body fails before anything touches the store.
    pub fn put<T: Serialize>(&mut self, collection: &str, id: &str, doc: &T) -> StoreResult<()> {
        let body = serde_json::to_string(doc)?;
        self.ops.push(BatchOp::Put {
            collection: collection.to_string(),
            id: id.to_string(),
            body,
        });
        Ok(())
    }

    /// Queues a delete. Deleting an absent document inside a batch is a
    /// no-op, not an error.
    pub fn delete(&mut self, collection: &str, id: &str) {
        self.ops.push(BatchOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
    }

    /// Queues an atomic field increment (see [`Collection::increment`]).
    pub fn increment(&mut self, collection: &str, id: &str, path: &str, delta: i64) {
        self.ops.push(BatchOp::Increment {
            collection: collection.to_string(),
            id: id.to_string(),
            path: path.to_string(),
            delta,
        });
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_queues_ops() {
        let mut batch = Batch::new();
        assert!(batch.is_empty());

        batch.put(names::SALES, "s-1", &serde_json::json!({"id": "s-1"})).unwrap();
        batch.delete(names::SALES, "s-2");
        batch.increment(names::PRODUCTS, "p-1", "$.stock", -2);

        assert_eq!(batch.len(), 3);
    }
}
