//! # Store Handle & Pool Management
//!
//! Connection pool creation and configuration for the SQLite-backed
//! document store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Document Store Lifecycle                           │
//! │                                                                         │
//! │  StoreConfig::new(path) ← configure pool settings                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::open(config).await ← create pool + apply schema                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  store.products() / store.sales() / ... ← typed collections             │
//! │  store.commit_batch(batch)             ← one transaction                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! WAL (Write-Ahead Logging) is enabled so readers don't block writers and
//! vice versa, and for better crash recovery.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use dagang_core::types::{
    ActivityLog, Expense, FlashSale, ImportedFileRecord, OtherIncome, Product, Sale, SaleReturn,
    Settings, SkuMapping, StockOpnameLog,
};

use crate::collection::{names, Batch, BatchOp, Collection};
use crate::error::{StoreError, StoreResult};
use crate::schema;

// =============================================================================
// Configuration
// =============================================================================

/// Store configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = StoreConfig::new("/path/to/dagang.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (sufficient for a single-shop deployment)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to apply the schema on open.
    /// Default: true
    pub apply_schema: bool,
}

impl StoreConfig {
    /// Creates a configuration with the given database path. The file is
    /// created if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StoreConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            apply_schema: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection acquire timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Creates an in-memory store configuration (for testing).
    pub fn in_memory() -> Self {
        StoreConfig {
            database_path: PathBuf::from(":memory:"),
            // In-memory requires a single connection: each connection would
            // otherwise see its own empty database.
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            apply_schema: true,
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// Main store handle providing typed collection access.
///
/// Cloning is cheap; all clones share one pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens the store.
    ///
    /// ## What This Does
    /// 1. Creates the database file if missing
    /// 2. Configures SQLite (WAL, NORMAL synchronous, foreign keys)
    /// 3. Creates the connection pool
    /// 4. Applies the document schema (if enabled)
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening document store"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Store pool created"
        );

        let store = Store { pool };

        if config.apply_schema {
            schema::apply_schema(&store.pool).await?;
        }

        Ok(store)
    }

    /// Returns a reference to the connection pool, for queries not covered
    /// by the collection API.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A typed handle onto an arbitrary collection.
    pub fn collection<T>(&self, name: &'static str) -> Collection<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
    {
        Collection::new(self.pool.clone(), name)
    }

    // -------------------------------------------------------------------------
    // Typed collection accessors
    // -------------------------------------------------------------------------

    pub fn products(&self) -> Collection<Product> {
        self.collection(names::PRODUCTS)
    }

    pub fn sales(&self) -> Collection<Sale> {
        self.collection(names::SALES)
    }

    pub fn returns(&self) -> Collection<SaleReturn> {
        self.collection(names::RETURNS)
    }

    pub fn expenses(&self) -> Collection<Expense> {
        self.collection(names::EXPENSES)
    }

    pub fn other_incomes(&self) -> Collection<OtherIncome> {
        self.collection(names::OTHER_INCOMES)
    }

    pub fn sku_mappings(&self) -> Collection<SkuMapping> {
        self.collection(names::SKU_MAPPINGS)
    }

    pub fn imported_files(&self) -> Collection<ImportedFileRecord> {
        self.collection(names::IMPORTED_FILES)
    }

    pub fn stock_opname_logs(&self) -> Collection<StockOpnameLog> {
        self.collection(names::STOCK_OPNAME_LOGS)
    }

    pub fn activity_logs(&self) -> Collection<ActivityLog> {
        self.collection(names::ACTIVITY_LOGS)
    }

    pub fn settings(&self) -> Collection<Settings> {
        self.collection(names::SETTINGS)
    }

    pub fn flash_sales(&self) -> Collection<FlashSale> {
        self.collection(names::FLASH_SALES)
    }

    /// Loads the settings singleton, falling back to defaults when the
    /// document has never been written.
    pub async fn load_settings(&self) -> StoreResult<Settings> {
        Ok(self
            .settings()
            .get(dagang_core::types::SINGLETON_ID)
            .await?
            .unwrap_or_default())
    }

    // -------------------------------------------------------------------------
    // Batch commit
    // -------------------------------------------------------------------------

    /// Commits a batch in one transaction: either every operation lands or
    /// none do.
    pub async fn commit_batch(&self, batch: Batch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        debug!(ops = batch.len(), "Committing batch");

        let now = chrono::Utc::now().to_rfc3339();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::BatchFailed(e.to_string()))?;

        for op in &batch.ops {
            let result = match op {
                BatchOp::Put {
                    collection,
                    id,
                    body,
                } => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, body, updated_at)
                        VALUES (?1, ?2, ?3, ?4)
                        ON CONFLICT (collection, id)
                        DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(body)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await
                }
                BatchOp::Delete { collection, id } => {
                    sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
                        .bind(collection)
                        .bind(id)
                        .execute(&mut *tx)
                        .await
                }
                BatchOp::Increment {
                    collection,
                    id,
                    path,
                    delta,
                } => {
                    sqlx::query(
                        r#"
                        UPDATE documents
                        SET body = json_set(body, ?3, COALESCE(json_extract(body, ?3), 0) + ?4),
                            updated_at = ?5
                        WHERE collection = ?1 AND id = ?2
                        "#,
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(path)
                    .bind(delta)
                    .bind(&now)
                    .execute(&mut *tx)
                    .await
                }
            };

            if let Err(e) = result {
                // Dropping the transaction rolls back everything queued.
                return Err(StoreError::BatchFailed(e.to_string()));
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::BatchFailed(e.to_string()))?;

        info!(ops = batch.len(), "Batch committed");
        Ok(())
    }

    /// Closes the pool. All collection operations fail afterwards.
    pub async fn close(&self) {
        info!("Closing store pool");
        self.pool.close().await;
    }

    /// Checks if the store is responsive.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
