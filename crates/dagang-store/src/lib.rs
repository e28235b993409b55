//! # dagang-store: Document Store for Dagang
//!
//! Persistence layer modeling the remote document store: named collections
//! of JSON documents with read/write/batch-write primitives, backed by
//! SQLite via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dagang Data Flow                                 │
//! │                                                                         │
//! │  dagang-engine (import pipeline, reports)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   dagang-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │    Store      │    │  Collections  │    │    Schema    │  │   │
//! │  │   │  (store.rs)   │◄───│(collection.rs)│    │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ Collection<T> │    │  documents   │  │   │
//! │  │   │  Batch commit │    │ Batch ops     │    │  table DDL   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dagang_store::{Store, StoreConfig};
//!
//! let store = Store::open(StoreConfig::new("dagang.db")).await?;
//! let products = store.products().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod collection;
pub mod error;
pub mod schema;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use collection::{names, Batch, Collection};
pub use error::{StoreError, StoreResult};
pub use store::{Store, StoreConfig};
