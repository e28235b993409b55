//! # dagang-core: Pure Business Logic for Dagang
//!
//! This crate is the **heart** of the Dagang reconciliation and reporting
//! engines. It contains all business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Dagang Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  dagang-engine (Pipeline)                       │   │
//! │  │   import session, resolver, guard, materializer, report        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ dagang-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ aggregate │  │  matcher  │  │   │
//! │  │   │  Product  │  │   Money   │  │  SKU agg  │  │  catalog  │  │   │
//! │  │   │   Sale    │  │  integer  │  │  grouping │  │  snapshot │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐                                                │   │
//! │  │   │  finance  │   NO I/O • NO DATABASE • PURE FUNCTIONS        │   │
//! │  │   └───────────┘                                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 dagang-store (Document Store)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Expense, SkuMapping, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`aggregate`] - SKU aggregation of raw extracted rows
//! - [`matcher`] - Catalog snapshot and recognized/unrecognized split
//! - [`finance`] - Date-windowed financial summaries
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: all persisted monetary values are i64 units
//! 4. **Explicit Errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod error;
pub mod finance;
pub mod matcher;
pub mod money;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{aggregate_rows, AggregatedItem};
pub use error::{CoreError, CoreResult};
pub use finance::{summarize, DateInterval, FinancialSummary};
pub use matcher::CatalogSnapshot;
pub use money::Money;
pub use types::*;
