//! # dagang-engine: Import Pipeline and Reporting for Dagang
//!
//! Orchestrates the sales-import reconciliation pipeline on top of
//! [`dagang_core`] (pure logic) and [`dagang_store`] (persistence).
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sales Import Pipeline                             │
//! │                                                                         │
//! │  extraction output (rows)                                               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ImportSession::analyze ── aggregate ── match ── prefill   [session]   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  SessionSlot ◄── operator review: CreateNew / MapTo        [session]   │
//! │        │                                                                │
//! │        ▼  is_ready() gate                                               │
//! │  materialize ── sales, products, mappings,                [materializer]│
//! │        │        expense (idempotent), stock decrements                  │
//! │        ▼                                                                │
//! │  ONE store transaction                                                  │
//! │                                                                         │
//! │  reports: financial_summary / dashboard_summary / export_csv  [report] │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - Import session value and the review-time slot
//! - [`resolver`] - SKU-mapping pre-fill and persistence planning
//! - [`guard`] - Per-file idempotency guard for the import cost expense
//! - [`materializer`] - The single write boundary of the pipeline
//! - [`report`] - Interval summaries and the accounting CSV export
//! - [`opname`] - Mass stock reset ahead of a physical recount
//! - [`error`] - Pipeline error type

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod guard;
pub mod materializer;
pub mod opname;
pub mod report;
pub mod resolver;
pub mod session;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ImportError, ImportResult};
pub use guard::CostPosting;
pub use materializer::{materialize, ImportOutcome};
pub use opname::zero_all_stock;
pub use report::{dashboard_summary, export_csv, financial_summary};
pub use session::{ImportSession, Resolution, SessionSlot};
