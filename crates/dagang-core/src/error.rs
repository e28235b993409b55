//! # Error Types
//!
//! Domain-specific error types for dagang-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  dagang-core errors (this file)                                        │
//! │  └── CoreError        - Domain rule violations                         │
//! │                                                                         │
//! │  dagang-store errors (separate crate)                                  │
//! │  └── StoreError       - Document store failures                        │
//! │                                                                         │
//! │  dagang-engine errors (separate crate)                                 │
//! │  └── ImportError      - Pipeline failures, wraps the two above         │
//! │                                                                         │
//! │  Flow: CoreError → ImportError → caller-facing notification            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Core business logic errors.
///
/// These represent domain rule violations. They are caught at the engine
/// boundary and translated to operator-facing messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A date interval with end before start.
    #[error("Invalid date interval: {start} is after {end}")]
    InvalidInterval { start: String, end: String },

    /// Row quantity or price outside the contract (`quantity ≥ 0`,
    /// `unit_price ≥ 0`).
    #[error("Invalid extracted row for order {order_id}: {reason}")]
    InvalidRow { order_id: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
