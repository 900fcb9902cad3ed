//! # gasdepot-core: Pure Business Logic for the GasDepot Back-Office
//!
//! Everything the reconciliation engine decides, without touching storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GasDepot Reconciliation Engine                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 POS terminal (HTTP JSON)                        │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │               ★ gasdepot-core (THIS CRATE) ★                    │    │
//! │  │                                                                 │    │
//! │  │   validation ──► pricing ──► effects                            │    │
//! │  │   (reject bad    (subtotals,  (balance / payroll /              │    │
//! │  │    input)         due)         inventory deltas)                │    │
//! │  │                                                                 │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ EffectPlan                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │          gasdepot-db: applies the plan in one transaction       │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Requests, records, ledger rows, history filters
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Request validation
//! - [`pricing`] - Line-item subtotals and the derived amounts
//! - [`effects`] - Ledger delta classification
//!
//! ## Example Usage
//!
//! ```rust
//! use gasdepot_core::effects::plan_effects;
//! use gasdepot_core::pricing::price_request;
//! use gasdepot_core::validation::validate_request;
//! use gasdepot_core::{ItemKind, LineItemInput, Money, PaymentMethod, TransactionRequest, TransactionType};
//!
//! let request = TransactionRequest {
//!     items: vec![LineItemInput {
//!         item_ref: Some("LPG-12KG".into()),
//!         kind: ItemKind::Cylinder,
//!         quantity: 1,
//!         unit_price: Money::from_minor(1500),
//!         is_return: false,
//!         variant: None,
//!         name: None,
//!         staff_id: None,
//!     }],
//!     transaction_type: TransactionType::Sale,
//!     payment_method: PaymentMethod::Cash,
//!     final_amount: Some(Money::from_minor(1500)),
//!     paid_amount: Some(Money::from_minor(500)),
//!     customer_id: Some("C1".into()),
//!     customer_type: None,
//!     notes: None,
//! };
//!
//! validate_request(&request).unwrap();
//! let pricing = price_request(&request).unwrap();
//! let plan = plan_effects(&request, &pricing).unwrap();
//!
//! assert_eq!(pricing.due_amount.minor(), 1000);
//! assert_eq!(plan.balance.unwrap().amount.minor(), 1000);
//! assert_eq!(plan.inventory[0].delta.full, -1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod effects;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items in a single transaction.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity on a single line item.
///
/// ## Business Reason
/// Catches typing 1000 instead of 10 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum characters in a transaction's notes.
pub const MAX_NOTES_LEN: usize = 500;

/// History page size when the caller gives none.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest history page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;
