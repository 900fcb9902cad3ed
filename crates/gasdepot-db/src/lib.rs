//! # gasdepot-db: Storage and Recording for GasDepot
//!
//! SQLite storage for the transaction log, inventory counters, counterparty
//! balances and staff payroll, plus the [`TransactionRecorder`] that updates
//! all of them in one database transaction.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GasDepot Data Flow                               │
//! │                                                                         │
//! │  POST /api/transactions (backoffice-api)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   gasdepot-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Recorder    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │ (recorder.rs) │───►│ inventory      │    │  (embedded)  │  │   │
//! │  │   │               │    │ counterparty   │    │              │  │   │
//! │  │   │ one BEGIN ..  │    │ payroll        │    │ 001_initial  │  │   │
//! │  │   │ COMMIT per    │    │ transaction    │    │  _schema.sql │  │   │
//! │  │   │ POS event     │    │ (history)      │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  │            │                                                    │   │
//! │  │            ▼                                                    │   │
//! │  │   ┌───────────────┐                                             │   │
//! │  │   │   Database    │  SqlitePool, WAL, busy_timeout              │   │
//! │  │   │   (pool.rs)   │                                             │   │
//! │  │   └───────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage and recording error types
//! - [`repository`] - Ledger tables and the history reader
//! - [`recorder`] - The atomic transaction recorder
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gasdepot_db::{Database, DbConfig, RecorderConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/gasdepot.db")).await?;
//!
//! let recorder = db.recorder(RecorderConfig::default());
//! let record = recorder.create("store-1", Some("staff-7"), request).await?;
//!
//! let page = db.transactions().list("store-1", &filter).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod recorder;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, RecordError, RecordResult};
pub use pool::{Database, DbConfig};
pub use recorder::{RecorderConfig, TransactionRecorder};

// Repository re-exports for convenience
pub use repository::counterparty::{CounterpartyRepository, NewCounterparty};
pub use repository::inventory::{InventoryRepository, NewInventoryItem};
pub use repository::payroll::{NewStaff, StaffRepository};
pub use repository::transaction::TransactionHistory;
