//! # Repository Module
//!
//! One module per ledger table group.
//!
//! ## Read and Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Setup / reads (pub, on the pool)                                       │
//! │    InventoryRepository     create, get, list_for_store                  │
//! │    CounterpartyRepository  create, get, balance_entries, ledger_total   │
//! │    StaffRepository         create, get                                  │
//! │    TransactionHistory      list, get, summary                           │
//! │                                                                         │
//! │  Ledger writes (pub(crate), on the recorder's open transaction)         │
//! │    inventory::apply_delta       counters += delta, movement row         │
//! │    counterparty::apply_delta    total_due += amount, balance entry      │
//! │    payroll::reduce_due          salary_due -= payout                    │
//! │    transaction::insert_record   transaction + line items                │
//! │    transaction::mark_oversold                                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Counters are only ever changed with relative `SET x = x + ?` updates, so
//! concurrent recorders never lose each other's increments.

pub mod counterparty;
pub mod inventory;
pub mod payroll;
pub mod transaction;
