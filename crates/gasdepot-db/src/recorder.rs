//! # Transaction Recorder
//!
//! Turns one POS event into one atomic update of the transaction log,
//! inventory counters, counterparty balance and staff payroll.
//!
//! ## create()
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  request                                                                │
//! │     │                                                                   │
//! │     ▼  validate_request ─────────────── Validation (nothing touched)    │
//! │     ▼  price_request    subtotals, total, final, paid, due              │
//! │     ▼  plan_effects     balance? payroll[] inventory[]                  │
//! │     │                                                                   │
//! │  BEGIN ─────────────────────────────────────────────────────────────┐   │
//! │  │  INSERT transactions + transaction_items   (takes the write lock)│   │
//! │  │  UPDATE customers|shops total_due += ?     ── NotFound → abort   │   │
//! │  │  UPDATE staff salary_due -= ?  (each)      ── NotFound → abort   │   │
//! │  │  UPDATE inventory counters += ? (each row) ── NotFound → abort   │   │
//! │  │     └── counter < 0 ? Reject → abort / AllowWithFlag → oversold  │   │
//! │  COMMIT ────────────────────────────────────────────────────────────┘   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  TransactionRecord { status: COMPLETED }                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every early return drops the open `sqlx::Transaction`, which rolls it
//! back. The same holds when the caller's future is cancelled mid-way.
//! The engine never retries on its own; `Conflict` goes back to the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::{RecordError, RecordResult};
use crate::repository::{counterparty, inventory, payroll, transaction};
use gasdepot_core::effects::plan_effects;
use gasdepot_core::pricing::price_request;
use gasdepot_core::validation::{validate_notes, validate_request};
use gasdepot_core::{
    OversellPolicy, TransactionRecord, TransactionRequest, TransactionStatus, ValidationError,
};

/// Engine settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// What to do when a sale drives a counter below zero.
    #[serde(default)]
    pub oversell: OversellPolicy,
}

impl RecorderConfig {
    pub fn with_oversell(mut self, policy: OversellPolicy) -> Self {
        self.oversell = policy;
        self
    }
}

/// The only writer of ledger rows on the transaction path.
#[derive(Debug, Clone)]
pub struct TransactionRecorder {
    pool: SqlitePool,
    config: RecorderConfig,
}

impl TransactionRecorder {
    /// Creates a recorder on an existing pool.
    pub fn new(pool: SqlitePool, config: RecorderConfig) -> Self {
        TransactionRecorder { pool, config }
    }

    pub fn config(&self) -> RecorderConfig {
        self.config
    }

    /// Records one POS event atomically.
    ///
    /// ## Arguments
    /// * `store_id` - Store of the acting principal (trusted as given)
    /// * `staff_id` - Staff account that performed it, if any
    /// * `request` - What the terminal submitted
    ///
    /// ## Returns
    /// The committed record. On any error nothing is persisted.
    #[instrument(skip(self, request), fields(kind = %request.transaction_type))]
    pub async fn create(
        &self,
        store_id: &str,
        staff_id: Option<&str>,
        request: TransactionRequest,
    ) -> RecordResult<TransactionRecord> {
        let store_id = store_id.trim();
        if store_id.is_empty() {
            return Err(ValidationError::required("storeId").into());
        }

        validate_request(&request)?;
        let notes = validate_notes(request.notes.as_deref())?;
        let pricing = price_request(&request)?;
        let plan = plan_effects(&request, &pricing)?;

        let mut record = TransactionRecord {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            staff_id: staff_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            customer: request.counterparty(),
            items: pricing.items,
            total_amount: pricing.total_amount,
            final_amount: pricing.final_amount,
            paid_amount: pricing.paid_amount,
            due_amount: pricing.due_amount,
            transaction_type: request.transaction_type,
            payment_method: request.payment_method,
            status: TransactionStatus::Completed,
            oversold: false,
            notes,
            created_at: Utc::now(),
        };

        debug!(
            id = %record.id,
            total = record.total_amount.minor(),
            due = record.due_amount.minor(),
            balance = plan.balance.is_some(),
            payroll = plan.payroll.len(),
            inventory = plan.inventory.len(),
            "Planned transaction"
        );

        let mut tx = self.pool.begin().await?;

        transaction::insert_record(&mut tx, &record).await?;

        if let Some(balance) = &plan.balance {
            counterparty::apply_delta(
                &mut tx,
                store_id,
                &balance.counterparty,
                balance.amount,
                &record.id,
            )
            .await?;
        }

        for payout in &plan.payroll {
            payroll::reduce_due(&mut tx, store_id, &payout.staff_id, payout.amount).await?;
        }

        for effect in &plan.inventory {
            let counters = inventory::apply_delta(&mut tx, store_id, effect, &record.id).await?;

            let Some((counter, resulting)) = counters.overdrawn_by(&effect.delta) else {
                continue;
            };

            match self.config.oversell {
                OversellPolicy::Reject => {
                    warn!(
                        item_ref = %effect.item_ref,
                        variant = %effect.variant,
                        counter,
                        resulting,
                        "Oversell rejected, rolling back"
                    );
                    return Err(RecordError::InsufficientStock {
                        item_ref: effect.item_ref.clone(),
                        variant: effect.variant.clone(),
                        counter: counter.to_string(),
                        resulting,
                    });
                }
                OversellPolicy::AllowWithFlag => {
                    warn!(
                        id = %record.id,
                        item_ref = %effect.item_ref,
                        variant = %effect.variant,
                        counter,
                        resulting,
                        "Oversell allowed, flagging record"
                    );
                    record.oversold = true;
                }
            }
        }

        if record.oversold {
            transaction::mark_oversold(&mut tx, &record.id).await?;
        }

        tx.commit().await?;

        info!(
            id = %record.id,
            store_id,
            kind = %record.transaction_type,
            final_amount = record.final_amount.minor(),
            due = record.due_amount.minor(),
            oversold = record.oversold,
            "Transaction recorded"
        );

        Ok(record)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
