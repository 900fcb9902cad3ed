//! # Counterparty Balances
//!
//! The running "total due" of customers and shops. Both directories have the
//! same shape and live in separate tables; [`CounterpartyKind`] selects one.
//!
//! ## Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  customers.total_due = Σ balance_entries.amount                         │
//! │                        WHERE counterparty_kind = 'Customer'             │
//! │                          AND counterparty_id   = customers.id           │
//! │                                                                         │
//! │  (same for shops)                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The only writer of `total_due` is [`apply_delta`], which is crate-private
//! and called from the transaction recorder. It updates the denormalised
//! counter and appends the matching entry in the caller's transaction.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gasdepot_core::{BalanceEntry, CounterpartyBalance, CounterpartyKind, CounterpartyRef, Money};

/// Table holding counterparties of a kind.
fn table(kind: CounterpartyKind) -> &'static str {
    match kind {
        CounterpartyKind::Customer => "customers",
        CounterpartyKind::Shop => "shops",
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CounterpartyRow {
    id: String,
    store_id: String,
    name: String,
    total_due: i64,
}

impl CounterpartyRow {
    fn into_balance(self, kind: CounterpartyKind) -> CounterpartyBalance {
        CounterpartyBalance {
            id: self.id,
            kind,
            store_id: self.store_id,
            name: self.name,
            total_due: Money::from_minor(self.total_due),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BalanceEntryRow {
    id: String,
    store_id: String,
    counterparty_kind: CounterpartyKind,
    counterparty_id: String,
    transaction_id: String,
    amount: i64,
    created_at: DateTime<Utc>,
}

impl From<BalanceEntryRow> for BalanceEntry {
    fn from(row: BalanceEntryRow) -> Self {
        BalanceEntry {
            id: row.id,
            store_id: row.store_id,
            counterparty_kind: row.counterparty_kind,
            counterparty_id: row.counterparty_id,
            transaction_id: row.transaction_id,
            amount: Money::from_minor(row.amount),
            created_at: row.created_at,
        }
    }
}

/// A customer or shop to register. New counterparties start with no due.
#[derive(Debug, Clone)]
pub struct NewCounterparty {
    pub id: String,
    pub store_id: String,
    pub kind: CounterpartyKind,
    pub name: String,
    pub phone: Option<String>,
}

impl NewCounterparty {
    pub fn new(kind: CounterpartyKind, store_id: &str, name: &str) -> Self {
        NewCounterparty {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            kind,
            name: name.to_string(),
            phone: None,
        }
    }

    /// Uses a caller-chosen id instead of a generated one.
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = Some(phone.to_string());
        self
    }
}

/// Customer/shop directory and balance reader.
#[derive(Debug, Clone)]
pub struct CounterpartyRepository {
    pool: SqlitePool,
}

impl CounterpartyRepository {
    /// Creates a new CounterpartyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CounterpartyRepository { pool }
    }

    /// Registers a customer or shop.
    pub async fn create(&self, new: &NewCounterparty) -> DbResult<CounterpartyBalance> {
        debug!(id = %new.id, kind = %new.kind, store_id = %new.store_id, "Creating counterparty");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} (id, store_id, name, phone, total_due, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)
             RETURNING id, store_id, name, total_due",
            table(new.kind)
        );

        let row: CounterpartyRow = sqlx::query_as(&sql)
            .bind(&new.id)
            .bind(&new.store_id)
            .bind(&new.name)
            .bind(&new.phone)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into_balance(new.kind))
    }

    /// Current balance of a counterparty in a store.
    pub async fn get(
        &self,
        store_id: &str,
        kind: CounterpartyKind,
        id: &str,
    ) -> DbResult<Option<CounterpartyBalance>> {
        let sql = format!(
            "SELECT id, store_id, name, total_due FROM {} WHERE id = ? AND store_id = ?",
            table(kind)
        );

        let row: Option<CounterpartyRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_balance(kind)))
    }

    /// Balance movements of a counterparty, oldest first.
    pub async fn balance_entries(
        &self,
        store_id: &str,
        kind: CounterpartyKind,
        id: &str,
    ) -> DbResult<Vec<BalanceEntry>> {
        let rows: Vec<BalanceEntryRow> = sqlx::query_as(
            "SELECT id, store_id, counterparty_kind, counterparty_id, transaction_id, amount, created_at
             FROM balance_entries
             WHERE store_id = ? AND counterparty_kind = ? AND counterparty_id = ?
             ORDER BY rowid",
        )
        .bind(store_id)
        .bind(kind)
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Σ of all balance entries of a counterparty. Equals its `total_due`.
    pub async fn ledger_total(
        &self,
        store_id: &str,
        kind: CounterpartyKind,
        id: &str,
    ) -> DbResult<Money> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM balance_entries
             WHERE store_id = ? AND counterparty_kind = ? AND counterparty_id = ?",
        )
        .bind(store_id)
        .bind(kind)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_minor(total))
    }
}

/// Adds `amount` to a counterparty's `total_due` and appends the entry.
///
/// Runs on the caller's connection so it joins the caller's transaction.
/// Returns the new balance.
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    store_id: &str,
    counterparty: &CounterpartyRef,
    amount: Money,
    transaction_id: &str,
) -> DbResult<Money> {
    let now = Utc::now();

    let sql = format!(
        "UPDATE {} SET total_due = total_due + ?, updated_at = ?
         WHERE id = ? AND store_id = ?
         RETURNING total_due",
        table(counterparty.kind)
    );

    let balance: Option<i64> = sqlx::query_scalar(&sql)
        .bind(amount.minor())
        .bind(now)
        .bind(&counterparty.id)
        .bind(store_id)
        .fetch_optional(&mut *conn)
        .await?;

    let balance =
        balance.ok_or_else(|| DbError::not_found(counterparty.kind.as_str(), &counterparty.id))?;

    sqlx::query(
        "INSERT INTO balance_entries (
            id, store_id, counterparty_kind, counterparty_id, transaction_id,
            amount, balance_after, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(store_id)
    .bind(counterparty.kind)
    .bind(&counterparty.id)
    .bind(transaction_id)
    .bind(amount.minor())
    .bind(balance)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    debug!(
        kind = %counterparty.kind,
        id = %counterparty.id,
        delta = amount.minor(),
        balance,
        "Balance delta applied"
    );

    Ok(Money::from_minor(balance))
}
