//! # Transaction Log & History
//!
//! Write side: crate-private inserts used by the recorder inside its
//! database transaction. Read side: [`TransactionHistory`], a paginated,
//! filterable projection over committed records.
//!
//! ## Read Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  list(store, filter)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve filter ── bad range / page / search → Validation               │
//! │       │                                                                 │
//! │       ▼  BEGIN (one read snapshot)                                      │
//! │  SELECT COUNT(*) … WHERE <filters>                    → meta.total      │
//! │  SELECT …        … WHERE <filters> ORDER BY … LIMIT … → page            │
//! │  SELECT items    … WHERE transaction_id IN (page ids) → line items      │
//! │       │                                                                 │
//! │       ▼  COMMIT                                                         │
//! │  { data, meta }                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records only become visible here once the recorder commits, together
//! with their ledger effects.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult, RecordError, RecordResult};
use gasdepot_core::validation::{validate_pagination, validate_search_query};
use gasdepot_core::{
    CounterpartyKind, CounterpartyRef, ItemKind, LineItem, Money, PageMeta, PaymentMethod,
    SortField, SortOrder, TransactionFilter, TransactionPage, TransactionRecord,
    TransactionStatus, TransactionSummary, TransactionType, ValidationError, DEFAULT_PAGE_LIMIT,
};

const TRANSACTION_COLUMNS: &str = "t.id, t.store_id, t.staff_id, t.customer_id, t.customer_type, \
     t.total_amount, t.final_amount, t.paid_amount, t.due_amount, t.type, t.payment_method, \
     t.status, t.oversold, t.notes, t.created_at";

const ITEM_COLUMNS: &str = "id, transaction_id, item_ref, kind, variant, name, quantity, \
     unit_price, subtotal, is_return, staff_id";

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    store_id: String,
    staff_id: Option<String>,
    customer_id: Option<String>,
    customer_type: Option<CounterpartyKind>,
    total_amount: i64,
    final_amount: i64,
    paid_amount: i64,
    due_amount: i64,
    #[sqlx(rename = "type")]
    transaction_type: TransactionType,
    payment_method: PaymentMethod,
    status: TransactionStatus,
    oversold: bool,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_record(self, items: Vec<LineItem>) -> TransactionRecord {
        let customer = self.customer_id.map(|id| CounterpartyRef {
            id,
            kind: self.customer_type.unwrap_or_default(),
        });

        TransactionRecord {
            id: self.id,
            store_id: self.store_id,
            staff_id: self.staff_id,
            customer,
            items,
            total_amount: Money::from_minor(self.total_amount),
            final_amount: Money::from_minor(self.final_amount),
            paid_amount: Money::from_minor(self.paid_amount),
            due_amount: Money::from_minor(self.due_amount),
            transaction_type: self.transaction_type,
            payment_method: self.payment_method,
            status: self.status,
            oversold: self.oversold,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    transaction_id: String,
    item_ref: Option<String>,
    kind: ItemKind,
    variant: String,
    name: String,
    quantity: i64,
    unit_price: i64,
    subtotal: i64,
    is_return: bool,
    staff_id: Option<String>,
}

impl From<ItemRow> for LineItem {
    fn from(row: ItemRow) -> Self {
        LineItem {
            id: row.id,
            item_ref: row.item_ref,
            kind: row.kind,
            variant: row.variant,
            name: row.name,
            quantity: row.quantity,
            unit_price: Money::from_minor(row.unit_price),
            subtotal: Money::from_minor(row.subtotal),
            is_return: row.is_return,
            staff_id: row.staff_id,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_sales: i64,
    total_expenses: i64,
    total_due_collected: i64,
    total_due_pending: i64,
    total_returns: i64,
    count: i64,
}

// =============================================================================
// Write Side (recorder only)
// =============================================================================

/// Inserts a record and its line items on the caller's connection.
pub(crate) async fn insert_record(
    conn: &mut SqliteConnection,
    record: &TransactionRecord,
) -> DbResult<()> {
    debug!(
        id = %record.id,
        kind = %record.transaction_type,
        items = record.items.len(),
        "Inserting transaction record"
    );

    sqlx::query(
        "INSERT INTO transactions (
            id, store_id, staff_id, customer_id, customer_type,
            total_amount, final_amount, paid_amount, due_amount,
            type, payment_method, status, oversold, notes, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.store_id)
    .bind(&record.staff_id)
    .bind(record.customer.as_ref().map(|c| c.id.as_str()))
    .bind(record.customer.as_ref().map(|c| c.kind))
    .bind(record.total_amount.minor())
    .bind(record.final_amount.minor())
    .bind(record.paid_amount.minor())
    .bind(record.due_amount.minor())
    .bind(record.transaction_type)
    .bind(record.payment_method)
    .bind(record.status)
    .bind(record.oversold)
    .bind(&record.notes)
    .bind(record.created_at)
    .execute(&mut *conn)
    .await?;

    for (position, item) in record.items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO transaction_items (
                id, transaction_id, position, item_ref, kind, variant, name,
                quantity, unit_price, subtotal, is_return, staff_id
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&item.id)
        .bind(&record.id)
        .bind(position as i64)
        .bind(&item.item_ref)
        .bind(item.kind)
        .bind(&item.variant)
        .bind(&item.name)
        .bind(item.quantity)
        .bind(item.unit_price.minor())
        .bind(item.subtotal.minor())
        .bind(item.is_return)
        .bind(&item.staff_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Flags a record inserted earlier in the same database transaction.
pub(crate) async fn mark_oversold(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let result = sqlx::query("UPDATE transactions SET oversold = 1 WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Transaction", id));
    }
    Ok(())
}

// =============================================================================
// Filters
// =============================================================================

/// A filter with defaults applied and ranges checked.
#[derive(Debug, Clone)]
struct ResolvedFilter {
    filter: TransactionFilter,
    search: Option<String>,
    sort_by: SortField,
    sort_order: SortOrder,
    page: u32,
    limit: u32,
}

impl ResolvedFilter {
    /// Checks ranges, search and paging.
    fn resolve(filter: &TransactionFilter) -> Result<Self, ValidationError> {
        let unpaged = Self::unpaged(filter)?;
        let (page, limit) = validate_pagination(filter.page, filter.limit)?;
        Ok(ResolvedFilter {
            page,
            limit,
            ..unpaged
        })
    }

    /// Checks ranges and search only; `page` and `limit` are ignored.
    fn unpaged(filter: &TransactionFilter) -> Result<Self, ValidationError> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(ValidationError::invalid("from", "must not be after `to`"));
            }
        }

        if let (Some(min), Some(max)) = (filter.min_amount, filter.max_amount) {
            if min > max {
                return Err(ValidationError::invalid(
                    "minAmount",
                    "must not exceed `maxAmount`",
                ));
            }
        }

        let search = validate_search_query(filter.search.as_deref())?;

        Ok(ResolvedFilter {
            filter: filter.clone(),
            search,
            sort_by: filter.sort_by.unwrap_or_default(),
            sort_order: filter.sort_order.unwrap_or_default(),
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        })
    }

    fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "t.created_at",
        SortField::FinalAmount => "t.final_amount",
        SortField::TotalAmount => "t.total_amount",
        SortField::PaidAmount => "t.paid_amount",
        SortField::DueAmount => "t.due_amount",
    }
}

fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// `%query%` with LIKE wildcards in the query escaped.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Appends `WHERE …` for the store and every present filter.
fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, store_id: &str, resolved: &ResolvedFilter) {
    let f = &resolved.filter;

    qb.push(" WHERE t.store_id = ").push_bind(store_id.to_string());

    if let Some(from) = f.from {
        qb.push(" AND t.created_at >= ").push_bind(from);
    }
    if let Some(to) = f.to {
        qb.push(" AND t.created_at <= ").push_bind(to);
    }
    if let Some(customer_id) = f.customer_id.as_deref().filter(|c| !c.trim().is_empty()) {
        qb.push(" AND t.customer_id = ")
            .push_bind(customer_id.trim().to_string());
    }
    if let Some(transaction_type) = f.transaction_type {
        qb.push(" AND t.type = ").push_bind(transaction_type);
    }
    if let Some(customer_type) = f.customer_type {
        qb.push(" AND t.customer_type = ").push_bind(customer_type);
    }
    if let Some(payment_method) = f.payment_method {
        qb.push(" AND t.payment_method = ").push_bind(payment_method);
    }
    if let Some(min) = f.min_amount {
        qb.push(" AND t.final_amount >= ").push_bind(min.minor());
    }
    if let Some(max) = f.max_amount {
        qb.push(" AND t.final_amount <= ").push_bind(max.minor());
    }
    if let Some(search) = resolved.search.as_deref() {
        let pattern = like_pattern(search);
        qb.push(" AND (t.id LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR t.notes LIKE ")
            .push_bind(pattern.clone())
            .push(
                " ESCAPE '\\' OR EXISTS (SELECT 1 FROM transaction_items i \
                 WHERE i.transaction_id = t.id AND (i.name LIKE ",
            )
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR i.variant LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')))");
    }
}

// =============================================================================
// Read Side
// =============================================================================

/// Read-only view over committed transaction records.
#[derive(Debug, Clone)]
pub struct TransactionHistory {
    pool: SqlitePool,
}

impl TransactionHistory {
    /// Creates a new TransactionHistory.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionHistory { pool }
    }

    /// One page of a store's records matching `filter`.
    ///
    /// ## Defaults
    /// - newest first (`createdAt desc`)
    /// - page 1, 20 per page, at most 100 per page
    pub async fn list(
        &self,
        store_id: &str,
        filter: &TransactionFilter,
    ) -> RecordResult<TransactionPage> {
        let resolved = ResolvedFilter::resolve(filter)?;

        let mut tx = self.pool.begin().await?;

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM transactions t");
        push_filters(&mut count_qb, store_id, &resolved);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;

        let mut page_qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {TRANSACTION_COLUMNS} FROM transactions t"));
        push_filters(&mut page_qb, store_id, &resolved);
        let direction = sort_direction(resolved.sort_order);
        page_qb
            .push(format!(
                " ORDER BY {} {direction}, t.rowid {direction}",
                sort_column(resolved.sort_by)
            ))
            .push(" LIMIT ")
            .push_bind(resolved.limit as i64)
            .push(" OFFSET ")
            .push_bind(resolved.offset());

        let rows: Vec<TransactionRow> = page_qb
            .build_query_as::<TransactionRow>()
            .fetch_all(&mut *tx)
            .await?;
        let data = hydrate(&mut tx, rows).await?;

        tx.commit().await?;

        debug!(store_id, total, returned = data.len(), page = resolved.page, "Listed transactions");

        Ok(TransactionPage {
            data,
            meta: PageMeta::new(total, resolved.page, resolved.limit),
        })
    }

    /// A single record of a store.
    ///
    /// ## Errors
    /// `NotFound` when the id is unknown or belongs to another store.
    pub async fn get(&self, store_id: &str, id: &str) -> RecordResult<TransactionRecord> {
        let mut tx = self.pool.begin().await?;

        let row: Option<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.store_id = ? AND t.id = ?"
        ))
        .bind(store_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(RecordError::NotFound {
                entity: "Transaction".to_string(),
                id: id.to_string(),
            });
        };

        let mut records = hydrate(&mut tx, vec![row]).await?;
        tx.commit().await?;

        records.pop().ok_or_else(|| RecordError::NotFound {
            entity: "Transaction".to_string(),
            id: id.to_string(),
        })
    }

    /// Aggregate over the records matching `filter` (sort and paging ignored).
    ///
    /// ```text
    /// totalSales        Σ finalAmount  of SALE
    /// totalExpenses     Σ finalAmount  of EXPENSE
    /// totalDueCollected Σ paidAmount   of DUE_PAYMENT
    /// totalDuePending   Σ dueAmount > 0 of everything but DUE_PAYMENT
    /// totalReturns      Σ finalAmount  of RETURN
    /// count             number of records
    /// ```
    pub async fn summary(
        &self,
        store_id: &str,
        filter: &TransactionFilter,
    ) -> RecordResult<TransactionSummary> {
        let resolved = ResolvedFilter::unpaged(filter)?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT
                COALESCE(SUM(CASE WHEN t.type = 'SALE' THEN t.final_amount ELSE 0 END), 0) AS total_sales,
                COALESCE(SUM(CASE WHEN t.type = 'EXPENSE' THEN t.final_amount ELSE 0 END), 0) AS total_expenses,
                COALESCE(SUM(CASE WHEN t.type = 'DUE_PAYMENT' THEN t.paid_amount ELSE 0 END), 0) AS total_due_collected,
                COALESCE(SUM(CASE WHEN t.type <> 'DUE_PAYMENT' AND t.due_amount > 0 THEN t.due_amount ELSE 0 END), 0) AS total_due_pending,
                COALESCE(SUM(CASE WHEN t.type = 'RETURN' THEN t.final_amount ELSE 0 END), 0) AS total_returns,
                COUNT(*) AS count
             FROM transactions t",
        );
        push_filters(&mut qb, store_id, &resolved);

        let row: SummaryRow = qb.build_query_as::<SummaryRow>().fetch_one(&self.pool).await?;

        Ok(TransactionSummary {
            total_sales: Money::from_minor(row.total_sales),
            total_expenses: Money::from_minor(row.total_expenses),
            total_due_collected: Money::from_minor(row.total_due_collected),
            total_due_pending: Money::from_minor(row.total_due_pending),
            total_returns: Money::from_minor(row.total_returns),
            count: row.count,
        })
    }
}

/// Loads line items for `rows` and assembles records, keeping row order.
async fn hydrate(
    conn: &mut SqliteConnection,
    rows: Vec<TransactionRow>,
) -> DbResult<Vec<TransactionRecord>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {ITEM_COLUMNS} FROM transaction_items WHERE transaction_id IN ("
    ));
    let mut ids = qb.separated(", ");
    for row in &rows {
        ids.push_bind(row.id.clone());
    }
    ids.push_unseparated(") ORDER BY transaction_id, position");

    let items: Vec<ItemRow> = qb.build_query_as::<ItemRow>().fetch_all(&mut *conn).await?;

    let mut by_transaction: HashMap<String, Vec<LineItem>> = HashMap::new();
    for item in items {
        by_transaction
            .entry(item.transaction_id.clone())
            .or_default()
            .push(item.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let items = by_transaction.remove(&row.id).unwrap_or_default();
            row.into_record(items)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use uuid::Uuid;

    fn record(
        store_id: &str,
        transaction_type: TransactionType,
        final_amount: i64,
        paid_amount: i64,
        created_at: DateTime<Utc>,
    ) -> TransactionRecord {
        let quantity = 1;
        TransactionRecord {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            staff_id: None,
            customer: None,
            items: vec![LineItem {
                id: Uuid::new_v4().to_string(),
                item_ref: Some("LPG-12KG".to_string()),
                kind: ItemKind::Cylinder,
                variant: "12kg".to_string(),
                name: "LPG 12kg refill".to_string(),
                quantity,
                unit_price: Money::from_minor(final_amount),
                subtotal: Money::from_minor(final_amount * quantity),
                is_return: false,
                staff_id: None,
            }],
            total_amount: Money::from_minor(final_amount),
            final_amount: Money::from_minor(final_amount),
            paid_amount: Money::from_minor(paid_amount),
            due_amount: Money::from_minor(final_amount - paid_amount),
            transaction_type,
            payment_method: PaymentMethod::Cash,
            status: TransactionStatus::Completed,
            oversold: false,
            notes: None,
            created_at,
        }
    }

    async fn insert(db: &Database, record: &TransactionRecord) {
        let mut conn = db.pool().acquire().await.unwrap();
        insert_record(&mut conn, record).await.unwrap();
    }

    async fn seeded() -> (Database, Vec<TransactionRecord>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let base = Utc::now() - Duration::hours(10);

        let mut due_sale = record("S1", TransactionType::Sale, 1500, 500, base + Duration::hours(3));
        due_sale.customer = Some(CounterpartyRef {
            id: "C1".to_string(),
            kind: CounterpartyKind::Customer,
        });
        due_sale.notes = Some("weekend refill".to_string());

        let records = vec![
            record("S1", TransactionType::Sale, 3000, 3000, base),
            record("S1", TransactionType::Return, 0, 0, base + Duration::hours(1)),
            record("S1", TransactionType::Expense, 800, 800, base + Duration::hours(2)),
            due_sale,
            record("S1", TransactionType::DuePayment, 0, 1000, base + Duration::hours(4)),
            record("S2", TransactionType::Sale, 9999, 9999, base + Duration::hours(5)),
        ];
        for r in &records {
            insert(&db, r).await;
        }
        (db, records)
    }

    #[tokio::test]
    async fn test_get_round_trips_record() {
        let (db, records) = seeded().await;
        let fetched = db.transactions().get("S1", &records[3].id).await.unwrap();

        assert_eq!(fetched.id, records[3].id);
        assert_eq!(fetched.items, records[3].items);
        assert_eq!(fetched.customer, records[3].customer);
        assert_eq!(fetched.due_amount.minor(), 1000);
        assert_eq!(fetched.notes.as_deref(), Some("weekend refill"));
    }

    #[tokio::test]
    async fn test_get_is_store_scoped() {
        let (db, records) = seeded().await;
        let result = db.transactions().get("S1", &records[5].id).await;
        assert!(matches!(result, Err(RecordError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_list_defaults_newest_first() {
        let (db, records) = seeded().await;
        let page = db
            .transactions()
            .list("S1", &TransactionFilter::default())
            .await
            .unwrap();

        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.page, 1);
        assert_eq!(page.meta.limit, 20);
        assert_eq!(page.meta.total_pages, 1);
        assert_eq!(page.data[0].id, records[4].id);
        assert_eq!(page.data[4].id, records[0].id);
        assert!(page.data.iter().all(|r| r.items.len() == 1));
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let (db, _) = seeded().await;
        let filter = TransactionFilter {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        };
        let page = db.transactions().list("S1", &filter).await.unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.total_pages, 3);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let (db, records) = seeded().await;
        let history = db.transactions();

        let sales = history
            .list(
                "S1",
                &TransactionFilter {
                    transaction_type: Some(TransactionType::Sale),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(sales.meta.total, 2);

        let by_customer = history
            .list(
                "S1",
                &TransactionFilter {
                    customer_id: Some("C1".to_string()),
                    customer_type: Some(CounterpartyKind::Customer),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_customer.data.len(), 1);
        assert_eq!(by_customer.data[0].id, records[3].id);

        let amount_band = history
            .list(
                "S1",
                &TransactionFilter {
                    min_amount: Some(Money::from_minor(800)),
                    max_amount: Some(Money::from_minor(1500)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(amount_band.meta.total, 2);

        let window = history
            .list(
                "S1",
                &TransactionFilter {
                    from: Some(records[1].created_at),
                    to: Some(records[2].created_at),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(window.meta.total, 2);
    }

    #[tokio::test]
    async fn test_list_search_is_case_insensitive() {
        let (db, records) = seeded().await;
        let history = db.transactions();

        let by_notes = history
            .list(
                "S1",
                &TransactionFilter {
                    search: Some("WEEKEND".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_notes.data.len(), 1);
        assert_eq!(by_notes.data[0].id, records[3].id);

        let by_item = history
            .list(
                "S1",
                &TransactionFilter {
                    search: Some("refill".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_item.meta.total, 5);

        let wildcard = history
            .list(
                "S1",
                &TransactionFilter {
                    search: Some("%".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(wildcard.meta.total, 0);
    }

    #[tokio::test]
    async fn test_list_sorts_by_amount() {
        let (db, _) = seeded().await;
        let page = db
            .transactions()
            .list(
                "S1",
                &TransactionFilter {
                    sort_by: Some(SortField::FinalAmount),
                    sort_order: Some(SortOrder::Asc),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let amounts: Vec<i64> = page.data.iter().map(|r| r.final_amount.minor()).collect();
        let mut sorted = amounts.clone();
        sorted.sort();
        assert_eq!(amounts, sorted);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_filters() {
        let (db, _) = seeded().await;
        let history = db.transactions();
        let now = Utc::now();

        let inverted = TransactionFilter {
            from: Some(now),
            to: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert!(matches!(
            history.list("S1", &inverted).await,
            Err(RecordError::Validation(_))
        ));

        let too_big = TransactionFilter {
            limit: Some(101),
            ..Default::default()
        };
        assert!(matches!(
            history.list("S1", &too_big).await,
            Err(RecordError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_summary() {
        let (db, _) = seeded().await;
        let summary = db
            .transactions()
            .summary("S1", &TransactionFilter::default())
            .await
            .unwrap();

        assert_eq!(summary.count, 5);
        assert_eq!(summary.total_sales.minor(), 4500);
        assert_eq!(summary.total_expenses.minor(), 800);
        assert_eq!(summary.total_due_collected.minor(), 1000);
        assert_eq!(summary.total_due_pending.minor(), 1000);
        assert_eq!(summary.total_returns.minor(), 0);
    }

    #[tokio::test]
    async fn test_summary_ignores_paging() {
        let (db, _) = seeded().await;
        let history = db.transactions();

        let paged = TransactionFilter {
            page: Some(0),
            limit: Some(500),
            ..Default::default()
        };
        let summary = history.summary("S1", &paged).await.unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.total_sales.minor(), 4500);

        // ranges are still checked
        let inverted = TransactionFilter {
            min_amount: Some(Money::from_minor(500)),
            max_amount: Some(Money::from_minor(100)),
            limit: Some(500),
            ..Default::default()
        };
        assert!(matches!(
            history.summary("S1", &inverted).await,
            Err(RecordError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_summary_of_empty_store_is_zero() {
        let (db, _) = seeded().await;
        let summary = db
            .transactions()
            .summary("nowhere", &TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(summary, TransactionSummary::default());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("10%_off"), "%10\\%\\_off%");
    }
}
