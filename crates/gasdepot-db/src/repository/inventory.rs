//! # Inventory Ledger
//!
//! Per-store, per-SKU counters: `full/empty/defected` for cylinders and a
//! single `stock` for accessories, keyed by (store, item, variant).
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TransactionRecorder (open sqlx::Transaction)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply_delta(conn, store, effect, tx_id)                                │
//! │       │                                                                 │
//! │       ├── UPDATE inventory SET full_count = full_count + ?, …           │
//! │       │   WHERE store_id = ? AND item_ref = ? AND variant = ?           │
//! │       │     AND kind = ?                                                │
//! │       │   RETURNING …            ← no row: NotFound, caller aborts      │
//! │       │                                                                 │
//! │       └── INSERT INTO inventory_movements …                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller never reads a counter and writes it back; concurrent deltas on
//! the same row therefore commute.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gasdepot_core::effects::InventoryEffect;
use gasdepot_core::{InventoryCounters, ItemKind};

const COUNTER_COLUMNS: &str =
    "store_id, item_ref, variant, kind, full_count, empty_count, defected_count, stock";

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    store_id: String,
    item_ref: String,
    variant: String,
    kind: ItemKind,
    full_count: i64,
    empty_count: i64,
    defected_count: i64,
    stock: i64,
}

impl From<InventoryRow> for InventoryCounters {
    fn from(row: InventoryRow) -> Self {
        InventoryCounters {
            store_id: row.store_id,
            item_ref: row.item_ref,
            variant: row.variant,
            kind: row.kind,
            full: row.full_count,
            empty: row.empty_count,
            defected: row.defected_count,
            stock: row.stock,
        }
    }
}

/// A new inventory row with its opening counts.
///
/// Opening counts are the only direct "set" of a counter; afterwards the row
/// changes through transaction deltas.
#[derive(Debug, Clone)]
pub struct NewInventoryItem {
    pub store_id: String,
    pub item_ref: String,
    pub variant: String,
    pub kind: ItemKind,
    pub name: String,
    pub full: i64,
    pub empty: i64,
    pub defected: i64,
    pub stock: i64,
}

impl NewInventoryItem {
    /// A cylinder row with full/empty opening counts.
    pub fn cylinder(store_id: &str, item_ref: &str, variant: &str, full: i64, empty: i64) -> Self {
        NewInventoryItem {
            store_id: store_id.to_string(),
            item_ref: item_ref.to_string(),
            variant: variant.to_string(),
            kind: ItemKind::Cylinder,
            name: item_ref.to_string(),
            full,
            empty,
            defected: 0,
            stock: 0,
        }
    }

    /// An accessory row with an opening stock.
    pub fn accessory(store_id: &str, item_ref: &str, stock: i64) -> Self {
        NewInventoryItem {
            store_id: store_id.to_string(),
            item_ref: item_ref.to_string(),
            variant: String::new(),
            kind: ItemKind::Accessory,
            name: item_ref.to_string(),
            full: 0,
            empty: 0,
            defected: 0,
            stock,
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }
}

/// Read side of the inventory ledger plus row setup.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Inserts a new inventory row.
    ///
    /// ## Errors
    /// - `CheckViolation` for a kind that is not goods
    /// - `UniqueViolation` when (store, item, variant) already exists
    pub async fn create(&self, item: &NewInventoryItem) -> DbResult<InventoryCounters> {
        debug!(store_id = %item.store_id, item_ref = %item.item_ref, variant = %item.variant, "Creating inventory row");

        let sql = format!(
            "INSERT INTO inventory (
                id, store_id, item_ref, variant, kind, name,
                full_count, empty_count, defected_count, stock, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {COUNTER_COLUMNS}"
        );

        let row: InventoryRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4().to_string())
            .bind(&item.store_id)
            .bind(&item.item_ref)
            .bind(&item.variant)
            .bind(item.kind)
            .bind(&item.name)
            .bind(item.full)
            .bind(item.empty)
            .bind(item.defected)
            .bind(item.stock)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    /// Current counters of one (store, item, variant) row.
    pub async fn get(
        &self,
        store_id: &str,
        item_ref: &str,
        variant: &str,
    ) -> DbResult<Option<InventoryCounters>> {
        let sql = format!(
            "SELECT {COUNTER_COLUMNS} FROM inventory
             WHERE store_id = ? AND item_ref = ? AND variant = ?"
        );

        let row: Option<InventoryRow> = sqlx::query_as(&sql)
            .bind(store_id)
            .bind(item_ref)
            .bind(variant)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// All rows of a store, ordered by item and variant.
    pub async fn list_for_store(&self, store_id: &str) -> DbResult<Vec<InventoryCounters>> {
        let sql = format!(
            "SELECT {COUNTER_COLUMNS} FROM inventory
             WHERE store_id = ?
             ORDER BY item_ref, variant"
        );

        let rows: Vec<InventoryRow> = sqlx::query_as(&sql)
            .bind(store_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

/// Adds `effect.delta` to one inventory row and logs the movement.
///
/// Runs on the caller's connection so it joins the caller's transaction.
/// Returns the counters after the delta.
pub(crate) async fn apply_delta(
    conn: &mut SqliteConnection,
    store_id: &str,
    effect: &InventoryEffect,
    transaction_id: &str,
) -> DbResult<InventoryCounters> {
    let now = Utc::now();
    let delta = effect.delta;

    let sql = format!(
        "UPDATE inventory SET
            full_count     = full_count + ?,
            empty_count    = empty_count + ?,
            defected_count = defected_count + ?,
            stock          = stock + ?,
            updated_at     = ?
         WHERE store_id = ? AND item_ref = ? AND variant = ? AND kind = ?
         RETURNING {COUNTER_COLUMNS}"
    );

    let row: Option<InventoryRow> = sqlx::query_as(&sql)
        .bind(delta.full)
        .bind(delta.empty)
        .bind(delta.defected)
        .bind(delta.stock)
        .bind(now)
        .bind(store_id)
        .bind(&effect.item_ref)
        .bind(&effect.variant)
        .bind(effect.kind)
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        let id = if effect.variant.is_empty() {
            effect.item_ref.clone()
        } else {
            format!("{}/{}", effect.item_ref, effect.variant)
        };
        return Err(DbError::not_found(
            format!("Inventory item ({})", effect.kind.as_str()),
            id,
        ));
    };

    sqlx::query(
        "INSERT INTO inventory_movements (
            id, store_id, transaction_id, item_ref, variant,
            full_delta, empty_delta, defected_delta, stock_delta, created_at
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(store_id)
    .bind(transaction_id)
    .bind(&effect.item_ref)
    .bind(&effect.variant)
    .bind(delta.full)
    .bind(delta.empty)
    .bind(delta.defected)
    .bind(delta.stock)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let counters: InventoryCounters = row.into();
    debug!(
        item_ref = %counters.item_ref,
        variant = %counters.variant,
        full = counters.full,
        empty = counters.empty,
        stock = counters.stock,
        "Inventory delta applied"
    );

    Ok(counters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use gasdepot_core::InventoryDelta;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Inserts a bare transaction row so movements have a parent.
    async fn parent_transaction(db: &Database, id: &str) {
        sqlx::query(
            "INSERT INTO transactions (
                id, store_id, total_amount, final_amount, paid_amount, due_amount,
                type, payment_method, created_at
             ) VALUES (?, 'S1', 0, 0, 0, 0, 'RETURN', 'CASH', ?)",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();
    }

    fn effect(item_ref: &str, kind: ItemKind, delta: InventoryDelta) -> InventoryEffect {
        InventoryEffect {
            item_ref: item_ref.to_string(),
            variant: String::new(),
            kind,
            delta,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup().await;
        let repo = db.inventory();

        let created = repo
            .create(&NewInventoryItem::cylinder("S1", "LPG-12KG", "", 10, 4))
            .await
            .unwrap();
        assert_eq!(created.full, 10);
        assert_eq!(created.empty, 4);

        let fetched = repo.get("S1", "LPG-12KG", "").await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(repo.get("S2", "LPG-12KG", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_row_rejected() {
        let db = setup().await;
        let repo = db.inventory();
        let item = NewInventoryItem::accessory("S1", "REGULATOR", 5);

        repo.create(&item).await.unwrap();
        assert!(matches!(
            repo.create(&item).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_delta_adds_and_logs() {
        let db = setup().await;
        db.inventory()
            .create(&NewInventoryItem::cylinder("S1", "LPG-12KG", "", 10, 0))
            .await
            .unwrap();
        parent_transaction(&db, "T1").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let delta = InventoryDelta {
            full: -2,
            empty: 2,
            ..Default::default()
        };
        let after = apply_delta(&mut conn, "S1", &effect("LPG-12KG", ItemKind::Cylinder, delta), "T1")
            .await
            .unwrap();
        drop(conn);

        assert_eq!(after.full, 8);
        assert_eq!(after.empty, 2);

        let logged: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory_movements WHERE transaction_id = 'T1'")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(logged, 1);
    }

    #[tokio::test]
    async fn test_apply_delta_unknown_sku_is_not_found() {
        let db = setup().await;
        parent_transaction(&db, "T1").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let delta = InventoryDelta {
            stock: -1,
            ..Default::default()
        };
        let result = apply_delta(&mut conn, "S1", &effect("NOPE", ItemKind::Accessory, delta), "T1").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_apply_delta_kind_mismatch_is_not_found() {
        let db = setup().await;
        db.inventory()
            .create(&NewInventoryItem::accessory("S1", "REGULATOR", 5))
            .await
            .unwrap();
        parent_transaction(&db, "T1").await;

        let mut conn = db.pool().acquire().await.unwrap();
        let delta = InventoryDelta {
            full: -1,
            ..Default::default()
        };
        let result = apply_delta(&mut conn, "S1", &effect("REGULATOR", ItemKind::Cylinder, delta), "T1").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_salary_payout_is_not_inventory() {
        let db = setup().await;
        let mut item = NewInventoryItem::accessory("S1", "X", 1);
        item.kind = ItemKind::SalaryPayout;
        assert!(matches!(
            db.inventory().create(&item).await,
            Err(DbError::CheckViolation { .. })
        ));
    }
}
