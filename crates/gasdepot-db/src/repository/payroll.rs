//! # Staff Payroll Ledger
//!
//! Monthly salary rate and accrued-but-unpaid `salary_due` per staff member.
//! Accrual runs elsewhere; the recorder only reduces `salary_due` when an
//! EXPENSE carries a SALARY_PAYOUT line for that staff member.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use gasdepot_core::{Money, StaffPayroll};

#[derive(Debug, sqlx::FromRow)]
struct StaffRow {
    id: String,
    store_id: String,
    name: String,
    salary: i64,
    salary_due: i64,
    last_salary_processed: Option<DateTime<Utc>>,
}

impl From<StaffRow> for StaffPayroll {
    fn from(row: StaffRow) -> Self {
        StaffPayroll {
            id: row.id,
            store_id: row.store_id,
            name: row.name,
            salary: Money::from_minor(row.salary),
            salary_due: Money::from_minor(row.salary_due),
            last_salary_processed: row.last_salary_processed,
        }
    }
}

/// A staff member to register, with an opening accrued balance.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub id: String,
    pub store_id: String,
    pub name: String,
    pub salary: Money,
    pub salary_due: Money,
}

impl NewStaff {
    pub fn new(store_id: &str, name: &str, salary: Money) -> Self {
        NewStaff {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            name: name.to_string(),
            salary,
            salary_due: Money::zero(),
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Salary already accrued at registration.
    pub fn with_salary_due(mut self, due: Money) -> Self {
        self.salary_due = due;
        self
    }
}

/// Read side of the payroll ledger plus row setup.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Registers a staff member.
    pub async fn create(&self, new: &NewStaff) -> DbResult<StaffPayroll> {
        debug!(id = %new.id, store_id = %new.store_id, "Creating staff member");

        let now = Utc::now();
        let row: StaffRow = sqlx::query_as(
            "INSERT INTO staff (id, store_id, name, salary, salary_due, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id, store_id, name, salary, salary_due, last_salary_processed",
        )
        .bind(&new.id)
        .bind(&new.store_id)
        .bind(&new.name)
        .bind(new.salary.minor())
        .bind(new.salary_due.minor())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Payroll state of one staff member in a store.
    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Option<StaffPayroll>> {
        let row: Option<StaffRow> = sqlx::query_as(
            "SELECT id, store_id, name, salary, salary_due, last_salary_processed
             FROM staff WHERE id = ? AND store_id = ?",
        )
        .bind(id)
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}

/// Subtracts a salary payout from `salary_due`. `amount` is the positive
/// payout; returns the new `salary_due`.
pub(crate) async fn reduce_due(
    conn: &mut SqliteConnection,
    store_id: &str,
    staff_id: &str,
    amount: Money,
) -> DbResult<Money> {
    let due: Option<i64> = sqlx::query_scalar(
        "UPDATE staff SET salary_due = salary_due - ?, updated_at = ?
         WHERE id = ? AND store_id = ?
         RETURNING salary_due",
    )
    .bind(amount.minor())
    .bind(Utc::now())
    .bind(staff_id)
    .bind(store_id)
    .fetch_optional(&mut *conn)
    .await?;

    let due = due.ok_or_else(|| DbError::not_found("Staff", staff_id))?;

    debug!(staff_id, paid = amount.minor(), salary_due = due, "Salary payout applied");

    Ok(Money::from_minor(due))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.staff();

        let created = repo
            .create(
                &NewStaff::new("S1", "Kamran", Money::from_minor(30_000))
                    .with_id("ST1")
                    .with_salary_due(Money::from_minor(30_000)),
            )
            .await
            .unwrap();
        assert_eq!(created.salary_due.minor(), 30_000);
        assert!(created.last_salary_processed.is_none());

        assert_eq!(repo.get("S1", "ST1").await.unwrap(), Some(created));
        assert!(repo.get("S2", "ST1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reduce_due() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.staff()
            .create(
                &NewStaff::new("S1", "Kamran", Money::from_minor(30_000))
                    .with_id("ST1")
                    .with_salary_due(Money::from_minor(30_000)),
            )
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let due = reduce_due(&mut conn, "S1", "ST1", Money::from_minor(12_000))
            .await
            .unwrap();
        assert_eq!(due.minor(), 18_000);

        let missing = reduce_due(&mut conn, "S1", "nobody", Money::from_minor(1)).await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }
}
