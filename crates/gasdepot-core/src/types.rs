//! # Domain Types
//!
//! Types shared by the reconciliation engine, the history reader and the
//! HTTP surface.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌────────────────────┐   ┌─────────────────────┐                       │
//! │  │ TransactionRequest │──►│  TransactionRecord  │  immutable once       │
//! │  │  items[]           │   │  totalAmount        │  committed            │
//! │  │  type              │   │  finalAmount        │                       │
//! │  │  paymentMethod     │   │  paidAmount         │                       │
//! │  │  finalAmount?      │   │  dueAmount (derived)│                       │
//! │  │  paidAmount?       │   │  status: COMPLETED  │                       │
//! │  └────────────────────┘   └─────────────────────┘                       │
//! │                                                                         │
//! │  Ledgers (one row each, mutated only by signed deltas):                 │
//! │  ┌───────────────────┐ ┌───────────────────────┐ ┌──────────────────┐   │
//! │  │ InventoryCounters │ │ CounterpartyBalance   │ │ StaffPayroll     │   │
//! │  │ full/empty/       │ │ totalDue              │ │ salaryDue        │   │
//! │  │ defected | stock  │ │ (Customer | Shop)     │ │                  │   │
//! │  └───────────────────┘ └───────────────────────┘ └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Enums travel as SCREAMING_SNAKE_CASE strings on the wire and in SQLite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Transaction Type
// =============================================================================

/// What kind of POS event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TransactionType {
    Sale,
    Return,
    Exchange,
    /// Pure money movement: reduces a counterparty's due, never moves goods.
    DuePayment,
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Sale,
        TransactionType::Return,
        TransactionType::Exchange,
        TransactionType::DuePayment,
        TransactionType::Expense,
    ];

    /// Wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "SALE",
            TransactionType::Return => "RETURN",
            TransactionType::Exchange => "EXCHANGE",
            TransactionType::DuePayment => "DUE_PAYMENT",
            TransactionType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    Digital,
    /// Goods handed over on credit.
    Due,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Digital => "DIGITAL",
            PaymentMethod::Due => "DUE",
        }
    }
}

// =============================================================================
// Transaction Status
// =============================================================================

/// Status of a committed record.
///
/// There is deliberately no pending/cancelled state: a record is either
/// absent or COMPLETED, because `create()` commits atomically or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum TransactionStatus {
    #[default]
    Completed,
}

// =============================================================================
// Counterparty
// =============================================================================

/// Which directory a counterparty lives in. Same shape, different table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum CounterpartyKind {
    #[default]
    Customer,
    Shop,
}

impl CounterpartyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterpartyKind::Customer => "Customer",
            CounterpartyKind::Shop => "Shop",
        }
    }
}

impl fmt::Display for CounterpartyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to the customer or shop on the other side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CounterpartyRef {
    pub id: String,
    pub kind: CounterpartyKind,
}

// =============================================================================
// Line Items
// =============================================================================

/// What a line item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ItemKind {
    /// Full/empty/defected counters.
    Cylinder,
    /// Single stock counter.
    Accessory,
    /// Salary disbursement to a staff member (EXPENSE only).
    SalaryPayout,
}

impl ItemKind {
    /// Whether the item represents physical goods held in inventory.
    pub fn is_goods(&self) -> bool {
        matches!(self, ItemKind::Cylinder | ItemKind::Accessory)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Cylinder => "CYLINDER",
            ItemKind::Accessory => "ACCESSORY",
            ItemKind::SalaryPayout => "SALARY_PAYOUT",
        }
    }
}

/// A line item as submitted by the terminal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItemInput {
    /// Inventory SKU id. Required for CYLINDER and ACCESSORY.
    #[serde(default)]
    pub item_ref: Option<String>,

    pub kind: ItemKind,

    pub quantity: i64,

    pub unit_price: Money,

    /// Explicit "this item comes back into the store" flag, independent of
    /// the transaction type (refill flows carry one on a SALE).
    #[serde(default)]
    pub is_return: bool,

    /// Counter variant, e.g. "12kg". Empty string when the SKU has one row.
    #[serde(default)]
    pub variant: Option<String>,

    /// Receipt label.
    #[serde(default)]
    pub name: Option<String>,

    /// Staff member paid by a SALARY_PAYOUT item.
    #[serde(default)]
    pub staff_id: Option<String>,
}

/// A priced line item as stored on a committed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub item_ref: Option<String>,
    pub kind: ItemKind,
    pub variant: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    /// quantity × unitPrice
    pub subtotal: Money,
    pub is_return: bool,
    pub staff_id: Option<String>,
}

// =============================================================================
// Transaction Request / Record
// =============================================================================

/// The payload a POS terminal submits to `create()`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionRequest {
    /// May be omitted for DUE_PAYMENT.
    #[serde(default)]
    pub items: Vec<LineItemInput>,

    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    pub payment_method: PaymentMethod,

    /// Price actually charged; defaults to the sum of subtotals.
    #[serde(default)]
    pub final_amount: Option<Money>,

    /// Defaults to zero.
    #[serde(default)]
    pub paid_amount: Option<Money>,

    #[serde(default)]
    pub customer_id: Option<String>,

    /// Defaults to Customer when `customerId` is given.
    #[serde(default)]
    pub customer_type: Option<CounterpartyKind>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl TransactionRequest {
    /// Counterparty named by the request, if any.
    pub fn counterparty(&self) -> Option<CounterpartyRef> {
        self.customer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| CounterpartyRef {
                id: id.to_string(),
                kind: self.customer_type.unwrap_or_default(),
            })
    }
}

/// A committed transaction. Never mutated after commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionRecord {
    pub id: String,
    pub store_id: String,
    pub staff_id: Option<String>,
    pub customer: Option<CounterpartyRef>,
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub final_amount: Money,
    pub paid_amount: Money,
    /// finalAmount - paidAmount, always derived.
    pub due_amount: Money,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub payment_method: PaymentMethod,
    pub status: TransactionStatus,
    /// Set when a counter went negative under `OversellPolicy::AllowWithFlag`.
    pub oversold: bool,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Ledger Rows
// =============================================================================

/// Signed change to one inventory row. Zero fields are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryDelta {
    #[serde(default)]
    pub full: i64,
    #[serde(default)]
    pub empty: i64,
    #[serde(default)]
    pub defected: i64,
    #[serde(default)]
    pub stock: i64,
}

impl InventoryDelta {
    pub fn is_zero(&self) -> bool {
        self.full == 0 && self.empty == 0 && self.defected == 0 && self.stock == 0
    }

    /// Adds another delta field-wise.
    pub fn merge(&mut self, other: InventoryDelta) {
        self.full += other.full;
        self.empty += other.empty;
        self.defected += other.defected;
        self.stock += other.stock;
    }
}

/// Current counters of one (store, item, variant) row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InventoryCounters {
    pub store_id: String,
    pub item_ref: String,
    pub variant: String,
    pub kind: ItemKind,
    pub full: i64,
    pub empty: i64,
    pub defected: i64,
    pub stock: i64,
}

impl InventoryCounters {
    /// First counter that `delta` decreased and that is now below zero, as
    /// `(name, value)`. Counters the delta did not decrease are ignored, so a
    /// return never trips over an earlier oversell.
    pub fn overdrawn_by(&self, delta: &InventoryDelta) -> Option<(&'static str, i64)> {
        [
            ("full", delta.full, self.full),
            ("empty", delta.empty, self.empty),
            ("defected", delta.defected, self.defected),
            ("stock", delta.stock, self.stock),
        ]
        .into_iter()
        .find(|(_, change, value)| *change < 0 && *value < 0)
        .map(|(name, _, value)| (name, value))
    }
}

/// Running "amount owed" of one customer or shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CounterpartyBalance {
    pub id: String,
    pub kind: CounterpartyKind,
    pub store_id: String,
    pub name: String,
    pub total_due: Money,
}

/// One appended balance movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BalanceEntry {
    pub id: String,
    pub store_id: String,
    pub counterparty_kind: CounterpartyKind,
    pub counterparty_id: String,
    pub transaction_id: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Salary ledger of one staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StaffPayroll {
    pub id: String,
    pub store_id: String,
    pub name: String,
    /// Monthly rate.
    pub salary: Money,
    /// Accrued, unpaid.
    pub salary_due: Money,
    #[ts(as = "Option<String>")]
    pub last_salary_processed: Option<DateTime<Utc>>,
}

// =============================================================================
// Engine Configuration Types
// =============================================================================

/// What to do when a sale drives an inventory counter below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OversellPolicy {
    /// Commit, mark the record `oversold`, log a warning.
    #[default]
    AllowWithFlag,
    /// Abort the whole transaction with `InsufficientStock`.
    Reject,
}

impl std::str::FromStr for OversellPolicy {
    type Err = crate::error::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "allow_with_flag" | "allow" | "flag" => Ok(OversellPolicy::AllowWithFlag),
            "reject" => Ok(OversellPolicy::Reject),
            _ => Err(crate::error::ValidationError::NotAllowed {
                field: "oversell_policy".to_string(),
                allowed: vec!["allow_with_flag".to_string(), "reject".to_string()],
            }),
        }
    }
}

// =============================================================================
// History Types
// =============================================================================

/// Sortable columns of the history view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum SortField {
    #[default]
    CreatedAt,
    FinalAmount,
    TotalAmount,
    PaidAmount,
    DueAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filters accepted by `list()` and `getSummary()`. All optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionFilter {
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default, rename = "type")]
    pub transaction_type: Option<TransactionType>,
    #[serde(default)]
    pub customer_type: Option<CounterpartyKind>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub min_amount: Option<Money>,
    #[serde(default)]
    pub max_amount: Option<Money>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: Option<SortField>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Offset pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl PageMeta {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let total_pages = if total <= 0 || limit == 0 {
            0
        } else {
            ((total as u64 + limit as u64 - 1) / limit as u64) as u32
        };
        PageMeta {
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// One page of committed records.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionPage {
    pub data: Vec<TransactionRecord>,
    pub meta: PageMeta,
}

/// Read-only aggregate over the filtered records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct TransactionSummary {
    pub total_sales: Money,
    pub total_expenses: Money,
    pub total_due_collected: Money,
    pub total_due_pending: Money,
    pub total_returns: Money,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&TransactionType::DuePayment).unwrap(),
            "\"DUE_PAYMENT\""
        );
        assert_eq!(
            serde_json::to_string(&ItemKind::SalaryPayout).unwrap(),
            "\"SALARY_PAYOUT\""
        );
        assert_eq!(
            serde_json::to_string(&CounterpartyKind::Shop).unwrap(),
            "\"Shop\""
        );
        for t in TransactionType::ALL {
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let json = r#"{
            "items": [{"itemRef": "LPG-12KG", "kind": "CYLINDER", "quantity": 2, "unitPrice": 1500}],
            "type": "SALE",
            "paymentMethod": "CASH"
        }"#;
        let req: TransactionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.items.len(), 1);
        assert!(!req.items[0].is_return);
        assert!(req.final_amount.is_none());
        assert!(req.counterparty().is_none());
    }

    #[test]
    fn test_counterparty_defaults_to_customer() {
        let json = r#"{"type": "DUE_PAYMENT", "paymentMethod": "CASH", "customerId": "C1"}"#;
        let req: TransactionRequest = serde_json::from_str(json).unwrap();
        assert!(req.items.is_empty());
        assert_eq!(
            req.counterparty(),
            Some(CounterpartyRef {
                id: "C1".to_string(),
                kind: CounterpartyKind::Customer
            })
        );
    }

    #[test]
    fn test_blank_customer_id_is_no_counterparty() {
        let json = r#"{"items": [], "type": "SALE", "paymentMethod": "CASH", "customerId": "  "}"#;
        let req: TransactionRequest = serde_json::from_str(json).unwrap();
        assert!(req.counterparty().is_none());
    }

    #[test]
    fn test_inventory_delta_merge() {
        let mut delta = InventoryDelta {
            full: -2,
            ..Default::default()
        };
        delta.merge(InventoryDelta {
            empty: 2,
            ..Default::default()
        });
        assert_eq!(delta.full, -2);
        assert_eq!(delta.empty, 2);
        assert!(!delta.is_zero());
        assert!(InventoryDelta::default().is_zero());
    }

    #[test]
    fn test_overdrawn_only_counts_decreased_counters() {
        let counters = InventoryCounters {
            store_id: "S".to_string(),
            item_ref: "LPG-12KG".to_string(),
            variant: String::new(),
            kind: ItemKind::Cylinder,
            full: -1,
            empty: 4,
            defected: 0,
            stock: 0,
        };
        let sale = InventoryDelta {
            full: -2,
            ..Default::default()
        };
        let refund = InventoryDelta {
            empty: 2,
            ..Default::default()
        };
        assert_eq!(counters.overdrawn_by(&sale), Some(("full", -1)));
        assert_eq!(counters.overdrawn_by(&refund), None);
    }

    #[test]
    fn test_page_meta_total_pages() {
        assert_eq!(PageMeta::new(0, 1, 20).total_pages, 0);
        assert_eq!(PageMeta::new(20, 1, 20).total_pages, 1);
        assert_eq!(PageMeta::new(21, 1, 20).total_pages, 2);
    }

    #[test]
    fn test_oversell_policy_parse() {
        assert_eq!("reject".parse::<OversellPolicy>().unwrap(), OversellPolicy::Reject);
        assert_eq!(
            "allow_with_flag".parse::<OversellPolicy>().unwrap(),
            OversellPolicy::AllowWithFlag
        );
        assert!("block".parse::<OversellPolicy>().is_err());
    }
}
