//! # Effect Planner
//!
//! Classifies a priced request into the ledger deltas the recorder must
//! apply. Pure: no ledger is read or written here.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Balance (at most one delta, at most one counterparty)                  │
//! │    DUE_PAYMENT                         → balance −= paidAmount          │
//! │    other type, due > 0, counterparty   → balance += dueAmount           │
//! │    otherwise                           → nothing                        │
//! │                                                                         │
//! │  Payroll (EXPENSE only)                                                 │
//! │    SALARY_PAYOUT item for staff S      → S.salaryDue −= subtotal        │
//! │                                                                         │
//! │  Inventory (never for DUE_PAYMENT)                                      │
//! │    item return-flagged OR type RETURN  → Inbound                        │
//! │    else type SALE                      → Outbound                       │
//! │    else                                → no movement                    │
//! │                                                                         │
//! │               Outbound        Inbound                                   │
//! │    CYLINDER   full −= q       empty += q                                │
//! │    ACCESSORY  stock −= q      stock += q                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Movements on the same (item, variant, kind) are merged so every inventory
//! row receives a single write.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::pricing::Pricing;
use crate::types::{
    CounterpartyRef, InventoryDelta, ItemKind, LineItem, TransactionRequest, TransactionType,
};

/// Physical direction of goods relative to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Goods leave the store.
    Outbound,
    /// Goods come back into the store.
    Inbound,
}

/// One goods line resolved to a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryMovement {
    pub item_ref: String,
    pub variant: String,
    pub kind: ItemKind,
    pub direction: Direction,
    pub quantity: i64,
}

impl InventoryMovement {
    /// The counter delta this movement implies.
    pub fn delta(&self) -> InventoryDelta {
        let q = self.quantity;
        match (self.kind, self.direction) {
            (ItemKind::Cylinder, Direction::Outbound) => InventoryDelta {
                full: -q,
                ..Default::default()
            },
            (ItemKind::Cylinder, Direction::Inbound) => InventoryDelta {
                empty: q,
                ..Default::default()
            },
            (ItemKind::Accessory, Direction::Outbound) => InventoryDelta {
                stock: -q,
                ..Default::default()
            },
            (ItemKind::Accessory, Direction::Inbound) => InventoryDelta {
                stock: q,
                ..Default::default()
            },
            (ItemKind::SalaryPayout, _) => InventoryDelta::default(),
        }
    }
}

/// Merged delta for one inventory row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEffect {
    pub item_ref: String,
    pub variant: String,
    pub kind: ItemKind,
    pub delta: InventoryDelta,
}

/// Signed change to one counterparty's `totalDue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceEffect {
    pub counterparty: CounterpartyRef,
    pub amount: Money,
}

/// Reduction of one staff member's `salaryDue`. `amount` is positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollEffect {
    pub staff_id: String,
    pub amount: Money,
}

/// Everything a committed request changes besides its own record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectPlan {
    pub balance: Option<BalanceEffect>,
    pub payroll: Vec<PayrollEffect>,
    pub inventory: Vec<InventoryEffect>,
}

impl EffectPlan {
    pub fn is_empty(&self) -> bool {
        self.balance.is_none() && self.payroll.is_empty() && self.inventory.is_empty()
    }
}

/// Resolves the direction of one line item, or `None` when it moves no goods.
pub fn resolve_direction(item: &LineItem, transaction_type: TransactionType) -> Option<Direction> {
    if !item.kind.is_goods() || transaction_type == TransactionType::DuePayment {
        return None;
    }
    if item.is_return || transaction_type == TransactionType::Return {
        return Some(Direction::Inbound);
    }
    if transaction_type == TransactionType::Sale {
        return Some(Direction::Outbound);
    }
    None
}

/// Builds the effect plan for a validated, priced request.
///
/// Returns a validation error when a DUE_PAYMENT names no counterparty.
/// An amount left due without a counterparty is recorded on the transaction
/// only; no balance changes.
pub fn plan_effects(request: &TransactionRequest, pricing: &Pricing) -> CoreResult<EffectPlan> {
    let balance = plan_balance(request, pricing)?;
    let payroll = plan_payroll(request.transaction_type, &pricing.items)?;
    let inventory = plan_inventory(request.transaction_type, &pricing.items);

    Ok(EffectPlan {
        balance,
        payroll,
        inventory,
    })
}

fn plan_balance(request: &TransactionRequest, pricing: &Pricing) -> CoreResult<Option<BalanceEffect>> {
    let counterparty = request.counterparty();

    if request.transaction_type == TransactionType::DuePayment {
        let counterparty = counterparty.ok_or_else(|| ValidationError::required("customerId"))?;
        return Ok(Some(BalanceEffect {
            counterparty,
            amount: -pricing.paid_amount,
        }));
    }

    if !pricing.due_amount.is_positive() {
        return Ok(None);
    }

    Ok(counterparty.map(|counterparty| BalanceEffect {
        counterparty,
        amount: pricing.due_amount,
    }))
}

fn plan_payroll(
    transaction_type: TransactionType,
    items: &[LineItem],
) -> CoreResult<Vec<PayrollEffect>> {
    if transaction_type != TransactionType::Expense {
        return Ok(Vec::new());
    }

    let mut payroll: Vec<PayrollEffect> = Vec::new();
    for item in items.iter().filter(|i| i.kind == ItemKind::SalaryPayout) {
        let staff_id = item
            .staff_id
            .clone()
            .ok_or_else(|| ValidationError::required("staffId"))?;

        match payroll.iter_mut().find(|p| p.staff_id == staff_id) {
            Some(existing) => {
                existing.amount = existing
                    .amount
                    .checked_add(item.subtotal)
                    .ok_or_else(|| CoreError::AmountOverflow {
                        field: "salaryPayout".to_string(),
                    })?;
            }
            None => payroll.push(PayrollEffect {
                staff_id,
                amount: item.subtotal,
            }),
        }
    }

    Ok(payroll)
}

fn plan_inventory(transaction_type: TransactionType, items: &[LineItem]) -> Vec<InventoryEffect> {
    let mut merged: BTreeMap<(String, String, &'static str), InventoryEffect> = BTreeMap::new();

    let movements = items.iter().filter_map(|item| {
        let direction = resolve_direction(item, transaction_type)?;
        let item_ref = item.item_ref.clone()?;
        Some(InventoryMovement {
            item_ref,
            variant: item.variant.clone(),
            kind: item.kind,
            direction,
            quantity: item.quantity,
        })
    });

    for movement in movements {
        let delta = movement.delta();
        merged
            .entry((
                movement.item_ref.clone(),
                movement.variant.clone(),
                movement.kind.as_str(),
            ))
            .or_insert_with(|| InventoryEffect {
                item_ref: movement.item_ref,
                variant: movement.variant,
                kind: movement.kind,
                delta: InventoryDelta::default(),
            })
            .delta
            .merge(delta);
    }

    merged
        .into_values()
        .filter(|effect| !effect.delta.is_zero())
        .collect()
}
