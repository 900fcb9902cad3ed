//! # Pricing
//!
//! Step 1 of a `create()` call: turn submitted line items into priced line
//! items and derive the four amounts of the record.
//!
//! ```text
//!   subtotal_i   = quantity_i × unitPrice_i
//!   totalAmount  = Σ subtotal_i
//!   finalAmount  = request.finalAmount ?? totalAmount     (manual discount)
//!   paidAmount   = request.paidAmount  ?? 0
//!   dueAmount    = finalAmount − paidAmount               (never supplied)
//! ```
//!
//! `dueAmount` may be negative (overpayment); the planner ignores that case.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ItemKind, LineItem, LineItemInput, TransactionRequest};

/// Amounts and priced items for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Pricing {
    pub items: Vec<LineItem>,
    pub total_amount: Money,
    pub final_amount: Money,
    pub paid_amount: Money,
    pub due_amount: Money,
}

/// Prices a validated request.
///
/// Fails only on arithmetic overflow; input validity is
/// [`crate::validation::validate_request`]'s job.
///
/// ## Example
/// ```rust
/// use gasdepot_core::pricing::price_request;
/// use gasdepot_core::{ItemKind, LineItemInput, Money, PaymentMethod, TransactionRequest, TransactionType};
///
/// let request = TransactionRequest {
///     items: vec![LineItemInput {
///         item_ref: Some("LPG-12KG".into()),
///         kind: ItemKind::Cylinder,
///         quantity: 2,
///         unit_price: Money::from_minor(1500),
///         is_return: false,
///         variant: None,
///         name: None,
///         staff_id: None,
///     }],
///     transaction_type: TransactionType::Sale,
///     payment_method: PaymentMethod::Cash,
///     final_amount: None,
///     paid_amount: None,
///     customer_id: None,
///     customer_type: None,
///     notes: None,
/// };
///
/// let pricing = price_request(&request).unwrap();
/// assert_eq!(pricing.total_amount.minor(), 3000);
/// assert_eq!(pricing.final_amount.minor(), 3000);
/// assert_eq!(pricing.due_amount.minor(), 3000);
/// ```
pub fn price_request(request: &TransactionRequest) -> CoreResult<Pricing> {
    let items = request
        .items
        .iter()
        .map(price_item)
        .collect::<CoreResult<Vec<_>>>()?;

    let total_amount = items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.subtotal))
        .ok_or_else(|| overflow("totalAmount"))?;

    let final_amount = request.final_amount.unwrap_or(total_amount);
    let paid_amount = request.paid_amount.unwrap_or_default();
    let due_amount = final_amount
        .checked_sub(paid_amount)
        .ok_or_else(|| overflow("dueAmount"))?;

    Ok(Pricing {
        items,
        total_amount,
        final_amount,
        paid_amount,
        due_amount,
    })
}

fn price_item(input: &LineItemInput) -> CoreResult<LineItem> {
    let subtotal = input
        .unit_price
        .checked_line_total(input.quantity)
        .ok_or_else(|| overflow("subtotal"))?;

    let item_ref = input
        .item_ref
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string);

    let variant = input
        .variant
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| item_ref.clone())
        .unwrap_or_else(|| default_name(input.kind).to_string());

    Ok(LineItem {
        id: Uuid::new_v4().to_string(),
        item_ref,
        kind: input.kind,
        variant,
        name,
        quantity: input.quantity,
        unit_price: input.unit_price,
        subtotal,
        is_return: input.is_return,
        staff_id: input
            .staff_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

fn default_name(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Cylinder => "Cylinder",
        ItemKind::Accessory => "Accessory",
        ItemKind::SalaryPayout => "Salary payout",
    }
}

fn overflow(field: &str) -> CoreError {
    CoreError::AmountOverflow {
        field: field.to_string(),
    }
}
