//! # Validation Module
//!
//! Request validation for the reconciliation engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractor (serde)                                        │
//! │  ├── Closed enums: unknown type / paymentMethod / kind rejected         │
//! │  └── Shape: missing fields, wrong JSON types                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── items, quantities, prices, amounts, notes                          │
//! │  └── type-dependent rules (DUE_PAYMENT, SALARY_PAYOUT)                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (inside the atomic unit)                             │
//! │  ├── SKU / counterparty / staff existence  → NotFound                   │
//! │  └── CHECK constraints                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs before a database transaction is opened, so a
//! failure leaves every ledger untouched.
//!
//! ## Usage
//! ```rust,no_run
//! use gasdepot_core::validation::{validate_item_ref, validate_quantity};
//!
//! validate_item_ref("LPG-12KG").unwrap();
//! validate_quantity(2).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ItemKind, LineItemInput, TransactionRequest, TransactionType};
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_ITEMS, MAX_NOTES_LEN, MAX_PAGE_LIMIT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an inventory SKU reference.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, digits, `-`, `_` and `.` only
///
/// ## Example
/// ```rust
/// use gasdepot_core::validation::validate_item_ref;
///
/// assert!(validate_item_ref("LPG-12KG").is_ok());
/// assert!(validate_item_ref("").is_err());
/// assert!(validate_item_ref("LPG 12KG").is_err());
/// ```
pub fn validate_item_ref(item_ref: &str) -> ValidationResult<()> {
    let item_ref = item_ref.trim();

    if item_ref.is_empty() {
        return Err(ValidationError::required("itemRef"));
    }

    if item_ref.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "itemRef".to_string(),
            max: 64,
        });
    }

    if !item_ref
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::invalid(
            "itemRef",
            "must contain only letters, numbers, hyphens, underscores and dots",
        ));
    }

    Ok(())
}

/// Validates the optional notes field and returns it trimmed.
///
/// Blank notes collapse to `None`.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };

    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(Some(notes.to_string()))
}

/// Validates a history search query.
///
/// ## Rules
/// - Empty means "no search"
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query, or `None` when blank.
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return Ok(None);
    };

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok(Some(query.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Example
/// ```rust
/// use gasdepot_core::validation::validate_quantity;
///
/// assert!(validate_quantity(1).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-3).is_err());
/// assert!(validate_quantity(10_000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price. Zero is allowed (plain returns carry no price).
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "unitPrice".to_string(),
        });
    }
    Ok(())
}

/// Validates an optional caller-supplied amount (finalAmount, paidAmount).
pub fn validate_amount(field: &str, amount: Option<Money>) -> ValidationResult<()> {
    match amount {
        Some(a) if a.is_negative() => Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Resolves history pagination to `(page, limit)` with defaults applied.
///
/// ## Rules
/// - `page` defaults to 1 and must be ≥ 1
/// - `limit` defaults to 20 and must be within 1..=MAX_PAGE_LIMIT
pub fn validate_pagination(page: Option<u32>, limit: Option<u32>) -> ValidationResult<(u32, u32)> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(crate::DEFAULT_PAGE_LIMIT);

    if page == 0 {
        return Err(ValidationError::MustBePositive {
            field: "page".to_string(),
        });
    }

    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: MAX_PAGE_LIMIT as i64,
        });
    }

    Ok((page, limit))
}

// =============================================================================
// Request Validators
// =============================================================================

/// Validates one line item in the context of its transaction type.
///
/// `index` is only used to name the offending field.
pub fn validate_line_item(
    index: usize,
    item: &LineItemInput,
    transaction_type: TransactionType,
) -> ValidationResult<()> {
    validate_quantity(item.quantity).map_err(|e| prefix(index, e))?;
    validate_unit_price(item.unit_price).map_err(|e| prefix(index, e))?;

    match item.kind {
        ItemKind::Cylinder | ItemKind::Accessory => {
            let item_ref = item
                .item_ref
                .as_deref()
                .ok_or_else(|| prefix(index, ValidationError::required("itemRef")))?;
            validate_item_ref(item_ref).map_err(|e| prefix(index, e))?;
        }
        ItemKind::SalaryPayout => {
            if transaction_type != TransactionType::Expense {
                return Err(ValidationError::NotAllowed {
                    field: format!("items[{index}].kind"),
                    allowed: vec!["CYLINDER".to_string(), "ACCESSORY".to_string()],
                });
            }
            let has_staff = item
                .staff_id
                .as_deref()
                .is_some_and(|s| !s.trim().is_empty());
            if !has_staff {
                return Err(prefix(index, ValidationError::required("staffId")));
            }
        }
    }

    Ok(())
}

/// Validates a whole request before anything is priced or written.
///
/// ## Rules
/// - `items` non-empty (DUE_PAYMENT may omit items) and at most MAX_LINE_ITEMS
/// - every item valid for the transaction type
/// - `finalAmount` / `paidAmount` not negative
/// - DUE_PAYMENT names a counterparty and pays a positive amount
/// - `notes` at most MAX_NOTES_LEN characters
///
/// A positive due without a counterparty is allowed; it stays on the record
/// and no balance moves.
pub fn validate_request(request: &TransactionRequest) -> ValidationResult<()> {
    let is_due_payment = request.transaction_type == TransactionType::DuePayment;

    if request.items.is_empty() && !is_due_payment {
        return Err(ValidationError::required("items"));
    }

    if request.items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    for (index, item) in request.items.iter().enumerate() {
        validate_line_item(index, item, request.transaction_type)?;
    }

    validate_amount("finalAmount", request.final_amount)?;
    validate_amount("paidAmount", request.paid_amount)?;

    if is_due_payment {
        if request.counterparty().is_none() {
            return Err(ValidationError::required("customerId"));
        }
        if !request.paid_amount.is_some_and(|p| p.is_positive()) {
            return Err(ValidationError::MustBePositive {
                field: "paidAmount".to_string(),
            });
        }
    }

    validate_notes(request.notes.as_deref())?;

    Ok(())
}

/// Rewrites the field of an item-level error to `items[i].field`.
fn prefix(index: usize, err: ValidationError) -> ValidationError {
    let at = |field: String| format!("items[{index}].{field}");
    match err {
        ValidationError::Required { field } => ValidationError::Required { field: at(field) },
        ValidationError::TooLong { field, max } => ValidationError::TooLong {
            field: at(field),
            max,
        },
        ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
            field: at(field),
            min,
            max,
        },
        ValidationError::MustBePositive { field } => {
            ValidationError::MustBePositive { field: at(field) }
        }
        ValidationError::MustNotBeNegative { field } => {
            ValidationError::MustNotBeNegative { field: at(field) }
        }
        ValidationError::InvalidFormat { field, reason } => ValidationError::InvalidFormat {
            field: at(field),
            reason,
        },
        ValidationError::NotAllowed { field, allowed } => ValidationError::NotAllowed {
            field: at(field),
            allowed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;

    fn cylinder(qty: i64, price: i64) -> LineItemInput {
        LineItemInput {
            item_ref: Some("LPG-12KG".to_string()),
            kind: ItemKind::Cylinder,
            quantity: qty,
            unit_price: Money::from_minor(price),
            is_return: false,
            variant: None,
            name: None,
            staff_id: None,
        }
    }

    fn request(tx_type: TransactionType, items: Vec<LineItemInput>) -> TransactionRequest {
        TransactionRequest {
            items,
            transaction_type: tx_type,
            payment_method: PaymentMethod::Cash,
            final_amount: None,
            paid_amount: None,
            customer_id: None,
            customer_type: None,
            notes: None,
        }
    }

    #[test]
    fn test_validate_item_ref() {
        assert!(validate_item_ref("LPG-12KG").is_ok());
        assert!(validate_item_ref("regulator_v2.1").is_ok());
        assert!(validate_item_ref("   ").is_err());
        assert!(validate_item_ref(&"A".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes(None).unwrap(), None);
        assert_eq!(validate_notes(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_notes(Some(" refill ")).unwrap(),
            Some("refill".to_string())
        );
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LEN + 1))).is_err());
    }

    #[test]
    fn test_validate_pagination_defaults() {
        assert_eq!(validate_pagination(None, None).unwrap(), (1, 20));
        assert_eq!(validate_pagination(Some(3), Some(50)).unwrap(), (3, 50));
        assert!(validate_pagination(Some(0), None).is_err());
        assert!(validate_pagination(None, Some(MAX_PAGE_LIMIT + 1)).is_err());
    }

    #[test]
    fn test_empty_items_rejected() {
        let req = request(TransactionType::Sale, vec![]);
        assert!(matches!(
            validate_request(&req),
            Err(ValidationError::Required { field }) if field == "items"
        ));
    }

    #[test]
    fn test_item_errors_name_the_index() {
        let req = request(TransactionType::Sale, vec![cylinder(1, 100), cylinder(0, 100)]);
        match validate_request(&req) {
            Err(ValidationError::MustBePositive { field }) => {
                assert_eq!(field, "items[1].quantity")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_goods_require_item_ref() {
        let mut item = cylinder(1, 100);
        item.item_ref = None;
        let req = request(TransactionType::Sale, vec![item]);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut req = request(TransactionType::Sale, vec![cylinder(1, 100)]);
        req.paid_amount = Some(Money::from_minor(-1));
        assert!(validate_request(&req).is_err());

        let mut req = request(TransactionType::Sale, vec![cylinder(1, 100)]);
        req.final_amount = Some(Money::from_minor(-1));
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_due_payment_rules() {
        let mut req = request(TransactionType::DuePayment, vec![]);
        req.paid_amount = Some(Money::from_minor(1000));
        assert!(matches!(
            validate_request(&req),
            Err(ValidationError::Required { field }) if field == "customerId"
        ));

        req.customer_id = Some("C1".to_string());
        assert!(validate_request(&req).is_ok());

        req.paid_amount = Some(Money::zero());
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_salary_payout_rules() {
        let payout = LineItemInput {
            item_ref: None,
            kind: ItemKind::SalaryPayout,
            quantity: 1,
            unit_price: Money::from_minor(20_000),
            is_return: false,
            variant: None,
            name: Some("October salary".to_string()),
            staff_id: Some("S1".to_string()),
        };

        let req = request(TransactionType::Expense, vec![payout.clone()]);
        assert!(validate_request(&req).is_ok());

        let req = request(TransactionType::Sale, vec![payout.clone()]);
        assert!(matches!(
            validate_request(&req),
            Err(ValidationError::NotAllowed { .. })
        ));

        let mut no_staff = payout;
        no_staff.staff_id = None;
        let req = request(TransactionType::Expense, vec![no_staff]);
        assert!(matches!(
            validate_request(&req),
            Err(ValidationError::Required { field }) if field == "items[0].staffId"
        ));
    }
}
