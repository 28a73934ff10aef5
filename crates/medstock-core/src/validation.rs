//! # Validation Module
//!
//! Input validation for everything that enters the inventory engine.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request layer                                                │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Auth, request shape                                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: InventoryService (Rust)                                      │
//! │  └── THIS MODULE: quantities, prices, names, emails, date ranges       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity > 0), CHECK (price_cents >= 0)                    │
//! │  ├── UNIQUE live product name / user email                             │
//! │  └── Foreign keys movement → product, user                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medstock_core::validation::{validate_quantity, validate_product_name};
//!
//! validate_product_name("Ibuprofen 400mg").unwrap();
//! validate_quantity(40).unwrap();
//! assert!(validate_quantity(0).is_err());
//! ```

use chrono::{DateTime, Utc};

use crate::error::ValidationError;
use crate::types::{MovementFilter, NewProduct, NewUser, ProductUpdate, StockChange};
use crate::MAX_MOVEMENT_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_NAME_LEN: usize = 200;
const MAX_LABEL_LEN: usize = 50;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_NOTE_LEN: usize = 500;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PHONE_LEN: usize = 20;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, MAX_NAME_LEN)
}

/// Validates a short label such as a category or unit of measure.
pub fn validate_label(field: &str, value: &str) -> ValidationResult<()> {
    required_text(field, value, MAX_LABEL_LEN)
}

/// Validates an optional movement note.
pub fn validate_note(note: Option<&str>) -> ValidationResult<()> {
    optional_text("note", note, MAX_NOTE_LEN)
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - One `@` with a non-empty local part and a dotted domain
///
/// ## Example
/// ```rust
/// use medstock_core::validation::validate_email;
///
/// assert!(validate_email("pharmacist@clinic.org").is_ok());
/// assert!(validate_email("pharmacist@clinic").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required_text("email", email, MAX_EMAIL_LEN)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.trim().split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a phone number: digits with an optional leading `+`.
pub fn validate_phone_number(phone: &str) -> ValidationResult<()> {
    required_text("phone_number", phone, MAX_PHONE_LEN)?;

    let digits = phone.trim().strip_prefix('+').unwrap_or(phone.trim());
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone_number".to_string(),
            reason: "must contain only digits and an optional leading +".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query, or `None` when it is blank.
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(query) = query.map(str::trim) else {
        return Ok(None);
    };

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: 100,
        });
    }

    Ok((!query.is_empty()).then(|| query.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a movement quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_MOVEMENT_QUANTITY
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Stock In / Stock Out form                                              │
/// │                                                                         │
/// │  User enters quantity: 40                                              │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(40) ← THIS FUNCTION                                 │
/// │       │                                                                 │
/// │       ├── qty <= 0? → INVALID "quantity must be positive"              │
/// │       │                                                                 │
/// │       ├── qty too large? → INVALID "quantity must be between ..."      │
/// │       │                                                                 │
/// │       └── OK → open the transaction                                    │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_MOVEMENT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_MOVEMENT_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in cents. Zero is allowed (donated stock).
///
/// ```rust
/// use medstock_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a low-stock threshold.
pub fn validate_threshold(threshold: i64) -> ValidationResult<()> {
    if threshold < 0 {
        return Err(ValidationError::Negative {
            field: "low_stock_threshold".to_string(),
        });
    }

    Ok(())
}

/// Validates the opening stock of a new product.
pub fn validate_opening_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }

    if stock > MAX_MOVEMENT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: MAX_MOVEMENT_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a date range; `start` must come before `end` when both are set.
pub fn validate_date_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if start >= end => Err(ValidationError::InvalidFormat {
            field: "date range".to_string(),
            reason: "start date must be before end date".to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Request Validators
// =============================================================================

pub fn validate_stock_change(change: &StockChange) -> ValidationResult<()> {
    validate_quantity(change.quantity)?;
    validate_note(change.note.as_deref())
}

pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    optional_text(
        "description",
        product.description.as_deref(),
        MAX_DESCRIPTION_LEN,
    )?;
    validate_price_cents(product.price_cents)?;
    validate_opening_stock(product.stock)?;
    validate_threshold(product.low_stock_threshold)?;
    validate_label("category", &product.category)?;
    validate_label("unit", &product.unit)
}

pub fn validate_product_update(update: &ProductUpdate) -> ValidationResult<()> {
    if let Some(name) = &update.name {
        validate_product_name(name)?;
    }
    optional_text(
        "description",
        update.description.as_deref(),
        MAX_DESCRIPTION_LEN,
    )?;
    if let Some(price) = update.price_cents {
        validate_price_cents(price)?;
    }
    if let Some(category) = &update.category {
        validate_label("category", category)?;
    }
    if let Some(unit) = &update.unit {
        validate_label("unit", unit)?;
    }
    if let Some(threshold) = update.low_stock_threshold {
        validate_threshold(threshold)?;
    }
    Ok(())
}

pub fn validate_new_user(user: &NewUser) -> ValidationResult<()> {
    required_text("name", &user.name, MAX_NAME_LEN)?;
    validate_email(&user.email)?;
    validate_phone_number(&user.phone_number)
}

pub fn validate_movement_filter(filter: &MovementFilter) -> ValidationResult<()> {
    validate_date_range(filter.start_date, filter.end_date)
}

// =============================================================================
// Unit Tests
// =============================================================================
