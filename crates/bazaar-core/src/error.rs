//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bazaar-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  bazaar-services errors                                                │
//! │  └── ApiError         - What the host HTTP layer sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (ids, counts, dates)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message and status

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic
/// failures. They should be caught and translated to user-facing messages
/// at the service boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// User cannot be found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// A cart line for the given product does not exist.
    #[error("Cart item not found for product {product_id}")]
    CartItemNotFound { product_id: String },

    /// The cart already holds every available unit of this product.
    ///
    /// ## When This Occurs
    /// - `add_item` is called when `stock − in_cart <= 0`
    ///
    /// The message deliberately states how many units the cart already
    /// holds, so the caller can explain the cap to the user.
    #[error("Cannot add {product_id}: cart already holds {in_cart} of {available} in stock")]
    StockExceeded {
        product_id: String,
        available: i64,
        in_cart: i64,
    },

    /// Checkout was attempted against a cart with no lines.
    #[error("Cart is empty, nothing to checkout")]
    EmptyCart,

    /// The cart still contained lines after the checkout order was
    /// persisted. Surfaced as an unrecoverable server error — never
    /// reported as success.
    #[error("Checkout for user {user_id} left {remaining} cart line(s) behind")]
    CheckoutInconsistency { user_id: String, remaining: i64 },

    /// Caller role is not allowed to perform the operation.
    #[error("Role '{role}' is not permitted to {action}")]
    Forbidden { role: String, action: String },

    /// No completed orders fell inside the requested report window.
    #[error("No sales found for this period")]
    NoSalesInPeriod,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Date string is not valid `YYYY-MM-DD`.
    #[error("Invalid date '{value}': use YYYY-MM-DD")]
    InvalidDate { value: String },

    /// A date range where the start does not precede the end.
    #[error("startDate must be before endDate")]
    DateRangeOrder,

    /// Year string is not a valid four-digit year.
    #[error("Valid year (YYYY) is required")]
    InvalidYear,

    /// Month is neither 1-12 nor a recognized English month name.
    #[error("Invalid month '{value}': use 1-12 or a month name like 'March'")]
    InvalidMonth { value: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Unknown export format.
    #[error("Unknown export format '{value}': use csv, excel or pdf")]
    InvalidExportFormat { value: String },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
