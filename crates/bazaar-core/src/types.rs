//! # Domain Types
//!
//! Core domain types used throughout Bazaar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    CartLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  price_cents    │   │  status         │   │  user_id (FK)   │       │
//! │  │  cost_price     │   │  customer_type  │   │  product_id     │       │
//! │  │  quantity       │   │  total_cents    │   │  quantity       │       │
//! │  │  seller_id      │   └────────┬────────┘   └─────────────────┘       │
//! │  └─────────────────┘            │                                       │
//! │                        ┌────────▼────────┐   ┌─────────────────┐       │
//! │  ┌─────────────────┐   │   OrderItem     │   │ ScheduledReport │       │
//! │  │   SearchEntry   │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  term           │   │  unit_price     │   │  frequency      │       │
//! │  │  role           │   │  cost (frozen)  │   │  next_run       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `OrderItem` freezes the unit price and line cost at checkout time.
//! Later edits to a product never change what an existing order recorded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Roles
// =============================================================================

/// The role attached to an authenticated caller.
///
/// `Guest` exists only for search logging; authenticated callers are
/// buyers, sellers or admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
    Guest,
}

impl Role {
    /// Stable lowercase label, matching the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
            Role::Guest => "guest",
        }
    }
}

/// An authenticated caller identity, provided by the host's auth layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// User id of the caller.
    pub id: String,
    /// Role granted by the authorization layer.
    pub role: Role,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Caller {
            id: id.into(),
            role,
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// A registered user.
///
/// Credentials and sessions live outside this system; the fields kept here
/// are the ones orders, carts and reports need.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    /// Free-form location label, used by customer segmentation.
    pub location: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Products
// =============================================================================

/// Product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Grocery,
    Kitchen,
    Clothing,
    Electronics,
    Furniture,
    Bakery,
    Liquor,
    Sports,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Selling price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Acquisition cost in cents (for profitability analysis).
    pub cost_price_cents: i64,

    /// Product category.
    pub category: Category,

    /// Stock on hand. Never negative.
    pub quantity: i64,

    /// Owning seller.
    pub seller_id: String,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the selling price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the acquisition cost as a Money type.
    #[inline]
    pub fn cost_price(&self) -> Money {
        Money::from_cents(self.cost_price_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One line of a user's cart.
///
/// A cart is the set of a user's lines: created lazily on first add,
/// mutated by add/remove, cleared on checkout. At most one line exists per
/// distinct product — adding the same product again merges into the
/// existing line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    pub id: String,
    pub user_id: String,
    pub product_id: String,

    /// Units held in the cart. Always >= 1.
    pub quantity: i64,

    /// Accumulated acquisition cost of the held units, captured at the
    /// time each unit was added.
    pub cost_cents: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Whether the order came from a first-time or returning customer.
///
/// Decided exactly once, at checkout, by looking for any prior order of
/// the same user. Never recomputed afterwards — reports rely on the stored
/// value being a fact about the moment the order was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    New,
    Repeat,
}

/// An order created by checkout.
///
/// Immutable once created except for `status` and `updated_at`. Reports
/// treat orders as append-only facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: String,
    pub user_id: String,

    /// Sum of `unit_price × quantity` across the order's items.
    pub total_cents: i64,

    pub status: OrderStatus,
    pub customer_type: CustomerType,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the order total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in an order.
/// Uses the snapshot pattern to freeze product pricing at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,

    /// Units sold.
    pub quantity: i64,

    /// Unit selling price in cents at checkout time (frozen).
    pub unit_price_cents: i64,

    /// Acquisition cost of the whole line at checkout time (frozen):
    /// `cost_price × quantity`.
    pub cost_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Revenue of this line: `unit_price × quantity`.
    #[inline]
    pub fn revenue_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

// =============================================================================
// Search Log
// =============================================================================

/// One logged search execution.
///
/// Appended for every search, whether or not it returned results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SearchEntry {
    pub id: String,
    pub term: String,
    pub user_id: Option<String>,
    pub role: Role,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Activity Log
// =============================================================================

/// One recorded user action, for the userActivity report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ActivityEntry {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Scheduled Reports
// =============================================================================

/// How often a scheduled report is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum ReportFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ReportFrequency {
    /// Stable lowercase label, matching the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportFrequency::Daily => "daily",
            ReportFrequency::Weekly => "weekly",
            ReportFrequency::Monthly => "monthly",
        }
    }
}

/// Which report body a subscription delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "camelCase"))]
#[serde(rename_all = "camelCase")]
pub enum ReportType {
    Sales,
    Inventory,
    UserActivity,
}

impl ReportType {
    /// Label used in email subjects.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportType::Sales => "sales",
            ReportType::Inventory => "inventory",
            ReportType::UserActivity => "userActivity",
        }
    }
}

/// A report subscription polled by the dispatcher.
///
/// Only `last_sent` and `next_run` are mutated, and only after a
/// successful delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ScheduledReport {
    pub id: String,
    pub user_id: String,
    pub frequency: ReportFrequency,
    pub report_type: ReportType,
    pub email: String,
    pub last_sent: Option<DateTime<Utc>>,
    pub next_run: DateTime<Utc>,
    pub is_active: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(Role::Seller.as_str(), "seller");
        assert_eq!(Role::Guest.as_str(), "guest");
    }

    #[test]
    fn test_order_item_revenue() {
        let item = OrderItem {
            id: "i1".to_string(),
            order_id: "o1".to_string(),
            product_id: "p1".to_string(),
            quantity: 3,
            unit_price_cents: 250,
            cost_cents: 450,
            created_at: Utc::now(),
        };
        assert_eq!(item.revenue_cents(), 750);
        assert_eq!(item.unit_price().cents(), 250);
    }

    #[test]
    fn test_report_type_labels() {
        assert_eq!(ReportType::UserActivity.as_str(), "userActivity");
        assert_eq!(ReportType::Sales.as_str(), "sales");
    }
}
