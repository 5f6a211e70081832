//! # Repository Implementations
//!
//! One repository per aggregate, each a thin `Clone`-able wrapper around
//! the shared [`sqlx::SqlitePool`].
//!
//! ## Repository Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ProductRepository   products          lookups, seller ownership sets   │
//! │  CartRepository      cart_items        per-user lines, upsert, clear    │
//! │  OrderRepository     orders/items      checkout commit, report windows  │
//! │  SearchRepository    search_logs       append + top-terms aggregation   │
//! │  ActivityRepository  activity_logs     append + recent/count            │
//! │  ScheduleRepository  scheduled_reports due-subscription polling         │
//! │  UserRepository      users             identity lookups                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod activity;
pub mod cart;
pub mod order;
pub mod product;
pub mod schedule;
pub mod search;
pub mod user;

/// Generates a new entity ID (UUID v4 string).
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
