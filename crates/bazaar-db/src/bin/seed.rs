//! # Seed Data Generator
//!
//! Populates the database with development data: a handful of users, a
//! product catalog across every category, and a few weeks of completed
//! orders and search logs so the report endpoints return something
//! interesting.
//!
//! ## Usage
//! ```bash
//! cargo run -p bazaar-db --bin seed
//! cargo run -p bazaar-db --bin seed -- --db ./data/bazaar.db --products 200
//! ```

use chrono::{Duration, Utc};
use std::env;
use tracing_subscriber::EnvFilter;

use bazaar_core::{
    Category, CustomerType, Order, OrderItem, OrderStatus, Product, Role, SearchEntry, User,
};
use bazaar_db::{generate_id, Database, DbConfig};

/// Product name stems per category.
const CATALOG: &[(Category, &[&str])] = &[
    (
        Category::Grocery,
        &["Basmati Rice", "Olive Oil", "Black Tea", "Lentils", "Honey"],
    ),
    (
        Category::Bakery,
        &["Rye Loaf", "Sourdough", "Bagel Pack", "Croissant Box"],
    ),
    (
        Category::Kitchen,
        &["Cast Iron Pan", "Chef Knife", "Cutting Board", "Stock Pot"],
    ),
    (
        Category::Electronics,
        &["Desk Lamp", "Bluetooth Speaker", "USB Charger", "Headphones"],
    ),
    (
        Category::Clothing,
        &["Wool Scarf", "Denim Jacket", "Canvas Tote", "Rain Coat"],
    ),
    (
        Category::Furniture,
        &["Oak Stool", "Bookshelf", "Side Table", "Floor Cushion"],
    ),
    (
        Category::Liquor,
        &["Stout", "Dry Cider", "Pale Ale", "Porter"],
    ),
    (
        Category::Sports,
        &["Yoga Mat", "Jump Rope", "Water Bottle", "Resistance Band"],
    ),
];

const SEARCH_TERMS: &[&str] = &["rye", "stout", "lamp", "scarf", "knife", "rice", "yoga"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./bazaar_dev.db");
    let mut product_count: usize = 64;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--products" | "-p" => {
                if i + 1 < args.len() {
                    product_count = args[i + 1].parse().unwrap_or(64);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bazaar Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: ./bazaar_dev.db)");
                println!("  -p, --products <N>    Number of products to generate (default: 64)");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Bazaar Seed Data Generator");
    println!("==========================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    if db.products().count().await? > 0 {
        println!("⚠ Database already has products; skipping seed.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    // Two sellers, three buyers, one admin.
    let users = [
        ("seller-anaya", "Lahore", Role::Seller),
        ("seller-omar", "Karachi", Role::Seller),
        ("buyer-zara", "Lahore", Role::Buyer),
        ("buyer-bilal", "Islamabad", Role::Buyer),
        ("buyer-sana", "Karachi", Role::Buyer),
        ("admin-root", "Lahore", Role::Admin),
    ];
    for (username, location, role) in users {
        db.users()
            .insert(&User {
                id: username.to_string(),
                username: username.to_string(),
                email: format!("{}@example.com", username),
                location: location.to_string(),
                role,
                created_at: now,
            })
            .await?;
    }
    println!("✓ Seeded {} users", users.len());

    // Products spread across both sellers.
    let mut product_ids: Vec<(String, i64)> = Vec::new();
    let mut generated = 0usize;
    'outer: for (category, names) in CATALOG {
        for (idx, name) in names.iter().enumerate() {
            if generated >= product_count {
                break 'outer;
            }

            let seed = generated * 13 + idx;
            let price_cents = 299 + ((seed * 37) % 4_700) as i64;
            let seller = if generated % 2 == 0 {
                "seller-anaya"
            } else {
                "seller-omar"
            };

            let product = Product {
                id: generate_id(),
                name: (*name).to_string(),
                description: None,
                price_cents,
                cost_price_cents: price_cents * (55 + (seed % 30) as i64) / 100,
                category: *category,
                quantity: (seed % 40) as i64 + 5,
                seller_id: seller.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            db.products().insert(&product).await?;
            product_ids.push((product.id, price_cents));
            generated += 1;
        }
    }
    println!("✓ Seeded {} products", generated);

    // A few weeks of completed orders.
    let buyers = ["buyer-zara", "buyer-bilal", "buyer-sana"];
    let mut order_count = 0usize;
    for day in 0..21 {
        let created_at = now - Duration::days(day as i64);
        for (b, buyer) in buyers.iter().enumerate() {
            if (day + b) % 3 == 0 {
                continue; // not everyone orders every day
            }

            let (product_id, price_cents) = &product_ids[(day * 7 + b * 3) % product_ids.len()];
            let quantity = ((day + b) % 3 + 1) as i64;

            let order = Order {
                id: generate_id(),
                user_id: (*buyer).to_string(),
                total_cents: price_cents * quantity,
                status: OrderStatus::Completed,
                customer_type: if order_count < buyers.len() {
                    CustomerType::New
                } else {
                    CustomerType::Repeat
                },
                created_at,
                updated_at: created_at,
            };
            let item = OrderItem {
                id: generate_id(),
                order_id: order.id.clone(),
                product_id: product_id.clone(),
                quantity,
                unit_price_cents: *price_cents,
                cost_cents: price_cents * 60 / 100 * quantity,
                created_at,
            };
            db.orders().commit_checkout(&order, &[item]).await?;
            order_count += 1;
        }
    }
    println!("✓ Seeded {} completed orders", order_count);

    // Search history for the top-terms report.
    let mut search_count = 0usize;
    for day in 0..21 {
        let timestamp = now - Duration::days(day as i64);
        for (t, term) in SEARCH_TERMS.iter().enumerate() {
            if (day + t) % 2 == 0 {
                continue;
            }
            db.searches()
                .log(&SearchEntry {
                    id: generate_id(),
                    term: (*term).to_string(),
                    user_id: Some(buyers[t % buyers.len()].to_string()),
                    role: Role::Buyer,
                    timestamp,
                })
                .await?;
            search_count += 1;
        }
    }
    println!("✓ Seeded {} search log entries", search_count);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
