//! # Seed Data Generator
//!
//! Populates a database with a pharmacy catalog and a stream of stock
//! movements for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./medstock_dev.db with the default catalog
//! cargo run -p medstock-db --bin seed
//!
//! # Cap the catalog and choose the database file
//! cargo run -p medstock-db --bin seed -- --count 40 --db ./data/medstock.db
//!
//! # More log detail
//! RUST_LOG=medstock_db=debug cargo run -p medstock-db --bin seed
//! ```
//!
//! ## Generated Data
//! - One admin user (unique email per run)
//! - Products across categories, each in a few strengths
//! - Deliveries and dispensings per product, every one through
//!   `InventoryService`, so stats and ledger agree exactly

use std::env;

use medstock_core::{NewProduct, NewUser, Role, StockChange};
use medstock_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Categories, units and product names for realistic test data
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "Analgesics",
        "strip",
        &["Paracetamol", "Ibuprofen", "Diclofenac", "Aspirin", "Naproxen"],
    ),
    (
        "Antibiotics",
        "box",
        &["Amoxicillin", "Azithromycin", "Ciprofloxacin", "Doxycycline", "Metronidazole"],
    ),
    (
        "Antihistamines",
        "strip",
        &["Cetirizine", "Loratadine", "Chlorpheniramine", "Fexofenadine"],
    ),
    (
        "Cardiovascular",
        "box",
        &["Amlodipine", "Atenolol", "Losartan", "Hydrochlorothiazide"],
    ),
    (
        "Supplies",
        "pack",
        &["Gauze Swabs", "Syringes 5ml", "Surgical Gloves", "Cotton Wool"],
    ),
];

/// Strength variants with a price multiplier in percent
const STRENGTHS: &[(&str, i64)] = &[("Low", 100), ("Standard", 140), ("High", 190)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(usize::MAX);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("MedStock Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Maximum number of products (default: all)");
                println!("  -d, --db <PATH>    Database file (default: $MEDSTOCK_DATABASE_PATH or ./medstock_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = DbConfig::from_env()?;
    if let Some(path) = db_path {
        config.database_path = path.into();
    } else if env::var(medstock_db::config::DATABASE_PATH_VAR).is_err() {
        config.database_path = "./medstock_dev.db".into();
    }

    info!(path = %config.database_path.display(), "Seeding database");
    let db = Database::new(config).await?;
    let inventory = db.inventory();

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let suffix = Uuid::new_v4().simple().to_string();
    let admin = inventory
        .create_user(NewUser {
            name: "Seed Admin".to_string(),
            email: format!("admin+{}@medstock.local", &suffix[..8]),
            phone_number: "+254700000000".to_string(),
            role: Role::Admin,
        })
        .await?;
    info!(user_id = admin.id, email = %admin.email, "Created admin user");

    let start = std::time::Instant::now();
    let mut generated = 0usize;
    let mut movements = 0usize;

    'catalog: for (category_idx, (category, unit, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (strength_idx, (strength, multiplier)) in STRENGTHS.iter().enumerate() {
                if generated >= count {
                    break 'catalog;
                }

                let seed = category_idx * 100 + name_idx * 10 + strength_idx;
                let product = inventory
                    .create_product(generate_product(category, unit, name, strength, *multiplier, seed), admin.id)
                    .await?;
                generated += 1;
                if product.stock > 0 {
                    movements += 1;
                }

                // A delivery, then a few dispensings that may run the shelf dry
                let delivery = 20 + (seed % 5) as i64 * 10;
                inventory
                    .add_stock(StockChange::new(product.id, admin.id, delivery).with_note("Supplier delivery"))
                    .await?;
                movements += 1;

                for round in 0..3 {
                    let quantity = 5 + ((seed + round * 7) % 25) as i64;
                    let change = StockChange::new(product.id, admin.id, quantity)
                        .with_note(format!("Dispensed, round {}", round + 1));
                    match inventory.remove_stock(change).await {
                        Ok(_) => movements += 1,
                        Err(e) if e.is_insufficient_stock() => {
                            warn!(product_id = product.id, quantity, "Shelf ran dry");
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }
    }

    let stats = inventory.get_stats().await?;
    info!(
        products = generated,
        movements,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Seed complete"
    );
    info!(
        total_products = stats.total_products,
        total_low_stock = stats.total_low_stock,
        total_out_of_stock = stats.total_out_of_stock,
        total_value = %stats.total_value(),
        "Stats"
    );

    Ok(())
}

/// Generates a single product with realistic data.
fn generate_product(
    category: &str,
    unit: &str,
    name: &str,
    strength: &str,
    multiplier: i64,
    seed: usize,
) -> NewProduct {
    // Base price 1.50 - 9.49, scaled by strength
    let base_price = 150 + ((seed * 37) % 800) as i64;

    NewProduct {
        name: format!("{} {}", name, strength),
        description: Some(format!("{} ({})", name, category.to_lowercase())),
        price_cents: base_price * multiplier / 100,
        // Every fourth product starts empty
        stock: if seed % 4 == 0 { 0 } else { (seed % 30) as i64 },
        low_stock_threshold: 10 + (seed % 3) as i64 * 5,
        category: category.to_string(),
        unit: unit.to_string(),
    }
}
