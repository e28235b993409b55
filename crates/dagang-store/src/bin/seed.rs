//! # Seed Data Generator
//!
//! Populates the store with demo catalog data and default settings for
//! development.
//!
//! ## Usage
//! ```bash
//! cargo run -p dagang-store --bin seed
//! cargo run -p dagang-store --bin seed -- --db ./data/dagang.db
//! ```

use std::env;

use dagang_core::money::Money;
use dagang_core::types::{Product, Settings, SINGLETON_ID};
use dagang_store::{Store, StoreConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Demo catalog: (name, category, cost, selling, stock).
const CATALOG: &[(&str, &str, i64, i64, i64)] = &[
    ("Kopi Bubuk 200g", "Minuman", 9000, 15000, 40),
    ("Teh Celup Isi 25", "Minuman", 4500, 7000, 60),
    ("Gula Pasir 1kg", "Sembako", 12500, 15500, 80),
    ("Beras Premium 5kg", "Sembako", 62000, 72000, 25),
    ("Minyak Goreng 2L", "Sembako", 30000, 36000, 35),
    ("Kecap Manis 520ml", "Bumbu", 16000, 21000, 30),
    ("Sambal Botol 335ml", "Bumbu", 11000, 15000, 30),
    ("Mie Instan Goreng", "Makanan", 2500, 3500, 200),
    ("Susu UHT 1L", "Minuman", 14500, 18500, 45),
    ("Sabun Mandi Batang", "Non-Pangan", 3000, 4500, 90),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./dagang_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dagang Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./dagang_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let store = Store::open(StoreConfig::new(&db_path)).await?;
    info!(db = %db_path, "Connected to store");

    let existing = store.products().count().await?;
    if existing > 0 {
        info!(existing, "Store already seeded, skipping");
        return Ok(());
    }

    for &(name, category, cost, selling, stock) in CATALOG {
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            cost_price: Money::from_units(cost),
            selling_price: Money::from_units(selling),
            stock,
            category: category.to_string(),
            subcategory: None,
        };
        store.products().put(&product.id, &product).await?;
    }

    let settings = Settings {
        store_name: "Toko Dagang".to_string(),
        default_discount_bps: 250,
        ..Settings::default()
    };
    store.settings().put(SINGLETON_ID, &settings).await?;

    info!(products = CATALOG.len(), "Seed complete");
    Ok(())
}
