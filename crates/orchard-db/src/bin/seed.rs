//! # Seed Data Generator
//!
//! Populates the database with demo data for development: opens the season,
//! registers a demo customer with an address, and loads the mango catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p orchard-db --bin seed
//!
//! # Specify database path
//! cargo run -p orchard-db --bin seed -- --db ./data/orchard.db
//! ```

use std::collections::HashMap;
use std::env;

use orchard_core::{
    Money, NewAddress, ProductInput, Quantity, DEFAULT_SEASON_BANNER, SETTING_SEASON_BANNER,
};
use orchard_db::{Database, DbConfig};

/// Demo catalog: (name, description, list ₹/kg, sale ₹/kg, stock kg, min kg,
/// special, attributes).
#[allow(clippy::type_complexity)]
const VARIETIES: &[(
    &str,
    &str,
    i64,
    Option<i64>,
    i64,
    i64,
    bool,
    &[(&str, &str)],
)] = &[
    (
        "Alphonso",
        "The king of mangoes. Rich, creamy, saffron-hued flesh.",
        500,
        Some(450),
        100,
        3,
        true,
        &[("origin", "Ratnagiri"), ("ripening", "Naturally ripened")],
    ),
    (
        "Banganapalli",
        "Large, fibreless, golden-yellow. The Andhra classic.",
        300,
        None,
        200,
        3,
        false,
        &[("origin", "Banaganapalle"), ("texture", "Fibreless")],
    ),
    (
        "Imam Pasand",
        "Aromatic connoisseur's mango with a honeyed finish.",
        450,
        Some(400),
        80,
        5,
        true,
        &[("origin", "Tamil Nadu"), ("aroma", "Intense")],
    ),
    (
        "Kesar",
        "Saffron-sweet pulp, the favorite for aamras.",
        350,
        None,
        150,
        3,
        false,
        &[("origin", "Gir"), ("best_for", "Aamras")],
    ),
    (
        "Neelam",
        "Late-season variety, tangy-sweet and long-keeping.",
        200,
        Some(180),
        250,
        3,
        false,
        &[("origin", "South India"), ("season", "Late")],
    ),
    (
        "Malgova",
        "Huge round fruit, juicy and mildly sweet.",
        280,
        None,
        120,
        5,
        false,
        &[("origin", "Salem"), ("size", "Large")],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./orchard_dev.db");

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
                println!("Orchard Store Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./orchard_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🥭 Orchard Store Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().list_all().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Settings: open the season and set the banner
    db.settings().set_season_active(true).await?;
    db.settings()
        .set(SETTING_SEASON_BANNER, DEFAULT_SEASON_BANNER)
        .await?;
    println!("✓ Season opened");

    // Demo customer with a default address
    let customer = db
        .customers()
        .create("Asha Kumar", "asha@example.com", "+91 98400 12345")
        .await?;

    db.addresses()
        .add(
            &customer.id,
            &NewAddress {
                full_name: "Asha Kumar".to_string(),
                phone: "+91 98400 12345".to_string(),
                address_line: "12 Beach Road, Besant Nagar".to_string(),
                city: "Chennai".to_string(),
                state: "Tamil Nadu".to_string(),
                pincode: "600090".to_string(),
                is_default: true,
            },
        )
        .await?;
    println!("✓ Demo customer created ({})", customer.email);

    // Catalog
    println!();
    println!("Loading catalog...");

    for (name, description, list, sale, stock_kg, min_kg, special, attrs) in VARIETIES {
        let input = ProductInput {
            name: name.to_string(),
            description: Some(description.to_string()),
            list_price: Money::from_rupees(*list),
            sale_price: sale.map(Money::from_rupees),
            stock: Quantity::from_kg(*stock_kg),
            min_order: Quantity::from_kg(*min_kg),
            special: *special,
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        };

        let product = db.products().create(&input).await?;
        println!(
            "  {} — ₹{}/kg, {} kg in stock",
            product.name,
            product.effective_price(),
            product.stock
        );
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
