//! # Seed Data Generator
//!
//! Stocks a shop with kirana products for development and demos.
//!
//! ## Usage
//! ```bash
//! # Seed the configured shop with every catalogue item (default)
//! cargo run -p kirana-db --bin seed
//!
//! # Limit the number of products
//! cargo run -p kirana-db --bin seed -- --count 50
//!
//! # Use a config file, override database path or shop
//! cargo run -p kirana-db --bin seed -- --config kirana.toml --db ./data/kirana.db --shop shop-a1b2
//! ```
//!
//! ## Generated Products
//! - Staples (atta, rice, dal, oil) at 5% GST
//! - Packaged foods (biscuits, noodles, snacks) at 12% or 18% GST
//! - Personal care and household at 18% GST
//! - Loose items sold by weight, with fractional opening stock
//!
//! Each product has:
//! - SKU: `{CATEGORY}-{INDEX:03}`
//! - Opening stock, written to the ledger as an `OPENING` adjustment
//! - Reorder level of 5 units

use std::env;
use std::path::PathBuf;

use kirana_core::{Money, NewProduct, Quantity, QuantityType, TaxRate};
use kirana_db::{init_tracing, Database, PosConfig};
use tracing::{info, warn};

/// Catalogue: (category code, GST basis points, [(name, price in paise, unit)])
const CATALOGUE: &[(&str, u32, &[(&str, i64, QuantityType)])] = &[
    (
        "STP",
        500,
        &[
            ("Aashirvaad Atta 5kg", 26_500, QuantityType::Pack),
            ("India Gate Basmati 1kg", 14_500, QuantityType::Pack),
            ("Toor Dal 1kg", 15_000, QuantityType::Pack),
            ("Fortune Sunflower Oil 1L", 16_000, QuantityType::Litre),
            ("Tata Salt 1kg", 2_800, QuantityType::Pack),
            ("Loose Sugar", 4_400, QuantityType::Kg),
            ("Loose Rice (Sona Masoori)", 5_600, QuantityType::Kg),
            ("Tata Tea Gold 250g", 14_500, QuantityType::Pack),
        ],
    ),
    (
        "PKG",
        1200,
        &[
            ("Amul Butter 100g", 5_600, QuantityType::Piece),
            ("Amul Ghee 500ml", 32_000, QuantityType::Piece),
            ("Haldiram Bhujia 200g", 5_500, QuantityType::Pack),
            ("Kissan Jam 500g", 17_000, QuantityType::Piece),
        ],
    ),
    (
        "SNK",
        1800,
        &[
            ("Parle-G 250g", 2_500, QuantityType::Pack),
            ("Britannia Good Day 100g", 3_000, QuantityType::Pack),
            ("Maggi Noodles 70g", 1_400, QuantityType::Pack),
            ("Lays Magic Masala 52g", 2_000, QuantityType::Pack),
            ("Cadbury Dairy Milk 50g", 4_000, QuantityType::Piece),
            ("Kurkure Masala Munch", 2_000, QuantityType::Pack),
        ],
    ),
    (
        "HPC",
        1800,
        &[
            ("Colgate Strong Teeth 100g", 5_500, QuantityType::Piece),
            ("Lux Soap 100g", 4_500, QuantityType::Piece),
            ("Surf Excel 1kg", 14_000, QuantityType::Pack),
            ("Vim Bar 200g", 2_000, QuantityType::Piece),
            ("Dettol Handwash 200ml", 9_900, QuantityType::Piece),
            ("Good Knight Refill", 8_500, QuantityType::Piece),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = usize::MAX;
    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut shop_id: Option<String> = None;

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
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--shop" | "-s" => {
                if i + 1 < args.len() {
                    shop_id = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Kirana POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>      Maximum number of products (default: whole catalogue)");
                println!("  -d, --db <PATH>      Database file path (default: from config)");
                println!("      --config <PATH>  Config file (default: ./kirana.toml if present)");
                println!("  -s, --shop <ID>      Shop to seed (default: from config)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let config_path = config_path.unwrap_or_else(|| PathBuf::from("kirana.toml"));
    let mut config = PosConfig::load(Some(config_path.as_path()))?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    if let Some(id) = shop_id {
        config.shop.id = id;
    }
    let shop = config.shop_id().to_string();

    info!(
        database = %config.database.path.display(),
        shop_id = %shop,
        "Seeding shop"
    );

    let db = Database::from_config(&config).await?;

    let existing = db.products().count(&shop).await?;
    if existing > 0 {
        warn!(existing, "Shop already has products, skipping seed");
        println!("Shop {} already has {} products.", shop, existing);
        println!("Delete the database file to regenerate.");
        return Ok(());
    }

    let start = std::time::Instant::now();
    let mut generated = 0usize;

    'catalogue: for (category, rate_bps, items) in CATALOGUE {
        for (idx, (name, price, unit)) in items.iter().enumerate() {
            if generated >= count {
                break 'catalogue;
            }

            let product = catalogue_product(&shop, category, *rate_bps, idx, name, *price, *unit);

            match db.products().insert(&product).await {
                Ok(created) => {
                    generated += 1;
                    info!(
                        sku = created.sku.as_deref().unwrap_or(""),
                        stock = %created.current_stock,
                        "Seeded product"
                    );
                }
                Err(e) => eprintln!("Failed to insert {}: {}", name, e),
            }
        }
    }

    println!(
        "Seeded {} products for shop {} in {:?}",
        generated,
        shop,
        start.elapsed()
    );

    Ok(())
}

/// Builds one catalogue product with deterministic opening stock.
fn catalogue_product(
    shop_id: &str,
    category: &str,
    rate_bps: u32,
    idx: usize,
    name: &str,
    price_paise: i64,
    unit: QuantityType,
) -> NewProduct {
    let seed = category.bytes().map(i64::from).sum::<i64>() + idx as i64 * 7;

    // Loose goods get fractional stock (e.g. 23.500 kg)
    let opening_stock = match unit {
        QuantityType::Kg | QuantityType::Litre => Quantity::from_milli((10 + seed % 40) * 1000 + 500),
        _ => Quantity::from_units(seed % 60),
    };

    NewProduct {
        shop_id: shop_id.to_string(),
        name: name.to_string(),
        sku: Some(format!("{}-{:03}", category, idx + 1)),
        barcode: Some(format!("890{:010}", seed * 1000 + idx as i64)),
        quantity_type: unit,
        cost_price: Money::from_paise(price_paise * 80 / 100),
        selling_price: Money::from_paise(price_paise),
        tax_rate: Some(TaxRate::from_bps(rate_bps)),
        opening_stock,
        reorder_level: Quantity::from_units(5),
    }
}
