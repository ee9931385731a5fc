//! # Seed Data Generator
//!
//! Populates a ledger database with demo stock for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path and outlet count
//! cargo run -p tally-db --bin seed -- --db ./data/tally.db --outlets 3
//! ```
//!
//! ## What It Does
//! All stock enters through the real operation handlers, so the seeded
//! database satisfies the ledger invariants: every level is explained by
//! its movements.
//! - One opening purchase per outlet across the demo catalog
//! - A handful of sales, one of which is voided again
//! - A shrinkage adjustment
//! - Advisory reorder thresholds on a few levels

use std::env;
use tally_core::{AdjustmentItem, LineItem};
use tally_db::{Database, DbConfig};
use uuid::Uuid;

/// Demo catalog: (sku-ish name, opening quantity per outlet)
const CATALOG: &[(&str, i64)] = &[
    ("Espresso Beans 1kg", 40),
    ("Oat Milk 1L", 120),
    ("Paper Cups 12oz (50pk)", 60),
    ("Cold Brew Bottle", 80),
    ("Croissant (frozen, 10pk)", 25),
    ("Cleaning Tablets", 15),
    ("Gift Card Blank", 200),
    ("House Blend 250g", 90),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut outlets: usize = 2;
    let mut db_path = String::from("./tally_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--outlets" | "-o" => {
                if i + 1 < args.len() {
                    outlets = args[i + 1].parse().unwrap_or(2);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --outlets <N>  Number of outlets to seed (default: 2)");
                println!("  -d, --db <PATH>    Database file path (default: ./tally_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Tally POS Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Outlets:  {}", outlets);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected, migrations applied");

    let ops = db.operations();
    let product_ids: Vec<String> = CATALOG.iter().map(|_| Uuid::new_v4().to_string()).collect();

    for outlet_no in 0..outlets {
        let outlet_id = Uuid::new_v4().to_string();

        // Opening stock arrives as one purchase per outlet
        let purchase_id = format!("seed-po-{}", outlet_no + 1);
        let receipt: Vec<LineItem> = CATALOG
            .iter()
            .zip(&product_ids)
            .map(|((_, qty), product_id)| LineItem::new(product_id.clone(), outlet_id.clone(), *qty))
            .collect();
        let movements = ops.receive_purchase(&purchase_id, &receipt).await?;
        println!(
            "✓ Outlet {}: received {} lines ({} movements)",
            outlet_no + 1,
            receipt.len(),
            movements.len()
        );

        // A few sales against the first products
        let sale_a = format!("seed-sale-{}a", outlet_no + 1);
        ops.record_sale(
            &sale_a,
            &[
                LineItem::new(product_ids[0].clone(), outlet_id.clone(), 3),
                LineItem::new(product_ids[1].clone(), outlet_id.clone(), 10),
            ],
        )
        .await?;

        let sale_b = format!("seed-sale-{}b", outlet_no + 1);
        ops.record_sale(
            &sale_b,
            &[LineItem::new(product_ids[3].clone(), outlet_id.clone(), 6)],
        )
        .await?;

        // The second sale turns out to be a mistake and is voided
        ops.revert(tally_core::SourceType::Sale, &sale_b).await?;

        // Stocktake finds two broken bottles
        let adjustment_id = format!("seed-adj-{}", outlet_no + 1);
        ops.adjust_stock(
            &adjustment_id,
            &[AdjustmentItem::new(
                product_ids[3].clone(),
                outlet_id.clone(),
                -2,
            )],
        )
        .await?;

        // Advisory reorder points
        db.levels()
            .set_minimum_threshold(&product_ids[0], &outlet_id, 10)
            .await?;
        db.levels()
            .set_minimum_threshold(&product_ids[5], &outlet_id, 5)
            .await?;

        let levels = db.levels().list_for_outlet(&outlet_id).await?;
        let low = db.levels().below_minimum(&outlet_id).await?;
        println!(
            "  {} levels, {} below reorder threshold",
            levels.len(),
            low.len()
        );

        // Reconciliation sanity: every level equals its movement sum
        for level in &levels {
            let replayed = db
                .movements()
                .reconciled_balance(&level.product_id, &level.outlet_id)
                .await?;
            if replayed != level.quantity_on_hand {
                eprintln!(
                    "✗ reconciliation mismatch for {}: level {} vs movements {}",
                    level.product_id, level.quantity_on_hand, replayed
                );
            }
        }
        println!("  reconciliation holds for all pairs");
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
