//! # Seed Data Generator
//!
//! Populates a database with the default menu and, optionally, demo orders
//! spread over the current month so the sales report has something to show.
//!
//! ## Usage
//! ```bash
//! # Default menu only
//! cargo run -p bistro-db --bin seed
//!
//! # Default menu plus 40 demo orders this month
//! cargo run -p bistro-db --bin seed -- --orders 40
//!
//! # Specify database path
//! cargo run -p bistro-db --bin seed -- --db ./data/bistro.db
//! ```
//!
//! ## Generated Orders
//! Each demo order has one to three distinct menu items with quantities of
//! one to three, placed between 10:00 and 21:59 UTC on a day of the current
//! month up to today. The choice is deterministic, so two runs against
//! fresh databases produce the same ledger.

use bistro_core::menu::Catalog;
use bistro_db::{Database, DbConfig, Session, SessionOptions};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut orders: usize = 0;
    let mut db_path = String::from("./bistro_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--orders" => {
                if i + 1 < args.len() {
                    orders = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "-d" | "--db" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "-h" | "--help" => {
                println!("Bistro POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Demo orders to record this month (default: 0)");
                println!("  -d, --db <PATH>    Database file path (default: ./bistro_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Bistro POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", orders);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let mut session = Session::open(db.clone(), SessionOptions::default()).await?;
    println!("✓ Menu has {} items", session.menu().len());

    if orders == 0 {
        session.close().await?;
        db.close().await;
        println!();
        println!("✓ Seed complete!");
        return Ok(());
    }

    let existing = session.ledger().count().await?;
    if existing > 0 {
        println!("⚠ Ledger already has {} orders", existing);
        println!("  Skipping demo orders to keep the history real.");
        println!("  Delete the database file to regenerate.");
        session.close().await?;
        db.close().await;
        return Ok(());
    }

    if !session.cart().is_empty() {
        println!("⚠ Cart is not empty, leaving it alone and skipping demo orders.");
        session.close().await?;
        db.close().await;
        return Ok(());
    }

    println!();
    println!("Recording demo orders...");

    let now = Utc::now();
    let item_ids: Vec<String> = session.menu().list().iter().map(|item| item.id.clone()).collect();
    let start = std::time::Instant::now();

    // Ledger order is time order
    let mut stamps: Vec<DateTime<Utc>> = (0..orders).map(|n| demo_timestamp(n, now)).collect();
    stamps.sort();

    for (n, placed_at) in stamps.into_iter().enumerate() {
        for (pick, quantity) in demo_lines(n, item_ids.len()) {
            session.add_item(&item_ids[pick]).await?;
            if quantity > 1 {
                session
                    .change_quantity(&item_ids[pick], i64::from(quantity - 1))
                    .await?;
            }
        }

        let order = session.checkout_at(placed_at).await?;

        if (n + 1) % 10 == 0 {
            println!("  Recorded {} orders (latest {})...", n + 1, order.order_number);
        }
    }

    println!();
    println!("✓ Recorded {} orders in {:?}", orders, start.elapsed());

    session.close().await?;
    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// (menu index, quantity) pairs for demo order `n`, distinct indexes.
fn demo_lines(n: usize, menu_len: usize) -> Vec<(usize, u32)> {
    if menu_len == 0 {
        return Vec::new();
    }

    let count = 1 + (n * 7) % 3;
    let mut lines: Vec<(usize, u32)> = Vec::with_capacity(count);
    for k in 0..count {
        let pick = (n * 31 + k * 17) % menu_len;
        if lines.iter().any(|(existing, _)| *existing == pick) {
            continue;
        }
        lines.push((pick, 1 + ((n + k) % 3) as u32));
    }
    lines
}

/// A timestamp in the current month, never after `now`.
fn demo_timestamp(n: usize, now: DateTime<Utc>) -> DateTime<Utc> {
    let day = 1 + (n as u32 * 13) % now.day();
    let hour = 10 + (n as u32 * 5) % 12;
    let minute = (n as u32 * 11) % 60;

    Utc.with_ymd_and_hms(now.year(), now.month(), day, hour, minute, 0)
        .single()
        .filter(|ts| *ts <= now)
        .unwrap_or(now)
}
