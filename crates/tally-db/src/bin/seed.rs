//! # Demo Data Generator
//!
//! Fills a database with demo sales and expenses for development.
//!
//! ## Usage
//! ```bash
//! # 50 sales and 30 expenses (default)
//! cargo run -p tally-db --bin seed
//!
//! # Custom amounts and database path
//! cargo run -p tally-db --bin seed -- --db ./sales.db --sales 200 --expenses 80
//! ```
//!
//! ## Generated Data
//! - The default catalog is seeded first (if the catalog is empty)
//! - Sales spread over the last ~6 months, 1-3 lines each
//! - Expenses across a handful of categories over the same period
//!
//! Output is deterministic for a given count: every "random" choice is
//! derived from the row index.

use chrono::{Duration, NaiveDate, Utc};
use std::env;
use tally_core::{ExpenseDraft, LineSelection, Money, SaleHeader};
use tally_db::{Database, DbConfig};

const CUSTOMERS: &[&str] = &[
    "Ann Keller",
    "Ben Ortiz",
    "Chloe Park",
    "Dev Patel",
    "Emma Novak",
    "Femi Adeyemi",
    "Grace Lim",
    "Hugo Brandt",
    "Ines Costa",
    "Jonas Berg",
];

/// (description, category, base amount in cents)
const EXPENSES: &[(&str, &str, i64)] = &[
    ("Cricket feed", "Feed", 3_000),
    ("Fish flakes", "Feed", 1_800),
    ("Coco fiber substrate", "Supplies", 2_500),
    ("Deli cups (100)", "Supplies", 1_500),
    ("Shipping labels", "Shipping", 900),
    ("Courier pickup", "Shipping", 4_500),
    ("Heat mat", "Equipment", 6_000),
    ("Shelving unit", "Equipment", 15_000),
    ("Market stall fee", "Fees", 5_000),
];

/// Days of history the generated rows are spread over.
const SPAN_DAYS: usize = 180;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut sales: usize = 50;
    let mut expenses: usize = 30;
    let mut db_path = String::from("./sales.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(50);
                    i += 1;
                }
            }
            "--expenses" | "-e" => {
                if i + 1 < args.len() {
                    expenses = args[i + 1].parse().unwrap_or(30);
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
                println!("Tally Demo Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -s, --sales <N>      Number of sales to generate (default: 50)");
                println!("  -e, --expenses <N>   Number of expenses to generate (default: 30)");
                println!("  -d, --db <PATH>      Database file path (default: ./sales.db)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally Demo Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Sales:    {}", sales);
    println!("Expenses: {}", expenses);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.reports().dashboard().await?.transactions;
    if existing > 0 {
        println!("⚠ Database already has {} sales", existing);
        println!("  Skipping seed to avoid mixing demo and real data.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let catalog = db.items().list_active().await?;
    if catalog.is_empty() {
        println!("⚠ No active items in the catalog; nothing to sell.");
        return Ok(());
    }
    let item_ids: Vec<i64> = catalog.iter().map(|item| item.id).collect();

    let today = Utc::now().date_naive();
    let start = std::time::Instant::now();

    println!();
    println!("Generating sales...");
    let mut generated_sales = 0;
    for index in 0..sales {
        let header = generate_sale_header(index, today);
        let selections = generate_selections(index, &item_ids);

        if let Err(e) = db.sales().create(&header, &selections).await {
            eprintln!("Failed to insert sale {}: {}", index, e);
            continue;
        }
        generated_sales += 1;

        if generated_sales % 25 == 0 {
            println!("  Generated {} sales...", generated_sales);
        }
    }

    println!("Generating expenses...");
    let mut generated_expenses = 0;
    for index in 0..expenses {
        let draft = generate_expense(index, today);

        if let Err(e) = db.expenses().insert(&draft).await {
            eprintln!("Failed to insert expense {}: {}", index, e);
            continue;
        }
        generated_expenses += 1;
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Generated {} sales and {} expenses in {:?}",
        generated_sales, generated_expenses, elapsed
    );

    let dashboard = db.reports().dashboard().await?;
    println!();
    println!("  Revenue:    {}", dashboard.revenue);
    println!("  Expenses:   {}", dashboard.expenses);
    println!("  Net profit: {}", dashboard.net_profit);

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn days_back(seed: usize, today: NaiveDate) -> NaiveDate {
    today - Duration::days(((seed * 37) % SPAN_DAYS) as i64)
}

fn generate_sale_header(seed: usize, today: NaiveDate) -> SaleHeader {
    let notes = (seed % 7 == 0).then(|| "Market day".to_string());

    SaleHeader {
        customer_name: CUSTOMERS[(seed * 3) % CUSTOMERS.len()].to_string(),
        date: days_back(seed, today),
        notes,
    }
}

/// One to three lines, quantities 1-4.
fn generate_selections(seed: usize, item_ids: &[i64]) -> Vec<LineSelection> {
    let line_count = 1 + seed % 3;

    (0..line_count)
        .map(|line| {
            let item_id = item_ids[(seed + line * 5) % item_ids.len()];
            let quantity = 1 + ((seed * 7 + line) % 4) as i64;
            LineSelection::new(item_id, quantity)
        })
        .collect()
}

fn generate_expense(seed: usize, today: NaiveDate) -> ExpenseDraft {
    let (description, category, base) = EXPENSES[seed % EXPENSES.len()];
    // +0% .. +45% in 5% steps
    let amount = base + base * ((seed * 11) % 10) as i64 * 5 / 100;

    ExpenseDraft {
        description: description.to_string(),
        amount: Money::from_cents(amount),
        category: category.to_string(),
        date: days_back(seed * 3 + 1, today),
        notes: None,
    }
}
