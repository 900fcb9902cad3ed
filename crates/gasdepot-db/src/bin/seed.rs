//! # Demo Store Seeder
//!
//! Populates a database with one demo store for development: cylinder and
//! accessory inventory, a few customers and shops, staff with accrued
//! salary, and a handful of recorded transactions.
//!
//! ## Usage
//! ```bash
//! # Seed ./gasdepot_dev.db as store "demo-store"
//! cargo run -p gasdepot-db --bin seed
//!
//! # Specify database path and store
//! cargo run -p gasdepot-db --bin seed -- --db ./data/gasdepot.db --store store-7
//! ```

use std::env;

use gasdepot_core::{
    CounterpartyKind, ItemKind, LineItemInput, Money, PaymentMethod, TransactionFilter,
    TransactionRequest, TransactionType,
};
use gasdepot_db::{
    Database, DbConfig, NewCounterparty, NewInventoryItem, NewStaff, RecorderConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (item_ref, variant, name, full, empty)
const CYLINDERS: &[(&str, &str, &str, i64, i64)] = &[
    ("LPG-12KG", "", "LPG 12kg", 40, 12),
    ("LPG-12KG", "TOTAL", "LPG 12kg (Total)", 25, 6),
    ("LPG-35KG", "", "LPG 35kg", 10, 4),
    ("LPG-45KG", "", "LPG 45kg Industrial", 6, 2),
];

/// (item_ref, name, stock)
const ACCESSORIES: &[(&str, &str, i64)] = &[
    ("REGULATOR", "Low Pressure Regulator", 30),
    ("HOSE-1M", "Gas Hose 1m", 50),
    ("BURNER-2", "Two Burner Stove", 8),
];

/// (id, kind, name, phone)
const COUNTERPARTIES: &[(&str, CounterpartyKind, &str, &str)] = &[
    ("C-001", CounterpartyKind::Customer, "Ayesha Khan", "0300-1111111"),
    ("C-002", CounterpartyKind::Customer, "Bilal Ahmed", "0301-2222222"),
    ("C-003", CounterpartyKind::Customer, "Hina Raza", "0302-3333333"),
    ("SH-001", CounterpartyKind::Shop, "Corner Gas Shop", "0321-4444444"),
    ("SH-002", CounterpartyKind::Shop, "Model Town Traders", "0322-5555555"),
];

/// (id, name, monthly salary in minor units)
const STAFF: &[(&str, &str, i64)] = &[
    ("ST-001", "Kamran", 35_000),
    ("ST-002", "Usman", 28_000),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./gasdepot_dev.db");
    let mut store_id = String::from("demo-store");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--store" | "-s" => {
                if i + 1 < args.len() {
                    store_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("GasDepot Demo Store Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./gasdepot_dev.db)");
                println!("  -s, --store <ID>     Store id to seed (default: demo-store)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, store = %store_id, "Seeding demo store");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.inventory().list_for_store(&store_id).await?;
    if !existing.is_empty() {
        warn!(
            rows = existing.len(),
            "Store already has inventory, skipping seed. Delete the database file to regenerate."
        );
        return Ok(());
    }

    for (item_ref, variant, name, full, empty) in CYLINDERS {
        db.inventory()
            .create(&NewInventoryItem::cylinder(&store_id, item_ref, variant, *full, *empty).named(name))
            .await?;
    }
    for (item_ref, name, stock) in ACCESSORIES {
        db.inventory()
            .create(&NewInventoryItem::accessory(&store_id, item_ref, *stock).named(name))
            .await?;
    }
    info!(cylinders = CYLINDERS.len(), accessories = ACCESSORIES.len(), "Inventory created");

    for (id, kind, name, phone) in COUNTERPARTIES {
        db.counterparties()
            .create(&NewCounterparty::new(*kind, &store_id, name).with_id(id).with_phone(phone))
            .await?;
    }
    for (id, name, salary) in STAFF {
        let salary = Money::from_minor(*salary);
        db.staff()
            .create(&NewStaff::new(&store_id, name, salary).with_id(id).with_salary_due(salary))
            .await?;
    }
    info!(counterparties = COUNTERPARTIES.len(), staff = STAFF.len(), "Directory created");

    let recorder = db.recorder(RecorderConfig::default());
    for request in demo_requests() {
        let record = recorder.create(&store_id, Some("ST-001"), request).await?;
        info!(id = %record.id, kind = %record.transaction_type, "Demo transaction recorded");
    }

    let summary = db
        .transactions()
        .summary(&store_id, &TransactionFilter::default())
        .await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let inventory = db.inventory().list_for_store(&store_id).await?;
    println!("{}", serde_json::to_string_pretty(&inventory)?);

    info!("Seed complete");
    Ok(())
}

fn goods(item_ref: &str, kind: ItemKind, quantity: i64, unit_price: i64) -> LineItemInput {
    LineItemInput {
        item_ref: Some(item_ref.to_string()),
        kind,
        quantity,
        unit_price: Money::from_minor(unit_price),
        is_return: false,
        variant: None,
        name: None,
        staff_id: None,
    }
}

fn demo_requests() -> Vec<TransactionRequest> {
    let base = |transaction_type, items| TransactionRequest {
        items,
        transaction_type,
        payment_method: PaymentMethod::Cash,
        final_amount: None,
        paid_amount: None,
        customer_id: None,
        customer_type: None,
        notes: None,
    };

    // Walk-in refill: two full out, two empties back
    let mut returned = goods("LPG-12KG", ItemKind::Cylinder, 2, 0);
    returned.is_return = true;
    let mut refill = base(
        TransactionType::Sale,
        vec![goods("LPG-12KG", ItemKind::Cylinder, 2, 3_200), returned],
    );
    refill.paid_amount = Some(Money::from_minor(6_400));

    // Credit sale to a customer
    let mut credit = base(
        TransactionType::Sale,
        vec![
            goods("LPG-35KG", ItemKind::Cylinder, 1, 9_500),
            goods("REGULATOR", ItemKind::Accessory, 1, 1_200),
        ],
    );
    credit.payment_method = PaymentMethod::Due;
    credit.paid_amount = Some(Money::from_minor(4_000));
    credit.customer_id = Some("C-001".to_string());
    credit.notes = Some("Balance next week".to_string());

    // Wholesale on credit to a shop
    let mut wholesale = base(
        TransactionType::Sale,
        vec![goods("LPG-12KG", ItemKind::Cylinder, 10, 3_000)],
    );
    wholesale.payment_method = PaymentMethod::Due;
    wholesale.final_amount = Some(Money::from_minor(29_000));
    wholesale.paid_amount = Some(Money::zero());
    wholesale.customer_id = Some("SH-001".to_string());
    wholesale.customer_type = Some(CounterpartyKind::Shop);

    // Partial settlement of the customer's due
    let mut settlement = base(TransactionType::DuePayment, vec![]);
    settlement.paid_amount = Some(Money::from_minor(3_000));
    settlement.customer_id = Some("C-001".to_string());

    // Empties collected back from the shop
    let mut empties = base(
        TransactionType::Return,
        vec![goods("LPG-12KG", ItemKind::Cylinder, 8, 0)],
    );
    empties.customer_id = Some("SH-001".to_string());
    empties.customer_type = Some(CounterpartyKind::Shop);

    // Salary advance
    let mut advance = base(
        TransactionType::Expense,
        vec![LineItemInput {
            item_ref: None,
            kind: ItemKind::SalaryPayout,
            quantity: 1,
            unit_price: Money::from_minor(10_000),
            is_return: false,
            variant: None,
            name: Some("Salary advance".to_string()),
            staff_id: Some("ST-002".to_string()),
        }],
    );
    advance.paid_amount = Some(Money::from_minor(10_000));

    vec![refill, credit, wholesale, settlement, empties, advance]
}
