#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use spend_control::domain::{CategoryKind, PaymentType};
use spend_control::storage::save_snapshot;
use spend_control::{Category, CreditCard, Snapshot, SpendingControl, Transaction};

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

/// Instant every fixture expectation is computed against.
pub fn reference() -> DateTime<Utc> {
    at(2025, 3, 20, 12)
}

fn with_id(mut control: SpendingControl, id: &str) -> SpendingControl {
    control.id = id.to_string();
    control
}

/// Household data for March 2025 with a February baseline.
///
/// | control      | scope             | goal | limit | March spend |
/// |--------------|-------------------|------|-------|-------------|
/// | ctl-food     | food + market     | 1000 | 1200  | 1100        |
/// | ctl-fuel     | fuel              | 300  | -     | 100         |
/// | ctl-all      | every expense     | 5000 | -     | 1200        |
/// | ctl-archived | inactive          | 10   | -     | -           |
pub fn sample_snapshot() -> Snapshot {
    let mut food = SpendingControl::for_category("food", 1000.0)
        .with_limit(1200.0)
        .with_notifications(vec![50.0, 80.0, 100.0], Vec::new());
    food.include_subcategories = true;

    let mut archived = SpendingControl::general(10.0);
    archived.is_active = false;

    let mut transactions = vec![
        Transaction::expense("food", 400.0, at(2025, 2, 12, 10)).with_payment(PaymentType::Pix),
        Transaction::expense("fuel", 250.0, at(2025, 2, 20, 10))
            .with_payment(PaymentType::DebitCard),
        Transaction::income("salary", 4000.0, at(2025, 3, 5, 9)).with_description("Acme payroll"),
        Transaction::expense("food", 500.0, at(2025, 3, 3, 19)).with_payment(PaymentType::Pix),
        Transaction::expense("market", 600.0, at(2025, 3, 14, 18)).with_card("nubank"),
        Transaction::expense("fuel", 100.0, at(2025, 3, 18, 8))
            .with_payment(PaymentType::DebitCard),
    ];
    for (idx, txn) in transactions.iter_mut().enumerate() {
        txn.id = format!("txn-{idx}");
    }

    Snapshot {
        controls: vec![
            with_id(food, "ctl-food"),
            with_id(SpendingControl::for_category("fuel", 300.0), "ctl-fuel"),
            with_id(SpendingControl::general(5000.0), "ctl-all"),
            with_id(archived, "ctl-archived"),
        ],
        transactions,
        categories: vec![
            Category::new("food", "Food", CategoryKind::Expense),
            Category::new("market", "Market", CategoryKind::Expense).with_parent("food"),
            Category::new("fuel", "Fuel", CategoryKind::Expense),
            Category::new("salary", "Salary", CategoryKind::Income),
        ],
        cards: vec![CreditCard::new("nubank", "Nubank", 3000.0, 10, 17)],
    }
}

pub fn write_snapshot(dir: &Path) -> PathBuf {
    let path = dir.join("snapshot.json");
    save_snapshot(&sample_snapshot(), &path).unwrap();
    path
}
