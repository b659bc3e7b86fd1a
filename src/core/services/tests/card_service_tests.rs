use chrono::NaiveDate;

use super::at;
use crate::core::errors::ControlError;
use crate::core::services::CardService;
use crate::domain::{CreditCard, PaymentType, Transaction};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_card() -> CreditCard {
    CreditCard::new("nubank", "Nubank", 2000.0, 10, 17)
}

#[test]
fn cycle_runs_from_day_after_closing_to_next_closing() {
    let (cycle, closing) =
        CardService::cycle_containing(&sample_card(), date(2025, 3, 12)).unwrap();
    assert_eq!(cycle.start, date(2025, 3, 11));
    assert_eq!(cycle.next_start, date(2025, 4, 11));
    assert_eq!(closing, date(2025, 4, 10));
    assert_eq!(CardService::due_date(&sample_card(), closing).unwrap(), date(2025, 4, 17));

    let (on_closing, closing) =
        CardService::cycle_containing(&sample_card(), date(2025, 3, 10)).unwrap();
    assert_eq!(on_closing.start, date(2025, 2, 11));
    assert_eq!(closing, date(2025, 3, 10));
}

#[test]
fn closing_day_is_clamped_and_due_rolls_to_next_month() {
    let card = CreditCard::new("c", "Late closer", 1000.0, 31, 5);
    let (cycle, closing) = CardService::cycle_containing(&card, date(2025, 2, 15)).unwrap();
    assert_eq!(closing, date(2025, 2, 28));
    assert_eq!(cycle.start, date(2025, 2, 1));
    assert_eq!(CardService::due_date(&card, closing).unwrap(), date(2025, 3, 5));
}

#[test]
fn invalid_card_days_are_rejected() {
    let card = CreditCard::new("c", "Broken", 1000.0, 0, 5);
    let err = CardService::cycle_containing(&card, date(2025, 2, 15)).unwrap_err();
    assert!(matches!(err, ControlError::InvalidInput(_)));
}

#[test]
fn summary_counts_only_this_cards_credit_purchases() {
    let transactions = vec![
        Transaction::expense("food", 300.0, at(2025, 3, 11, 0)).with_card("nubank"),
        Transaction::expense("fuel", 200.0, at(2025, 3, 15, 0)).with_card("nubank"),
        Transaction::expense("fuel", 900.0, at(2025, 3, 15, 0)).with_card("other"),
        Transaction::expense("fuel", 900.0, at(2025, 3, 15, 0)).with_payment(PaymentType::Pix),
        Transaction::expense("food", 900.0, at(2025, 3, 10, 12)).with_card("nubank"),
    ];
    let summary =
        CardService::summarize(&sample_card(), &transactions, at(2025, 3, 20, 12)).unwrap();

    assert_eq!(summary.metrics.spent, 500.0);
    assert_eq!(summary.metrics.remaining, 1500.0);
    assert_eq!(summary.metrics.util_pct, 25.0);
    assert!(!summary.metrics.over_limit);
    assert_eq!(summary.cycle.days_in_cycle, 31);
    assert_eq!(summary.cycle.due_date, date(2025, 4, 17));
    assert_eq!(summary.projection.elapsed_days, 10);
    assert_eq!(summary.top_categories[0].category_id.as_deref(), Some("food"));
}

#[test]
fn unknown_card_id_is_reported() {
    let err = CardService::summarize_by_id(&[sample_card()], "missing", &[], at(2025, 3, 20, 0))
        .unwrap_err();
    assert!(matches!(err, ControlError::CardNotFound(id) if id == "missing"));
}
