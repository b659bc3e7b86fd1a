use chrono::NaiveDate;

use super::at;
use crate::core::services::{CategoryMatcher, CategoryScope, SpendService};
use crate::domain::{
    CalendarCycle, Category, CategoryKind, CategoryTree, PeriodWindow, SpendingControl, Transaction,
};

fn march_window() -> PeriodWindow {
    let cycle = CalendarCycle {
        start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        next_start: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
    };
    PeriodWindow::from_cycle(cycle, &chrono_tz::UTC)
}

fn malformed(raw: &str) -> Transaction {
    serde_json::from_str(raw).unwrap()
}

#[test]
fn sums_only_in_scope_expenses_inside_the_window() {
    let transactions = vec![
        Transaction::expense("food", 10.0, at(2025, 3, 1, 0)),
        Transaction::expense("food", 20.0, at(2025, 3, 31, 23)),
        Transaction::expense("food", 40.0, at(2025, 4, 1, 0)),
        Transaction::expense("fuel", 80.0, at(2025, 3, 15, 0)),
        Transaction::income("food", 160.0, at(2025, 3, 15, 0)),
    ];
    let scope = CategoryMatcher::Only(["food".to_string()].into());
    let totals = SpendService::accumulate(&transactions, &march_window(), &scope);
    assert_eq!(totals.spent, 30.0);
    assert_eq!(totals.matched, 2);
    assert_eq!(totals.skipped, 0);
}

#[test]
fn malformed_records_are_skipped_and_counted() {
    let transactions = vec![
        Transaction::expense("food", 25.0, at(2025, 3, 5, 0)),
        malformed(r#"{"id":"t1","categoryId":"food","value":99,"date":"soon","type":"EXPENSE"}"#),
        malformed(r#"{"id":"t2","categoryId":"food","value":99,"type":"EXPENSE"}"#),
        Transaction::expense("food", -5.0, at(2025, 3, 6, 0)),
        Transaction::expense("food", f64::NAN, at(2025, 3, 7, 0)),
        malformed(r#"{"id":"t3","categoryId":"fuel","value":99,"date":null,"type":"EXPENSE"}"#),
    ];
    let scope = CategoryMatcher::Only(["food".to_string()].into());
    let totals = SpendService::accumulate(&transactions, &march_window(), &scope);
    assert_eq!(totals.spent, 25.0);
    assert_eq!(totals.skipped, 4);
}

#[test]
fn breakdown_is_sorted_by_total() {
    let transactions = vec![
        Transaction::expense("food", 10.0, at(2025, 3, 2, 0)),
        Transaction::expense("fuel", 30.0, at(2025, 3, 3, 0)),
        Transaction::expense("food", 5.0, at(2025, 3, 4, 0)),
    ];
    let totals = SpendService::accumulate(&transactions, &march_window(), &CategoryMatcher::All);
    assert_eq!(totals.breakdown.len(), 2);
    assert_eq!(totals.breakdown[0].category_id.as_deref(), Some("fuel"));
    assert_eq!(totals.breakdown[1].total, 15.0);
    assert_eq!(totals.breakdown[1].count, 2);
}

#[test]
fn closures_work_as_scopes() {
    let only_uncategorized = |category: Option<&str>| category.is_none();
    assert!(only_uncategorized.includes(None));

    let mut loose = Transaction::expense("x", 7.0, at(2025, 3, 9, 0));
    loose.category_id = None;
    let transactions = vec![loose, Transaction::expense("food", 3.0, at(2025, 3, 9, 0))];
    let totals = SpendService::accumulate(&transactions, &march_window(), &only_uncategorized);
    assert_eq!(totals.spent, 7.0);
}

#[test]
fn matcher_resolves_subcategories_only_when_asked() {
    let tree = CategoryTree::new(&[
        Category::new("home", "Home", CategoryKind::Expense),
        Category::new("rent", "Rent", CategoryKind::Expense).with_parent("home"),
        Category::new("power", "Power", CategoryKind::Expense).with_parent("home"),
    ]);
    let mut control = SpendingControl::for_category("home", 100.0);
    let exact = CategoryMatcher::for_control(&control, Some(&tree));
    assert!(exact.includes(Some("home")));
    assert!(!exact.includes(Some("rent")));

    control.include_subcategories = true;
    let rolled = CategoryMatcher::for_control(&control, Some(&tree));
    assert!(rolled.includes(Some("rent")));
    assert!(rolled.includes(Some("power")));
    assert!(!rolled.includes(None));

    let general = CategoryMatcher::for_control(&SpendingControl::general(1.0), Some(&tree));
    assert_eq!(general, CategoryMatcher::All);
}

#[test]
fn daily_series_accumulates_per_local_day() {
    let transactions = vec![
        Transaction::expense("food", 10.0, at(2025, 3, 2, 9)),
        Transaction::expense("food", 5.0, at(2025, 3, 2, 20)),
        Transaction::expense("food", 20.0, at(2025, 3, 4, 9)),
    ];
    let series = SpendService::daily_series(
        &transactions,
        &march_window(),
        &CategoryMatcher::All,
        &chrono_tz::UTC,
    );
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2025, 3, 2).unwrap());
    assert_eq!(series[0].value, 15.0);
    assert_eq!(series[1].cumulative, 35.0);
}
