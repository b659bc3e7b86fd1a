//! Dashboard aggregates: finance status, payment-type buckets, category
//! distribution and income by source.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::core::errors::{ControlError, Result};
use crate::core::services::projection_service::{finite_or_zero, percent_of};
use crate::domain::period::local_midnight_utc;
use crate::domain::{
    CategoryShare, CategoryTree, DateRange, FinanceAccumulatedStatus, FinancePeriodStatus,
    FinanceStatus, IncomeSource, PaymentBucket, PaymentType, PaymentTypeSummary, ReportRange,
    Transaction, TransactionType,
};

const UNCATEGORIZED: &str = "Uncategorized";
const UNKNOWN_CATEGORY: &str = "Unknown category";
const UNLABELED_SOURCE: &str = "Unlabeled";

pub struct SummaryService;

impl SummaryService {
    /// Current range and the equally long range right before it.
    pub fn resolve_range(
        range: ReportRange,
        reference: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<(DateRange, DateRange)> {
        let (start, end, previous_start) = match range {
            ReportRange::LastDays { days } => {
                if days == 0 {
                    return Err(ControlError::InvalidInput(
                        "report range must cover at least one day".into(),
                    ));
                }
                let today = reference.with_timezone(tz).date_naive();
                let end = shift_days(today, 1, true)?;
                let start = shift_days(end, days, false)?;
                let previous_start = shift_days(start, days, false)?;
                (start, end, previous_start)
            }
            ReportRange::Month { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                    ControlError::InvalidInput(format!("invalid month {year}-{month:02}"))
                })?;
                let end = first_of_next_month(start)?;
                let previous_start = first_of_previous_month(start)?;
                (start, end, previous_start)
            }
        };
        let current = DateRange {
            start: local_midnight_utc(tz, start),
            end: local_midnight_utc(tz, end),
        };
        let previous = DateRange {
            start: local_midnight_utc(tz, previous_start),
            end: current.start,
        };
        Ok((current, previous))
    }

    pub fn finance_status(
        transactions: &[Transaction],
        range: ReportRange,
        reference: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<FinanceStatus> {
        let (current, previous) = Self::resolve_range(range, reference, tz)?;
        let now = Flows::within(transactions, Some(&current));
        let before = Flows::within(transactions, Some(&previous));
        let all_time = Flows::within(transactions, None);

        Ok(FinanceStatus {
            range: current,
            period: FinancePeriodStatus {
                income: now.income,
                expense: now.expense,
                balance: now.balance(),
                income_change: change_pct(now.income, before.income),
                expense_change: change_pct(now.expense, before.expense),
                balance_change: change_pct(now.balance(), before.balance()),
            },
            accumulated: FinanceAccumulatedStatus {
                total_income: all_time.income,
                total_expense: all_time.expense,
                total_balance: all_time.balance(),
            },
        })
    }

    /// Expense buckets per payment type. The four known types are always present.
    pub fn payment_summary(
        transactions: &[Transaction],
        range: ReportRange,
        reference: DateTime<Utc>,
        tz: &Tz,
    ) -> Result<PaymentTypeSummary> {
        let (current, previous) = Self::resolve_range(range, reference, tz)?;
        let now = expense_by_payment(transactions, &current);
        let before = expense_by_payment(transactions, &previous);
        let total: f64 = now.values().map(|(sum, _)| sum).sum();

        let mut kinds: Vec<PaymentType> = PaymentType::KNOWN.to_vec();
        if now.contains_key(&PaymentType::Other) {
            kinds.push(PaymentType::Other);
        }

        let mut buckets: Vec<PaymentBucket> = kinds
            .into_iter()
            .map(|payment_type| {
                let (sum, count) = now.get(&payment_type).copied().unwrap_or((0.0, 0));
                let previous_sum = before.get(&payment_type).map_or(0.0, |(sum, _)| *sum);
                PaymentBucket {
                    payment_type,
                    total: sum,
                    count,
                    avg: if count > 0 {
                        finite_or_zero(sum / count as f64)
                    } else {
                        0.0
                    },
                    share_pct: percent_of(sum, total),
                    delta_pct: change_pct(sum, previous_sum),
                }
            })
            .collect();
        buckets.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));

        Ok(PaymentTypeSummary {
            range: current,
            total,
            buckets,
        })
    }

    /// Expense totals per category inside `range`, largest first.
    pub fn category_distribution(
        transactions: &[Transaction],
        categories: &CategoryTree,
        range: &DateRange,
    ) -> Vec<CategoryShare> {
        let mut per_category: BTreeMap<Option<&str>, f64> = BTreeMap::new();
        for txn in transactions {
            if !txn.is_expense() {
                continue;
            }
            let (Some(date), Some(value)) = (txn.date, txn.usable_value()) else {
                continue;
            };
            if range.contains(date) {
                let key = txn.category_id.as_deref();
                *per_category.entry(key).or_insert(0.0) += value;
            }
        }
        let total: f64 = per_category.values().sum();

        let mut shares: Vec<CategoryShare> = per_category
            .into_iter()
            .map(|(category_id, sum)| CategoryShare {
                name: match category_id {
                    Some(id) => categories.name_of(id).unwrap_or(UNKNOWN_CATEGORY).into(),
                    None => UNCATEGORIZED.to_string(),
                },
                category_id: category_id.map(str::to_string),
                total: sum,
                share_pct: percent_of(sum, total),
            })
            .collect();
        shares.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
        shares
    }

    /// Income totals grouped by trimmed description inside `range`, largest
    /// first; ties ordered by source name.
    pub fn income_by_source(transactions: &[Transaction], range: &DateRange) -> Vec<IncomeSource> {
        let mut per_source: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for txn in transactions {
            if txn.kind != TransactionType::Income {
                continue;
            }
            let (Some(date), Some(value)) = (txn.date, txn.usable_value()) else {
                continue;
            };
            if !range.contains(date) {
                continue;
            }
            let source = match txn.description.trim() {
                "" => UNLABELED_SOURCE,
                label => label,
            };
            let entry = per_source.entry(source).or_default();
            entry.0 += value;
            entry.1 += 1;
        }
        let total: f64 = per_source.values().map(|(sum, _)| sum).sum();

        let mut sources: Vec<IncomeSource> = per_source
            .into_iter()
            .map(|(source, (sum, count))| IncomeSource {
                source: source.to_string(),
                total: sum,
                count,
                share_pct: percent_of(sum, total),
            })
            .collect();
        sources.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
        sources
    }
}

#[derive(Debug, Default)]
struct Flows {
    income: f64,
    expense: f64,
}

impl Flows {
    /// Sums usable values; `None` covers all dated history.
    fn within(transactions: &[Transaction], range: Option<&DateRange>) -> Self {
        let mut flows = Flows::default();
        for txn in transactions {
            let (Some(date), Some(value)) = (txn.date, txn.usable_value()) else {
                continue;
            };
            if range.map_or(true, |range| range.contains(date)) {
                match txn.kind {
                    TransactionType::Income => flows.income += value,
                    TransactionType::Expense => flows.expense += value,
                }
            }
        }
        flows
    }

    fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

fn expense_by_payment(
    transactions: &[Transaction],
    range: &DateRange,
) -> BTreeMap<PaymentType, (f64, usize)> {
    let mut buckets: BTreeMap<PaymentType, (f64, usize)> = BTreeMap::new();
    for txn in transactions {
        if !txn.is_expense() {
            continue;
        }
        let (Some(date), Some(value)) = (txn.date, txn.usable_value()) else {
            continue;
        };
        if range.contains(date) {
            let entry = buckets.entry(txn.payment_type).or_default();
            entry.0 += value;
            entry.1 += 1;
        }
    }
    buckets
}

/// Percent change from `previous` to `current`; 100 when growing from zero.
pub(crate) fn change_pct(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current == 0.0 {
            0.0
        } else {
            100.0
        }
    } else {
        finite_or_zero((current - previous) / previous.abs() * 100.0)
    }
}

fn shift_days(date: NaiveDate, days: u32, forward: bool) -> Result<NaiveDate> {
    let delta = Days::new(u64::from(days));
    let shifted = if forward {
        date.checked_add_days(delta)
    } else {
        date.checked_sub_days(delta)
    };
    shifted.ok_or_else(|| ControlError::InvalidInput(format!("date {date} out of range")))
}

fn first_of_next_month(date: NaiveDate) -> Result<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ControlError::InvalidInput(format!("date {date} out of range")))
}

fn first_of_previous_month(date: NaiveDate) -> Result<NaiveDate> {
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ControlError::InvalidInput(format!("date {date} out of range")))
}
