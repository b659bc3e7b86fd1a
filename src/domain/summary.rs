//! Dashboard aggregates over a reporting range.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::transaction::PaymentType;

/// Which slice of history a dashboard aggregate covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ReportRange {
    /// The last `days` calendar days, ending on the reference date.
    LastDays { days: u32 },
    Month { year: i32, month: u32 },
}

/// Half-open instant range `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancePeriodStatus {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
    pub income_change: f64,
    pub expense_change: f64,
    pub balance_change: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinanceAccumulatedStatus {
    pub total_income: f64,
    pub total_expense: f64,
    pub total_balance: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FinanceStatus {
    pub range: DateRange,
    pub period: FinancePeriodStatus,
    pub accumulated: FinanceAccumulatedStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBucket {
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub total: f64,
    pub count: usize,
    pub avg: f64,
    pub share_pct: f64,
    pub delta_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentTypeSummary {
    pub range: DateRange,
    pub total: f64,
    pub buckets: Vec<PaymentBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category_id: Option<String>,
    pub name: String,
    pub total: f64,
    pub share_pct: f64,
}

/// Income received from one source, keyed by the transaction description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSource {
    pub source: String,
    pub total: f64,
    pub count: usize,
    pub share_pct: f64,
}

/// One point of the per-day spend chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DailySpend {
    pub date: NaiveDate,
    pub value: f64,
    pub cumulative: f64,
}
