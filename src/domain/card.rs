//! Credit cards and their statement-cycle summaries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::{Identifiable, NamedEntity};
use crate::domain::progress::{CategorySpend, Projection};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: CardBrand,
    #[serde(default)]
    pub last4: Option<String>,
    pub limit: f64,
    pub closing_day: u32,
    pub due_day: u32,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreditCard {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        limit: f64,
        closing_day: u32,
        due_day: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: CardBrand::default(),
            last4: None,
            limit,
            closing_day,
            due_day,
            timezone: None,
            is_active: true,
        }
    }
}

impl Identifiable for CreditCard {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for CreditCard {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Elo,
    Amex,
    Hipercard,
    #[default]
    #[serde(other)]
    Other,
}

/// Statement cycle `(previous closing, closing]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CardCycle {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub closing_date: NaiveDate,
    pub due_date: NaiveDate,
    pub days_in_cycle: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardMetrics {
    pub spent: f64,
    pub remaining: f64,
    pub util_pct: f64,
    pub daily_avg: f64,
    pub projected: f64,
    pub over_limit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub card_id: String,
    pub name: String,
    pub limit: f64,
    pub cycle: CardCycle,
    pub metrics: CardMetrics,
    pub projection: Projection,
    pub top_categories: Vec<CategorySpend>,
}
