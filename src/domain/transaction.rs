//! Income and expense records as delivered by the transactions API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{lenient_amount, lenient_timestamp, missing_amount, Identifiable};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    /// `NaN` when the source record had no usable amount.
    #[serde(default = "missing_amount", deserialize_with = "lenient_amount")]
    pub value: f64,
    /// `None` when the source record had no date or an unparseable one.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub origin: TransactionOrigin,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
}

impl Transaction {
    pub fn new(
        category_id: Option<String>,
        value: f64,
        date: DateTime<Utc>,
        kind: TransactionType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category_id,
            value,
            date: Some(date),
            kind,
            payment_type: PaymentType::default(),
            origin: TransactionOrigin::default(),
            description: String::new(),
            card_id: None,
        }
    }

    pub fn expense(category_id: impl Into<String>, value: f64, date: DateTime<Utc>) -> Self {
        Self::new(Some(category_id.into()), value, date, TransactionType::Expense)
    }

    pub fn income(category_id: impl Into<String>, value: f64, date: DateTime<Utc>) -> Self {
        Self::new(Some(category_id.into()), value, date, TransactionType::Income)
    }

    pub fn with_payment(mut self, payment_type: PaymentType) -> Self {
        self.payment_type = payment_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_card(mut self, card_id: impl Into<String>) -> Self {
        self.payment_type = PaymentType::CreditCard;
        self.card_id = Some(card_id.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Finite, non-negative value; anything else is excluded from sums.
    pub fn usable_value(&self) -> Option<f64> {
        (self.value.is_finite() && self.value >= 0.0).then_some(self.value)
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Expense,
    Income,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    DebitCard,
    CreditCard,
    Pix,
    #[default]
    #[serde(alias = "CASH")]
    Money,
    #[serde(other)]
    Other,
}

impl PaymentType {
    pub const KNOWN: [PaymentType; 4] = [
        PaymentType::DebitCard,
        PaymentType::CreditCard,
        PaymentType::Pix,
        PaymentType::Money,
    ];
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentType::DebitCard => "Debit card",
            PaymentType::CreditCard => "Credit card",
            PaymentType::Pix => "Pix",
            PaymentType::Money => "Money",
            PaymentType::Other => "Other",
        };
        f.write_str(label)
    }
}

/// Channel a transaction was recorded from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionOrigin {
    #[default]
    Dashboard,
    Whatsapp,
    Text,
    Image,
    Audio,
    Chatbot,
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_date_deserializes_to_none() {
        let raw = r#"[
            {"id":"a","categoryId":"food","value":10,"date":"2025-01-02T10:00:00Z",
             "type":"EXPENSE","paymentType":"PIX"},
            {"id":"b","categoryId":"food","value":5,"date":"not a date","type":"EXPENSE"},
            {"id":"c","categoryId":"food","value":5,"type":"INCOME",
             "paymentType":"CASH","origin":"SMOKE_SIGNAL"}
        ]"#;
        let parsed: Vec<Transaction> = serde_json::from_str(raw).unwrap();
        assert!(parsed[0].date.is_some());
        assert_eq!(parsed[0].payment_type, PaymentType::Pix);
        assert_eq!(parsed[1].date, None);
        assert_eq!(parsed[2].date, None);
        assert_eq!(parsed[2].payment_type, PaymentType::Money);
        assert_eq!(parsed[2].origin, TransactionOrigin::Other);
    }

    #[test]
    fn unusable_amounts_deserialize_without_failing_the_batch() {
        let raw = r#"[
            {"id":"a","categoryId":"food","value":null,"date":"2025-01-02","type":"EXPENSE"},
            {"id":"b","categoryId":"food","date":"2025-01-02","type":"EXPENSE"},
            {"id":"c","categoryId":"food","value":"12.50","date":"2025-01-02","type":"EXPENSE"},
            {"id":"d","categoryId":"food","value":{"amount":3},"date":"2025-01-02","type":"EXPENSE"}
        ]"#;
        let parsed: Vec<Transaction> = serde_json::from_str(raw).unwrap();
        let values: Vec<_> = parsed.iter().map(Transaction::usable_value).collect();
        assert_eq!(values, vec![None, None, Some(12.5), None]);
    }

    #[test]
    fn usable_value_rejects_negative_and_nan() {
        let date = chrono::Utc::now();
        assert_eq!(Transaction::expense("x", 12.5, date).usable_value(), Some(12.5));
        assert_eq!(Transaction::expense("x", -1.0, date).usable_value(), None);
        assert_eq!(Transaction::expense("x", f64::NAN, date).usable_value(), None);
    }
}
