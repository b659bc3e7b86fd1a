//! Credit-card statement cycle resolution and the "current bill" summary.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};

use crate::core::errors::{ControlError, Result};
use crate::core::services::projection_service::{percent_of, ProjectionService};
use crate::core::services::spend_service::sort_by_total_desc;
use crate::domain::period::{anchored_date, month_index, parse_timezone};
use crate::domain::{
    CalendarCycle, CardCycle, CardMetrics, CardSummary, CategorySpend, CreditCard, PaymentType,
    PeriodWindow, Transaction,
};

const TOP_CATEGORIES: usize = 5;

pub struct CardService;

impl CardService {
    /// Statement cycle containing `today`: it opens the day after the previous
    /// closing date and ends on the next closing date (both clamped to month length).
    pub fn cycle_containing(
        card: &CreditCard,
        today: NaiveDate,
    ) -> Result<(CalendarCycle, NaiveDate)> {
        validate_day("closing day", card.closing_day)?;
        validate_day("due day", card.due_day)?;

        let this_month = month_index(today);
        let closing_this = closing_at(this_month, card.closing_day)?;
        let (previous_closing, closing) = if today <= closing_this {
            (closing_at(this_month - 1, card.closing_day)?, closing_this)
        } else {
            (closing_this, closing_at(this_month + 1, card.closing_day)?)
        };

        let cycle = CalendarCycle {
            start: next_day(previous_closing)?,
            next_start: next_day(closing)?,
        };
        Ok((cycle, closing))
    }

    /// Due date of the bill closing on `closing`: same month when the due day
    /// comes after the closing day, the following month otherwise.
    pub fn due_date(card: &CreditCard, closing: NaiveDate) -> Result<NaiveDate> {
        let closing_idx = month_index(closing);
        let due_idx = if card.due_day > card.closing_day {
            closing_idx
        } else {
            closing_idx + 1
        };
        closing_at(due_idx, card.due_day)
    }

    pub fn summarize(
        card: &CreditCard,
        transactions: &[Transaction],
        reference: DateTime<Utc>,
    ) -> Result<CardSummary> {
        let tz = parse_timezone(card.timezone.as_deref())?;
        let today = reference.with_timezone(&tz).date_naive();
        let (cycle, closing) = Self::cycle_containing(card, today)?;
        let window = PeriodWindow::from_cycle(cycle, &tz);

        let mut spent = 0.0;
        let mut per_category: BTreeMap<Option<&str>, (f64, usize)> = BTreeMap::new();
        for txn in transactions {
            if !txn.is_expense()
                || txn.payment_type != PaymentType::CreditCard
                || txn.card_id.as_deref() != Some(card.id.as_str())
            {
                continue;
            }
            let (Some(date), Some(value)) = (txn.date, txn.usable_value()) else {
                continue;
            };
            if !window.contains(date) {
                continue;
            }
            spent += value;
            let entry = per_category.entry(txn.category_id.as_deref()).or_default();
            entry.0 += value;
            entry.1 += 1;
        }

        let limit = card.limit.max(0.0);
        let projection = ProjectionService::project(spent, &cycle, today);
        let mut top_categories: Vec<CategorySpend> = per_category
            .into_iter()
            .map(|(category_id, (total, count))| CategorySpend {
                category_id: category_id.map(str::to_string),
                total,
                count,
            })
            .collect();
        sort_by_total_desc(&mut top_categories);
        top_categories.truncate(TOP_CATEGORIES);

        tracing::debug!(card = %card.id, spent, "summarized card cycle");

        Ok(CardSummary {
            card_id: card.id.clone(),
            name: card.name.clone(),
            limit,
            cycle: CardCycle {
                start: window.start,
                end: window.end,
                closing_date: closing,
                due_date: Self::due_date(card, closing)?,
                days_in_cycle: cycle.days(),
            },
            metrics: CardMetrics {
                spent,
                remaining: (limit - spent).max(0.0),
                util_pct: percent_of(spent, limit),
                daily_avg: projection.daily_avg,
                projected: projection.projected,
                over_limit: spent > limit,
            },
            projection,
            top_categories,
        })
    }

    /// Looks a card up by id and summarizes it.
    pub fn summarize_by_id(
        cards: &[CreditCard],
        card_id: &str,
        transactions: &[Transaction],
        reference: DateTime<Utc>,
    ) -> Result<CardSummary> {
        let card = cards
            .iter()
            .find(|card| card.id == card_id)
            .ok_or_else(|| ControlError::CardNotFound(card_id.to_string()))?;
        Self::summarize(card, transactions, reference)
    }
}

fn validate_day(label: &str, day: u32) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(ControlError::InvalidInput(format!(
            "card {label} {day} must be between 1 and 31"
        )))
    }
}

fn closing_at(idx: i32, day: u32) -> Result<NaiveDate> {
    let out_of_range = || ControlError::InvalidInput("card cycle is out of range".into());
    anchored_date(idx, day).ok_or_else(out_of_range)
}

fn next_day(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(1))
        .ok_or_else(|| ControlError::InvalidInput(format!("date {date} out of range")))
}
