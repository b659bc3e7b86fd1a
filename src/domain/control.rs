//! User-defined spending controls (goal/limit budgets per category).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpendingControl {
    pub id: String,
    /// `None` applies the control to every expense category.
    #[serde(default)]
    pub category_id: Option<String>,
    pub goal: f64,
    #[serde(default)]
    pub limit: Option<f64>,
    /// Raw wire value; parsed when the control is evaluated.
    #[serde(default = "default_period_type")]
    pub period_type: String,
    #[serde(default)]
    pub reset_day: Option<u32>,
    #[serde(default)]
    pub reset_weekday: Option<u32>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub include_subcategories: bool,
    #[serde(default)]
    pub carry_over: bool,
    #[serde(default)]
    pub notify: bool,
    #[serde(default)]
    pub notify_at_pct: Vec<f64>,
    #[serde(default)]
    pub channels: Vec<NotifyChannel>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_period_type() -> String {
    "monthly".into()
}

fn default_active() -> bool {
    true
}

impl SpendingControl {
    /// Monthly control resetting on day 1, with a fresh id.
    pub fn new(category_id: Option<String>, goal: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            category_id,
            goal,
            limit: None,
            period_type: default_period_type(),
            reset_day: Some(1),
            reset_weekday: None,
            timezone: None,
            include_subcategories: false,
            carry_over: false,
            notify: false,
            notify_at_pct: Vec::new(),
            channels: Vec::new(),
            is_active: true,
            archived_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn for_category(category_id: impl Into<String>, goal: f64) -> Self {
        Self::new(Some(category_id.into()), goal)
    }

    pub fn general(goal: f64) -> Self {
        Self::new(None, goal)
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_period(mut self, period_type: impl Into<String>) -> Self {
        self.period_type = period_type.into();
        self
    }

    pub fn with_reset_day(mut self, reset_day: u32) -> Self {
        self.reset_day = Some(reset_day);
        self
    }

    pub fn with_reset_weekday(mut self, reset_weekday: u32) -> Self {
        self.reset_weekday = Some(reset_weekday);
        self
    }

    pub fn with_notifications(
        mut self,
        thresholds: Vec<f64>,
        channels: Vec<NotifyChannel>,
    ) -> Self {
        self.notify = true;
        self.notify_at_pct = thresholds;
        self.channels = channels;
        self
    }

    /// Evaluated by batch operations; archived or deactivated controls are skipped.
    pub fn is_live(&self) -> bool {
        self.is_active && self.archived_at.is_none()
    }

    pub fn is_general(&self) -> bool {
        self.category_id.is_none()
    }
}

impl Identifiable for SpendingControl {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotifyChannel {
    InApp,
    Email,
    #[serde(alias = "WHATSZAPP")]
    Whatsapp,
}
