//! Derived progress records for spending controls.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::period::PeriodType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    Ok,
    Warning,
    Danger,
}

impl ControlStatus {
    /// Weight used by at-risk ranking.
    pub fn rank(&self) -> u32 {
        match self {
            ControlStatus::Ok => 1,
            ControlStatus::Warning => 2,
            ControlStatus::Danger => 3,
        }
    }
}

impl fmt::Display for ControlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ControlStatus::Ok => "OK",
            ControlStatus::Warning => "Warning",
            ControlStatus::Danger => "Danger",
        };
        f.write_str(label)
    }
}

/// Percent cut-offs for status classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StatusThresholds {
    pub warning_pct: f64,
    pub danger_pct: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            warning_pct: 80.0,
            danger_pct: 100.0,
        }
    }
}

/// Linear end-of-cycle estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub total_days: i64,
    pub elapsed_days: i64,
    pub daily_avg: f64,
    pub projected: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    /// `None` for uncategorized transactions.
    pub category_id: Option<String>,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlProgress {
    pub control_id: String,
    pub category_id: Option<String>,
    pub period_type: PeriodType,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub next_reset_at: DateTime<Utc>,
    pub spent: f64,
    pub goal: f64,
    /// Unused goal folded in from the previous cycle; zero without carry-over.
    pub carried_over: f64,
    pub effective_goal: f64,
    pub limit: Option<f64>,
    pub remaining_to_goal: f64,
    pub remaining_to_limit: Option<f64>,
    pub usage_pct_of_goal: f64,
    pub usage_pct_of_limit: Option<f64>,
    pub over_limit: bool,
    pub status: ControlStatus,
    pub projection: Projection,
    pub crossed_thresholds: Vec<f64>,
    pub breakdown: Vec<CategorySpend>,
    pub skipped_transactions: usize,
}

pub(crate) fn classification_pct(
    limit: Option<f64>,
    usage_pct_of_limit: Option<f64>,
    usage_pct_of_goal: f64,
) -> f64 {
    match (limit, usage_pct_of_limit) {
        (Some(limit), Some(pct)) if limit > 0.0 => pct,
        _ => usage_pct_of_goal,
    }
}

impl ControlProgress {
    /// Percentage the status was classified on: limit usage when a positive
    /// limit exists, goal usage otherwise.
    pub fn classification_pct(&self) -> f64 {
        classification_pct(self.limit, self.usage_pct_of_limit, self.usage_pct_of_goal)
    }

    pub fn priority_score(&self) -> f64 {
        f64::from(self.status.rank()) * 1000.0 + self.classification_pct()
    }

    /// Progress-bar fill, clamped to `[0, 100]`.
    pub fn bar_pct(&self) -> f64 {
        self.classification_pct().clamp(0.0, 100.0)
    }

    pub fn projected_over_limit(&self) -> bool {
        self.limit
            .map(|limit| self.projection.projected > limit)
            .unwrap_or(false)
    }

    pub fn projected_over_goal(&self) -> bool {
        self.projection.projected > self.effective_goal
    }
}
