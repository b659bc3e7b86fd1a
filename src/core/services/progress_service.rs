//! Goal/limit progress, status classification and at-risk ranking for spending controls.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::core::errors::{ControlError, Result};
use crate::core::services::projection_service::{percent_of, ProjectionService};
use crate::core::services::spend_service::{CategoryMatcher, SpendService};
use crate::domain::{
    progress, CategoryTree, ControlProgress, ControlStatus, PeriodResolver, PeriodWindow,
    SpendingControl, StatusThresholds, Transaction,
};

/// Outcome of evaluating one control inside a batch.
#[derive(Debug)]
pub struct ControlEvaluation {
    pub control_id: String,
    pub result: Result<ControlProgress>,
}

/// Stateless progress computation shared by every caller.
pub struct ProgressService;

impl ProgressService {
    /// Progress of `control` for the cycle containing `reference`, using exact
    /// category matching and the default 80/100 thresholds.
    pub fn compute_control_progress(
        control: &SpendingControl,
        transactions: &[Transaction],
        reference: DateTime<Utc>,
    ) -> Result<ControlProgress> {
        Self::compute(
            control,
            transactions,
            None,
            reference,
            &StatusThresholds::default(),
        )
    }

    /// Same as [`Self::compute_control_progress`] with subcategory roll-up
    /// resolved through `categories`.
    pub fn compute_with_categories(
        control: &SpendingControl,
        transactions: &[Transaction],
        categories: &CategoryTree,
        reference: DateTime<Utc>,
    ) -> Result<ControlProgress> {
        Self::compute(
            control,
            transactions,
            Some(categories),
            reference,
            &StatusThresholds::default(),
        )
    }

    pub fn compute(
        control: &SpendingControl,
        transactions: &[Transaction],
        categories: Option<&CategoryTree>,
        reference: DateTime<Utc>,
        thresholds: &StatusThresholds,
    ) -> Result<ControlProgress> {
        let resolver = PeriodResolver::for_control(control)?;
        let window = resolver.window_containing(reference)?;
        let scope = CategoryMatcher::for_control(control, categories);
        let totals = SpendService::accumulate(transactions, &window, &scope);
        let spent = totals.spent;
        if !spent.is_finite() {
            return Err(ControlError::InvalidInput(format!(
                "spend for control {} is out of range",
                control.id
            )));
        }

        let goal = control.goal.max(0.0);
        let carried_over = if control.carry_over {
            Self::carried_over(goal, &resolver, &window, transactions, &scope)?
        } else {
            0.0
        };
        let effective_goal = (goal + carried_over).min(f64::MAX);
        let limit = control
            .limit
            .filter(|limit| limit.is_finite())
            .map(|limit| limit.max(0.0));

        let usage_pct_of_goal = percent_of(spent, effective_goal);
        let usage_pct_of_limit = limit.map(|limit| percent_of(spent, limit));
        let over_limit = limit.map_or(false, |limit| spent > limit);
        let classification_pct =
            progress::classification_pct(limit, usage_pct_of_limit, usage_pct_of_goal);
        let status = Self::classify(over_limit, classification_pct, thresholds);
        let projection =
            ProjectionService::project(spent, &window.cycle, resolver.local_date(reference));

        tracing::debug!(
            control = %control.id,
            period = %resolver.period_type(),
            spent,
            status = %status,
            "computed control progress"
        );

        Ok(ControlProgress {
            control_id: control.id.clone(),
            category_id: control.category_id.clone(),
            period_type: resolver.period_type(),
            period_start: window.start,
            period_end: window.end,
            next_reset_at: window.next_reset_at,
            spent,
            goal,
            carried_over,
            effective_goal,
            limit,
            remaining_to_goal: (effective_goal - spent).max(0.0),
            remaining_to_limit: limit.map(|limit| (limit - spent).max(0.0)),
            usage_pct_of_goal,
            usage_pct_of_limit,
            over_limit,
            status,
            projection,
            crossed_thresholds: Self::crossed_thresholds(control, classification_pct),
            breakdown: totals.breakdown,
            skipped_transactions: totals.skipped,
        })
    }

    /// Evaluates every live control; a failing control does not affect the others.
    pub fn compute_all(
        controls: &[SpendingControl],
        transactions: &[Transaction],
        categories: Option<&CategoryTree>,
        reference: DateTime<Utc>,
        thresholds: &StatusThresholds,
    ) -> Vec<ControlEvaluation> {
        controls
            .iter()
            .filter(|control| control.is_live())
            .map(|control| {
                let result =
                    Self::compute(control, transactions, categories, reference, thresholds);
                if let Err(err) = &result {
                    tracing::warn!(
                        control = %control.id,
                        error = %err,
                        "failed to evaluate control"
                    );
                }
                ControlEvaluation {
                    control_id: control.id.clone(),
                    result,
                }
            })
            .collect()
    }

    /// `danger` when over the limit or at/above the danger cut-off, `warning`
    /// at/above the warning cut-off, `ok` otherwise.
    pub fn classify(over_limit: bool, pct: f64, thresholds: &StatusThresholds) -> ControlStatus {
        if over_limit || pct >= thresholds.danger_pct {
            ControlStatus::Danger
        } else if pct >= thresholds.warning_pct {
            ControlStatus::Warning
        } else {
            ControlStatus::Ok
        }
    }

    /// Highest priority first; equal scores keep input order.
    pub fn rank_at_risk(progress: &[ControlProgress], top_n: usize) -> Vec<&ControlProgress> {
        let mut ranked: Vec<&ControlProgress> = progress.iter().collect();
        ranked.sort_by(|a, b| {
            b.priority_score()
                .partial_cmp(&a.priority_score())
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(top_n);
        ranked
    }

    /// Notification thresholds already reached, ascending.
    pub fn crossed_thresholds(control: &SpendingControl, pct: f64) -> Vec<f64> {
        if !control.notify {
            return Vec::new();
        }
        let mut crossed: Vec<f64> = control
            .notify_at_pct
            .iter()
            .copied()
            .filter(|threshold| threshold.is_finite() && *threshold <= pct)
            .collect();
        crossed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        crossed.dedup();
        crossed
    }

    /// Unused goal from the immediately preceding cycle. Only one cycle back
    /// is considered, so carried amounts never compound.
    fn carried_over(
        goal: f64,
        resolver: &PeriodResolver,
        window: &PeriodWindow,
        transactions: &[Transaction],
        scope: &CategoryMatcher,
    ) -> Result<f64> {
        let previous = resolver.previous(window)?;
        let previous_spent = SpendService::accumulate(transactions, &previous, scope).spent;
        Ok((goal - previous_spent).max(0.0))
    }
}
