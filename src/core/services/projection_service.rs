use chrono::NaiveDate;

use crate::domain::{CalendarCycle, Projection};

/// Naive linear projection of spend to the end of a cycle.
pub struct ProjectionService;

impl ProjectionService {
    /// `today` is the local reference date. Elapsed days are clamped to
    /// `[1, total_days]`; non-finite results collapse to zero.
    pub fn project(spent: f64, cycle: &CalendarCycle, today: NaiveDate) -> Projection {
        let total_days = cycle.days().max(0);
        if total_days == 0 {
            return Projection::default();
        }
        let elapsed_days = ((today - cycle.start).num_days() + 1).clamp(1, total_days);

        let daily_avg = finite_or_zero(spent / elapsed_days as f64);
        let projected = finite_or_zero(daily_avg * total_days as f64);

        Projection {
            total_days,
            elapsed_days,
            daily_avg,
            projected,
        }
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// `numerator / denominator * 100`, or zero when the denominator is not positive.
/// Overflowing ratios saturate so a huge spend never reads as 0%.
pub(crate) fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    let pct = numerator / denominator * 100.0;
    if pct.is_nan() {
        0.0
    } else {
        pct.clamp(-f64::MAX, f64::MAX)
    }
}
