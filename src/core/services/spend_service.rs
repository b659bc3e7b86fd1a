//! Sums expense transactions into a control's spend for one window.

use std::collections::{BTreeMap, HashSet};

use chrono::TimeZone;

use crate::domain::{
    CategorySpend, CategoryTree, DailySpend, PeriodWindow, SpendingControl, Transaction,
};

/// Pre-resolved "does this category count" predicate.
pub trait CategoryScope {
    fn includes(&self, category_id: Option<&str>) -> bool;
}

impl<F> CategoryScope for F
where
    F: Fn(Option<&str>) -> bool,
{
    fn includes(&self, category_id: Option<&str>) -> bool {
        self(category_id)
    }
}

/// Category scope of a control, resolved once per computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryMatcher {
    All,
    Only(HashSet<String>),
}

impl CategoryMatcher {
    /// General controls match everything. Category controls match their own id
    /// and, with `include_subcategories` and a tree, every descendant.
    pub fn for_control(control: &SpendingControl, tree: Option<&CategoryTree>) -> Self {
        let Some(root) = control.category_id.as_deref() else {
            return CategoryMatcher::All;
        };
        match tree {
            Some(tree) if control.include_subcategories => {
                CategoryMatcher::Only(tree.subtree(root))
            }
            _ => CategoryMatcher::Only(HashSet::from([root.to_string()])),
        }
    }
}

impl CategoryScope for CategoryMatcher {
    fn includes(&self, category_id: Option<&str>) -> bool {
        match self {
            CategoryMatcher::All => true,
            CategoryMatcher::Only(ids) => category_id.map_or(false, |id| ids.contains(id)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpendTotals {
    pub spent: f64,
    pub matched: usize,
    /// In-scope expenses ignored for a missing date or unusable value.
    pub skipped: usize,
    pub breakdown: Vec<CategorySpend>,
}

/// Stateless spend aggregation.
pub struct SpendService;

impl SpendService {
    pub fn accumulate<S>(
        transactions: &[Transaction],
        window: &PeriodWindow,
        scope: &S,
    ) -> SpendTotals
    where
        S: CategoryScope + ?Sized,
    {
        let mut spent = 0.0;
        let mut matched = 0usize;
        let mut skipped = 0usize;
        let mut per_category: BTreeMap<Option<&str>, (f64, usize)> = BTreeMap::new();

        for txn in transactions {
            let category = txn.category_id.as_deref();
            if !txn.is_expense() || !scope.includes(category) {
                continue;
            }
            let Some(date) = txn.date else {
                tracing::debug!(
                    transaction = %txn.id,
                    "skipping transaction without a usable date"
                );
                skipped += 1;
                continue;
            };
            if !window.contains(date) {
                continue;
            }
            let Some(value) = txn.usable_value() else {
                tracing::debug!(
                    transaction = %txn.id,
                    value = txn.value,
                    "skipping transaction with unusable value"
                );
                skipped += 1;
                continue;
            };
            spent += value;
            matched += 1;
            let entry = per_category.entry(category).or_default();
            entry.0 += value;
            entry.1 += 1;
        }

        if skipped > 0 {
            tracing::warn!(skipped, "ignored malformed transactions while accumulating spend");
        }

        let mut breakdown: Vec<CategorySpend> = per_category
            .into_iter()
            .map(|(category_id, (total, count))| CategorySpend {
                category_id: category_id.map(str::to_string),
                total,
                count,
            })
            .collect();
        sort_by_total_desc(&mut breakdown);

        SpendTotals {
            spent,
            matched,
            skipped,
            breakdown,
        }
    }

    /// Per local day spend inside the window with a running total, for charts.
    pub fn daily_series<S, Z>(
        transactions: &[Transaction],
        window: &PeriodWindow,
        scope: &S,
        tz: &Z,
    ) -> Vec<DailySpend>
    where
        S: CategoryScope + ?Sized,
        Z: TimeZone,
    {
        let mut per_day = BTreeMap::new();
        for txn in transactions {
            if !txn.is_expense() || !scope.includes(txn.category_id.as_deref()) {
                continue;
            }
            let (Some(date), Some(value)) = (txn.date, txn.usable_value()) else {
                continue;
            };
            if !window.contains(date) {
                continue;
            }
            *per_day
                .entry(date.with_timezone(tz).date_naive())
                .or_insert(0.0) += value;
        }

        let mut cumulative = 0.0;
        per_day
            .into_iter()
            .map(|(date, value)| {
                cumulative += value;
                DailySpend {
                    date,
                    value,
                    cumulative,
                }
            })
            .collect()
    }
}

/// Descending by total; ties ordered by category id for stable output.
pub(crate) fn sort_by_total_desc(entries: &mut [CategorySpend]) {
    entries.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category_id.cmp(&b.category_id))
    });
}
