#![doc(test(attr(deny(warnings))))]

//! Spending-control progress for a personal-finance client: period windows,
//! spend accumulation, goal/limit status, projections and dashboard summaries.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use spend_control::{ControlStatus, ProgressService, SpendingControl, Transaction};
//!
//! let control = SpendingControl::for_category("food", 1000.0).with_limit(1200.0);
//! let date = Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap();
//! let spent = Transaction::expense("food", 1100.0, date);
//! let progress = ProgressService::compute_control_progress(
//!     &control,
//!     &[spent],
//!     Utc.with_ymd_and_hms(2025, 3, 20, 0, 0, 0).unwrap(),
//! )
//! .unwrap();
//! assert_eq!(progress.status, ControlStatus::Warning);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod storage;
pub mod utils;

pub use crate::core::errors::{CliError, ControlError, Result};
pub use crate::core::services::{
    CardService, ControlEvaluation, ProgressService, ProjectionService, SpendService,
    SummaryService,
};
pub use crate::domain::{
    Category, CategoryTree, ControlProgress, ControlStatus, CreditCard, PeriodResolver, PeriodType,
    PeriodWindow, Snapshot, SpendingControl, StatusThresholds, Transaction,
};

/// Initializes global tracing. Safe to call more than once.
pub fn init() {
    utils::init_tracing();
}
