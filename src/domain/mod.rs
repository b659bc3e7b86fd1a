//! Domain records consumed and produced by the spending services.

pub mod card;
pub mod category;
pub mod common;
pub mod control;
pub mod period;
pub mod progress;
pub mod snapshot;
pub mod summary;
pub mod transaction;

pub use card::{CardBrand, CardCycle, CardMetrics, CardSummary, CreditCard};
pub use category::{Category, CategoryKind, CategoryTree};
pub use control::{NotifyChannel, SpendingControl};
pub use period::{CalendarCycle, PeriodResolver, PeriodType, PeriodWindow};
pub use progress::{CategorySpend, ControlProgress, ControlStatus, Projection, StatusThresholds};
pub use snapshot::Snapshot;
pub use summary::{
    CategoryShare, DailySpend, DateRange, FinanceAccumulatedStatus, FinancePeriodStatus,
    FinanceStatus, IncomeSource, PaymentBucket, PaymentTypeSummary, ReportRange,
};
pub use transaction::{PaymentType, Transaction, TransactionOrigin, TransactionType};
