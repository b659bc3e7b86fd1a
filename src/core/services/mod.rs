pub mod card_service;
pub mod progress_service;
pub mod projection_service;
pub mod spend_service;
pub mod summary_service;

pub use card_service::CardService;
pub use progress_service::{ControlEvaluation, ProgressService};
pub use projection_service::ProjectionService;
pub use spend_service::{CategoryMatcher, CategoryScope, SpendService, SpendTotals};
pub use summary_service::SummaryService;

#[cfg(test)]
mod tests;
