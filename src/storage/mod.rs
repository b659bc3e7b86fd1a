pub mod json_backend;

use crate::{core::errors::ControlError, domain::Snapshot};

pub type Result<T> = std::result::Result<T, ControlError>;

/// Source of the records a computation runs over.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Snapshot>;
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

pub use json_backend::{load_snapshot, save_snapshot, snapshot_warnings, JsonSnapshotStore};
