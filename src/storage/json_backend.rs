use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::{
        errors::ControlError,
        utils::{write_atomic, PathResolver},
    },
    domain::Snapshot,
};

use super::{Result, SnapshotStore};

/// JSON file holding controls, transactions, categories and cards.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    path: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `snapshot.json` inside the application directory.
    pub fn in_base(base: Option<PathBuf>) -> Self {
        Self::new(PathResolver::snapshot_file_in(&PathResolver::resolve_base(base)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonSnapshotStore {
    fn load(&self) -> Result<Snapshot> {
        load_snapshot(&self.path)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        save_snapshot(snapshot, &self.path)
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    if !path.exists() {
        return Err(ControlError::StorageError(format!(
            "snapshot `{}` not found",
            path.display()
        )));
    }
    let data = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&data)
        .map_err(|err| ControlError::StorageError(format!("{}: {err}", path.display())))?;
    tracing::debug!(
        path = %path.display(),
        controls = snapshot.controls.len(),
        transactions = snapshot.transactions.len(),
        "loaded snapshot"
    );
    for warning in snapshot_warnings(&snapshot) {
        tracing::warn!("{warning}");
    }
    Ok(snapshot)
}

pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)?;
    write_atomic(path, &json)
}

/// Referential problems that do not stop a computation but are worth surfacing.
pub fn snapshot_warnings(snapshot: &Snapshot) -> Vec<String> {
    let category_ids: HashSet<&str> = snapshot.categories.iter().map(|c| c.id.as_str()).collect();
    let card_ids: HashSet<&str> = snapshot.cards.iter().map(|c| c.id.as_str()).collect();
    let mut warnings = Vec::new();

    let mut seen_controls = HashSet::new();
    for control in &snapshot.controls {
        if !seen_controls.insert(control.id.as_str()) {
            warnings.push(format!("control {} appears more than once", control.id));
        }
        if let Some(category) = control.category_id.as_deref() {
            if !category_ids.is_empty() && !category_ids.contains(category) {
                warnings.push(format!(
                    "control {} references missing category {}",
                    control.id, category
                ));
            }
        }
    }

    for txn in &snapshot.transactions {
        if txn.date.is_none() {
            warnings.push(format!("transaction {} has no usable date", txn.id));
        }
        if !txn.value.is_finite() {
            warnings.push(format!("transaction {} has no usable amount", txn.id));
        }
        if let Some(card) = txn.card_id.as_deref() {
            if !card_ids.contains(card) {
                warnings.push(format!(
                    "transaction {} references unknown card {}",
                    txn.id, card
                ));
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, CategoryKind, SpendingControl, Transaction};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn sample_snapshot() -> Snapshot {
        let date = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        Snapshot {
            controls: vec![SpendingControl::for_category("food", 800.0).with_limit(1000.0)],
            transactions: vec![Transaction::expense("food", 42.5, date)],
            categories: vec![Category::new("food", "Food", CategoryKind::Expense)],
            cards: Vec::new(),
        }
    }

    #[test]
    fn save_and_load_through_store() {
        let temp = TempDir::new().unwrap();
        let store = JsonSnapshotStore::in_base(Some(temp.path().to_path_buf()));
        let snapshot = sample_snapshot();
        store.save(&snapshot).unwrap();
        assert!(store.path().ends_with("snapshot.json"));
        assert_eq!(store.load().unwrap(), snapshot);
    }

    #[test]
    fn missing_file_is_a_storage_error() {
        let temp = TempDir::new().unwrap();
        let err = load_snapshot(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ControlError::StorageError(_)));
    }

    #[test]
    fn sections_default_to_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.json");
        fs::write(&path, r#"{"transactions":[]}"#).unwrap();
        let snapshot = load_snapshot(&path).unwrap();
        assert!(snapshot.controls.is_empty());
        assert!(snapshot.cards.is_empty());
    }

    #[test]
    fn null_amount_is_loaded_and_flagged() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("null-value.json");
        fs::write(
            &path,
            r#"{"transactions":[
                {"id":"t1","categoryId":"food","value":null,"date":"2025-03-02","type":"EXPENSE"},
                {"id":"t2","categoryId":"food","value":20,"date":"2025-03-02","type":"EXPENSE"}
            ]}"#,
        )
        .unwrap();
        let snapshot = load_snapshot(&path).unwrap();
        assert_eq!(snapshot.transactions.len(), 2);
        assert_eq!(snapshot.transactions[0].usable_value(), None);
        assert_eq!(
            snapshot_warnings(&snapshot),
            vec!["transaction t1 has no usable amount".to_string()]
        );
    }

    #[test]
    fn warns_about_dangling_references() {
        let mut snapshot = sample_snapshot();
        snapshot.controls.push(SpendingControl::for_category("travel", 10.0));
        let date = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        snapshot
            .transactions
            .push(Transaction::expense("food", 1.0, date).with_card("ghost"));
        let warnings = snapshot_warnings(&snapshot);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("travel"));
        assert!(warnings[1].contains("ghost"));
    }
}
