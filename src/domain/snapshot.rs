//! Everything one computation runs over, as exported by the API.

use serde::{Deserialize, Serialize};

use crate::domain::{
    card::CreditCard, category::Category, category::CategoryTree, control::SpendingControl,
    transaction::Transaction,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Snapshot {
    pub controls: Vec<SpendingControl>,
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub cards: Vec<CreditCard>,
}

impl Snapshot {
    pub fn category_tree(&self) -> CategoryTree {
        CategoryTree::new(&self.categories)
    }

    pub fn control(&self, id: &str) -> Option<&SpendingControl> {
        self.controls.iter().find(|control| control.id == id)
    }
}
