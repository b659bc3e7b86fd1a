//! Category records and the read-only hierarchy used for subcategory roll-ups.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::common::{Identifiable, NamedEntity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: CategoryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn default_kind() -> CategoryKind {
    CategoryKind::Expense
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            kind,
            icon: None,
            color: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

impl Identifiable for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryKind {
    Expense,
    Income,
}

#[derive(Debug, Clone)]
struct CategoryNode {
    parent_id: Option<String>,
    name: String,
}

/// Immutable id → {parent, name} lookup.
#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
    nodes: HashMap<String, CategoryNode>,
}

impl CategoryTree {
    pub fn new(categories: &[Category]) -> Self {
        let nodes = categories
            .iter()
            .map(|category| {
                (
                    category.id.clone(),
                    CategoryNode {
                        parent_id: category.parent_id.clone(),
                        name: category.name.clone(),
                    },
                )
            })
            .collect();
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).map(|node| node.name.as_str())
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        let node = self.nodes.get(id)?;
        node.parent_id.as_deref()
    }

    /// True when `candidate` sits strictly below `ancestor`. Walks parents and
    /// stops on cycles.
    pub fn is_descendant(&self, candidate: &str, ancestor: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.parent_of(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if !seen.insert(id) {
                return false;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// `root` plus every category below it.
    pub fn subtree(&self, root: &str) -> HashSet<String> {
        let mut ids: HashSet<String> = self
            .nodes
            .keys()
            .filter(|id| self.is_descendant(id, root))
            .cloned()
            .collect();
        ids.insert(root.to_string());
        ids
    }
}
