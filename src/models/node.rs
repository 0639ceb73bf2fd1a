//! 文件树节点

use serde::{Deserialize, Serialize};

use super::tree_index::display_name;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    File,
    /// `None` and `Some(vec![])` both mean "no materialized children" but stay distinguishable.
    Folder { children: Option<Vec<Node>> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub icon: Option<String>,
    pub icon_color: Option<String>,
    pub modified: Option<i64>,
    pub size: Option<u64>,
}

impl Node {
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
            icon: None,
            icon_color: None,
            modified: None,
            size: None,
        }
    }

    pub fn folder(name: impl Into<String>, path: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Folder {
                children: Some(children),
            },
            icon: None,
            icon_color: None,
            modified: None,
            size: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>, color: Option<String>) -> Self {
        self.icon = Some(icon.into());
        self.icon_color = color;
        self
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn children(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Folder {
                children: Some(children),
            } => Some(children.as_slice()),
            _ => None,
        }
    }

    /// Name with the canvas suffix stripped.
    pub fn display_name(&self) -> &str {
        display_name(&self.name)
    }
}

/// A soft-deleted item as reported by the trash listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashEntry {
    pub name: String,
    pub trash_path: String,
    pub original_path: String,
    pub is_folder: bool,
    pub trashed_at: u64,
}
