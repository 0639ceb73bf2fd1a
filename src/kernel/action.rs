use std::time::Instant;

use crate::kernel::effect::{Mutation, SaveReason};
use crate::kernel::services::ports::GatewayError;
use crate::models::{CanvasSnapshot, Node, TrashEntry};

#[derive(Debug, Clone)]
pub enum Action {
    Tree(TreeAction),
    Document(DocumentAction),
    /// Drives the autosave debounce slot.
    Tick { now: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateKind {
    Canvas,
    Folder,
}

#[derive(Debug, Clone)]
pub enum TreeAction {
    Refresh,
    RefreshTrash,
    LoadBaseDirectory,
    ToggleExpand {
        path: String,
    },
    Select {
        path: Option<String>,
    },
    SetSearchQuery {
        query: String,
    },
    Create {
        kind: CreateKind,
        parent: String,
        name: String,
    },
    Rename {
        path: String,
        new_name: String,
    },
    Move {
        source: String,
        target: Option<String>,
    },
    Copy {
        source: String,
        target: Option<String>,
    },
    Delete {
        path: String,
    },
    Trash {
        path: String,
    },
    Restore {
        trash_path: String,
    },
    DeletePermanently {
        trash_path: String,
    },
    EmptyTrash,
    SetIcon {
        path: String,
        icon: Option<String>,
        color: Option<String>,
    },
    DismissAlert,
    Listed {
        request: u64,
        result: Result<Vec<Node>, GatewayError>,
    },
    TrashListed {
        result: Result<Vec<TrashEntry>, GatewayError>,
    },
    BaseDirectoryResolved {
        result: Result<String, GatewayError>,
    },
    MutationFinished {
        mutation: Mutation,
        result: Result<(), GatewayError>,
    },
}

#[derive(Debug, Clone)]
pub enum DocumentAction {
    Changed {
        snapshot: CanvasSnapshot,
        now: Instant,
    },
    Loaded {
        path: String,
        result: Result<String, GatewayError>,
    },
    Saved {
        path: String,
        reason: SaveReason,
        result: Result<(), GatewayError>,
    },
}
