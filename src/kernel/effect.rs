use std::fmt;

/// Gateway calls requested by the reducers. Each one completes with exactly one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ListTree { request: u64 },
    ListTrash,
    LoadBaseDirectory,
    Mutate(Mutation),
    ReadCanvas { path: String },
    SaveCanvas {
        path: String,
        content: String,
        reason: SaveReason,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReason {
    /// Debounce timer fired.
    Autosave,
    /// Leaving the document with unsaved changes.
    Flush,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateFolder {
        path: String,
    },
    CreateCanvas {
        path: String,
    },
    Delete {
        path: String,
    },
    Rename {
        from: String,
        to: String,
        is_folder: bool,
    },
    Move {
        from: String,
        to: String,
        /// `None` is the root.
        target_folder: Option<String>,
    },
    Copy {
        from: String,
        to: String,
        target_folder: Option<String>,
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
}

impl Mutation {
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::CreateFolder { .. } => "create folder",
            Mutation::CreateCanvas { .. } => "create canvas",
            Mutation::Delete { .. } => "delete",
            Mutation::Rename { .. } => "rename",
            Mutation::Move { .. } => "move",
            Mutation::Copy { .. } => "copy",
            Mutation::Trash { .. } => "move to trash",
            Mutation::Restore { .. } => "restore",
            Mutation::DeletePermanently { .. } => "delete permanently",
            Mutation::EmptyTrash => "empty trash",
            Mutation::SetIcon { .. } => "set icon",
        }
    }

    /// Path that stops existing in the forest once the mutation succeeds.
    pub fn removed_path(&self) -> Option<&str> {
        match self {
            Mutation::Delete { path } | Mutation::Trash { path } => Some(path),
            Mutation::Rename { from, .. } | Mutation::Move { from, .. } => Some(from),
            _ => None,
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
