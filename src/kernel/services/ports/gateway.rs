//! Storage collaborator contract: the remote capability surface the controllers call.

use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Node, TrashEntry};

/// Opaque failure reported by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Recursive root listing.
    async fn list(&self) -> Result<Vec<Node>>;

    async fn create_folder(&self, path: &str) -> Result<()>;

    /// Creates a default empty document at `path`.
    async fn create_canvas(&self, path: &str) -> Result<()>;

    /// Permanent delete that bypasses the trash.
    async fn delete_item(&self, path: &str) -> Result<()>;

    /// Also used for moves.
    async fn rename_item(&self, old_path: &str, new_path: &str) -> Result<()>;

    async fn copy_canvas(&self, source_path: &str, dest_path: &str) -> Result<()>;

    async fn read_canvas(&self, path: &str) -> Result<String>;

    async fn save_canvas(&self, path: &str, content: &str) -> Result<()>;

    async fn base_directory(&self) -> Result<String>;

    async fn trash_item(&self, path: &str) -> Result<()>;

    async fn list_trash(&self) -> Result<Vec<TrashEntry>>;

    async fn restore_item(&self, trash_path: &str) -> Result<()>;

    async fn delete_permanently(&self, trash_path: &str) -> Result<()>;

    async fn empty_trash(&self) -> Result<()>;

    async fn set_item_icon(&self, path: &str, icon: Option<&str>, color: Option<&str>)
        -> Result<()>;
}

pub type SharedGateway = Arc<dyn StorageGateway>;
