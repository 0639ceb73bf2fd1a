//! 数据模型层

pub mod document;
pub mod node;
pub mod tree_index;

pub use document::{
    default_document_content, serialize_snapshot, CanvasSnapshot, DocumentState, ViewState, Zoom,
    DEFAULT_BACKGROUND,
};
pub use node::{Node, NodeKind, TrashEntry};
pub use tree_index::{
    base_name, display_name, filter, find_by_path, is_canvas_path, is_same_or_within, join_path,
    parent_of, remap_prefix, sanitize_name, unique_copy_name, with_canvas_extension,
    CANVAS_EXTENSION,
};
