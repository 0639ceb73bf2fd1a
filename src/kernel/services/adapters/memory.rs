//! In-memory storage gateway.
//!
//! Mirrors the desktop backend's observable behaviour (listing order, hidden entries, trash
//! naming, restore collisions) without touching the disk. Tests can delay reads per path and
//! queue one-shot failures per capability.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use crate::kernel::services::ports::{GatewayError, GatewayResult, StorageGateway};
use crate::models::{
    base_name, default_document_content, display_name, is_canvas_path, is_same_or_within,
    join_path, parent_of, remap_prefix, Node, NodeKind, TrashEntry, CANVAS_EXTENSION,
};

pub const DEFAULT_BASE_DIRECTORY: &str = "memory://canvases";
const CONTENT_SOURCE: &str = "canvasdesk";

#[derive(Debug, Clone)]
enum EntryKind {
    Folder,
    File(String),
}

#[derive(Debug, Clone)]
struct Entry {
    kind: EntryKind,
    icon: Option<String>,
    icon_color: Option<String>,
    modified: i64,
}

impl Entry {
    fn folder() -> Self {
        Self {
            kind: EntryKind::Folder,
            icon: None,
            icon_color: None,
            modified: now_secs(),
        }
    }

    fn file(content: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::File(content.into()),
            icon: None,
            icon_color: None,
            modified: now_secs(),
        }
    }

    fn is_folder(&self) -> bool {
        matches!(self.kind, EntryKind::Folder)
    }
}

#[derive(Debug, Clone)]
struct TrashedItem {
    original_path: String,
    trashed_at: u64,
    is_folder: bool,
    /// Keyed by path relative to the trashed item; `""` is the item itself.
    entries: Vec<(String, Entry)>,
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<String, Entry>,
    trash: BTreeMap<String, TrashedItem>,
    last_trash_stamp: u64,
    failures: FxHashMap<String, VecDeque<String>>,
    read_delays: FxHashMap<String, Duration>,
    calls: Vec<String>,
}

pub struct MemoryGateway {
    base_directory: String,
    state: Mutex<MemoryState>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DIRECTORY)
    }
}

impl MemoryGateway {
    pub fn new(base_directory: impl Into<String>) -> Self {
        Self {
            base_directory: base_directory.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a folder and its missing ancestors.
    pub fn with_folder(self, path: &str) -> Self {
        ensure_parents(&mut self.state().entries, &join_path(path, "_"));
        self
    }

    /// Seeds a file with raw content; any name is accepted so hidden and foreign files
    /// can be staged.
    pub fn with_file(self, path: &str, content: impl Into<String>) -> Self {
        {
            let mut state = self.state();
            ensure_parents(&mut state.entries, path);
            state.entries.insert(path.to_string(), Entry::file(content));
        }
        self
    }

    /// The next call to `op` (a capability name such as `"read_canvas"`) fails with `message`.
    pub fn fail_next(&self, op: &str, message: impl Into<String>) {
        self.state()
            .failures
            .entry(op.to_string())
            .or_default()
            .push_back(message.into());
    }

    /// Every read of `path` waits `delay` before answering.
    pub fn set_read_delay(&self, path: &str, delay: Duration) {
        self.state().read_delays.insert(path.to_string(), delay);
    }

    /// Capability calls so far, as `"op path"` strings.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn content(&self, path: &str) -> Option<String> {
        match &self.state().entries.get(path)?.kind {
            EntryKind::File(content) => Some(content.clone()),
            EntryKind::Folder => None,
        }
    }

    pub fn exists(&self, path: &str) -> bool {
        self.state().entries.contains_key(path)
    }

    /// Logs the call and pops a queued failure for `op`.
    fn begin(&self, op: &str, detail: &str) -> GatewayResult<MutexGuard<'_, MemoryState>> {
        let mut state = self.state();
        state.calls.push(if detail.is_empty() {
            op.to_string()
        } else {
            format!("{op} {detail}")
        });
        if let Some(message) = state.failures.get_mut(op).and_then(VecDeque::pop_front) {
            tracing::debug!(op, "injected gateway failure");
            return Err(GatewayError::new(message));
        }
        Ok(state)
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn list(&self) -> GatewayResult<Vec<Node>> {
        let state = self.begin("list", "")?;
        Ok(collect_nodes(&state.entries, ""))
    }

    async fn create_folder(&self, path: &str) -> GatewayResult<()> {
        safe_relative_path(path)?;
        let mut state = self.begin("create_folder", path)?;
        if path.is_empty() {
            return Ok(());
        }
        match state.entries.get(path) {
            Some(entry) if entry.is_folder() => Ok(()),
            Some(_) => Err(already_exists(path)),
            None => {
                ensure_parents(&mut state.entries, path);
                state.entries.insert(path.to_string(), Entry::folder());
                Ok(())
            }
        }
    }

    async fn create_canvas(&self, path: &str) -> GatewayResult<()> {
        item_path(path)?;
        let mut state = self.begin("create_canvas", path)?;
        write_file(
            &mut state.entries,
            path,
            default_document_content(CONTENT_SOURCE),
        )
    }

    async fn delete_item(&self, path: &str) -> GatewayResult<()> {
        item_path(path)?;
        let mut state = self.begin("delete_item", path)?;
        if !state.entries.contains_key(path) {
            return Err(not_found(path));
        }
        state.entries.retain(|key, _| !is_same_or_within(key, path));
        Ok(())
    }

    async fn rename_item(&self, old_path: &str, new_path: &str) -> GatewayResult<()> {
        item_path(old_path)?;
        item_path(new_path)?;
        let mut state = self.begin("rename_item", &format!("{old_path} -> {new_path}"))?;

        if !state.entries.contains_key(old_path) {
            return Err(not_found(old_path));
        }
        if state.entries.contains_key(new_path) {
            return Err(already_exists(new_path));
        }
        if is_same_or_within(new_path, old_path) {
            return Err(GatewayError::new(format!(
                "cannot move {old_path} into itself"
            )));
        }

        let moved: Vec<(String, Entry)> = state
            .entries
            .iter()
            .filter_map(|(key, entry)| {
                remap_prefix(key, old_path, new_path).map(|next| (next, entry.clone()))
            })
            .collect();
        state.entries.retain(|key, _| !is_same_or_within(key, old_path));
        ensure_parents(&mut state.entries, new_path);
        state.entries.extend(moved);
        Ok(())
    }

    async fn copy_canvas(&self, source_path: &str, dest_path: &str) -> GatewayResult<()> {
        item_path(source_path)?;
        item_path(dest_path)?;
        let mut state = self.begin("copy_canvas", &format!("{source_path} -> {dest_path}"))?;
        let content = match state.entries.get(source_path).map(|entry| &entry.kind) {
            Some(EntryKind::File(content)) => content.clone(),
            Some(EntryKind::Folder) => return Err(is_a_directory(source_path)),
            None => return Err(not_found(source_path)),
        };
        write_file(&mut state.entries, dest_path, content)
    }

    async fn read_canvas(&self, path: &str) -> GatewayResult<String> {
        item_path(path)?;
        let delay = {
            let state = self.begin("read_canvas", path)?;
            state.read_delays.get(path).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.state().entries.get(path).map(|entry| &entry.kind) {
            Some(EntryKind::File(content)) => Ok(content.clone()),
            Some(EntryKind::Folder) => Err(is_a_directory(path)),
            None => Err(not_found(path)),
        }
    }

    async fn save_canvas(&self, path: &str, content: &str) -> GatewayResult<()> {
        item_path(path)?;
        let mut state = self.begin("save_canvas", path)?;
        write_file(&mut state.entries, path, content.to_string())
    }

    async fn base_directory(&self) -> GatewayResult<String> {
        self.begin("base_directory", "")?;
        Ok(self.base_directory.clone())
    }

    async fn trash_item(&self, path: &str) -> GatewayResult<()> {
        item_path(path)?;
        let mut state = self.begin("trash_item", path)?;
        let Some(root) = state.entries.get(path) else {
            return Err(not_found(path));
        };
        let is_folder = root.is_folder();

        let stamp = (chrono::Utc::now().timestamp_millis().max(0) as u64)
            .max(state.last_trash_stamp + 1);
        state.last_trash_stamp = stamp;

        let entries: Vec<(String, Entry)> = state
            .entries
            .iter()
            .filter(|(key, _)| is_same_or_within(key, path))
            .map(|(key, entry)| (key[path.len()..].to_string(), entry.clone()))
            .collect();
        state.entries.retain(|key, _| !is_same_or_within(key, path));

        let trash_path = format!("{stamp}_{}", base_name(path));
        tracing::debug!(path, trash_path = %trash_path, "moved to trash");
        state.trash.insert(
            trash_path,
            TrashedItem {
                original_path: path.to_string(),
                trashed_at: stamp,
                is_folder,
                entries,
            },
        );
        Ok(())
    }

    async fn list_trash(&self) -> GatewayResult<Vec<TrashEntry>> {
        let state = self.begin("list_trash", "")?;
        let mut items: Vec<TrashEntry> = state
            .trash
            .iter()
            .map(|(trash_path, item)| {
                let original = base_name(&item.original_path);
                let name = if item.is_folder {
                    original.to_string()
                } else {
                    display_name(original).to_string()
                };
                TrashEntry {
                    name,
                    trash_path: trash_path.clone(),
                    original_path: item.original_path.clone(),
                    is_folder: item.is_folder,
                    trashed_at: item.trashed_at,
                }
            })
            .collect();
        items.sort_by(|a, b| b.trashed_at.cmp(&a.trashed_at));
        Ok(items)
    }

    async fn restore_item(&self, trash_path: &str) -> GatewayResult<()> {
        let mut state = self.begin("restore_item", trash_path)?;
        let Some(item) = state.trash.remove(trash_path) else {
            return Err(not_found(trash_path));
        };

        let dest = restore_destination(&state.entries, &item);
        ensure_parents(&mut state.entries, &dest);
        for (suffix, entry) in item.entries {
            state.entries.insert(format!("{dest}{suffix}"), entry);
        }
        Ok(())
    }

    async fn delete_permanently(&self, trash_path: &str) -> GatewayResult<()> {
        let mut state = self.begin("delete_permanently", trash_path)?;
        match state.trash.remove(trash_path) {
            Some(_) => Ok(()),
            None => Err(not_found(trash_path)),
        }
    }

    async fn empty_trash(&self) -> GatewayResult<()> {
        let mut state = self.begin("empty_trash", "")?;
        state.trash.clear();
        Ok(())
    }

    async fn set_item_icon(
        &self,
        path: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> GatewayResult<()> {
        item_path(path)?;
        let mut state = self.begin("set_item_icon", path)?;
        let Some(entry) = state.entries.get_mut(path) else {
            return Err(not_found(path));
        };
        entry.icon = icon.map(str::to_string);
        entry.icon_color = icon.and(color).map(str::to_string);
        Ok(())
    }
}

/// Rejects parent references and absolute paths. The empty path names the base directory.
fn safe_relative_path(path: &str) -> GatewayResult<()> {
    if path.starts_with('/') || path.starts_with('\\') {
        return Err(GatewayError::new("absolute paths are not allowed"));
    }
    if path.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(GatewayError::new("path traversal is not allowed"));
    }
    Ok(())
}

/// A safe path that names an entry below the base directory.
fn item_path(path: &str) -> GatewayResult<()> {
    safe_relative_path(path)?;
    if path.is_empty() {
        return Err(GatewayError::new("the base directory is not an item"));
    }
    Ok(())
}

fn collect_nodes(entries: &BTreeMap<String, Entry>, parent: &str) -> Vec<Node> {
    let mut nodes: Vec<Node> = entries
        .iter()
        .filter(|(path, _)| parent_of(path) == parent)
        .filter_map(|(path, entry)| {
            let name = base_name(path);
            if name.starts_with('.') {
                return None;
            }
            let (kind, size) = match &entry.kind {
                EntryKind::Folder => (
                    NodeKind::Folder {
                        children: Some(collect_nodes(entries, path)),
                    },
                    None,
                ),
                EntryKind::File(content) if is_canvas_path(name) => {
                    (NodeKind::File, Some(content.len() as u64))
                }
                EntryKind::File(_) => return None,
            };
            Some(Node {
                name: name.to_string(),
                path: path.clone(),
                kind,
                icon: entry.icon.clone(),
                icon_color: entry.icon_color.clone(),
                modified: Some(entry.modified),
                size,
            })
        })
        .collect();

    nodes.sort_by(|a, b| {
        b.is_folder()
            .cmp(&a.is_folder())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    nodes
}

fn ensure_parents(entries: &mut BTreeMap<String, Entry>, path: &str) {
    let mut parent = parent_of(path);
    while !parent.is_empty() {
        entries
            .entry(parent.to_string())
            .or_insert_with(Entry::folder);
        parent = parent_of(parent);
    }
}

fn write_file(
    entries: &mut BTreeMap<String, Entry>,
    path: &str,
    content: String,
) -> GatewayResult<()> {
    match entries.get_mut(path) {
        Some(entry) if entry.is_folder() => Err(is_a_directory(path)),
        Some(entry) => {
            entry.kind = EntryKind::File(content);
            entry.modified = now_secs();
            Ok(())
        }
        None => {
            ensure_parents(entries, path);
            entries.insert(path.to_string(), Entry::file(content));
            Ok(())
        }
    }
}

/// Original path, or `"{base} (restored)"`, `"{base} (restored 2)"`, ... when occupied.
fn restore_destination(entries: &BTreeMap<String, Entry>, item: &TrashedItem) -> String {
    let original = item.original_path.as_str();
    if !entries.contains_key(original) {
        return original.to_string();
    }

    let parent = parent_of(original);
    let name = base_name(original);
    let (stem, extension) = match name.strip_suffix(CANVAS_EXTENSION) {
        Some(stem) if !item.is_folder => (stem, CANVAS_EXTENSION),
        _ => (name, ""),
    };

    let mut attempt: u32 = 1;
    loop {
        let candidate = if attempt == 1 {
            format!("{stem} (restored){extension}")
        } else {
            format!("{stem} (restored {attempt}){extension}")
        };
        let candidate = join_path(parent, &candidate);
        if !entries.contains_key(&candidate) {
            return candidate;
        }
        attempt += 1;
    }
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn not_found(path: &str) -> GatewayError {
    GatewayError::new(format!("{path}: no such file or directory"))
}

fn already_exists(path: &str) -> GatewayError {
    GatewayError::new(format!("{path}: already exists"))
}

fn is_a_directory(path: &str) -> GatewayError {
    GatewayError::new(format!("{path}: is a directory"))
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/memory.rs"]
mod tests;
