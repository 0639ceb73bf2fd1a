//! Sidebar tree state: the forest served by the gateway, the expanded folders, the
//! selection, and the trash listing.
//!
//! Every mutation is requested as an [`Effect::Mutate`] and only touches local state once
//! its completion arrives, so a failed call leaves the controller exactly as the last
//! successful refresh left it. Expansion and selection are keyed by path because a
//! refresh replaces every node wholesale.

use std::borrow::Cow;

use rustc_hash::FxHashSet;

use crate::kernel::action::CreateKind;
use crate::kernel::effect::{Effect, Mutation};
use crate::kernel::services::ports::GatewayError;
use crate::models::{
    base_name, filter, find_by_path, is_same_or_within, join_path, parent_of, remap_prefix,
    sanitize_name, unique_copy_name, with_canvas_extension, Node, TrashEntry,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub path: String,
    pub name: String,
    pub depth: u16,
    pub is_folder: bool,
    pub is_expanded: bool,
    pub icon: Option<String>,
    pub icon_color: Option<String>,
}

#[derive(Debug, Default)]
pub struct TreeSyncController {
    forest: Vec<Node>,
    expanded: FxHashSet<String>,
    selected: Option<String>,
    search_query: String,
    trash: Vec<TrashEntry>,
    base_directory: Option<String>,
    next_list_request: u64,
    applied_list_request: u64,
    pending_lists: usize,
    pending_mutations: usize,
    banner: Option<String>,
    alert: Option<String>,
}

impl TreeSyncController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forest(&self) -> &[Node] {
        &self.forest
    }

    pub fn expanded(&self) -> &FxHashSet<String> {
        &self.expanded
    }

    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_node(&self) -> Option<&Node> {
        self.selected
            .as_deref()
            .and_then(|path| find_by_path(&self.forest, path))
    }

    /// Path of the selected canvas; a selected folder opens no document.
    pub fn selected_document(&self) -> Option<&str> {
        self.selected_node()
            .filter(|node| !node.is_folder())
            .map(|node| node.path.as_str())
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn trash(&self) -> &[TrashEntry] {
        &self.trash
    }

    pub fn base_directory(&self) -> Option<&str> {
        self.base_directory.as_deref()
    }

    /// Listing failure, shown as a banner until the next successful listing.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Mutation failure, shown until dismissed.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending_lists > 0
    }

    pub fn has_pending_mutations(&self) -> bool {
        self.pending_mutations > 0
    }

    pub fn visible_forest(&self) -> Cow<'_, [Node]> {
        filter(&self.forest, &self.search_query)
    }

    /// Flattened view of the visible forest. While a search is active every folder that
    /// survived the filter is shown open.
    pub fn rows(&self) -> Vec<TreeRow> {
        let visible = self.visible_forest();
        let searching = !self.search_query.is_empty();

        let mut rows = Vec::new();
        let mut stack: Vec<(&Node, u16)> = visible.iter().rev().map(|node| (node, 0)).collect();

        while let Some((node, depth)) = stack.pop() {
            let is_expanded =
                node.is_folder() && (searching || self.expanded.contains(&node.path));
            rows.push(TreeRow {
                path: node.path.clone(),
                name: node.display_name().to_string(),
                depth,
                is_folder: node.is_folder(),
                is_expanded,
                icon: node.icon.clone(),
                icon_color: node.icon_color.clone(),
            });

            if !is_expanded {
                continue;
            }
            if let Some(children) = node.children() {
                for child in children.iter().rev() {
                    stack.push((child, depth + 1));
                }
            }
        }

        rows
    }

    pub fn refresh(&mut self) -> Vec<Effect> {
        self.next_list_request += 1;
        self.pending_lists += 1;
        vec![Effect::ListTree {
            request: self.next_list_request,
        }]
    }

    pub fn refresh_trash(&mut self) -> Vec<Effect> {
        vec![Effect::ListTrash]
    }

    pub fn load_base_directory(&mut self) -> Vec<Effect> {
        vec![Effect::LoadBaseDirectory]
    }

    pub fn apply_listed(&mut self, request: u64, result: Result<Vec<Node>, GatewayError>) -> bool {
        self.pending_lists = self.pending_lists.saturating_sub(1);

        if request < self.applied_list_request {
            tracing::debug!(
                request,
                applied = self.applied_list_request,
                "discarding stale tree listing"
            );
            return true;
        }

        match result {
            Ok(forest) => {
                self.applied_list_request = request;
                self.forest = forest;
                self.banner = None;
                self.reconcile_selection();
            }
            Err(e) => {
                tracing::warn!(error = %e, "tree listing failed");
                self.banner = Some(format!("Failed to load files: {e}"));
            }
        }
        true
    }

    fn reconcile_selection(&mut self) {
        let Some(selected) = self.selected.as_deref() else {
            return;
        };
        if find_by_path(&self.forest, selected).is_none() {
            tracing::debug!(path = selected, "selection vanished after refresh");
            self.selected = None;
        }
    }

    pub fn apply_trash_listed(&mut self, result: Result<Vec<TrashEntry>, GatewayError>) -> bool {
        match result {
            Ok(entries) => {
                self.trash = entries;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "trash listing failed");
                self.banner = Some(format!("Failed to load trash: {e}"));
                true
            }
        }
    }

    pub fn apply_base_directory(&mut self, result: Result<String, GatewayError>) -> bool {
        match result {
            Ok(dir) => {
                let changed = self.base_directory.as_deref() != Some(dir.as_str());
                self.base_directory = Some(dir);
                changed
            }
            Err(e) => {
                tracing::warn!(error = %e, "base directory lookup failed");
                false
            }
        }
    }

    pub fn toggle_expand(&mut self, path: &str) -> bool {
        if !find_by_path(&self.forest, path).is_some_and(Node::is_folder) {
            return false;
        }
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_string());
        }
        true
    }

    pub fn select(&mut self, path: Option<&str>) -> bool {
        let next = match path {
            None => None,
            Some(path) => match find_by_path(&self.forest, path) {
                Some(node) => Some(node.path.clone()),
                None => {
                    tracing::debug!(path, "ignoring selection of unknown path");
                    return false;
                }
            },
        };
        if next == self.selected {
            return false;
        }
        self.selected = next;
        true
    }

    pub fn set_search_query(&mut self, query: &str) -> bool {
        if self.search_query == query {
            return false;
        }
        self.search_query = query.to_string();
        true
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub fn create(&mut self, kind: CreateKind, parent: &str, raw_name: &str) -> Vec<Effect> {
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            tracing::debug!("rejecting create with empty name");
            return Vec::new();
        }

        let name = sanitize_name(trimmed);
        let mutation = match kind {
            CreateKind::Canvas => Mutation::CreateCanvas {
                path: join_path(parent, &with_canvas_extension(&name)),
            },
            CreateKind::Folder => Mutation::CreateFolder {
                path: join_path(parent, &name),
            },
        };
        self.request(mutation)
    }

    pub fn rename(&mut self, path: &str, new_display_name: &str) -> Vec<Effect> {
        let Some(node) = find_by_path(&self.forest, path) else {
            tracing::debug!(path, "rename target not in tree");
            return Vec::new();
        };

        let trimmed = new_display_name.trim();
        if trimmed.is_empty() || trimmed == node.display_name() {
            return Vec::new();
        }

        let is_folder = node.is_folder();
        let mut final_name = sanitize_name(trimmed);
        if !is_folder {
            final_name = with_canvas_extension(&final_name);
        }

        let to = join_path(parent_of(path), &final_name);
        if to == path {
            return Vec::new();
        }
        self.request(Mutation::Rename {
            from: path.to_string(),
            to,
            is_folder,
        })
    }

    /// Moves `source` into `target`, or to the root when `target` is `None`.
    pub fn move_item(&mut self, source: &str, target: Option<&str>) -> Vec<Effect> {
        if let Some(target) = target {
            if is_same_or_within(target, source) {
                tracing::debug!(source, target, "rejecting move into own subtree");
                return Vec::new();
            }
            if !find_by_path(&self.forest, target).is_some_and(Node::is_folder) {
                tracing::debug!(source, target, "move target is not a folder");
                return Vec::new();
            }
        }

        let to = join_path(target.unwrap_or(""), base_name(source));
        if to == source {
            return Vec::new();
        }
        self.request(Mutation::Move {
            from: source.to_string(),
            to,
            target_folder: target.map(str::to_string),
        })
    }

    pub fn copy(&mut self, source: &str, target: Option<&str>) -> Vec<Effect> {
        let Some(node) = find_by_path(&self.forest, source) else {
            tracing::debug!(path = source, "copy source not in tree");
            return Vec::new();
        };
        if node.is_folder() {
            tracing::debug!(path = source, "folders cannot be copied");
            return Vec::new();
        }

        let to = unique_copy_name(&self.forest, target.unwrap_or(""), node.display_name());
        self.request(Mutation::Copy {
            from: source.to_string(),
            to,
            target_folder: target.map(str::to_string),
        })
    }

    pub fn delete(&mut self, path: &str) -> Vec<Effect> {
        self.request(Mutation::Delete {
            path: path.to_string(),
        })
    }

    pub fn trash_item(&mut self, path: &str) -> Vec<Effect> {
        self.request(Mutation::Trash {
            path: path.to_string(),
        })
    }

    pub fn restore(&mut self, trash_path: &str) -> Vec<Effect> {
        self.request(Mutation::Restore {
            trash_path: trash_path.to_string(),
        })
    }

    pub fn delete_permanently(&mut self, trash_path: &str) -> Vec<Effect> {
        self.request(Mutation::DeletePermanently {
            trash_path: trash_path.to_string(),
        })
    }

    pub fn empty_trash(&mut self) -> Vec<Effect> {
        if self.trash.is_empty() {
            return Vec::new();
        }
        self.request(Mutation::EmptyTrash)
    }

    pub fn set_icon(
        &mut self,
        path: &str,
        icon: Option<String>,
        color: Option<String>,
    ) -> Vec<Effect> {
        self.request(Mutation::SetIcon {
            path: path.to_string(),
            icon,
            color,
        })
    }

    fn request(&mut self, mutation: Mutation) -> Vec<Effect> {
        self.pending_mutations += 1;
        vec![Effect::Mutate(mutation)]
    }

    pub fn apply_mutation_finished(
        &mut self,
        mutation: &Mutation,
        result: Result<(), GatewayError>,
    ) -> Vec<Effect> {
        self.pending_mutations = self.pending_mutations.saturating_sub(1);

        if let Err(e) = result {
            tracing::warn!(op = mutation.label(), error = %e, "mutation failed");
            self.alert = Some(format!("Failed to {}: {e}", mutation.label()));
            return Vec::new();
        }
        tracing::info!(op = mutation.label(), "mutation applied");

        match mutation {
            Mutation::CreateFolder { path } => {
                self.expanded.insert(path.clone());
                self.refresh()
            }
            Mutation::Rename {
                from,
                to,
                is_folder,
            } => {
                if *is_folder {
                    self.remap_expanded(from, to);
                }
                self.refresh()
            }
            Mutation::Move {
                from,
                to,
                target_folder,
            } => {
                self.remap_expanded(from, to);
                if let Some(target) = target_folder {
                    self.expanded.insert(target.clone());
                }
                self.refresh()
            }
            Mutation::Copy { target_folder, .. } => {
                if let Some(target) = target_folder {
                    self.expanded.insert(target.clone());
                }
                self.refresh()
            }
            Mutation::Trash { .. } | Mutation::Restore { .. } => {
                let mut effects = self.refresh();
                effects.extend(self.refresh_trash());
                effects
            }
            Mutation::DeletePermanently { .. } | Mutation::EmptyTrash => self.refresh_trash(),
            Mutation::CreateCanvas { .. } | Mutation::Delete { .. } | Mutation::SetIcon { .. } => {
                self.refresh()
            }
        }
    }

    fn remap_expanded(&mut self, from: &str, to: &str) {
        let moved: Vec<(String, String)> = self
            .expanded
            .iter()
            .filter_map(|path| remap_prefix(path, from, to).map(|next| (path.clone(), next)))
            .collect();
        for (old, new) in moved {
            self.expanded.remove(&old);
            self.expanded.insert(new);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/tree_sync.rs"]
mod tests;
