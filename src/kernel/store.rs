use super::{
    Action, DocumentAction, DocumentLifecycleController, Effect, TreeAction, TreeSyncController,
};
use crate::kernel::services::ports::SessionConfig;

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn new(state_changed: bool, effects: Vec<Effect>) -> Self {
        Self {
            effects,
            state_changed,
        }
    }

    fn effects(effects: Vec<Effect>) -> Self {
        Self {
            effects,
            state_changed: false,
        }
    }
}

/// One session's controllers. Tree selection drives the document controller.
pub struct Store {
    tree: TreeSyncController,
    document: DocumentLifecycleController,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl Store {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            tree: TreeSyncController::new(),
            document: DocumentLifecycleController::new(config),
        }
    }

    pub fn tree(&self) -> &TreeSyncController {
        &self.tree
    }

    pub fn document(&self) -> &DocumentLifecycleController {
        &self.document
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::Tree(tree_action) => {
                let before = self.tree.selected_document().map(str::to_string);
                let mut result = self.dispatch_tree(tree_action);

                if self.tree.selected_document() != before.as_deref() {
                    let next = self.tree.selected_document().map(str::to_string);
                    let mut effects = self.document.select(next.as_deref());
                    effects.append(&mut result.effects);
                    result.effects = effects;
                    result.state_changed = true;
                }
                result
            }
            Action::Document(document_action) => self.dispatch_document(document_action),
            Action::Tick { now } => DispatchResult::effects(self.document.poll_autosave(now)),
        }
    }

    /// Saves unsaved data now, e.g. before the session is torn down.
    pub fn flush(&mut self) -> DispatchResult {
        DispatchResult::effects(self.document.flush())
    }

    fn dispatch_tree(&mut self, action: TreeAction) -> DispatchResult {
        match action {
            TreeAction::Refresh => DispatchResult::new(true, self.tree.refresh()),
            TreeAction::RefreshTrash => DispatchResult::effects(self.tree.refresh_trash()),
            TreeAction::LoadBaseDirectory => {
                DispatchResult::effects(self.tree.load_base_directory())
            }
            TreeAction::ToggleExpand { path } => {
                DispatchResult::new(self.tree.toggle_expand(&path), Vec::new())
            }
            TreeAction::Select { path } => {
                DispatchResult::new(self.tree.select(path.as_deref()), Vec::new())
            }
            TreeAction::SetSearchQuery { query } => {
                DispatchResult::new(self.tree.set_search_query(&query), Vec::new())
            }
            TreeAction::DismissAlert => DispatchResult::new(self.tree.dismiss_alert(), Vec::new()),
            TreeAction::Create { kind, parent, name } => {
                let effects = self.tree.create(kind, &parent, &name);
                self.mutation_request(effects)
            }
            TreeAction::Rename { path, new_name } => {
                let effects = self.tree.rename(&path, &new_name);
                self.mutation_request(effects)
            }
            TreeAction::Move { source, target } => {
                let effects = self.tree.move_item(&source, target.as_deref());
                self.mutation_request(effects)
            }
            TreeAction::Copy { source, target } => {
                let effects = self.tree.copy(&source, target.as_deref());
                self.mutation_request(effects)
            }
            TreeAction::Delete { path } => {
                let effects = self.tree.delete(&path);
                self.mutation_request(effects)
            }
            TreeAction::Trash { path } => {
                let effects = self.tree.trash_item(&path);
                self.mutation_request(effects)
            }
            TreeAction::Restore { trash_path } => {
                let effects = self.tree.restore(&trash_path);
                self.mutation_request(effects)
            }
            TreeAction::DeletePermanently { trash_path } => {
                let effects = self.tree.delete_permanently(&trash_path);
                self.mutation_request(effects)
            }
            TreeAction::EmptyTrash => {
                let effects = self.tree.empty_trash();
                self.mutation_request(effects)
            }
            TreeAction::SetIcon { path, icon, color } => {
                let effects = self.tree.set_icon(&path, icon, color);
                self.mutation_request(effects)
            }
            TreeAction::Listed { request, result } => {
                DispatchResult::new(self.tree.apply_listed(request, result), Vec::new())
            }
            TreeAction::TrashListed { result } => {
                DispatchResult::new(self.tree.apply_trash_listed(result), Vec::new())
            }
            TreeAction::BaseDirectoryResolved { result } => {
                DispatchResult::new(self.tree.apply_base_directory(result), Vec::new())
            }
            TreeAction::MutationFinished { mutation, result } => {
                if result.is_ok() {
                    if let Some(removed) = mutation.removed_path() {
                        self.document.discard_pending_under(removed);
                    }
                }
                let effects = self.tree.apply_mutation_finished(&mutation, result);
                DispatchResult::new(true, effects)
            }
        }
    }

    /// Unsaved data under a path about to disappear is written before the mutation runs.
    fn mutation_request(&mut self, effects: Vec<Effect>) -> DispatchResult {
        let mut flushed = Vec::new();
        for effect in &effects {
            if let Effect::Mutate(mutation) = effect {
                if let Some(removed) = mutation.removed_path() {
                    flushed.extend(self.document.flush_under(removed));
                }
            }
        }

        let state_changed = !effects.is_empty();
        flushed.extend(effects);
        DispatchResult::new(state_changed, flushed)
    }

    fn dispatch_document(&mut self, action: DocumentAction) -> DispatchResult {
        match action {
            DocumentAction::Changed { snapshot, now } => {
                DispatchResult::new(self.document.record_change(snapshot, now), Vec::new())
            }
            DocumentAction::Loaded { path, result } => {
                DispatchResult::new(self.document.apply_loaded(&path, result), Vec::new())
            }
            DocumentAction::Saved {
                path,
                reason,
                result,
            } => DispatchResult::new(self.document.apply_saved(&path, reason, result), Vec::new()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
