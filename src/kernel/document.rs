//! Canvas document lifecycle: load on select, trailing-edge autosave, flush on switch.
//!
//! The live path is the staleness token. Every completion carries the path it was issued
//! for and is dropped unless that path is still live, so only the most recent selection
//! can touch the open document.

use std::time::{Duration, Instant};

use crate::kernel::effect::{Effect, SaveReason};
use crate::kernel::services::ports::{GatewayError, SessionConfig};
use crate::models::{is_same_or_within, serialize_snapshot, CanvasSnapshot, DocumentState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    /// An autosave is in flight; the document is still current.
    Saving,
}

#[derive(Debug, Clone)]
struct PendingChange {
    path: String,
    snapshot: CanvasSnapshot,
}

#[derive(Debug)]
pub struct DocumentLifecycleController {
    phase: DocumentPhase,
    live: Option<String>,
    document: Option<DocumentState>,
    error: Option<String>,
    pending: Option<PendingChange>,
    deadline: Option<Instant>,
    debounce: Duration,
    default_background: String,
    saves_in_flight: usize,
    /// Autosaves issued for the current live path that have not settled.
    live_autosaves: usize,
}

impl Default for DocumentLifecycleController {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl DocumentLifecycleController {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            phase: DocumentPhase::Idle,
            live: None,
            document: None,
            error: None,
            pending: None,
            deadline: None,
            debounce: config.autosave_debounce,
            default_background: config.default_background.clone(),
            saves_in_flight: 0,
            live_autosaves: 0,
        }
    }

    pub fn phase(&self) -> DocumentPhase {
        self.phase
    }

    pub fn live_path(&self) -> Option<&str> {
        self.live.as_deref()
    }

    pub fn document(&self) -> Option<&DocumentState> {
        self.document.as_ref()
    }

    /// Advisory load failure; the substituted document stays editable.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_render_eligible(&self) -> bool {
        matches!(self.phase, DocumentPhase::Ready | DocumentPhase::Saving)
    }

    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.pending.is_some()
    }

    pub fn saves_in_flight(&self) -> usize {
        self.saves_in_flight
    }

    /// Switches the live document. Unsaved data for the old path is flushed before the
    /// new read so the runtime can write it first.
    pub fn select(&mut self, path: Option<&str>) -> Vec<Effect> {
        if self.live.as_deref() == path {
            return Vec::new();
        }

        self.deadline = None;
        let mut effects = self.flush();

        self.live = path.map(str::to_string);
        self.live_autosaves = 0;
        self.document = None;
        self.error = None;

        match path {
            None => {
                self.phase = DocumentPhase::Idle;
                tracing::debug!("document closed");
            }
            Some(path) => {
                self.phase = DocumentPhase::Loading;
                tracing::debug!(path, "loading document");
                effects.push(Effect::ReadCanvas {
                    path: path.to_string(),
                });
            }
        }
        effects
    }

    /// Records the latest surface state and rearms the debounce slot. Changes are only
    /// accepted while the document is displayed.
    pub fn record_change(&mut self, snapshot: CanvasSnapshot, now: Instant) -> bool {
        if !self.is_render_eligible() {
            tracing::debug!(phase = ?self.phase, "ignoring change with no displayed document");
            return false;
        }
        let Some(path) = self.live.clone() else {
            return false;
        };

        self.document = Some(DocumentState::from_snapshot(path.clone(), snapshot.clone()));
        self.pending = Some(PendingChange { path, snapshot });
        self.deadline = Some(now + self.debounce);
        true
    }

    /// Fires the autosave once its deadline has passed.
    pub fn poll_autosave(&mut self, now: Instant) -> Vec<Effect> {
        match self.deadline {
            Some(deadline) if now >= deadline => {}
            _ => return Vec::new(),
        }
        self.deadline = None;

        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        if self.live.as_deref() != Some(pending.path.as_str()) {
            tracing::debug!(path = %pending.path, "abandoning autosave for stale path");
            return Vec::new();
        }

        let Some(effect) = self.save_effect(pending, SaveReason::Autosave) else {
            return Vec::new();
        };
        self.live_autosaves += 1;
        self.phase = DocumentPhase::Saving;
        vec![effect]
    }

    /// Writes any unsaved data now and cancels the timer.
    pub fn flush(&mut self) -> Vec<Effect> {
        self.deadline = None;
        self.pending
            .take()
            .and_then(|pending| self.save_effect(pending, SaveReason::Flush))
            .into_iter()
            .collect()
    }

    /// Flushes unsaved data when it belongs to `path` or something below it.
    pub fn flush_under(&mut self, path: &str) -> Vec<Effect> {
        if self.has_pending_under(path) {
            self.flush()
        } else {
            Vec::new()
        }
    }

    /// Drops unsaved data once its path no longer exists in storage.
    pub fn discard_pending_under(&mut self, path: &str) -> bool {
        if !self.has_pending_under(path) {
            return false;
        }
        tracing::debug!(path, "discarding changes for removed path");
        self.pending = None;
        self.deadline = None;
        true
    }

    fn has_pending_under(&self, path: &str) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| is_same_or_within(&pending.path, path))
    }

    fn save_effect(&mut self, pending: PendingChange, reason: SaveReason) -> Option<Effect> {
        match serialize_snapshot(&pending.snapshot) {
            Ok(content) => {
                self.saves_in_flight += 1;
                Some(Effect::SaveCanvas {
                    path: pending.path,
                    content,
                    reason,
                })
            }
            Err(e) => {
                tracing::warn!(path = %pending.path, error = %e, "failed to serialize canvas");
                None
            }
        }
    }

    pub fn apply_loaded(&mut self, path: &str, result: Result<String, GatewayError>) -> bool {
        if self.live.as_deref() != Some(path) || self.phase != DocumentPhase::Loading {
            tracing::debug!(path, "discarding superseded load");
            return false;
        }

        match result {
            Ok(content) => {
                self.document = Some(
                    DocumentState::parse(path, &content)
                        .unwrap_or_else(|| self.default_document(path)),
                );
                self.error = None;
            }
            Err(e) => {
                tracing::warn!(path, error = %e, "canvas load failed");
                self.document = Some(self.default_document(path));
                self.error = Some(format!("Failed to load canvas: {e}"));
            }
        }
        self.phase = DocumentPhase::Ready;
        true
    }

    pub fn apply_saved(
        &mut self,
        path: &str,
        reason: SaveReason,
        result: Result<(), GatewayError>,
    ) -> bool {
        self.saves_in_flight = self.saves_in_flight.saturating_sub(1);

        match result {
            Ok(()) => tracing::debug!(path, ?reason, "canvas saved"),
            Err(e) => tracing::warn!(path, ?reason, error = %e, "canvas save failed"),
        }

        if reason == SaveReason::Autosave && self.live.as_deref() == Some(path) {
            self.live_autosaves = self.live_autosaves.saturating_sub(1);
        }
        if self.phase == DocumentPhase::Saving && self.live_autosaves == 0 {
            self.phase = DocumentPhase::Ready;
            return true;
        }
        false
    }

    fn default_document(&self, path: &str) -> DocumentState {
        let mut document = DocumentState::empty(path);
        document.view_state.background_color = Some(self.default_background.clone());
        document
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/document.rs"]
mod tests;
