//! Headless application core (state/action/effect).

pub mod action;
pub mod document;
pub mod effect;
pub mod services;
pub mod store;
pub mod tree_sync;

pub use action::{Action, CreateKind, DocumentAction, TreeAction};
pub use document::{DocumentLifecycleController, DocumentPhase};
pub use effect::{Effect, Mutation, SaveReason};
pub use store::{DispatchResult, Store};
pub use tree_sync::{TreeRow, TreeSyncController};
