use std::io;

use crate::kernel::effect::{Effect, Mutation, SaveReason};
use crate::kernel::services::bus::KernelBusSender;
use crate::kernel::services::ports::{GatewayResult, SharedGateway, StorageGateway};
use crate::kernel::{Action, DocumentAction, TreeAction};

/// Runs effects against the storage gateway. Every effect yields exactly one action.
pub struct GatewayRuntime {
    runtime: tokio::runtime::Runtime,
    gateway: SharedGateway,
    bus: KernelBusSender,
}

impl GatewayRuntime {
    pub fn new(gateway: SharedGateway, bus: KernelBusSender) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .or_else(|e| {
                tracing::error!(
                    error = %e,
                    "Failed to create multi-thread tokio runtime, falling back to current-thread"
                );
                tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
            })?;
        Ok(Self {
            runtime,
            gateway,
            bus,
        })
    }

    pub fn tokio_handle(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Flush saves in the batch complete, in order, before anything else in it starts.
    pub fn execute(&self, effects: Vec<Effect>) {
        if effects.is_empty() {
            return;
        }

        let (flushes, rest): (Vec<_>, Vec<_>) = effects.into_iter().partition(|effect| {
            matches!(
                effect,
                Effect::SaveCanvas {
                    reason: SaveReason::Flush,
                    ..
                }
            )
        });

        if flushes.is_empty() {
            for effect in rest {
                self.spawn(effect);
            }
            return;
        }

        let gateway = self.gateway.clone();
        let bus = self.bus.clone();
        let handle = self.tokio_handle();
        self.runtime.spawn(async move {
            for effect in flushes {
                let action = run(gateway.as_ref(), effect).await;
                let _ = bus.send_action(action);
            }
            for effect in rest {
                let gateway = gateway.clone();
                let bus = bus.clone();
                handle.spawn(async move {
                    let action = run(gateway.as_ref(), effect).await;
                    let _ = bus.send_action(action);
                });
            }
        });
    }

    fn spawn(&self, effect: Effect) {
        let gateway = self.gateway.clone();
        let bus = self.bus.clone();
        self.runtime.spawn(async move {
            let action = run(gateway.as_ref(), effect).await;
            let _ = bus.send_action(action);
        });
    }
}

async fn run(gateway: &dyn StorageGateway, effect: Effect) -> Action {
    match effect {
        Effect::ListTree { request } => Action::Tree(TreeAction::Listed {
            request,
            result: gateway.list().await,
        }),
        Effect::ListTrash => Action::Tree(TreeAction::TrashListed {
            result: gateway.list_trash().await,
        }),
        Effect::LoadBaseDirectory => Action::Tree(TreeAction::BaseDirectoryResolved {
            result: gateway.base_directory().await,
        }),
        Effect::Mutate(mutation) => {
            let result = mutate(gateway, &mutation).await;
            Action::Tree(TreeAction::MutationFinished { mutation, result })
        }
        Effect::ReadCanvas { path } => {
            let result = gateway.read_canvas(&path).await;
            Action::Document(DocumentAction::Loaded { path, result })
        }
        Effect::SaveCanvas {
            path,
            content,
            reason,
        } => {
            let result = gateway.save_canvas(&path, &content).await;
            Action::Document(DocumentAction::Saved {
                path,
                reason,
                result,
            })
        }
    }
}

async fn mutate(gateway: &dyn StorageGateway, mutation: &Mutation) -> GatewayResult<()> {
    tracing::debug!(op = mutation.label(), "running mutation");
    match mutation {
        Mutation::CreateFolder { path } => gateway.create_folder(path).await,
        Mutation::CreateCanvas { path } => gateway.create_canvas(path).await,
        Mutation::Delete { path } => gateway.delete_item(path).await,
        Mutation::Rename { from, to, .. } | Mutation::Move { from, to, .. } => {
            gateway.rename_item(from, to).await
        }
        Mutation::Copy { from, to, .. } => gateway.copy_canvas(from, to).await,
        Mutation::Trash { path } => gateway.trash_item(path).await,
        Mutation::Restore { trash_path } => gateway.restore_item(trash_path).await,
        Mutation::DeletePermanently { trash_path } => gateway.delete_permanently(trash_path).await,
        Mutation::EmptyTrash => gateway.empty_trash().await,
        Mutation::SetIcon { path, icon, color } => {
            gateway
                .set_item_icon(path, icon.as_deref(), color.as_deref())
                .await
        }
    }
}
