//! One application session: the store, the gateway runtime, and the bus between them.

use std::io;
use std::sync::mpsc::RecvTimeoutError;
use std::time::{Duration, Instant};

use crate::kernel::services::adapters::GatewayRuntime;
use crate::kernel::services::ports::{SessionConfig, SharedGateway};
use crate::kernel::services::{kernel_bus, KernelBusReceiver, KernelMessage};
use crate::kernel::{
    Action, DocumentAction, DocumentLifecycleController, Store, TreeAction, TreeSyncController,
};
use crate::models::CanvasSnapshot;

const MAX_KERNEL_BUS_DRAIN_PER_TICK: usize = 256;

pub struct Session {
    store: Store,
    runtime: GatewayRuntime,
    rx: KernelBusReceiver,
    in_flight: usize,
}

impl Session {
    pub fn new(gateway: SharedGateway, config: &SessionConfig) -> io::Result<Self> {
        let (bus, rx) = kernel_bus();
        let runtime = GatewayRuntime::new(gateway, bus)?;
        tracing::info!(
            autosave_debounce_ms = config.autosave_debounce.as_millis() as u64,
            "session started"
        );
        Ok(Self {
            store: Store::new(config),
            runtime,
            rx,
            in_flight: 0,
        })
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn tree(&self) -> &TreeSyncController {
        self.store.tree()
    }

    pub fn document(&self) -> &DocumentLifecycleController {
        self.store.document()
    }

    /// Gateway calls issued but not yet answered on the bus.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Initial tree, trash and base directory fetch.
    pub fn start(&mut self) -> bool {
        let mut changed = self.dispatch(Action::Tree(TreeAction::Refresh));
        changed |= self.dispatch(Action::Tree(TreeAction::RefreshTrash));
        changed |= self.dispatch(Action::Tree(TreeAction::LoadBaseDirectory));
        changed
    }

    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        self.in_flight += result.effects.len();
        self.runtime.execute(result.effects);
        result.state_changed
    }

    pub fn record_change(&mut self, snapshot: CanvasSnapshot, now: Instant) -> bool {
        self.dispatch(Action::Document(DocumentAction::Changed { snapshot, now }))
    }

    /// Drains completions, then lets the autosave slot fire if its deadline passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.pump();
        changed |= self.dispatch(Action::Tick { now });
        changed
    }

    /// Applies completions that already arrived without blocking.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_KERNEL_BUS_DRAIN_PER_TICK {
            match self.rx.try_recv() {
                Ok(msg) => changed |= self.handle(msg),
                Err(_) => break,
            }
        }
        changed
    }

    /// Blocks until every issued call has been answered, including follow-ups the
    /// answers trigger. Returns `false` on timeout.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(msg) => {
                    self.handle(msg);
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(in_flight = self.in_flight, "session did not settle in time");
                    return false;
                }
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    /// Writes unsaved changes and waits for outstanding calls.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        let result = self.store.flush();
        self.in_flight += result.effects.len();
        self.runtime.execute(result.effects);
        self.wait_idle(timeout)
    }

    fn handle(&mut self, msg: KernelMessage) -> bool {
        match msg {
            KernelMessage::Action(action) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                self.dispatch(action)
            }
        }
    }
}
