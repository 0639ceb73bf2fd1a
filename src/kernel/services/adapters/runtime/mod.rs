//! Async runtime adapter: executes gateway effects and sends completions back over the kernel bus.

mod runtime;

pub use runtime::GatewayRuntime;
