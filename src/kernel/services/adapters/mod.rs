//! Service adapters: runtime specific implementations (async execution, storage, settings).

pub mod memory;
pub mod paths;
pub mod runtime;
pub mod settings;

pub use memory::MemoryGateway;
pub use paths::{ensure_log_dir, get_app_data_dir, get_log_dir, get_settings_path};
pub use runtime::GatewayRuntime;
pub use settings::{
    ensure_settings_file, ensure_settings_file_at, load_settings, load_settings_from,
    SettingsError,
};
