//! canvasdesk - 画布笔记的文件树与文档生命周期内核
//!
//! 模块结构：
//! - models: 数据模型（Node, TrashEntry, DocumentState）与树索引
//! - kernel: 状态/动作/副作用（TreeSyncController, DocumentLifecycleController, Store）
//! - kernel::services: 端口（StorageGateway）与适配器（运行时、内存网关、设置）
//! - app: 会话装配
//! - logging: tracing 初始化

pub mod app;
pub mod kernel;
pub mod logging;
pub mod models;
