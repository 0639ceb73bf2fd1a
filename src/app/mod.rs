//! 应用层：会话装配（Store + 运行时 + 总线）

pub mod session;

pub use session::Session;
