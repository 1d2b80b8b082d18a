//! 同步模块
//!
//! 实现对账流程：拉取 → 冲突检测 → last-write-wins 解决 → 本地保存 → 推送

pub mod auto;
pub mod engine;
pub mod log;
pub mod remote;

// 重导出（log 子模块与 log crate 同名，必须走 self::）
pub use self::auto::*;
pub use self::engine::*;
pub use self::log::*;
pub use self::remote::*;
