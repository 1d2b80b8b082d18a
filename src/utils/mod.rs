//! 工具模块
//!
//! 文件系统与时间相关的通用工具函数

pub mod fs;
pub mod time;

// 重导出
pub use fs::*;
pub use time::*;
