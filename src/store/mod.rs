//! 持久化模块
//!
//! 单层键值存储，浏览器 localStorage 的文件系统替身

pub mod kv;

// 重导出
pub use kv::*;
