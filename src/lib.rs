// Evalsync - Library Root
//
// 离线优先的评估数据同步助手：本地快照与模拟远端的对账、
// last-write-wins 冲突解决、连接状态推导

pub mod config;
pub mod connectivity;
pub mod models;
pub mod status;
pub mod store;
pub mod sync;
pub mod utils;

// 重新导出常用类型
pub use config::{default_data_dir, SystemConfig};
pub use connectivity::NetworkMonitor;
pub use models::{DataSnapshot, OnlineConfig, SyncState};
pub use status::{ConnectionStatus, DetailedStatus, OperationMode};
pub use store::KvStore;
pub use sync::SyncEngine;
