//! 连接监测模块
//!
//! 浏览器 navigator.onLine 的替身：进程内共享的在线标记。
//! 环境变量 EVALSYNC_OFFLINE 可在启动时强制离线（演示/测试用）。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 强制离线的环境变量
pub const OFFLINE_ENV: &str = "EVALSYNC_OFFLINE";

/// 网络状态监视器
///
/// Clone 共享同一个标记，同步引擎与自动同步循环各持一份。
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    online: Arc<AtomicBool>,
}

impl NetworkMonitor {
    /// 创建监视器，初始状态读取 EVALSYNC_OFFLINE
    pub fn new() -> Self {
        let forced_offline = std::env::var(OFFLINE_ENV).is_ok();
        if forced_offline {
            log::warn!("📡 {} set - starting in offline mode", OFFLINE_ENV);
        }
        Self {
            online: Arc::new(AtomicBool::new(!forced_offline)),
        }
    }

    /// 指定初始状态创建（测试用）
    pub fn with_state(online: bool) -> Self {
        Self {
            online: Arc::new(AtomicBool::new(online)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// 更新在线状态
    ///
    /// 返回 true 表示发生了离线→在线的转换，调用方应触发一次重新同步
    /// （对应原系统 window 'online' 事件后的延迟同步）。
    pub fn set_online(&self, online: bool) -> bool {
        let was_online = self.online.swap(online, Ordering::SeqCst);

        match (was_online, online) {
            (false, true) => {
                log::info!("🌐 Connection restored");
                true
            }
            (true, false) => {
                log::info!("📡 Connection lost - offline mode");
                false
            }
            _ => false,
        }
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}
