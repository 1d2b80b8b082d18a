//! 配置模块
//!
//! SystemConfig：进程级参数（存储前缀、同步间隔、模拟延迟），
//! 默认值 + 数据目录下可选的 config.json 覆盖。
//! OnlineConfig：持久化的在线状态（公司 id、激活标记、上次同步时间）。

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::OnlineConfig;
use crate::store::KvStore;
use crate::utils::try_read_file;

const COMPANY_ID_KEY: &str = "company_id";
const ACTIVE_KEY: &str = "active";
const LAST_SYNC_KEY: &str = "last_sync";

/// 系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// 存储 key 前缀
    pub storage_prefix: String,

    /// 自动同步间隔（秒）
    pub sync_interval_secs: u64,

    /// 模拟拉取延迟（毫秒）
    pub fetch_latency_ms: u64,

    /// 模拟推送延迟（毫秒）
    pub push_latency_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            storage_prefix: "evalsync_".to_string(),
            sync_interval_secs: 300,
            fetch_latency_ms: 1000,
            push_latency_ms: 500,
        }
    }
}

impl SystemConfig {
    /// 从数据目录加载配置，config.json 不存在时使用默认值
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("config.json");

        match try_read_file(&path) {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
            None => Ok(Self::default()),
        }
    }

    /// 测试/演示用：去掉模拟延迟
    pub fn without_latency(mut self) -> Self {
        self.fetch_latency_ms = 0;
        self.push_latency_ms = 0;
        self
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }

    pub fn push_latency(&self) -> Duration {
        Duration::from_millis(self.push_latency_ms)
    }
}

/// 默认数据目录：~/.local/share/evalsync（平台相关）
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evalsync")
}

/// 从存储读取在线配置，缺失的 key 逐项回退默认值
pub fn load_online_config(store: &KvStore) -> OnlineConfig {
    OnlineConfig {
        company_id: store.get::<String>(COMPANY_ID_KEY).ok().flatten(),
        active: store.get::<bool>(ACTIVE_KEY).ok().flatten().unwrap_or(false),
        last_sync: store.get::<DateTime<Utc>>(LAST_SYNC_KEY).ok().flatten(),
    }
}

/// 写回在线配置
pub fn save_online_config(store: &KvStore, config: &OnlineConfig) -> Result<()> {
    match &config.company_id {
        Some(id) => store.put(COMPANY_ID_KEY, id)?,
        None => store.remove(COMPANY_ID_KEY)?,
    }

    store.put(ACTIVE_KEY, &config.active)?;

    match &config.last_sync {
        Some(ts) => store.put(LAST_SYNC_KEY, ts)?,
        None => store.remove(LAST_SYNC_KEY)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SystemConfig::default();
        assert_eq!(config.storage_prefix, "evalsync_");
        assert_eq!(config.sync_interval_secs, 300);
        assert_eq!(config.fetch_latency_ms, 1000);
        assert_eq!(config.push_latency_ms, 500);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = SystemConfig::load(temp.path()).unwrap();
        assert_eq!(config.storage_prefix, "evalsync_");
    }

    #[test]
    fn test_load_partial_override() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.json"),
            r#"{"sync_interval_secs": 60}"#,
        )
        .unwrap();

        let config = SystemConfig::load(temp.path()).unwrap();
        assert_eq!(config.sync_interval_secs, 60);
        // 其余字段保持默认
        assert_eq!(config.fetch_latency_ms, 1000);
    }

    #[test]
    fn test_online_config_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::new(temp.path(), "test_");

        let config = OnlineConfig {
            company_id: Some("ACME".to_string()),
            active: true,
            last_sync: Some(Utc::now()),
        };

        save_online_config(&store, &config).unwrap();
        let loaded = load_online_config(&store);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_online_config_reset_removes_keys() {
        let temp = TempDir::new().unwrap();
        let store = KvStore::new(temp.path(), "test_");

        let config = OnlineConfig {
            company_id: Some("ACME".to_string()),
            active: true,
            last_sync: Some(Utc::now()),
        };
        save_online_config(&store, &config).unwrap();

        save_online_config(&store, &OnlineConfig::default()).unwrap();
        let loaded = load_online_config(&store);
        assert!(loaded.company_id.is_none());
        assert!(!loaded.active);
        assert!(loaded.last_sync.is_none());
    }
}
