//! 模拟远端
//!
//! 真实环境里是 HTTP 调用；这里和原系统一样，用同一个键值存储里
//! 带 server_ 前缀的 key 扮演服务端副本，并保留可配置的模拟延迟。

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::DataSnapshot;
use crate::store::KvStore;

const SERVER_EVALUATIONS_KEY: &str = "server_evaluations";
const SERVER_COLLABORATORS_KEY: &str = "server_collaborators";
const SERVER_MANAGERS_KEY: &str = "server_managers";
const SERVER_TIMESTAMP_KEY: &str = "server_timestamp";

/// 模拟的服务端数据副本
#[derive(Debug, Clone)]
pub struct RemoteStore {
    store: KvStore,
    fetch_latency: Duration,
    push_latency: Duration,
}

impl RemoteStore {
    pub fn new(store: KvStore, fetch_latency: Duration, push_latency: Duration) -> Self {
        Self {
            store,
            fetch_latency,
            push_latency,
        }
    }

    /// 拉取服务端快照
    ///
    /// 缺失的集合按空处理；缺失的时间戳按当前时间处理（与原系统一致）。
    pub async fn fetch(&self) -> Result<DataSnapshot> {
        log::info!("📥 Fetching data from server...");
        tokio::time::sleep(self.fetch_latency).await;

        let snapshot = DataSnapshot {
            evaluations: self.store.get(SERVER_EVALUATIONS_KEY)?.unwrap_or_default(),
            collaborators: self.store.get(SERVER_COLLABORATORS_KEY)?.unwrap_or_default(),
            managers: self.store.get(SERVER_MANAGERS_KEY)?.unwrap_or_default(),
            timestamp: self
                .store
                .get::<DateTime<Utc>>(SERVER_TIMESTAMP_KEY)?
                .unwrap_or_else(Utc::now),
        };

        Ok(snapshot)
    }

    /// 推送快照到服务端
    ///
    /// 服务端时间戳取推送时刻，而不是快照自带的时间戳（原系统行为）。
    pub async fn push(&self, snapshot: &DataSnapshot) -> Result<()> {
        log::info!("📤 Sending data to server...");
        tokio::time::sleep(self.push_latency).await;

        self.store.put(SERVER_EVALUATIONS_KEY, &snapshot.evaluations)?;
        self.store.put(SERVER_COLLABORATORS_KEY, &snapshot.collaborators)?;
        self.store.put(SERVER_MANAGERS_KEY, &snapshot.managers)?;
        self.store.put(SERVER_TIMESTAMP_KEY, &Utc::now())?;

        Ok(())
    }

    /// 服务端是否已有数据
    pub fn has_data(&self) -> bool {
        self.store.contains(SERVER_TIMESTAMP_KEY)
    }

    pub fn fetch_latency(&self) -> Duration {
        self.fetch_latency
    }

    pub fn push_latency(&self) -> Duration {
        self.push_latency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Collaborator;
    use tempfile::TempDir;

    fn remote(temp: &TempDir) -> RemoteStore {
        let store = KvStore::new(temp.path(), "test_");
        RemoteStore::new(store, Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_fetch_empty_server() {
        let temp = TempDir::new().unwrap();
        let remote = remote(&temp);

        assert!(!remote.has_data());
        let snapshot = remote.fetch().await.unwrap();
        assert!(snapshot.evaluations.is_empty());
        assert!(snapshot.collaborators.is_empty());
        assert!(snapshot.managers.is_empty());
    }

    #[tokio::test]
    async fn test_push_then_fetch() {
        let temp = TempDir::new().unwrap();
        let remote = remote(&temp);

        let mut snapshot = DataSnapshot::empty_now();
        snapshot.collaborators.insert(
            "c1".to_string(),
            Collaborator {
                name: "Ana".to_string(),
                department: "QA".to_string(),
                active: true,
            },
        );

        remote.push(&snapshot).await.unwrap();
        assert!(remote.has_data());

        let fetched = remote.fetch().await.unwrap();
        assert_eq!(fetched.collaborators, snapshot.collaborators);
        // push 时服务端重新打了时间戳
        assert!(fetched.timestamp >= snapshot.timestamp);
    }
}
