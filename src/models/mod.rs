//! 数据模型
//!
//! 定义 DataSnapshot, SyncState, OnlineConfig, Conflict 等数据结构。
//! 快照是同步的最小单位：冲突解决整体替换，从不做字段级合并。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 一条评估记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub id: String,

    /// 被评估的协作者 id
    pub collaborator: String,

    /// 执行评估的管理者 id
    pub manager: Option<String>,

    pub score: f64,

    #[serde(default)]
    pub comments: String,

    pub date: DateTime<Utc>,
}

/// 协作者
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Collaborator {
    pub name: String,

    #[serde(default)]
    pub department: String,

    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// 管理者
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Manager {
    pub name: String,

    #[serde(default)]
    pub department: String,
}

/// 完整的数据快照
///
/// 本地任一时刻恰好有一份"当前"快照；时间戳用于 last-write-wins 比较。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataSnapshot {
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,

    #[serde(default)]
    pub collaborators: BTreeMap<String, Collaborator>,

    #[serde(default)]
    pub managers: BTreeMap<String, Manager>,

    pub timestamp: DateTime<Utc>,
}

impl DataSnapshot {
    /// 空快照，时间戳取当前时间
    pub fn empty_now() -> Self {
        Self {
            evaluations: Vec::new(),
            collaborators: BTreeMap::new(),
            managers: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// 记录总数（诊断输出用）
    pub fn record_count(&self) -> usize {
        self.evaluations.len() + self.collaborators.len() + self.managers.len()
    }
}

/// 连接与同步的瞬时状态
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SyncState {
    pub online: bool,

    pub syncing: bool,

    pub last_error: Option<String>,
}

/// 在线配置 - 对应存储中的 company_id / active / last_sync
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OnlineConfig {
    pub company_id: Option<String>,

    #[serde(default)]
    pub active: bool,

    pub last_sync: Option<DateTime<Utc>>,
}

impl OnlineConfig {
    /// 是否已配置公司
    pub fn is_configured(&self) -> bool {
        self.company_id.is_some()
    }
}

/// 冲突检测结果：两侧快照 + 时间戳是否不一致
#[derive(Debug, Clone)]
pub struct Conflict {
    pub local: DataSnapshot,
    pub remote: DataSnapshot,
    pub has_conflict: bool,
}

/// 冲突解决的胜出方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Local,
    Remote,
}

/// 一次完成的同步结果
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub winner: Winner,

    /// 胜出快照的时间戳
    pub snapshot_timestamp: DateTime<Utc>,

    /// 胜出快照中的记录总数
    pub records: usize,

    /// 本次是否检测到冲突
    pub had_conflict: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_record_count() {
        let mut snapshot = DataSnapshot::empty_now();
        assert_eq!(snapshot.record_count(), 0);

        snapshot.collaborators.insert(
            "c1".to_string(),
            Collaborator {
                name: "Ana".to_string(),
                department: "QA".to_string(),
                active: true,
            },
        );
        snapshot.managers.insert(
            "m1".to_string(),
            Manager {
                name: "Bruno".to_string(),
                department: "QA".to_string(),
            },
        );
        assert_eq!(snapshot.record_count(), 2);
    }

    #[test]
    fn test_snapshot_missing_fields_default() {
        // 服务端可能只存了时间戳
        let json = r#"{"timestamp": "2025-01-01T00:00:00Z"}"#;
        let snapshot: DataSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.evaluations.is_empty());
        assert!(snapshot.collaborators.is_empty());
        assert!(snapshot.managers.is_empty());
    }

    #[test]
    fn test_evaluation_optional_fields() {
        // manager 缺席、comments 缺省都是合法记录
        let json = r#"[{
            "id": "ev-1",
            "collaborator": "c1",
            "manager": null,
            "score": 8.5,
            "date": "2025-02-10T12:00:00Z"
        }]"#;
        let evaluations: Vec<Evaluation> = serde_json::from_str(json).unwrap();
        assert_eq!(evaluations.len(), 1);
        assert!(evaluations[0].manager.is_none());
        assert_eq!(evaluations[0].comments, "");
    }

    #[test]
    fn test_online_config_is_configured() {
        let mut config = OnlineConfig::default();
        assert!(!config.is_configured());

        config.company_id = Some("ACME".to_string());
        assert!(config.is_configured());
    }
}
