//! 键值存储
//!
//! 每个 key 对应数据目录下的一个 JSON 文件：`<dir>/<prefix><key>.json`。
//! 本地数据与模拟服务端数据共用同一个目录，靠 key 前缀区分（`server_*`）。

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse value for key '{key}': {source}")]
    Deserialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 文件后端的键值存储
#[derive(Debug, Clone)]
pub struct KvStore {
    dir: PathBuf,
    prefix: String,
}

impl KvStore {
    /// 创建存储实例（目录延迟创建，首次写入时建立）
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// 存储目录
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// key 对应的磁盘路径（诊断用）
    pub fn raw_path(&self, key: &str) -> PathBuf {
        // key 不允许携带路径分隔符
        debug_assert!(!key.contains('/') && !key.contains('\\'));
        self.dir.join(format!("{}{}.json", self.prefix, key))
    }

    /// 读取 key，文件不存在时返回 Ok(None)
    ///
    /// 损坏的 JSON 以 Deserialize 错误上抛，是否回退默认值由调用方决定。
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let path = self.raw_path(key);

        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: e,
                })
            }
        };

        let value = serde_json::from_str(&content).map_err(|e| StoreError::Deserialize {
            key: key.to_string(),
            source: e,
        })?;

        Ok(Some(value))
    }

    /// 读取 key，缺失或解析失败时返回默认值
    pub fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key).ok().flatten().unwrap_or_default()
    }

    /// 写入 key（格式化 JSON）
    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialize {
            key: key.to_string(),
            source: e,
        })?;

        let path = self.raw_path(key);

        // 确保父目录存在
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                key: key.to_string(),
                source: e,
            })?;
        }

        fs::write(&path, json).map_err(|e| StoreError::Io {
            key: key.to_string(),
            source: e,
        })
    }

    /// 删除 key，不存在时静默成功
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.raw_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io {
                key: key.to_string(),
                source: e,
            }),
        }
    }

    /// 检查 key 是否存在
    pub fn contains(&self, key: &str) -> bool {
        self.raw_path(key).exists()
    }
}
