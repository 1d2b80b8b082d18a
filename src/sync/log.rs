//! 同步日志
//!
//! 带时间戳的追加日志，落在数据目录的 sync.log。
//! 原系统在 DOM 里只保留最近 50 行，这里对文件做同样的截断。

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::utils::{log_timestamp, try_read_file, write_file};

/// 日志保留的最大行数
const MAX_LINES: usize = 50;

/// 同步事件日志
#[derive(Debug, Clone)]
pub struct SyncLog {
    path: PathBuf,
}

impl SyncLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一条日志，超过 MAX_LINES 时丢弃最旧的行
    pub fn append(&self, message: &str) -> Result<()> {
        let mut lines: Vec<String> = try_read_file(&self.path)
            .map(|c| c.lines().map(String::from).collect())
            .unwrap_or_default();

        lines.push(format!("[{}] {}", log_timestamp(), message));

        if lines.len() > MAX_LINES {
            let excess = lines.len() - MAX_LINES;
            lines.drain(..excess);
        }

        write_file(&self.path, &(lines.join("\n") + "\n"))
    }

    /// 最近 n 行（不足 n 行时全部返回）
    pub fn tail(&self, n: usize) -> Vec<String> {
        let lines: Vec<String> = try_read_file(&self.path)
            .map(|c| c.lines().map(String::from).collect())
            .unwrap_or_default();

        let skip = lines.len().saturating_sub(n);
        lines.into_iter().skip(skip).collect()
    }

    /// 清空日志
    pub fn clear(&self) -> Result<()> {
        write_file(&self.path, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_tail() {
        let temp = TempDir::new().unwrap();
        let log = SyncLog::new(temp.path().join("sync.log"));

        log.append("first").unwrap();
        log.append("second").unwrap();

        let lines = log.tail(10);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("first"));
        assert!(lines[1].contains("second"));
    }

    #[test]
    fn test_cap_at_50_lines() {
        let temp = TempDir::new().unwrap();
        let log = SyncLog::new(temp.path().join("sync.log"));

        for i in 0..60 {
            log.append(&format!("entry {}", i)).unwrap();
        }

        let lines = log.tail(100);
        assert_eq!(lines.len(), 50);
        // 最旧的 10 条已被丢弃
        assert!(lines[0].contains("entry 10"));
        assert!(lines[49].contains("entry 59"));
    }

    #[test]
    fn test_clear() {
        let temp = TempDir::new().unwrap();
        let log = SyncLog::new(temp.path().join("sync.log"));

        log.append("something").unwrap();
        log.clear().unwrap();
        assert!(log.tail(10).is_empty());
    }

    #[test]
    fn test_tail_fewer_than_requested() {
        let temp = TempDir::new().unwrap();
        let log = SyncLog::new(temp.path().join("sync.log"));

        log.append("only").unwrap();
        assert_eq!(log.tail(5).len(), 1);
    }
}
