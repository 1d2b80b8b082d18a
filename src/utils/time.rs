//! 时间工具
//!
//! 统一的时间戳格式：磁盘上存 RFC 3339，界面上显示本地化短格式

use chrono::{DateTime, Local, Utc};

/// 日志行使用的时间戳（本地时间，到秒）
pub fn log_timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// 界面显示用的完整时间（本地时间）
pub fn display_datetime(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%d/%m/%Y %H:%M:%S").to_string()
}

/// 上次同步时间的显示文本，从未同步时返回 "never"
pub fn display_last_sync(last_sync: Option<&DateTime<Utc>>) -> String {
    match last_sync {
        Some(ts) => display_datetime(ts),
        None => "never".to_string(),
    }
}
