//! 状态指示模块
//!
//! 把 (OnlineConfig, SyncState) 映射为界面状态数据。渲染本身不在这里：
//! 调用方（CLI、状态栏等）拿 label/color 自行展示。

use colored::Color;

use crate::models::{OnlineConfig, SyncState};
use crate::utils::display_last_sync;

/// 主连接状态指示
///
/// 判定优先级：未配置公司 > 离线 > 同步中 > 已激活 > 未同步
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    CompanyNotConfigured,
    Offline,
    Syncing,
    Synced,
    NotSynced,
}

impl ConnectionStatus {
    /// 从当前配置和同步状态推导
    pub fn derive(config: &OnlineConfig, state: &SyncState) -> Self {
        if !config.is_configured() {
            Self::CompanyNotConfigured
        } else if !state.online {
            Self::Offline
        } else if state.syncing {
            Self::Syncing
        } else if config.active {
            Self::Synced
        } else {
            Self::NotSynced
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CompanyNotConfigured => "🏢 Configure company",
            Self::Offline => "📡 Offline",
            Self::Syncing => "🔄 Syncing...",
            Self::Synced => "🌐 Synced",
            Self::NotSynced => "⚠️ Not synced",
        }
    }

    /// 原始界面使用的十六进制色值
    pub fn hex_color(&self) -> &'static str {
        match self {
            Self::CompanyNotConfigured | Self::NotSynced => "#ffc107",
            Self::Offline => "#dc3545",
            Self::Syncing => "#17a2b8",
            Self::Synced => "#28a745",
        }
    }

    /// 终端输出用的颜色
    pub fn terminal_color(&self) -> Color {
        match self {
            Self::CompanyNotConfigured | Self::NotSynced => Color::Yellow,
            Self::Offline => Color::Red,
            Self::Syncing => Color::Cyan,
            Self::Synced => Color::Green,
        }
    }
}

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// 纯本地
    Local,
    /// 配置了公司但尚未同步成功
    OnlineConfigured,
    /// 在线且已同步
    OnlineSynced,
}

impl OperationMode {
    pub fn derive(config: &OnlineConfig) -> Self {
        if config.active {
            Self::OnlineSynced
        } else if config.is_configured() {
            Self::OnlineConfigured
        } else {
            Self::Local
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Local => "📱 Local mode",
            Self::OnlineConfigured => "🔄 Online configured",
            Self::OnlineSynced => "🌐 Online synced",
        }
    }

    pub fn terminal_color(&self) -> Color {
        match self {
            Self::Local => Color::White,
            Self::OnlineConfigured => Color::Yellow,
            Self::OnlineSynced => Color::Green,
        }
    }
}

/// 状态屏使用的完整状态快照
#[derive(Debug, Clone)]
pub struct DetailedStatus {
    pub connection: ConnectionStatus,
    pub mode: OperationMode,

    /// 已配置的公司 id
    pub company: Option<String>,

    /// 上次同步时间的显示文本（从未同步时为 "never"）
    pub last_sync: String,

    pub last_error: Option<String>,
}

impl DetailedStatus {
    pub fn derive(config: &OnlineConfig, state: &SyncState) -> Self {
        Self {
            connection: ConnectionStatus::derive(config, state),
            mode: OperationMode::derive(config),
            company: config.company_id.clone(),
            last_sync: display_last_sync(config.last_sync.as_ref()),
            last_error: state.last_error.clone(),
        }
    }
}
