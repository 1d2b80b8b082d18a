//! 同步引擎
//!
//! 原流程的完整移植：拉取服务端快照 → 比较时间戳 → 整体取舍（last-write-wins）
//! → 本地保存 → 推送回服务端 → 更新 last_sync。
//! 快照整体替换，从不做字段级合并。

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{load_online_config, save_online_config, SystemConfig};
use crate::connectivity::NetworkMonitor;
use crate::models::{Conflict, DataSnapshot, OnlineConfig, SyncOutcome, SyncState, Winner};
use crate::store::KvStore;
use crate::sync::{RemoteStore, SyncLog};

const EVALUATIONS_KEY: &str = "evaluations";
const COLLABORATORS_KEY: &str = "collaborators";
const MANAGERS_KEY: &str = "managers";
const LAST_MODIFIED_KEY: &str = "last_modified";
const FORCED_EXIT_KEY: &str = "forced_exit";

lazy_static! {
    /// 公司 id：大写字母/数字开头，2-32 位，允许 - 和 _
    static ref COMPANY_ID: Regex = Regex::new(r"^[A-Z0-9][A-Z0-9_-]{1,31}$").unwrap();
}

/// 同步引擎
pub struct SyncEngine {
    store: KvStore,
    remote: RemoteStore,
    monitor: NetworkMonitor,
    sync_log: SyncLog,
    state: SyncState,
}

impl SyncEngine {
    pub fn new(store: KvStore, config: &SystemConfig, monitor: NetworkMonitor) -> Self {
        let remote = RemoteStore::new(
            store.clone(),
            config.fetch_latency(),
            config.push_latency(),
        );
        let sync_log = SyncLog::new(store.dir().join("sync.log"));
        let state = SyncState {
            online: monitor.is_online(),
            syncing: false,
            last_error: None,
        };

        Self {
            store,
            remote,
            monitor,
            sync_log,
            state,
        }
    }

    /// 当前在线配置（每次从存储读取，存储是唯一事实来源）
    pub fn online_config(&self) -> OnlineConfig {
        load_online_config(&self.store)
    }

    /// 当前同步状态
    pub fn sync_state(&self) -> &SyncState {
        &self.state
    }

    pub fn sync_log(&self) -> &SyncLog {
        &self.sync_log
    }

    /// 更新在线标记，返回 true 表示应触发一次重新同步
    pub fn set_online(&mut self, online: bool) -> bool {
        let restored = self.monitor.set_online(online);
        self.state.online = online;

        if restored {
            self.log_line("🌐 Internet connection restored");
        } else if !online {
            self.log_line("📡 Internet connection lost - offline mode");
        }

        restored && self.online_config().is_configured()
    }

    // ═══════════════════════════════════════════════════════════════════
    // 初始化与同步流程
    // ═══════════════════════════════════════════════════════════════════

    /// 初始化在线系统
    ///
    /// 公司未配置或离线时停在本地模式；否则做一次初始同步，
    /// 成功后把 active 置位。同步失败不上抛，只记录并返回 false。
    pub async fn initialize(&mut self) -> Result<bool> {
        log::info!("🌐 Initializing online system...");

        let mut config = self.online_config();

        if !config.is_configured() {
            log::info!("🏢 Company not configured - local mode");
            return Ok(false);
        }

        if !self.monitor.is_online() {
            log::info!("📡 No connection - offline mode");
            return Ok(false);
        }

        match self.synchronize().await {
            Ok(_) => {
                config = self.online_config();
                config.active = true;
                save_online_config(&self.store, &config)?;
                log::info!("✅ Online system active");
                Ok(true)
            }
            Err(e) => {
                log::error!("❌ Failed to initialize online system: {:#}", e);
                Ok(false)
            }
        }
    }

    /// 执行一次同步
    ///
    /// 前置条件不满足（公司未配置或离线）时返回 Ok(None)。
    /// 无论成功失败，返回前 syncing 标记一定被清除。
    pub async fn synchronize(&mut self) -> Result<Option<SyncOutcome>> {
        let config = self.online_config();
        if !config.is_configured() || !self.monitor.is_online() {
            log::warn!("⚠️ Synchronization not available");
            return Ok(None);
        }

        self.state.syncing = true;
        self.state.last_error = None;
        self.log_line("🔄 Starting synchronization...");

        let result = self.run_pipeline().await;

        // finally 语义：错误路径也要清标记
        self.state.syncing = false;

        match result {
            Ok(outcome) => {
                log::info!("✅ Synchronization complete");
                self.log_line("✅ Synchronization completed successfully");
                Ok(Some(outcome))
            }
            Err(e) => {
                let message = format!("{:#}", e);
                log::error!("❌ Synchronization error: {}", message);
                self.log_line(&format!("❌ Synchronization error: {}", message));
                self.state.last_error = Some(message);
                Err(e)
            }
        }
    }

    /// 同步主体：拉取 → 检测 → 解决 → 保存 → 推送 → 更新 last_sync
    async fn run_pipeline(&mut self) -> Result<SyncOutcome> {
        self.log_line("📥 Connecting to server...");
        let remote_snapshot = self.remote.fetch().await.context("fetch from server")?;

        let conflict = self.detect_conflict(remote_snapshot)?;
        let had_conflict = conflict.has_conflict;

        let (winner_snapshot, winner) = self.resolve_conflict(conflict);

        self.save_local(&winner_snapshot)
            .context("save snapshot locally")?;
        self.log_line("💾 Data saved locally");

        self.log_line("📤 Sending data to server...");
        self.remote
            .push(&winner_snapshot)
            .await
            .context("push to server")?;
        self.log_line("📤 Data sent successfully");

        let mut config = self.online_config();
        config.last_sync = Some(Utc::now());
        save_online_config(&self.store, &config)?;

        Ok(SyncOutcome {
            winner,
            snapshot_timestamp: winner_snapshot.timestamp,
            records: winner_snapshot.record_count(),
            had_conflict,
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // 冲突检测与解决
    // ═══════════════════════════════════════════════════════════════════

    /// 读取当前本地快照，缺失的 last_modified 按当前时间处理
    pub fn local_snapshot(&self) -> Result<DataSnapshot> {
        Ok(DataSnapshot {
            evaluations: self.store.get(EVALUATIONS_KEY)?.unwrap_or_default(),
            collaborators: self.store.get(COLLABORATORS_KEY)?.unwrap_or_default(),
            managers: self.store.get(MANAGERS_KEY)?.unwrap_or_default(),
            timestamp: self
                .store
                .get::<DateTime<Utc>>(LAST_MODIFIED_KEY)?
                .unwrap_or_else(Utc::now),
        })
    }

    /// 冲突判定：两侧时间戳不相等即视为冲突
    pub fn detect_conflict(&self, remote: DataSnapshot) -> Result<Conflict> {
        let local = self.local_snapshot()?;
        let has_conflict = remote.timestamp != local.timestamp;

        Ok(Conflict {
            local,
            remote,
            has_conflict,
        })
    }

    /// last-write-wins：没有冲突保持本地；有冲突时较新的时间戳整体胜出，
    /// 平局保持本地
    pub fn resolve_conflict(&self, conflict: Conflict) -> (DataSnapshot, Winner) {
        log::info!("🔧 Resolving conflicts...");
        self.log_line("🔧 Analyzing conflicts...");

        if !conflict.has_conflict {
            log::info!("✅ No conflict detected");
            self.log_line("✅ No conflict detected");
            return (conflict.local, Winner::Local);
        }

        if conflict.remote.timestamp > conflict.local.timestamp {
            log::info!("📥 Server data is more recent");
            self.log_line("📥 Applying server data (more recent)");
            (conflict.remote, Winner::Remote)
        } else {
            log::info!("📤 Local data is more recent");
            self.log_line("📤 Keeping local data (more recent)");
            (conflict.local, Winner::Local)
        }
    }

    /// 整体写入本地快照（含 last_modified）
    pub fn save_local(&self, snapshot: &DataSnapshot) -> Result<()> {
        self.store.put(EVALUATIONS_KEY, &snapshot.evaluations)?;
        self.store.put(COLLABORATORS_KEY, &snapshot.collaborators)?;
        self.store.put(MANAGERS_KEY, &snapshot.managers)?;
        self.store.put(LAST_MODIFIED_KEY, &snapshot.timestamp)?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // 公司配置
    // ═══════════════════════════════════════════════════════════════════

    /// 配置公司 id：去空白、转大写、校验后持久化
    ///
    /// 返回规范化后的 id。是否接着触发初始同步由调用方决定。
    pub fn configure_company(&mut self, raw: &str) -> Result<String> {
        let company_id = raw.trim().to_uppercase();

        if company_id.is_empty() {
            bail!("company id is required");
        }
        if !COMPANY_ID.is_match(&company_id) {
            bail!("invalid company id '{}' (expected 2-32 chars: A-Z, 0-9, '-', '_')", company_id);
        }

        let mut config = self.online_config();
        config.company_id = Some(company_id.clone());
        save_online_config(&self.store, &config)?;

        log::info!("🏢 Company configured: {}", company_id);
        self.log_line(&format!("🏢 Company configured: {}", company_id));

        Ok(company_id)
    }

    /// 重置在线配置：清掉公司 id 和 last_sync，本地数据保留
    pub fn reset_online_config(&mut self) -> Result<()> {
        save_online_config(&self.store, &OnlineConfig::default())?;
        self.store.remove(FORCED_EXIT_KEY)?;
        self.sync_log.clear()?;

        self.log_line("🗑️ Online configuration reset");
        log::warn!("🗑️ Online configuration reset - local mode");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // 连接测试与退出记录
    // ═══════════════════════════════════════════════════════════════════

    /// 模拟连接测试
    pub async fn test_connection(&mut self) -> Result<bool> {
        self.log_line("🔍 Testing connection...");

        if !self.monitor.is_online() {
            self.log_line("❌ No internet connection");
            return Ok(false);
        }

        // 模拟探测耗时：按一次拉取 + 一次推送估算（原系统固定 2 秒）
        let probe = self.remote.fetch_latency() + self.remote.push_latency();
        tokio::time::sleep(probe).await;

        self.log_line("✅ Server connection OK");
        Ok(true)
    }

    /// 活跃在线会话终止时打退出标记（原 beforeunload 行为）
    pub fn record_forced_exit(&self) -> Result<()> {
        let config = self.online_config();
        if config.active && self.monitor.is_online() {
            self.store.put(FORCED_EXIT_KEY, &Utc::now())?;
        }
        Ok(())
    }

    /// 写同步日志；日志失败只降级为 warning，不影响同步本身
    fn log_line(&self, message: &str) {
        if let Err(e) = self.sync_log.append(message) {
            log::warn!("Failed to write sync log: {:#}", e);
        }
    }
}
