//! 自动同步
//!
//! 周期性触发同步的循环。只有"已激活 + 在线 + 不在同步中"才真正执行，
//! 与原系统 setInterval 里的守卫一致。

use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::models::{OnlineConfig, SyncState};
use crate::sync::SyncEngine;

/// 自动同步的执行条件
pub fn should_auto_sync(config: &OnlineConfig, state: &SyncState) -> bool {
    config.active && state.online && !state.syncing
}

/// 自动同步循环（不返回，调用方用 select 配合退出信号）
pub async fn run_auto_sync(engine: &mut SyncEngine, interval: Duration) {
    log::info!(
        "⏰ Automatic sync configured for every {} minutes",
        interval.as_secs() / 60
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // interval 的第一个 tick 立即完成，先消费掉
    ticker.tick().await;

    loop {
        ticker.tick().await;

        if !should_auto_sync(&engine.online_config(), engine.sync_state()) {
            continue;
        }

        log::info!("⏰ Scheduled automatic sync");
        if let Err(e) = engine.synchronize().await {
            // 失败不中断循环，下个周期重试
            log::error!("❌ Automatic sync failed: {:#}", e);
        }
    }
}
