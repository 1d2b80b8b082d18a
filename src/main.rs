use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use evalsync::sync::run_auto_sync;
use evalsync::{
    default_data_dir, DetailedStatus, KvStore, NetworkMonitor, SyncEngine, SystemConfig,
};

/// Evalsync CLI
///
/// 评估数据的离线优先同步工具 - localStorage 时代同步脚本的 Rust 实现
#[derive(Parser)]
#[command(name = "evalsync")]
#[command(author, version = env!("APP_VERSION"), about)]
#[command(
    long_about = "Offline-first synchronization helper for evaluation tracking data.\n\
                        Reconciles the local snapshot against a simulated remote copy using\n\
                        last-write-wins on whole snapshots."
)]
struct Cli {
    /// 数据目录（默认：平台数据目录下的 evalsync/）
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 配置公司 id 并触发初始同步
    Configure {
        /// 公司 id（自动去空白并转大写）
        company_id: String,
    },

    /// 手动执行一次同步
    Sync,

    /// 显示连接状态与本地数据概况
    Status,

    /// 测试与服务端的连接
    Test,

    /// 重置在线配置（本地数据保留）
    Reset {
        /// 跳过确认
        #[arg(short, long)]
        force: bool,
    },

    /// 查看同步日志
    Log {
        /// 清空日志
        #[arg(long)]
        clear: bool,

        /// 显示最近 N 行
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,
    },

    /// 周期性自动同步（Ctrl-C 退出）
    Watch,
}

// ═══════════════════════════════════════════════════════════════════
// 命令实现
// ═══════════════════════════════════════════════════════════════════

async fn configure(engine: &mut SyncEngine, company_id: &str) -> Result<()> {
    let normalized = match engine.configure_company(company_id) {
        Ok(id) => id,
        Err(e) => {
            println!("{}", format!("❌ {}", e).red());
            std::process::exit(1);
        }
    };

    println!("{}", format!("🏢 Company configured: {}", normalized).green());

    // 配置后立即做一次初始同步（原系统在配置后延迟触发）
    if engine.initialize().await? {
        println!("{}", "🌐 Data synchronized successfully!".green());
    } else {
        println!(
            "{}",
            "⚠️ Initial sync not performed - check connection and try 'evalsync sync'".yellow()
        );
    }

    Ok(())
}

async fn sync_manual(engine: &mut SyncEngine) -> Result<()> {
    if !engine.online_config().is_configured() {
        println!("{}", "❌ Configure the company first!".red());
        println!("Run {} to configure", "evalsync configure <COMPANY_ID>".cyan());
        return Ok(());
    }

    println!("{}", "🔄 Syncing...".cyan());

    match engine.synchronize().await {
        Ok(Some(outcome)) => {
            println!("{}", "✅ Synchronized!".green());
            if outcome.had_conflict {
                let side = match outcome.winner {
                    evalsync::models::Winner::Local => "local",
                    evalsync::models::Winner::Remote => "server",
                };
                println!("   🔧 Conflict resolved: {} snapshot kept", side.yellow());
            } else {
                println!("   ✅ No conflict detected");
            }
            println!("   📊 Records in snapshot: {}", outcome.records);
        }
        Ok(None) => {
            println!("{}", "⚠️ Synchronization not available (offline?)".yellow());
        }
        Err(e) => {
            println!("{}", format!("❌ Sync error: {:#}", e).red());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn show_status(engine: &SyncEngine, data_dir: &std::path::Path) -> Result<()> {
    let config = engine.online_config();
    let status = DetailedStatus::derive(&config, engine.sync_state());

    println!(
        "{}",
        "╔══════════════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║                  Evalsync Status                     ║".cyan()
    );
    println!(
        "{}",
        "╚══════════════════════════════════════════════════════╝".cyan()
    );
    println!();
    println!("📁 Data dir: {}", data_dir.display().to_string().green());
    println!();

    println!(
        "🔌 Connection: {}",
        status.connection.label().color(status.connection.terminal_color())
    );
    println!(
        "⚙️  Mode: {}",
        status.mode.label().color(status.mode.terminal_color())
    );

    match &status.company {
        Some(company) => println!("🏢 Company: {}", format!("✅ {}", company).green()),
        None => println!("🏢 Company: {}", "❌ not configured".red()),
    }

    if status.last_sync == "never" {
        println!("🕐 Last sync: {}", "❌ never".red());
    } else {
        println!("🕐 Last sync: {}", format!("✅ {}", status.last_sync).green());
    }

    if let Some(error) = &status.last_error {
        println!("⚠️  Last error: {}", error.red());
    }

    // 本地数据概况
    let snapshot = engine.local_snapshot()?;
    println!();
    println!("📊 Local data:");
    println!("   Evaluations: {}", snapshot.evaluations.len());
    println!("   Collaborators: {}", snapshot.collaborators.len());
    println!("   Managers: {}", snapshot.managers.len());

    Ok(())
}

async fn test_connection(engine: &mut SyncEngine) -> Result<()> {
    println!("{}", "🔍 Testing connection...".cyan());

    if engine.test_connection().await? {
        println!("{}", "✅ Connection tested successfully!".green());
    } else {
        println!("{}", "❌ No internet connection!".red());
        std::process::exit(1);
    }

    Ok(())
}

fn reset(engine: &mut SyncEngine, force: bool) -> Result<()> {
    if !force {
        println!(
            "{}",
            "⚠️ This resets all online configuration (local data is kept).".yellow()
        );
        println!("Re-run with {} to confirm", "--force".cyan());
        return Ok(());
    }

    engine.reset_online_config()?;
    println!(
        "{}",
        "🗑️ Online configuration reset! System in local mode.".yellow()
    );

    Ok(())
}

fn show_log(engine: &SyncEngine, clear: bool, lines: usize) -> Result<()> {
    if clear {
        engine.sync_log().clear()?;
        println!("{}", "🗑️ Sync log cleared".yellow());
        return Ok(());
    }

    let tail = engine.sync_log().tail(lines);
    if tail.is_empty() {
        println!("{}", "📭 Sync log is empty".yellow());
    } else {
        for line in tail {
            println!("{}", line);
        }
    }

    Ok(())
}

async fn watch(engine: &mut SyncEngine, config: &SystemConfig) -> Result<()> {
    println!(
        "{}",
        format!(
            "⏰ Auto-sync every {}s - Ctrl-C to stop",
            config.sync_interval_secs
        )
        .cyan()
    );

    engine.initialize().await?;

    tokio::select! {
        _ = run_auto_sync(engine, config.sync_interval()) => {}
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("{}", "👋 Stopping auto-sync".yellow());
        }
    }

    // 活跃在线会话退出时打标记（原 beforeunload 行为）
    engine.record_forced_exit()?;

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    let config = SystemConfig::load(&data_dir)?;
    let store = KvStore::new(&data_dir, config.storage_prefix.clone());
    let monitor = NetworkMonitor::new();
    let mut engine = SyncEngine::new(store, &config, monitor);

    match cli.command {
        Commands::Configure { company_id } => configure(&mut engine, &company_id).await,
        Commands::Sync => sync_manual(&mut engine).await,
        Commands::Status => show_status(&engine, &data_dir),
        Commands::Test => test_connection(&mut engine).await,
        Commands::Reset { force } => reset(&mut engine, force),
        Commands::Log { clear, lines } => show_log(&engine, clear, lines),
        Commands::Watch => watch(&mut engine, &config).await,
    }
}
