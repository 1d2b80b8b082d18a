//! CLI 集成测试
//!
//! 走真实二进制 + 临时数据目录；config.json 把模拟延迟归零

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn data_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.json"),
        r#"{"fetch_latency_ms": 0, "push_latency_ms": 0}"#,
    )
    .unwrap();
    temp
}

fn evalsync(temp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("evalsync").unwrap();
    cmd.arg("--data-dir").arg(temp.path());
    cmd.env_remove("EVALSYNC_OFFLINE");
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn status_on_fresh_dir_is_local_mode() {
    let temp = data_dir();

    evalsync(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"))
        .stdout(predicate::str::contains("Local mode"));
}

#[test]
fn sync_without_company_asks_to_configure() {
    let temp = data_dir();

    evalsync(&temp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configure the company first!"));
}

#[test]
fn configure_rejects_invalid_id() {
    let temp = data_dir();

    evalsync(&temp)
        .args(["configure", "has space"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid company id"));
}

#[test]
fn configure_then_status_shows_company_synced() {
    let temp = data_dir();

    evalsync(&temp)
        .args(["configure", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Company configured: ACME"));

    evalsync(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("ACME"))
        .stdout(predicate::str::contains("Online synced"));
}

#[test]
fn offline_env_forces_offline_status() {
    let temp = data_dir();

    evalsync(&temp)
        .args(["configure", "acme"])
        .env("EVALSYNC_OFFLINE", "1")
        .assert()
        .success();

    let mut cmd = evalsync(&temp);
    cmd.env("EVALSYNC_OFFLINE", "1");
    cmd.arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Offline"));
}

#[test]
fn reset_requires_force() {
    let temp = data_dir();

    evalsync(&temp).args(["configure", "acme"]).assert().success();

    // 不带 --force：只提示，不动配置
    evalsync(&temp)
        .arg("reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    evalsync(&temp)
        .arg("status")
        .assert()
        .stdout(predicate::str::contains("ACME"));

    // 带 --force：回到本地模式
    evalsync(&temp)
        .args(["reset", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local mode"));

    evalsync(&temp)
        .arg("status")
        .assert()
        .stdout(predicate::str::contains("Local mode"));
}

#[test]
fn sync_log_records_and_clears() {
    let temp = data_dir();

    evalsync(&temp).args(["configure", "acme"]).assert().success();

    evalsync(&temp)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Synchronization completed successfully"));

    evalsync(&temp)
        .args(["log", "--clear"])
        .assert()
        .success();

    evalsync(&temp)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync log is empty"));
}

#[test]
fn test_command_reports_offline() {
    let temp = data_dir();

    let mut cmd = evalsync(&temp);
    cmd.env("EVALSYNC_OFFLINE", "1");
    cmd.arg("test")
        .assert()
        .failure()
        .stdout(predicate::str::contains("No internet connection"));
}
