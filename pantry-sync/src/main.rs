use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pantry_sync::notify::LogNotifier;
use pantry_sync::{PantrySync, setup_environment};

const HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境 (dotenv, 日志) + 配置
    let config = setup_environment();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Pantry sync starting...");

    // 2. 组件装配
    let app = PantrySync::build(config, Arc::new(LogNotifier)).context("failed to build pantry sync")?;

    match app.sessions().load() {
        Some(user) => tracing::info!(user = %user.id, label = %user.label, "Session restored"),
        None => tracing::info!("No active session; scans are no-ops until login"),
    }

    // 3. 登记临期扫描 (keep existing)
    let registration = app.start().context("failed to register expiry scan")?;
    tracing::info!(?registration, "Expiry scan registered");

    // 4. 运行直到 Ctrl-C，期间定期检查作业 runner
    let mut health = tokio::time::interval(HEALTH_CHECK_INTERVAL);
    health.tick().await;
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for shutdown signal")?;
                break;
            }
            _ = health.tick() => {
                if let Err(e) = app.check_health() {
                    tracing::error!(error = %e, "Health check failed");
                }
            }
        }
    }
    tracing::info!("Shutdown signal received");

    app.shutdown().await;
    Ok(())
}
