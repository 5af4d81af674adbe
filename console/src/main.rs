//! 集群仪表盘终端前端
//!
//! 作为视图层的替身，提供以下功能：
//! - 登录远端集群管理 API 并持久化会话
//! - 启动轮询调度器，保持拓扑快照最新
//! - 订阅状态容器，快照变化时渲染摘要
//! - 展示动作与会话相关的即时通知

mod commands;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use client::actions::ActionDispatcher;
use client::api::ApiClient;
use client::notify::{Notifier, Toast, ToastLevel};
use client::scheduler::RefreshScheduler;
use client::session::SessionStore;
use client::storage::ClientStorage;
use client::store::{TopologySnapshot, TopologyStore};
use common::config::AppConfig;

use commands::{CommandLoop, TerminalConfirm};

const SERVICE_NAME: &str = "console";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file (if present) before anything else
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);

    // 组装客户端核心
    let api = Arc::new(ApiClient::new(&config)?);
    let store = Arc::new(TopologyStore::new());
    let (notifier, mut toasts) = Notifier::channel();
    let storage = ClientStorage::new(&config.storage_dir);
    let session = Arc::new(SessionStore::new(
        api.clone(),
        store.clone(),
        storage.clone(),
        notifier.clone(),
    ));

    // 恢复持久化会话，否则用环境变量中的凭证登录
    if !session.restore().await {
        let username = std::env::var("DASH_USERNAME")
            .context("DASH_USERNAME is required for first login")?;
        let password = std::env::var("DASH_PASSWORD")
            .context("DASH_PASSWORD is required for first login")?;
        session.login(&username, &password).await?;
    }

    // 可选：直接进入指定集群视图
    if let Ok(cluster) = std::env::var("DASH_CLUSTER") {
        if !cluster.is_empty() {
            store.select_cluster(&cluster);
        }
    }

    // 启动轮询调度器
    let scheduler = Arc::new(RefreshScheduler::new(
        api.clone(),
        store.clone(),
        session.clone(),
        storage,
    ));
    if let Some(seconds) = std::env::var("REFRESH_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        scheduler.set_interval(seconds).await;
    }
    scheduler.start().await;

    info!(service = SERVICE_NAME, api_url = %config.api_url, "启动仪表盘");

    // 命令循环：视图切换与经确认的动作分发
    let dispatcher = ActionDispatcher::new(
        api,
        session.clone(),
        notifier,
        Arc::new(TerminalConfirm),
    );
    // 主循环持有一份发送端，标准输入关闭不会误触退出
    let (quit_tx, mut quit) = tokio::sync::mpsc::channel(1);
    CommandLoop {
        store: store.clone(),
        scheduler: scheduler.clone(),
        session: session.clone(),
        dispatcher,
    }
    .spawn(quit_tx.clone());

    // 订阅快照与通知，Ctrl-C 或 quit 命令退出
    let mut snapshots = store.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = quit.recv() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                render(&snapshot);
            }
            toast = toasts.recv() => {
                match toast {
                    Some(toast) => render_toast(&toast),
                    None => break,
                }
            }
        }
    }

    // 退出前取消定时器，避免孤儿轮询任务
    scheduler.stop().await;
    info!(service = SERVICE_NAME, "已退出");
    Ok(())
}

/// 渲染一份拓扑快照摘要
fn render(snapshot: &TopologySnapshot) {
    let stale = if snapshot.stale.any() { " [stale]" } else { "" };
    match &snapshot.selected {
        Some(name) => {
            let servers = snapshot.servers.as_deref().unwrap_or(&[]);
            let degraded = servers.iter().filter(|s| !s.state.is_healthy()).count();
            let master = snapshot
                .master
                .as_ref()
                .map(|m| m.address())
                .unwrap_or_else(|| "-".to_string());
            let alerts = snapshot.alerts.as_ref().map(|a| a.len()).unwrap_or(0);
            println!(
                "#{} cluster={name} master={master} servers={} degraded={degraded} alerts={alerts}{stale}",
                snapshot.revision,
                servers.len(),
            );
        }
        None => {
            let clusters = snapshot.clusters.as_deref().unwrap_or(&[]);
            let down = clusters.iter().filter(|c| c.is_down).count();
            println!(
                "#{} clusters={} down={down}{stale}",
                snapshot.revision,
                clusters.len(),
            );
        }
    }
}

/// 渲染一条即时通知
fn render_toast(toast: &Toast) {
    let tag = match toast.level {
        ToastLevel::Success => "ok",
        ToastLevel::Error => "error",
        ToastLevel::Info => "info",
    };
    println!("[{tag}] {}", toast.message);
}

/// Load .env file from the working directory (best-effort, no error if missing).
fn load_dotenv() {
    let env_path = std::path::Path::new(".env");
    if env_path.exists() {
        if let Ok(content) = std::fs::read_to_string(env_path) {
            for line in content.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim();
                    // Only set if not already set by the environment
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
        }
    }
}
