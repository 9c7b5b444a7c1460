//! 应用入口 - 编排层
//!
//! 负责启动：打印配置、创建共享状态、绑定端口、运行 HTTP 服务直到收到 Ctrl+C

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .with_context(|| format!("无效的监听地址: {}:{}", config.host, config.port))?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("无法绑定端口: {}", addr))?;

        let state = Arc::new(AppState::from_config(&config));

        Ok(Self { listener, state })
    }

    /// 运行 HTTP 服务
    pub async fn run(self) -> Result<()> {
        let addr = self.listener.local_addr()?;
        info!("✓ Rheto 评分服务已启动: http://{}", addr);

        axum::serve(self.listener, create_router(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP 服务异常退出")?;

        info!("服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("无法监听 Ctrl+C 信号: {}", e);
        std::future::pending::<()>().await;
    }
    info!("收到 Ctrl+C，正在关闭服务...");
}
