//! # API 服务器
//!
//! Axum HTTP 服务器，Ctrl-C 时优雅停机。

use std::net::{IpAddr, SocketAddr};
use std::ops::Deref;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app::AppContext;
use crate::config::ServerConfig;
use crate::error::{Context, Result, ServiceError};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 服务器应用状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    #[must_use]
    pub const fn context_arc(&self) -> &Arc<AppContext> {
        &self.context
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// API 服务器
pub struct ApiServer {
    config: ServerConfig,
    router: Router,
}

impl ApiServer {
    /// 创建服务器
    #[must_use]
    pub fn new(context: Arc<AppContext>) -> Self {
        let config = context.config.server.clone();
        let router = Self::create_router(AppState::new(context), &config);
        Self { config, router }
    }

    /// 创建路由器
    fn create_router(state: AppState, config: &ServerConfig) -> Router {
        let app = super::routes::create_routes(state);
        let service_builder = ServiceBuilder::new().layer(TraceLayer::new_for_http());

        if config.enable_cors {
            let cors_layer = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
                .allow_headers(Any);
            app.layer(service_builder.layer(cors_layer))
        } else {
            app.layer(service_builder)
        }
    }

    /// 路由器（测试中直接驱动）
    #[must_use]
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// 监听地址
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ip = self.config.bind_address.parse::<IpAddr>().map_err(|e| {
            ServiceError::config_with_source(
                format!("监听地址格式错误: {}", self.config.bind_address),
                e,
            )
        })?;
        Ok(SocketAddr::new(ip, self.config.port))
    }

    /// 启动服务器，直到收到 Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let addr = self.bind_address()?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "server_start",
            &format!("Starting server on {addr}")
        );

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("无法监听 {addr}"))?;

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServiceError::server_start_with_source("服务器运行错误", e))?;

        linfo!(
            "system",
            LogStage::Shutdown,
            LogComponent::ServerSetup,
            "server_stopped",
            "Server stopped"
        );
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        lwarn!(
            "system",
            LogStage::Shutdown,
            LogComponent::ServerSetup,
            "signal_handler_failed",
            &format!("无法监听停止信号: {e}")
        );
        std::future::pending::<()>().await;
    }
    linfo!(
        "system",
        LogStage::Shutdown,
        LogComponent::ServerSetup,
        "shutdown_signal",
        "收到停止信号，开始优雅停机"
    );
}
