//! MySQL 管理 HTTP API
//!
//! 对 MySQL 服务器的一层轻量 HTTP 封装：
//! - 列出数据库、列出表
//! - 读取表数据（最多 1000 行）
//! - 原样执行调用方提交的 SQL

mod connection;
mod docs;
mod handlers;
mod routes;
mod service;
mod state;

use std::time::Duration;

use axum::{
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use common::config::{load_dotenv, AppConfig};
use common::middleware::request_context_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "mysql-api";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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
    let config = AppConfig::load();
    info!(
        environment = %config.environment,
        mysql = ?config.mysql,
        cors_origins = ?config.cors_origins,
        docs = config.docs_enabled(),
        "配置已加载"
    );

    let addr = config.bind_addr();
    let app = create_router(AppState::new(config));

    // 启动服务
    info!(service = SERVICE_NAME, address = %addr, "启动服务");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(service = SERVICE_NAME, "服务已停止");
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .merge(routes::router())
        .route(docs::OPENAPI_PATH, get(docs::openapi_json));
    if config.docs_enabled() {
        router = router.merge(docs::router());
    }

    let router = router
        .layer(middleware::from_fn(request_context_middleware))
        .layer(TraceLayer::new_for_http());
    let router = match config.request_timeout_secs {
        Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
        None => router,
    };

    router.layer(cors_layer(&config)).with_state(state)
}

/// CORS policy: credentials allowed, methods and headers mirrored, origins
/// mirrored for `*` and otherwise matched against the configured list.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let list: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "无法监听 Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "无法监听 SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("收到退出信号，开始关闭");
}
