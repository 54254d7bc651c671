mod config;
mod error;
mod server;

use axum::serve;
use config::{Config, LoggingConfig};
use devspace_infra::{DatabaseManager, JwtService};
use devspace_migration::{Migrator, MigratorTrait};
use error::{DevspaceError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    init_tracing(&config.logging)?;
    info!("Starting devspace...");
    info!("Configuration loaded successfully");

    // 初始化数据库连接
    let db_manager = DatabaseManager::new(&config.database.url, &config.database.pool_settings()).await?;
    if config.database.run_migrations {
        Migrator::up(db_manager.primary_db().as_ref(), None)
            .await
            .map_err(|e| DevspaceError::Database(e.to_string()))?;
        info!("Database migrations applied");
    }

    // 初始化JWT服务
    let jwt_service = Arc::new(JwtService::new(
        &config.security.jwt_secret,
        config.security.jwt_issuer.clone(),
        config.security.jwt_expiration,
    )?);

    // 初始化应用状态
    let app_state = server::init_app_state(&db_manager, jwt_service, &config);
    if !app_state.authorize_admins.is_restricted() {
        warn!("security.authorize_admins is empty, any logged-in user can grant namespace access");
    }
    info!(
        sa_namespace = %config.kubernetes.service_account_namespace,
        probe_timeout_secs = config.authorization.probe_timeout_secs,
        "Application state initialized"
    );

    // 创建路由
    let app = server::create_router(app_state);

    // 启动HTTP服务器
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
    info!("Server listening on {}", addr);

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    info!("Server stopped");
    Ok(())
}

/// RUST_LOG优先，否则使用配置中的日志级别
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| DevspaceError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if logging.format.eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| DevspaceError::Logging(e.to_string()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
