use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 连接池配置
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 20,
            min_connections: 2,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// DatabaseManager 管理主数据库连接
/// 根据URL前缀自动选择MySQL或PostgreSQL
#[derive(Clone)]
pub struct DatabaseManager {
    primary: Arc<DatabaseConnection>,
}

impl DatabaseManager {
    /// 连接数据库
    pub async fn new(url: &str, pool: &PoolSettings) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let mut options = ConnectOptions::new(url.to_string());
        options
            .max_connections(pool.max_connections)
            .min_connections(pool.min_connections)
            .connect_timeout(pool.connect_timeout)
            .sqlx_logging(false);

        let db = Database::connect(options).await?;
        info!(backend = ?db.get_database_backend(), "Database connected");

        Ok(Self {
            primary: Arc::new(db),
        })
    }

    /// 直接包装已有连接
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            primary: Arc::new(db),
        }
    }

    /// 获取主数据库连接
    pub fn primary_db(&self) -> Arc<DatabaseConnection> {
        self.primary.clone()
    }
}
