use async_trait::async_trait;
use devspace_domain::{Cluster, SpaceAssignment, SpaceAssignmentFilter, User};

/// 集群注册表
#[async_trait]
pub trait ClusterRegistry: Send + Sync {
    /// 列出所有已注册的集群
    async fn list(&self) -> Result<Vec<Cluster>, Box<dyn std::error::Error + Send + Sync>>;

    /// 根据ID获取集群
    async fn get(&self, id: u64) -> Result<Option<Cluster>, Box<dyn std::error::Error + Send + Sync>>;
}

/// 用户存储
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: u64) -> Result<Option<User>, Box<dyn std::error::Error + Send + Sync>>;
}

/// 开发空间存储
#[async_trait]
pub trait SpaceAssignmentStore: Send + Sync {
    /// 列出满足条件的开发空间，空条件返回全部
    async fn list(
        &self,
        filter: SpaceAssignmentFilter,
    ) -> Result<Vec<SpaceAssignment>, Box<dyn std::error::Error + Send + Sync>>;
}
