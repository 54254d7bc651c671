use async_trait::async_trait;
use devspace_api::AssignmentService;
use devspace_domain::ClusterAccessResult;
use std::sync::Arc;

use super::aggregator::AuthorizationAggregator;
use super::error::ServiceAccountError;

/// ServiceAccount服务trait
#[async_trait]
pub trait ServiceAccountService: Send + Sync {
    /// 授予用户在指定集群上访问某个开发空间的权限
    async fn authorize(
        &self,
        cluster_id: u64,
        user_id: u64,
        space_name: &str,
    ) -> Result<(), ServiceAccountError>;

    /// 列出用户在所有集群上的访问结果
    async fn list_authorizations(
        &self,
        user_id: u64,
    ) -> Result<Vec<ClusterAccessResult>, ServiceAccountError>;
}

/// 默认ServiceAccount服务实现
pub struct DefaultServiceAccountService {
    aggregator: Arc<AuthorizationAggregator>,
    assignments: Arc<dyn AssignmentService>,
}

impl DefaultServiceAccountService {
    pub fn new(aggregator: Arc<AuthorizationAggregator>, assignments: Arc<dyn AssignmentService>) -> Self {
        Self {
            aggregator,
            assignments,
        }
    }
}

#[async_trait]
impl ServiceAccountService for DefaultServiceAccountService {
    async fn authorize(
        &self,
        cluster_id: u64,
        user_id: u64,
        space_name: &str,
    ) -> Result<(), ServiceAccountError> {
        self.assignments
            .authorize_namespace(cluster_id, user_id, space_name)
            .await?;
        Ok(())
    }

    async fn list_authorizations(
        &self,
        user_id: u64,
    ) -> Result<Vec<ClusterAccessResult>, ServiceAccountError> {
        self.aggregator.list_authorizations(user_id).await
    }
}
