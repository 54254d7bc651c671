use async_trait::async_trait;

use crate::cluster::ClusterAccessError;

/// 开发空间授权过程中的错误
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("cluster {0} not found")]
    ClusterNotFound(u64),

    #[error("user {0} not found")]
    UserNotFound(u64),

    #[error("namespace {0} not found")]
    NamespaceNotFound(String),

    #[error(transparent)]
    ClusterAccess(#[from] ClusterAccessError),

    #[error("store error: {0}")]
    Store(String),
}

/// 开发空间授权服务
/// 为用户的ServiceAccount授予某个命名空间的访问权限
#[async_trait]
pub trait AssignmentService: Send + Sync {
    /// 重复授权同一用户和命名空间不会报错
    async fn authorize_namespace(
        &self,
        cluster_id: u64,
        user_id: u64,
        space_name: &str,
    ) -> Result<(), AssignmentError>;
}
