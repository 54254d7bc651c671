use devspace_api::AssignmentError;

/// ServiceAccount服务错误
/// 只有用户、集群列表、开发空间列表的失败会中止整个请求
#[derive(Debug, thiserror::Error)]
pub enum ServiceAccountError {
    #[error("user {0} not found")]
    UserNotFound(u64),

    #[error("failed to resolve user: {0}")]
    UserLookup(String),

    #[error("failed to list clusters: {0}")]
    ClusterList(String),

    #[error("failed to list dev spaces: {0}")]
    SpaceList(String),

    #[error(transparent)]
    Assignment(#[from] AssignmentError),
}
