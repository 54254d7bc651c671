pub mod dev_space;

pub use dev_space::{SpaceAssignment, SpaceAssignmentFilter};

use serde::{Deserialize, Serialize};

/// Cluster实体
/// 已注册的Kubernetes集群，kubeconfig具备集群管理员权限
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: u64,
    pub name: String,
    /// 集群管理员kubeconfig，不会出现在日志中
    pub kubeconfig: String,
    /// API Server地址
    pub server: String,
    pub storage_class: String,
}

impl Cluster {
    pub fn kubeconfig_bytes(&self) -> &[u8] {
        self.kubeconfig.as_bytes()
    }
}

impl std::fmt::Debug for Cluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kubeconfig", &"<redacted>")
            .field("server", &self.server)
            .field("storage_class", &self.storage_class)
            .finish()
    }
}
