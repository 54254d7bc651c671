use serde::{Deserialize, Serialize};

/// NamespaceGrant表示用户在某个集群上可以访问的一个开发空间
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceGrant {
    pub space_id: u64,
    pub namespace: String,
    #[serde(rename = "spacename")]
    pub space_name: String,
}

/// ClusterAccessResult是用户在单个集群上的访问结果
/// 只有具备集群管理员权限或者至少一个开发空间授权的集群才会产生该结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAccessResult {
    /// 绑定到用户ServiceAccount的kubeconfig
    pub kubeconfig: String,
    pub storage_class: String,
    /// 按命名空间升序排列
    #[serde(rename = "namespace_packs")]
    pub grants: Vec<NamespaceGrant>,
    /// 用户是否拥有集群管理员权限
    pub privilege: bool,
}

impl ClusterAccessResult {
    /// 集群管理员：不再枚举命名空间
    pub fn privileged(kubeconfig: String, storage_class: String) -> Self {
        Self {
            kubeconfig,
            storage_class,
            grants: Vec::new(),
            privilege: true,
        }
    }

    /// 普通用户：仅包含被授权的开发空间
    /// 没有任何授权时返回None，避免产生空条目
    pub fn scoped(
        kubeconfig: String,
        storage_class: String,
        mut grants: Vec<NamespaceGrant>,
    ) -> Option<Self> {
        if grants.is_empty() {
            return None;
        }
        grants.sort_by(|a, b| a.namespace.cmp(&b.namespace));
        grants.dedup_by(|a, b| a.namespace == b.namespace);

        Some(Self {
            kubeconfig,
            storage_class,
            grants,
            privilege: false,
        })
    }
}
