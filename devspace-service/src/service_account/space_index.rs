use devspace_domain::{NamespaceGrant, SpaceAssignment};
use std::collections::HashMap;

/// 开发空间索引：集群ID -> 命名空间 -> 开发空间
///
/// 每次请求重新构建，不做持久化。同一集群内命名空间重复时后写入的覆盖先写入的。
#[derive(Debug, Clone, Default)]
pub struct SpaceIndex {
    clusters: HashMap<u64, HashMap<String, SpaceAssignment>>,
}

impl SpaceIndex {
    pub fn build(assignments: impl IntoIterator<Item = SpaceAssignment>) -> Self {
        let mut clusters: HashMap<u64, HashMap<String, SpaceAssignment>> = HashMap::new();
        for assignment in assignments {
            clusters
                .entry(assignment.cluster_id)
                .or_default()
                .insert(assignment.namespace.clone(), assignment);
        }
        Self { clusters }
    }

    pub fn get(&self, cluster_id: u64, namespace: &str) -> Option<&SpaceAssignment> {
        self.clusters.get(&cluster_id)?.get(namespace)
    }

    pub fn cluster(&self, cluster_id: u64) -> Option<&HashMap<String, SpaceAssignment>> {
        self.clusters.get(&cluster_id)
    }

    /// 将命名空间列表映射为开发空间授权，不在索引中的命名空间被忽略
    pub fn grants_for(&self, cluster_id: u64, namespaces: &[String]) -> Vec<NamespaceGrant> {
        let Some(spaces) = self.clusters.get(&cluster_id) else {
            return Vec::new();
        };

        namespaces
            .iter()
            .filter_map(|ns| spaces.get(ns))
            .map(|space| NamespaceGrant {
                space_id: space.id,
                namespace: space.namespace.clone(),
                space_name: space.space_name.clone(),
            })
            .collect()
    }

    /// 索引中的开发空间总数
    pub fn len(&self) -> usize {
        self.clusters.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
