use serde::{Deserialize, Serialize};

/// SpaceAssignment表示“某集群上的某个命名空间是一个开发空间”
/// 命名空间在同一集群内唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceAssignment {
    /// 开发空间ID
    pub id: u64,
    pub cluster_id: u64,
    pub user_id: u64,
    pub namespace: String,
    pub space_name: String,
}

/// 开发空间查询条件，字段为空表示不过滤
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceAssignmentFilter {
    pub cluster_id: Option<u64>,
    pub user_id: Option<u64>,
}

impl SpaceAssignmentFilter {
    pub fn for_user(user_id: u64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, assignment: &SpaceAssignment) -> bool {
        self.cluster_id.map_or(true, |id| id == assignment.cluster_id)
            && self.user_id.map_or(true, |id| id == assignment.user_id)
    }
}
