use k8s_openapi::api::authorization::v1::{
    ResourceAttributes, SelfSubjectAccessReview, SelfSubjectAccessReviewSpec, SubjectAccessReview,
    SubjectAccessReviewSpec, SubjectAccessReviewStatus,
};

/// 访问审查的资源属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewAttributes {
    pub verb: String,
    pub group: String,
    pub resource: String,
}

impl Default for ReviewAttributes {
    /// 能在命名空间内创建Deployment即视为可用的开发空间
    fn default() -> Self {
        Self {
            verb: "create".to_string(),
            group: "apps".to_string(),
            resource: "deployments".to_string(),
        }
    }
}

/// ServiceAccount在RBAC中的用户名
pub fn service_account_username(namespace: &str, name: &str) -> String {
    format!("system:serviceaccount:{}:{}", namespace, name)
}

/// ServiceAccount隐含所属的用户组
pub fn service_account_groups(namespace: &str) -> Vec<String> {
    vec![
        "system:serviceaccounts".to_string(),
        format!("system:serviceaccounts:{}", namespace),
        "system:authenticated".to_string(),
    ]
}

/// 对所有资源的所有操作做自我审查，通过即为集群管理员
pub fn cluster_admin_review() -> SelfSubjectAccessReview {
    SelfSubjectAccessReview {
        spec: SelfSubjectAccessReviewSpec {
            resource_attributes: Some(ResourceAttributes {
                verb: Some("*".to_string()),
                group: Some("*".to_string()),
                resource: Some("*".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// 审查ServiceAccount在某个命名空间内的访问权限
pub fn namespace_review(
    attributes: &ReviewAttributes,
    sa_name: &str,
    sa_namespace: &str,
    namespace: &str,
) -> SubjectAccessReview {
    SubjectAccessReview {
        spec: SubjectAccessReviewSpec {
            user: Some(service_account_username(sa_namespace, sa_name)),
            groups: Some(service_account_groups(sa_namespace)),
            resource_attributes: Some(ResourceAttributes {
                namespace: Some(namespace.to_string()),
                verb: Some(attributes.verb.clone()),
                group: Some(attributes.group.clone()),
                resource: Some(attributes.resource.clone()),
                ..Default::default()
            }),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// 显式拒绝或缺少状态都视为不允许
pub fn is_allowed(status: Option<&SubjectAccessReviewStatus>) -> bool {
    status.map_or(false, |s| s.allowed && !s.denied.unwrap_or(false))
}
