use serde::{Deserialize, Serialize};

/// 用户ServiceAccount名称的前缀
pub const SERVICE_ACCOUNT_PREFIX: &str = "devspace-sa-";

/// User实体
/// 平台用户，每个用户在每个集群中拥有一个同名的ServiceAccount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    /// 用户在各集群中的ServiceAccount名称
    pub sa_name: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>, sa_name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            sa_name: sa_name.into(),
        }
    }

    /// 根据用户ID生成默认的ServiceAccount名称
    pub fn default_sa_name(id: u64) -> String {
        format!("{}{}", SERVICE_ACCOUNT_PREFIX, id)
    }
}
