use serde::{Deserialize, Serialize};

/// 认证后的用户信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: u64,
}

impl AuthenticatedUser {
    pub fn new(user_id: u64) -> Self {
        Self { user_id }
    }
}

/// 认证结果
#[derive(Debug, Clone)]
pub enum AuthenticationResult {
    /// 认证成功
    Authenticated(AuthenticatedUser),
    /// 未认证（没有提供凭证）
    Unauthenticated,
    /// 认证失败（凭证无效）
    Failed(String),
}

impl AuthenticationResult {
    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            AuthenticationResult::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}
