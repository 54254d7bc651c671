use std::collections::HashSet;
use std::sync::Arc;

/// 允许调用授权接口的用户
///
/// 列表为空时所有已登录用户都可以授权。
#[derive(Debug, Clone, Default)]
pub struct AuthorizeAdmins {
    admins: Arc<HashSet<u64>>,
}

impl AuthorizeAdmins {
    pub fn new(admins: impl IntoIterator<Item = u64>) -> Self {
        Self {
            admins: Arc::new(admins.into_iter().collect()),
        }
    }

    pub fn is_restricted(&self) -> bool {
        !self.admins.is_empty()
    }

    pub fn permits(&self, user_id: u64) -> bool {
        !self.is_restricted() || self.admins.contains(&user_id)
    }
}
