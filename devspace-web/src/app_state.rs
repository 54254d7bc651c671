use devspace_infra::security::JwtService;
use devspace_service::ServiceAccountService;
use std::sync::Arc;

use crate::security::AuthorizeAdmins;

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub service_account_service: Arc<dyn ServiceAccountService>,
    pub jwt_service: Arc<JwtService>,
    pub authorize_admins: AuthorizeAdmins,
}
