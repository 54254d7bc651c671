use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use devspace_api::AuthenticatedUser;

use crate::response::ApiError;

/// 当前用户提取器
/// 从请求扩展中提取已认证的用户ID
pub struct CurrentUser(pub u64);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .map(|user| CurrentUser(user.user_id))
            .ok_or(ApiError::LoginRequired)
    }
}
