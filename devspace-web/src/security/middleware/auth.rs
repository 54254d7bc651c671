use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use devspace_api::{AuthenticatedUser, AuthenticationResult};
use devspace_infra::security::JwtService;
use tracing::debug;

use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// 从Authorization头中解析Bearer令牌
pub fn authenticate(jwt_service: &JwtService, headers: &HeaderMap) -> AuthenticationResult {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return AuthenticationResult::Unauthenticated;
    };
    let Some(token) = value.to_str().ok().and_then(|v| v.strip_prefix(BEARER_PREFIX)) else {
        return AuthenticationResult::Failed("unsupported authorization scheme".to_string());
    };

    let claims = match jwt_service.verify(token.trim()) {
        Ok(claims) => claims,
        Err(e) => return AuthenticationResult::Failed(e.to_string()),
    };
    match claims.user_id() {
        Ok(user_id) => AuthenticationResult::Authenticated(AuthenticatedUser::new(user_id)),
        Err(e) => AuthenticationResult::Failed(e.to_string()),
    }
}

/// 认证中间件
/// 认证成功时将用户信息注入请求扩展，否则交给处理器决定是否拒绝
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state.jwt_service, request.headers()) {
        AuthenticationResult::Authenticated(user) => {
            request.extensions_mut().insert(user);
        }
        AuthenticationResult::Unauthenticated => {}
        AuthenticationResult::Failed(reason) => {
            debug!(%reason, path = %request.uri().path(), "Authentication failed");
        }
    }

    next.run(request).await
}
