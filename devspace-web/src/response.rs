use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use devspace_api::AssignmentError;
use devspace_service::ServiceAccountError;
use serde::Serialize;
use tracing::warn;

/// 成功
pub const CODE_OK: i32 = 0;
/// 内部错误
pub const CODE_INTERNAL: i32 = 10001;
/// 请求参数绑定或校验失败
pub const CODE_BIND: i32 = 20001;
/// 需要登录
pub const CODE_LOGIN_REQUIRED: i32 = 20101;
/// 无权调用
pub const CODE_FORBIDDEN: i32 = 20103;
pub const CODE_USER_NOT_FOUND: i32 = 20102;
pub const CODE_CLUSTER_NOT_FOUND: i32 = 20201;
/// 集群与用户的开发空间关系查询失败
pub const CODE_CLUSTER_USER_NOT_FOUND: i32 = 20202;
pub const CODE_DEV_SPACE_NOT_FOUND: i32 = 20301;

/// 统一响应信封
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: CODE_OK,
            message: "OK".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 没有数据的成功响应，data序列化为null
    pub fn empty() -> Self {
        Self {
            code: CODE_OK,
            message: "OK".to_string(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Web层错误，带有稳定的错误码
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Bind(String),

    #[error("login required")]
    LoginRequired,

    #[error("permission denied")]
    Forbidden,

    #[error("user not found")]
    UserNotFound,

    #[error("cluster not found")]
    ClusterNotFound,

    #[error("cluster user not found")]
    ClusterUserNotFound,

    #[error("dev space not found")]
    DevSpaceNotFound,

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> i32 {
        match self {
            ApiError::Bind(_) => CODE_BIND,
            ApiError::LoginRequired => CODE_LOGIN_REQUIRED,
            ApiError::Forbidden => CODE_FORBIDDEN,
            ApiError::UserNotFound => CODE_USER_NOT_FOUND,
            ApiError::ClusterNotFound => CODE_CLUSTER_NOT_FOUND,
            ApiError::ClusterUserNotFound => CODE_CLUSTER_USER_NOT_FOUND,
            ApiError::DevSpaceNotFound => CODE_DEV_SPACE_NOT_FOUND,
            ApiError::Internal(_) => CODE_INTERNAL,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Bind(_) => StatusCode::BAD_REQUEST,
            ApiError::LoginRequired => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::UserNotFound
            | ApiError::ClusterNotFound
            | ApiError::ClusterUserNotFound
            | ApiError::DevSpaceNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceAccountError> for ApiError {
    fn from(error: ServiceAccountError) -> Self {
        match error {
            ServiceAccountError::UserNotFound(_) => ApiError::UserNotFound,
            ServiceAccountError::UserLookup(detail) => {
                warn!(error = %detail, "User lookup failed");
                ApiError::UserNotFound
            }
            ServiceAccountError::ClusterList(detail) => {
                warn!(error = %detail, "Cluster list failed");
                ApiError::ClusterNotFound
            }
            ServiceAccountError::SpaceList(detail) => {
                warn!(error = %detail, "Dev space list failed");
                ApiError::ClusterUserNotFound
            }
            ServiceAccountError::Assignment(AssignmentError::UserNotFound(_)) => ApiError::UserNotFound,
            ServiceAccountError::Assignment(AssignmentError::ClusterNotFound(_)) => ApiError::ClusterNotFound,
            ServiceAccountError::Assignment(AssignmentError::NamespaceNotFound(_)) => ApiError::DevSpaceNotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            warn!(error = %detail, "Request failed");
        }
        let body = ApiResponse::<()> {
            code: self.code(),
            message: self.to_string(),
            data: None,
        };
        (self.status(), Json(body)).into_response()
    }
}
