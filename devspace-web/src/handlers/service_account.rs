use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use devspace_domain::{ClusterAccessResult, NamespaceGrant};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use crate::extractors::CurrentUser;
use crate::response::{ApiError, ApiResponse};
use crate::AppState;

/// 授权请求，三个字段都必填
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AuthorizeRequest {
    #[validate(required(message = "cluster_id is required"))]
    pub cluster_id: Option<u64>,

    #[validate(required(message = "user_id is required"))]
    pub user_id: Option<u64>,

    /// 目标命名空间
    #[validate(
        required(message = "space_name is required"),
        length(min = 1, message = "space_name must not be empty")
    )]
    pub space_name: Option<String>,
}

/// 开发空间
#[derive(Debug, Serialize, ToSchema)]
pub struct NamespacePack {
    pub space_id: u64,
    pub namespace: String,
    pub spacename: String,
}

impl From<NamespaceGrant> for NamespacePack {
    fn from(grant: NamespaceGrant) -> Self {
        Self {
            space_id: grant.space_id,
            namespace: grant.namespace,
            spacename: grant.space_name,
        }
    }
}

/// 单个集群的访问凭证
#[derive(Debug, Serialize, ToSchema)]
pub struct ClusterKubeconfig {
    pub kubeconfig: String,
    pub storage_class: String,
    pub namespace_packs: Vec<NamespacePack>,
    pub privilege: bool,
}

impl From<ClusterAccessResult> for ClusterKubeconfig {
    fn from(result: ClusterAccessResult) -> Self {
        Self {
            kubeconfig: result.kubeconfig,
            storage_class: result.storage_class,
            namespace_packs: result.grants.into_iter().map(NamespacePack::from).collect(),
            privilege: result.privilege,
        }
    }
}

/// 授予用户访问开发空间的权限
/// POST /v1/sa/authorize
///
/// 会把任意用户绑定到目标命名空间，配置了`security.authorize_admins`时只有其中的用户可以调用
#[utoipa::path(
    post,
    path = "/v1/sa/authorize",
    tag = "service-account",
    request_body = AuthorizeRequest,
    responses(
        (status = 200, description = "授权成功，data为null"),
        (status = 400, description = "参数错误，code=20001"),
        (status = 401, description = "需要登录，code=20101"),
        (status = 403, description = "无权授权，code=20103"),
        (status = 404, description = "用户、集群或开发空间不存在"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn authorize(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    payload: Result<Json<AuthorizeRequest>, JsonRejection>,
) -> Result<ApiResponse<()>, ApiError> {
    if !state.authorize_admins.permits(caller) {
        return Err(ApiError::Forbidden);
    }

    let Json(request) = payload.map_err(|e| ApiError::Bind(e.body_text()))?;
    request
        .validate()
        .map_err(|e| ApiError::Bind(e.to_string()))?;

    let (Some(cluster_id), Some(user_id), Some(space_name)) =
        (request.cluster_id, request.user_id, request.space_name)
    else {
        return Err(ApiError::Bind("missing required field".to_string()));
    };

    debug!(caller, cluster_id, user_id, %space_name, "Authorizing dev space");
    state
        .service_account_service
        .authorize(cluster_id, user_id, &space_name)
        .await?;

    Ok(ApiResponse::empty())
}

/// 列出当前用户在所有集群上的kubeconfig
/// GET /v1/sa/kubeconfigs
#[utoipa::path(
    get,
    path = "/v1/sa/kubeconfigs",
    tag = "service-account",
    responses(
        (status = 200, description = "data为集群访问凭证列表", body = [ClusterKubeconfig]),
        (status = 401, description = "需要登录，code=20101"),
        (status = 404, description = "用户不存在，code=20102"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn list_authorization(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<ApiResponse<Vec<ClusterKubeconfig>>, ApiError> {
    let results = state
        .service_account_service
        .list_authorizations(user_id)
        .await?;

    Ok(ApiResponse::ok(
        results.into_iter().map(ClusterKubeconfig::from).collect(),
    ))
}
