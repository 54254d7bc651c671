use axum::{
    routing::{get, post},
    Json, Router,
};
use devspace_api::{AssignmentService, ClusterRegistry, SpaceAssignmentStore, UserStore};
use devspace_infra::{
    database::DatabaseManager, DevKubeconfigAssembler, JwtService, KubeAssignmentService,
    KubeClusterAccessClient, SeaOrmClusterRegistry, SeaOrmSpaceAssignmentStore, SeaOrmUserStore,
};
use devspace_service::{AuthorizationAggregator, DefaultServiceAccountService, ServiceAccountService};
use devspace_web::openapi::ApiDoc;
use devspace_web::{AppState, AuthorizeAdmins};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;

/// 创建应用路由
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(devspace_web::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        // 开发空间授权路由
        .route("/v1/sa/authorize", post(devspace_web::authorize))
        .route("/v1/sa/kubeconfigs", get(devspace_web::list_authorization))
        // 认证中间件注入用户信息，处理器自行决定是否要求登录
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            devspace_web::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// 初始化应用状态
pub fn init_app_state(
    db_manager: &DatabaseManager,
    jwt_service: Arc<JwtService>,
    config: &Config,
) -> AppState {
    let primary_db = db_manager.primary_db();

    let clusters: Arc<dyn ClusterRegistry> = Arc::new(SeaOrmClusterRegistry::new(primary_db.clone()));
    let users: Arc<dyn UserStore> = Arc::new(SeaOrmUserStore::new(primary_db.clone()));
    let spaces: Arc<dyn SpaceAssignmentStore> = Arc::new(SeaOrmSpaceAssignmentStore::new(primary_db));

    let access = Arc::new(KubeClusterAccessClient::new(config.kubernetes.kube_settings()));

    let aggregator = Arc::new(AuthorizationAggregator::new(
        clusters.clone(),
        users.clone(),
        spaces,
        access.clone(),
        Arc::new(DevKubeconfigAssembler::default()),
        config.aggregator_settings(),
    ));

    let assignments: Arc<dyn AssignmentService> = Arc::new(KubeAssignmentService::new(
        clusters,
        users,
        access,
        config.kubernetes.assignment_settings(),
    ));

    let service_account_service: Arc<dyn ServiceAccountService> =
        Arc::new(DefaultServiceAccountService::new(aggregator, assignments));

    AppState {
        service_account_service,
        jwt_service,
        authorize_admins: AuthorizeAdmins::new(config.security.authorize_admins.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use devspace_domain::ClusterAccessResult;
    use devspace_service::ServiceAccountError;
    use tower::ServiceExt;

    struct NoopService;

    #[async_trait]
    impl ServiceAccountService for NoopService {
        async fn authorize(&self, _: u64, _: u64, _: &str) -> Result<(), ServiceAccountError> {
            Ok(())
        }

        async fn list_authorizations(&self, _: u64) -> Result<Vec<ClusterAccessResult>, ServiceAccountError> {
            Ok(Vec::new())
        }
    }

    fn router() -> Router {
        create_router(AppState {
            service_account_service: Arc::new(NoopService),
            jwt_service: Arc::new(JwtService::new("test_secret", "devspace".to_string(), 3600).unwrap()),
            authorize_admins: AuthorizeAdmins::default(),
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let response = router()
            .oneshot(Request::builder().uri("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(doc["paths"]["/v1/sa/kubeconfigs"].is_object());
    }

    #[tokio::test]
    async fn test_kubeconfigs_requires_login() {
        let response = router()
            .oneshot(Request::builder().uri("/v1/sa/kubeconfigs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
