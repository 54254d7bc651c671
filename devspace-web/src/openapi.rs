use utoipa::OpenApi;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify,
};

use crate::handlers::{health, service_account};

/// OpenAPI文档配置
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        service_account::authorize,
        service_account::list_authorization,
    ),
    components(schemas(
        service_account::AuthorizeRequest,
        service_account::ClusterKubeconfig,
        service_account::NamespacePack,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "健康检查端点"),
        (name = "service-account", description = "开发空间授权端点"),
    ),
    info(
        title = "Devspace API",
        description = "多集群开发空间授权服务",
        version = "1.0.0"
    ),
    servers(
        (url = "http://localhost:8080", description = "本地开发服务器"),
    )
)]
pub struct ApiDoc;

/// 安全配置修改器
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
