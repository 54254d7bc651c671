use axum::http::StatusCode;
use axum::response::IntoResponse;

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "服务可用"))
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
