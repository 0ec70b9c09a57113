use crate::app::HealthStatus;
use crate::transport::http::types::AppState;
use axum::extract::State;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/test",
    responses(
        (status = 200, description = "API is up", body = HealthStatus)
    )
)]
pub async fn test_handler(State(state): State<AppState>) -> Json<HealthStatus> {
    tracing::info!("test route hit");
    Json(state.service.health_check())
}
