use axum::{Extension, Json, Router};
use axum::http::StatusCode;
use axum::routing::get;
use serde::Serialize;
use crate::controller::AppState;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health_check))
        .route_layer(Extension(HealthInfo {
            status: "ok",
            environment: app_state.environment,
        }))
}

#[derive(Clone, Serialize, Debug)]
pub struct HealthInfo {
    status: &'static str,
    environment: String,
}

/// Misc endpoint for individual use case
async fn get_health_check(
    Extension(health): Extension<HealthInfo>,
) -> Result<(StatusCode, Json<HealthInfo>), StatusCode>
{
    Ok((StatusCode::OK, Json(health)))
}
