use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::presentation::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct IdentityDto {
    pub(crate) service_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct HealthDto {
    pub(crate) status: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "Service identity", body = IdentityDto)
    )
)]
pub(crate) async fn identity(State(state): State<AppState>) -> Json<IdentityDto> {
    Json(IdentityDto {
        service_name: state.service_name.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "service",
    responses(
        (status = 200, description = "Process is alive", body = HealthDto)
    )
)]
pub(crate) async fn healthz() -> Json<HealthDto> {
    Json(HealthDto {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/readyz",
    tag = "service",
    responses(
        (status = 200, description = "Storage is reachable", body = HealthDto),
        (status = 503, description = "Storage is unreachable", body = HealthDto)
    )
)]
pub(crate) async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<HealthDto>) {
    match state.post_service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthDto {
                status: "ok".to_string(),
            }),
        ),
        Err(err) => {
            error!(error = %err, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthDto {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
