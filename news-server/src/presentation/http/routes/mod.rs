use axum::{Router, routing::get};

use super::handlers::service::{healthz, identity, readyz};
use crate::presentation::AppState;

pub(crate) mod posts;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(identity))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/posts", posts::router())
}
