use axum::Router;
use axum::routing::get;

use crate::presentation::AppState;
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, find_posts, get_post, upsert_post,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(find_posts).post(create_post))
        .route("/{id}", get(get_post).put(upsert_post).delete(delete_post))
}
