use utoipa::OpenApi;

use crate::presentation::http::app_error::{ErrorBody, ErrorDetail, ErrorLevel};
use crate::presentation::http::handlers::posts::{PostDraftDto, PostDto};
use crate::presentation::http::handlers::service::{HealthDto, IdentityDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::service::identity,
        crate::presentation::http::handlers::service::healthz,
        crate::presentation::http::handlers::service::readyz,
        crate::presentation::http::handlers::posts::find_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::upsert_post,
        crate::presentation::http::handlers::posts::delete_post
    ),
    components(
        schemas(
            IdentityDto,
            HealthDto,
            PostDraftDto,
            PostDto,
            ErrorBody,
            ErrorDetail,
            ErrorLevel
        )
    ),
    tags(
        (name = "service", description = "Identity and health endpoints"),
        (name = "posts", description = "Post endpoints")
    )
)]
pub(crate) struct ApiDoc;
