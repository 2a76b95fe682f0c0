use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use crate::data::post_storage::PostFilter;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};
use crate::presentation::http::app_error::{AppResult, ErrorBody};
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::{AppState, ListLimits};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostDraftDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FindPostsQuery {
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
    pub(crate) from: Option<DateTime<Utc>>,
    pub(crate) to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostDraftDto> for PostDraft {
    fn from(dto: PostDraftDto) -> Self {
        Self {
            title: dto.title,
            content: dto.content,
        }
    }
}

impl FindPostsQuery {
    /// A missing or zero `limit` falls back to the configured default.
    fn into_filter(self, limits: ListLimits) -> Result<PostFilter, DomainError> {
        let limit = match self.limit {
            None | Some(0) => limits.default_limit,
            Some(limit) if limit > limits.max_limit => {
                return Err(DomainError::Validation {
                    field: "limit",
                    message: "exceeds the maximum page size",
                });
            }
            Some(limit) => limit,
        };

        Ok(PostFilter::new(limit)?
            .with_offset(self.offset.unwrap_or(0))
            .created_from(self.from)
            .created_to(self.to))
    }
}

#[utoipa::path(
    get,
    path = "/posts",
    tag = "posts",
    params(
        ("limit" = Option<u32>, Query, description = "Page size; 0 or absent selects the server default"),
        ("offset" = Option<u32>, Query, description = "Number of posts to skip (>= 0)"),
        ("from" = Option<String>, Query, description = "Inclusive lower bound on created_at, RFC 3339"),
        ("to" = Option<String>, Query, description = "Inclusive upper bound on created_at, RFC 3339")
    ),
    responses(
        (status = 200, description = "Posts, newest first", body = [PostDto]),
        (status = 400, description = "Invalid query", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn find_posts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FindPostsQuery>,
) -> AppResult<(StatusCode, Json<Vec<PostDto>>)> {
    let filter = query.into_filter(state.list_limits)?;

    let posts = state.post_service.find_posts(filter).await?;

    Ok((
        StatusCode::OK,
        Json(posts.into_iter().map(PostDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDto),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    let post = state.post_service.get_post(&id).await?;

    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    post,
    path = "/posts",
    tag = "posts",
    request_body = PostDraftDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "Generated id collided, retry", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<PostDraftDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let post = state.post_service.create_post(dto.into()).await?;

    Ok((StatusCode::CREATED, Json(PostDto::from(post))))
}

#[utoipa::path(
    put,
    path = "/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id, created when absent")
    ),
    request_body = PostDraftDto,
    responses(
        (status = 200, description = "Post updated or created"),
        (status = 400, description = "Validation error", body = ErrorBody),
        (status = 409, description = "Concurrent upsert created the post first, retry", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn upsert_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(dto): ApiJson<PostDraftDto>,
) -> AppResult<StatusCode> {
    dto.validate()?;

    let outcome = state.post_service.upsert_post(&id, dto.into()).await?;
    info!(post_id = %id, ?outcome, "post upserted");

    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "posts",
    params(
        ("id" = String, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted or already absent"),
        (status = 500, description = "Internal error", body = ErrorBody)
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> AppResult<StatusCode> {
    state.post_service.delete_post(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
