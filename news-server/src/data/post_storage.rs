use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::Post;

/// Replacement values for an update-in-place. `created_at` is never part of a patch.
///
/// Storages persist `updated_at` as given unless it is not later than the stored
/// `created_at`, in which case `created_at + 1ms` is written instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Time range and page selection over `created_at`. Both bounds are inclusive,
/// and a missing bound leaves that side of the range open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostFilter {
    pub(crate) from: Option<DateTime<Utc>>,
    pub(crate) to: Option<DateTime<Utc>>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
}

impl PostFilter {
    pub(crate) fn new(limit: u32) -> Result<Self, DomainError> {
        if limit == 0 {
            return Err(DomainError::Validation {
                field: "limit",
                message: "must be > 0",
            });
        }
        Ok(Self {
            from: None,
            to: None,
            limit,
            offset: 0,
        })
    }

    pub(crate) fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub(crate) fn created_from(mut self, from: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self
    }

    pub(crate) fn created_to(mut self, to: Option<DateTime<Utc>>) -> Self {
        self.to = to;
        self
    }

    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(DomainError::Validation {
                field: "from",
                message: "must not be after 'to'",
            });
        }
        Ok(self)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, created_at: DateTime<Utc>) -> bool {
        self.from.is_none_or(|from| created_at >= from) && self.to.is_none_or(|to| created_at <= to)
    }
}

/// Persistence capability for posts.
///
/// Implementations classify backend failures at the point they occur:
/// a duplicate id on `insert` is `AlreadyExists`, an `update` touching no rows is
/// `NotFound`, and everything else is `Unexpected`. `remove` never reports absence.
#[async_trait]
pub(crate) trait PostStorage: Send + Sync {
    async fn by_id(&self, id: &str) -> Result<Post, DomainError>;
    /// Newest first by `created_at`.
    async fn by_filter(&self, filter: PostFilter) -> Result<Vec<Post>, DomainError>;
    async fn insert(&self, post: &Post) -> Result<(), DomainError>;
    async fn update(&self, id: &str, patch: PostPatch) -> Result<(), DomainError>;
    async fn remove(&self, id: &str) -> Result<(), DomainError>;
    async fn ping(&self) -> Result<(), DomainError>;
}
