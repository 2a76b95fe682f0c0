use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

const MAX_TITLE_LEN: usize = 255;
const MAX_ID_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Title and content of a post as submitted by a caller, for both create and upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PostDraft {
    pub(crate) title: String,
    pub(crate) content: String,
}

impl PostDraft {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
        })
    }
}

impl Post {
    /// Builds a post whose timestamps are both `now`, truncated to milliseconds.
    pub(crate) fn fresh(id: impl Into<String>, draft: PostDraft, now: DateTime<Utc>) -> Self {
        let now = truncate_to_millis(now);
        Self {
            id: id.into(),
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }

    #[cfg(test)]
    pub(crate) fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let id = validate_post_id(&id.into())?;
        let title = normalize_title(&title.into())?;
        let content = normalize_content(&content.into())?;

        if updated_at < created_at {
            return Err(DomainError::Validation {
                field: "updated_at",
                message: "must be >= created_at",
            });
        }

        Ok(Self {
            id,
            title,
            content,
            created_at,
            updated_at,
        })
    }
}

/// Drops sub-millisecond precision. Applied before anything is persisted so that
/// the stored value and the value handed back to the caller are identical.
pub(crate) fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(3)
}

pub(crate) fn validate_post_id(id: &str) -> Result<String, DomainError> {
    if id.trim().is_empty() || id.chars().count() > MAX_ID_LEN {
        return Err(DomainError::Validation {
            field: "id",
            message: "must be 1..255 chars",
        });
    }
    Ok(id.to_string())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}
