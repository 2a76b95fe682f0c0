use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::data::post_storage::{PostFilter, PostPatch, PostStorage};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft, truncate_to_millis, validate_post_id};
use crate::infrastructure::clock::Clock;
use crate::infrastructure::id_generator::IdGenerator;

/// Outcome of an upsert, reported for logging and response shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpsertOutcome {
    Updated,
    Created,
}

pub(crate) struct PostService {
    storage: Arc<dyn PostStorage>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl PostService {
    pub(crate) fn new(
        storage: Arc<dyn PostStorage>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            storage,
            clock,
            ids,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(self.clock.now())
    }

    pub(crate) async fn get_post(&self, id: &str) -> Result<Post, DomainError> {
        self.storage.by_id(id).await
    }

    /// Stores a new post under a freshly generated id. A collision surfaces as
    /// `AlreadyExists` and is not retried here.
    pub(crate) async fn create_post(&self, draft: PostDraft) -> Result<Post, DomainError> {
        let draft = draft.validate()?;
        let post = Post::fresh(self.ids.next_id(), draft, self.now());

        self.storage.insert(&post).await?;

        debug!(post_id = %post.id, "post created");
        Ok(post)
    }

    /// Replaces title and content of `id`, or creates the post under that id when
    /// it does not exist yet.
    ///
    /// Only `NotFound` from the update triggers the insert. Two concurrent upserts
    /// of the same absent id can both reach the insert; the loser gets
    /// `AlreadyExists` from the storage uniqueness constraint.
    pub(crate) async fn upsert_post(
        &self,
        id: &str,
        draft: PostDraft,
    ) -> Result<UpsertOutcome, DomainError> {
        let id = validate_post_id(id)?;
        let draft = draft.validate()?;
        let now = self.now();

        let patch = PostPatch {
            title: draft.title.clone(),
            content: draft.content.clone(),
            updated_at: now,
        };

        match self.storage.update(&id, patch).await {
            Ok(()) => {
                debug!(post_id = %id, "post updated in place");
                Ok(UpsertOutcome::Updated)
            }
            Err(DomainError::NotFound(_)) => {
                let post = Post::fresh(id, draft, now);
                self.storage.insert(&post).await?;

                debug!(post_id = %post.id, "post created by upsert");
                Ok(UpsertOutcome::Created)
            }
            Err(err) => Err(err),
        }
    }

    /// Removing an absent post is a successful no-op.
    pub(crate) async fn delete_post(&self, id: &str) -> Result<(), DomainError> {
        self.storage.remove(id).await?;

        debug!(post_id = %id, "post deleted");
        Ok(())
    }

    pub(crate) async fn find_posts(&self, filter: PostFilter) -> Result<Vec<Post>, DomainError> {
        let filter = filter.validate()?;
        self.storage.by_filter(filter).await
    }

    pub(crate) async fn ping(&self) -> Result<(), DomainError> {
        self.storage.ping().await
    }
}
