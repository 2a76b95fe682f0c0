use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;

use crate::data::post_storage::{PostFilter, PostPatch, PostStorage};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

/// In-process stand-in for the Postgres storage with the same contract.
#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryPostStorage {
    posts: Arc<Mutex<HashMap<String, Post>>>,
}

impl InMemoryPostStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.posts.lock().expect("posts mutex poisoned").len()
    }
}

#[async_trait]
impl PostStorage for InMemoryPostStorage {
    async fn by_id(&self, id: &str) -> Result<Post, DomainError> {
        self.posts
            .lock()
            .expect("posts mutex poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    async fn by_filter(&self, filter: PostFilter) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .values()
            .filter(|post| filter.contains(post.created_at))
            .cloned()
            .collect();

        posts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        Ok(posts
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn insert(&self, post: &Post) -> Result<(), DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        if posts.contains_key(&post.id) {
            return Err(DomainError::post_already_exists(&post.id));
        }
        posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<(), DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let post = posts
            .get_mut(id)
            .ok_or_else(|| DomainError::post_not_found(id))?;

        post.title = patch.title;
        post.content = patch.content;
        post.updated_at = patch
            .updated_at
            .max(post.created_at + Duration::milliseconds(1));
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), DomainError> {
        self.posts.lock().expect("posts mutex poisoned").remove(id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::InMemoryPostStorage;
    use crate::data::post_storage::{PostFilter, PostPatch, PostStorage};
    use crate::domain::error::DomainError;
    use crate::domain::post::{Post, truncate_to_millis};

    fn post_at(id: &str, created_at: DateTime<Utc>) -> Post {
        let created_at = truncate_to_millis(created_at);
        Post::new(id, "exclusive", "new era beginning!", created_at, created_at)
            .expect("valid post")
    }

    async fn seeded() -> (InMemoryPostStorage, [Post; 3]) {
        let storage = InMemoryPostStorage::new();
        let t1 = Utc::now() - Duration::minutes(3);
        let posts = [
            post_at("a", t1),
            post_at("b", t1 + Duration::minutes(1)),
            post_at("c", t1 + Duration::minutes(2)),
        ];
        for post in &posts {
            storage.insert(post).await.expect("insert must succeed");
        }
        (storage, posts)
    }

    #[tokio::test]
    async fn by_filter_returns_newest_first() {
        let (storage, [p1, p2, p3]) = seeded().await;

        let posts = storage
            .by_filter(PostFilter::new(10).expect("valid limit"))
            .await
            .expect("filter must succeed");

        assert_eq!(posts, vec![p3, p2, p1]);
    }

    #[tokio::test]
    async fn by_filter_applies_limit_and_offset() {
        let (storage, [_, p2, _]) = seeded().await;

        let filter = PostFilter::new(1).expect("valid limit").with_offset(1);
        let posts = storage.by_filter(filter).await.expect("filter must succeed");

        assert_eq!(posts, vec![p2]);
    }

    #[tokio::test]
    async fn by_filter_respects_from_bound() {
        let storage = InMemoryPostStorage::new();
        let t = Utc::now();
        let post = post_at("1", t);
        storage.insert(&post).await.expect("insert must succeed");

        let after = PostFilter::new(10)
            .expect("valid limit")
            .created_from(Some(t + Duration::hours(1)));
        assert!(storage.by_filter(after).await.expect("filter").is_empty());

        let before = PostFilter::new(10)
            .expect("valid limit")
            .created_from(Some(t - Duration::hours(1)));
        assert_eq!(storage.by_filter(before).await.expect("filter"), vec![post]);
    }

    #[tokio::test]
    async fn insert_duplicate_is_already_exists() {
        let (storage, [p1, ..]) = seeded().await;

        let err = storage.insert(&p1).await.expect_err("duplicate must fail");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert_eq!(storage.len(), 3);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let storage = InMemoryPostStorage::new();
        let err = storage
            .update(
                "missing",
                PostPatch {
                    title: "t".to_string(),
                    content: "c".to_string(),
                    updated_at: Utc::now(),
                },
            )
            .await
            .expect_err("update must fail");

        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_always_lands_after_created_at() {
        let (storage, [p1, ..]) = seeded().await;

        storage
            .update(
                &p1.id,
                PostPatch {
                    title: "t".to_string(),
                    content: "c".to_string(),
                    updated_at: p1.created_at - Duration::days(1),
                },
            )
            .await
            .expect("update must succeed");

        let stored = storage.by_id(&p1.id).await.expect("post must exist");
        assert_eq!(stored.updated_at, p1.created_at + Duration::milliseconds(1));
    }

    #[tokio::test]
    async fn remove_missing_is_not_an_error() {
        let storage = InMemoryPostStorage::new();
        storage.remove("42").await.expect("remove must succeed");
    }
}
