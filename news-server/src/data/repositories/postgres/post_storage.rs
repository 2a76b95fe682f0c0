use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::post_storage::{PostFilter, PostPatch, PostStorage};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

const UNIQUE_VIOLATION: &str = "23505";
const COLUMNS: &str = "id, title, content, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostStorage {
    pool: PgPool,
    table: String,
    queries: PostQueries,
}

#[derive(Debug, Clone)]
struct PostQueries {
    by_id: String,
    insert: String,
    update: String,
    remove: String,
}

impl PostQueries {
    fn for_table(table: &str) -> Self {
        Self {
            by_id: format!("SELECT {COLUMNS} FROM {table} WHERE id = $1"),
            insert: format!("INSERT INTO {table} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5)"),
            update: format!(
                "UPDATE {table} \
                 SET title = $2, content = $3, \
                 updated_at = GREATEST($4, created_at + INTERVAL '1 millisecond') \
                 WHERE id = $1"
            ),
            remove: format!("DELETE FROM {table} WHERE id = $1"),
        }
    }
}

impl PostgresPostStorage {
    pub(crate) fn new(pool: PgPool, table_name: &str) -> Self {
        let table = quote_identifier(table_name);
        let queries = PostQueries::for_table(&table);
        Self {
            pool,
            table,
            queries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct PostRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<&Post> for PostRow {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            content: post.content.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Stored rows are returned exactly as persisted; write-side validation is not re-applied.
impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PostStorage for PostgresPostStorage {
    async fn by_id(&self, id: &str) -> Result<Post, DomainError> {
        let row = sqlx::query_as::<_, PostRow>(&self.queries.by_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(Post::from)
            .ok_or_else(|| DomainError::post_not_found(id))
    }

    async fn by_filter(&self, filter: PostFilter) -> Result<Vec<Post>, DomainError> {
        let mut query = build_filter_query(&self.table, &filter);

        let rows = query
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn insert(&self, post: &Post) -> Result<(), DomainError> {
        let row = PostRow::from(post);

        sqlx::query(&self.queries.insert)
            .bind(&row.id)
            .bind(&row.title)
            .bind(&row.content)
            .bind(row.created_at)
            .bind(row.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    return DomainError::post_already_exists(&row.id);
                }
                map_post_db_error(err)
            })?;

        Ok(())
    }

    async fn update(&self, id: &str, patch: PostPatch) -> Result<(), DomainError> {
        let result = sqlx::query(&self.queries.update)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.content)
            .bind(patch.updated_at)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        // The statement succeeds even when nothing matched.
        if result.rows_affected() == 0 {
            return Err(DomainError::post_not_found(id));
        }
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), DomainError> {
        sqlx::query(&self.queries.remove)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(())
    }
}

fn build_filter_query(table: &str, filter: &PostFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {COLUMNS} FROM {table}"));

    let mut keyword = " WHERE ";
    if let Some(from) = filter.from {
        query.push(keyword).push("created_at >= ").push_bind(from);
        keyword = " AND ";
    }
    if let Some(to) = filter.to {
        query.push(keyword).push("created_at <= ").push_bind(to);
    }

    query
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(i64::from(filter.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(filter.offset));

    query
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{PostQueries, PostRow, build_filter_query, quote_identifier};
    use crate::data::post_storage::PostFilter;
    use crate::domain::post::{Post, truncate_to_millis};

    const SELECT: &str = "SELECT id, title, content, created_at, updated_at FROM \"post\"";
    const ORDER: &str = "ORDER BY created_at DESC, id DESC";

    #[test]
    fn filter_query_without_bounds_has_no_where_clause() {
        let filter = PostFilter::new(10).expect("valid limit");
        let query = build_filter_query("\"post\"", &filter);

        assert_eq!(query.sql(), format!("{SELECT} {ORDER} LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn filter_query_with_from_only() {
        let filter = PostFilter::new(10)
            .expect("valid limit")
            .created_from(Some(Utc::now()));
        let query = build_filter_query("\"post\"", &filter);

        assert_eq!(
            query.sql(),
            format!("{SELECT} WHERE created_at >= $1 {ORDER} LIMIT $2 OFFSET $3")
        );
    }

    #[test]
    fn filter_query_with_to_only() {
        let filter = PostFilter::new(10)
            .expect("valid limit")
            .created_to(Some(Utc::now()));
        let query = build_filter_query("\"post\"", &filter);

        assert_eq!(
            query.sql(),
            format!("{SELECT} WHERE created_at <= $1 {ORDER} LIMIT $2 OFFSET $3")
        );
    }

    #[test]
    fn filter_query_with_both_bounds() {
        let now = Utc::now();
        let filter = PostFilter::new(10)
            .expect("valid limit")
            .with_offset(5)
            .created_from(Some(now - Duration::hours(1)))
            .created_to(Some(now));
        let query = build_filter_query("\"post\"", &filter);

        assert_eq!(
            query.sql(),
            format!(
                "{SELECT} WHERE created_at >= $1 AND created_at <= $2 {ORDER} LIMIT $3 OFFSET $4"
            )
        );
    }

    #[test]
    fn update_query_keeps_updated_at_after_created_at() {
        let queries = PostQueries::for_table("\"post\"");

        assert!(queries.update.starts_with("UPDATE \"post\" SET title = $2, content = $3,"));
        assert!(
            queries
                .update
                .contains("updated_at = GREATEST($4, created_at + INTERVAL '1 millisecond')")
        );
        assert!(queries.update.ends_with("WHERE id = $1"));
    }

    #[test]
    fn quote_identifier_escapes_embedded_quotes() {
        assert_eq!(quote_identifier("post"), "\"post\"");
        assert_eq!(quote_identifier("po\"st"), "\"po\"\"st\"");
    }

    #[test]
    fn row_round_trip_preserves_post() {
        let created_at = truncate_to_millis(
            Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0)
                .single()
                .expect("valid ts")
                + Duration::microseconds(987_654),
        );
        let updated_at = created_at + Duration::milliseconds(1500);
        let post = Post::new("id-1", "title", "content", created_at, updated_at)
            .expect("valid post");

        let restored = Post::from(PostRow::from(&post));

        assert_eq!(restored, post);
    }

    #[test]
    fn stored_rows_are_read_back_verbatim() {
        let now = truncate_to_millis(Utc::now());
        let row = PostRow {
            id: "legacy".to_string(),
            title: format!("  {}  ", "x".repeat(300)),
            content: " padded ".to_string(),
            created_at: now,
            updated_at: now,
        };

        let post = Post::from(row.clone());

        assert_eq!(post.title, row.title);
        assert_eq!(post.content, " padded ");
        assert_eq!(PostRow::from(&post), row);
    }

    mod live {
        //! Run with `DATABASE_URL=... cargo test -- --ignored`.

        use chrono::{DateTime, Duration, TimeZone, Utc};
        use sqlx::PgPool;
        use uuid::Uuid;

        use super::super::PostgresPostStorage;
        use crate::data::post_storage::{PostFilter, PostPatch, PostStorage};
        use crate::domain::error::DomainError;
        use crate::domain::post::{Post, truncate_to_millis};

        async fn storage() -> PostgresPostStorage {
            let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
            let pool = PgPool::connect(&url).await.expect("database must be reachable");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("migrations must apply");
            PostgresPostStorage::new(pool, "post")
        }

        /// A past instant unique to this test run, so filters only see our own rows.
        fn isolated_base() -> DateTime<Utc> {
            let seconds = (Uuid::new_v4().as_u128() % 1_000_000_000) as i64;
            Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0)
                .single()
                .expect("valid ts")
                + Duration::seconds(seconds * 10)
        }

        fn post_at(created_at: DateTime<Utc>) -> Post {
            let created_at = truncate_to_millis(created_at);
            Post::new(
                Uuid::new_v4().to_string(),
                "exclusive",
                "new era beginning!",
                created_at,
                created_at,
            )
            .expect("valid post")
        }

        #[tokio::test]
        #[ignore = "requires postgres (DATABASE_URL)"]
        async fn insert_then_by_id_round_trips() {
            let storage = storage().await;
            let post = post_at(Utc::now());

            storage.insert(&post).await.expect("insert must succeed");
            let stored = storage.by_id(&post.id).await.expect("post must exist");

            assert_eq!(stored, post);
        }

        #[tokio::test]
        #[ignore = "requires postgres (DATABASE_URL)"]
        async fn duplicate_insert_is_already_exists() {
            let storage = storage().await;
            let post = post_at(Utc::now());

            storage.insert(&post).await.expect("insert must succeed");
            let err = storage.insert(&post).await.expect_err("duplicate must fail");

            assert!(matches!(err, DomainError::AlreadyExists(_)));
        }

        #[tokio::test]
        #[ignore = "requires postgres (DATABASE_URL)"]
        async fn by_id_missing_is_not_found() {
            let storage = storage().await;
            let err = storage
                .by_id(&Uuid::new_v4().to_string())
                .await
                .expect_err("must be missing");

            assert!(matches!(err, DomainError::NotFound(_)));
        }

        #[tokio::test]
        #[ignore = "requires postgres (DATABASE_URL)"]
        async fn update_replaces_fields_and_keeps_created_at() {
            let storage = storage().await;
            let post = post_at(Utc::now() - Duration::minutes(1));
            storage.insert(&post).await.expect("insert must succeed");

            let updated_at = truncate_to_millis(Utc::now());
            storage
                .update(
                    &post.id,
                    PostPatch {
                        title: "title2".to_string(),
                        content: "content2".to_string(),
                        updated_at,
                    },
                )
                .await
                .expect("update must succeed");

            let stored = storage.by_id(&post.id).await.expect("post must exist");
            assert_eq!(stored.title, "title2");
            assert_eq!(stored.content, "content2");
            assert_eq!(stored.created_at, post.created_at);
            assert_eq!(stored.updated_at, updated_at);
        }

        #[tokio::test]
        #[ignore = "requires postgres (DATABASE_URL)"]
        async fn update_missing_is_not_found() {
            let storage = storage().await;
            let err = storage
                .update(
                    &Uuid::new_v4().to_string(),
                    PostPatch {
                        title: "extra new".to_string(),
                        content: "something happened".to_string(),
                        updated_at: Utc::now(),
                    },
                )
                .await
                .expect_err("update of missing row must fail");

            assert!(matches!(err, DomainError::NotFound(_)));
        }

        #[tokio::test]
        #[ignore = "requires postgres (DATABASE_URL)"]
        async fn remove_is_idempotent() {
            let storage = storage().await;
            let post = post_at(Utc::now());
            storage.insert(&post).await.expect("insert must succeed");

            storage.remove(&post.id).await.expect("remove must succeed");
            storage.remove(&post.id).await.expect("second remove must succeed");

            let err = storage.by_id(&post.id).await.expect_err("post must be gone");
            assert!(matches!(err, DomainError::NotFound(_)));
        }

        #[tokio::test]
        #[ignore = "requires postgres (DATABASE_URL)"]
        async fn by_filter_orders_bounds_and_pages() {
            let storage = storage().await;
            let base = isolated_base();
            let oldest = post_at(base);
            let middle = post_at(base + Duration::seconds(1));
            let newest = post_at(base + Duration::seconds(2));
            for post in [&oldest, &middle, &newest] {
                storage.insert(post).await.expect("insert must succeed");
            }

            let window = PostFilter::new(10)
                .expect("valid limit")
                .created_from(Some(base))
                .created_to(Some(base + Duration::seconds(2)));

            let all = storage.by_filter(window).await.expect("filter must succeed");
            let ids: Vec<_> = all.iter().map(|post| post.id.as_str()).collect();
            assert_eq!(ids, [newest.id.as_str(), middle.id.as_str(), oldest.id.as_str()]);

            let mut page = window.with_offset(1);
            page.limit = 1;
            let second = storage.by_filter(page).await.expect("filter must succeed");
            assert_eq!(second, vec![middle.clone()]);

            let later = window.created_from(Some(base + Duration::hours(1))).created_to(None);
            let later_ids: Vec<_> = storage
                .by_filter(later)
                .await
                .expect("filter must succeed")
                .into_iter()
                .map(|post| post.id)
                .collect();
            assert!(!later_ids.contains(&newest.id));
        }
    }
}
