use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{NewsClientError, NewsClientResult};
use crate::models::{FindPostsQuery, Post, ServiceInfo};

#[derive(Debug, Serialize)]
struct PostDraftDto<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<ErrorDetailDto>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetailDto {
    message: String,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `news-svc`.
pub struct NewsClient {
    base_url: String,
    client: Client,
}

impl NewsClient {
    /// Создаёт новый клиент с базовым URL сервера, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> NewsClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> NewsClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.error.map(|detail| detail.message),
            Err(_) => None,
        };
        NewsClientError::from_http_status(status, message)
    }

    async fn send(request: RequestBuilder) -> NewsClientResult<reqwest::Response> {
        let response = request.send().await.map_err(NewsClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn send_for_json<TRes>(request: RequestBuilder) -> NewsClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(NewsClientError::from_reqwest)
    }

    /// Возвращает имя сервиса (`GET /`).
    pub async fn service_info(&self) -> NewsClientResult<ServiceInfo> {
        let request = self.client.request(Method::GET, self.endpoint("/"));
        Self::send_for_json(request).await
    }

    /// Создаёт пост; идентификатор и временные метки назначает сервер.
    pub async fn create_post(&self, title: &str, content: &str) -> NewsClientResult<Post> {
        let request = self
            .client
            .request(Method::POST, self.endpoint("/posts"))
            .json(&PostDraftDto { title, content });
        Self::send_for_json(request).await
    }

    /// Получает пост по идентификатору.
    pub async fn get_post(&self, id: &str) -> NewsClientResult<Post> {
        let request = self
            .client
            .request(Method::GET, self.endpoint(&post_path(id)));
        Self::send_for_json(request).await
    }

    /// Обновляет пост по идентификатору или создаёт его, если поста нет.
    ///
    /// Сервер не возвращает тело ответа; актуальное состояние можно получить
    /// через [`NewsClient::get_post`].
    pub async fn upsert_post(&self, id: &str, title: &str, content: &str) -> NewsClientResult<()> {
        let request = self
            .client
            .request(Method::PUT, self.endpoint(&post_path(id)))
            .json(&PostDraftDto { title, content });
        Self::send(request).await?;
        Ok(())
    }

    /// Удаляет пост по идентификатору. Удаление отсутствующего поста не считается ошибкой.
    pub async fn delete_post(&self, id: &str) -> NewsClientResult<()> {
        let request = self
            .client
            .request(Method::DELETE, self.endpoint(&post_path(id)));
        Self::send(request).await?;
        Ok(())
    }

    /// Ищет посты по интервалу `created_at`, от новых к старым.
    pub async fn find_posts(&self, query: &FindPostsQuery) -> NewsClientResult<Vec<Post>> {
        let request = self
            .client
            .request(Method::GET, self.endpoint("/posts"))
            .query(query);
        Self::send_for_json(request).await
    }
}

fn post_path(id: &str) -> String {
    format!("/posts/{}", urlencoding::encode(id))
}
