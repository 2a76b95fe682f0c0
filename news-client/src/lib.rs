//! Клиентская библиотека для работы с news-svc по HTTP.
//!
//! Предоставляет типизированный API (`NewsClient`) поверх REST-эндпоинтов сервиса:
//! создание, чтение, upsert, удаление и поиск постов по интервалу `created_at`.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{NewsClientError, NewsClientResult};
pub use http_client::NewsClient;
pub use models::{FindPostsQuery, Post, ServiceInfo};
