use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Публичная модель поста.
pub struct Post {
    /// Идентификатор поста.
    pub id: String,
    /// Заголовок поста.
    pub title: String,
    /// Содержимое поста.
    pub content: String,
    /// Дата и время создания поста (UTC, точность до миллисекунд).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления поста (UTC, точность до миллисекунд).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Идентификация сервиса, которую возвращает `GET /`.
pub struct ServiceInfo {
    /// Имя сервиса.
    pub service_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Параметры поиска постов.
///
/// Пустые поля не передаются серверу: `limit` тогда берётся из настроек сервера,
/// `offset` равен нулю, а границы интервала не применяются.
pub struct FindPostsQuery {
    /// Максимальное число постов в ответе.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Сколько постов пропустить от начала выборки.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Нижняя граница `created_at` (включительно).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    /// Верхняя граница `created_at` (включительно).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}
