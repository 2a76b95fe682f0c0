use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `news-client`.
pub enum NewsClientError {
    /// Ошибка HTTP-транспорта (`reqwest`): соединение, таймаут, декодирование ответа.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Запрошенный пост не найден (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Пост с таким идентификатором уже существует (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос: ошибка валидации или неверные параметры (прочие 4xx).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Внутренняя ошибка сервера (5xx).
    #[error("server error: {0}")]
    Server(String),
}

/// Результат операций `news-client`.
pub type NewsClientResult<T> = Result<T, NewsClientError>;

impl NewsClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            reqwest::StatusCode::CONFLICT => Self::Conflict(message),
            status if status.is_server_error() => Self::Server(message),
            _ => Self::InvalidRequest(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
