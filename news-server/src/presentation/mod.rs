use std::sync::Arc;

use crate::application::post_service::PostService;

pub(crate) mod http;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ListLimits {
    pub(crate) default_limit: u32,
    pub(crate) max_limit: u32,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) post_service: Arc<PostService>,
    pub(crate) service_name: Arc<str>,
    pub(crate) list_limits: ListLimits,
}

impl AppState {
    pub(crate) fn new(
        post_service: Arc<PostService>,
        service_name: impl Into<Arc<str>>,
        list_limits: ListLimits,
    ) -> Self {
        Self {
            post_service,
            service_name: service_name.into(),
            list_limits,
        }
    }
}
