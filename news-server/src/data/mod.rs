pub(crate) mod post_storage;
pub(crate) mod repositories;
