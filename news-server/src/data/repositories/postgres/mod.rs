pub(crate) mod post_storage;
