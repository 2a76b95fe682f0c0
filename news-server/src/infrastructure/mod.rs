pub(crate) mod clock;
pub(crate) mod database;
pub(crate) mod id_generator;
pub(crate) mod logging;
pub(crate) mod settings;
