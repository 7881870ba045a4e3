pub mod app_context;
pub mod evaluation_context;
pub mod remote_config_error;
pub mod remote_config_options;
pub mod server_config;
pub mod server_template;

pub(crate) mod internal;
