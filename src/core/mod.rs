//! Core types - pure abstractions shared across the codebase.

mod kind;
mod state;
mod url;

pub use kind::ContentType;
pub use state::{
    is_serving, is_shutdown, register_server, set_serving, setup_shutdown_handler,
};
pub use url::UrlPath;
