//! Utility modules shared across the toolkit.

pub mod mime;
pub mod path;
pub mod plural;
pub mod slug;

pub use path::{normalize_path, relativize};
pub use plural::{plural_count, plural_s};
pub use slug::slugify;
