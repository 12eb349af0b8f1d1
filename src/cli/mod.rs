//! Command-line interface module.

mod args;
pub mod images;
pub mod serve;
pub mod validate;

pub use args::{Cli, Commands, ImagesCommand};
