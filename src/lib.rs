// Library surface for the binary, headless integration tests and reuse.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod keys;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod runtime;
pub mod score;
pub mod session;
pub mod text_provider;
pub mod ui;

pub use error::{Error, Result};
