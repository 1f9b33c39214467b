pub mod config;
pub mod logging;

pub mod checksum;
pub mod context;
pub mod error;
pub mod github;
pub mod http;
pub mod manifest;
pub mod pipeline;
pub mod resolve;
pub mod retry;
pub mod template;
pub mod url_model;
pub mod version;
pub mod webhook;

pub use context::ReleaseContext;
pub use error::{ReleaseError, Result};
