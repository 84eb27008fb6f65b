//! # CYOA Core
//!
//! Core story logic for the choose-your-own-adventure server.
//!
//! This crate contains the pure, transport-free pieces:
//! - The story graph and its JSON loader
//! - Chapter templates: compilation and rendering
//! - Optional link checking for tooling
//! - Startup configuration
//!
//! **No API concerns**: request routing and HTTP responses belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod story;
pub mod template;
pub mod validation;

pub use config::ServerConfig;
pub use constants::*;
pub use error::{StoryError, StoryResult};
pub use story::{Chapter, Story, StoryOption};
pub use template::Template;
pub use validation::DanglingOption;
