//! # API REST
//!
//! HTTP layer for the CYOA story server.
//!
//! Handles:
//! - Request-to-chapter-key resolution (replaceable per server)
//! - Chapter lookup and rendering with the configured template
//! - HTTP concerns (status codes, request tracing, CORS)
//!
//! Uses `cyoa-core` for the story model and templates.

#![warn(rust_2018_idioms)]

pub mod handler;
pub mod resolver;

pub use handler::{serve_chapter, StoryHandler, StoryHandlerBuilder};
pub use resolver::{
    chapter_key_from_path, default_path_resolver, query_param_resolver, PathResolver,
};

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the story router.
///
/// Every path and method reaches [`serve_chapter`]; the resolver alone decides which chapter
/// a request names.
pub fn router(handler: StoryHandler) -> Router {
    Router::new()
        .fallback(serve_chapter)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(handler)
}
