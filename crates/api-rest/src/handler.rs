//! Chapter request handler.
//!
//! [`StoryHandler`] holds the loaded story, the compiled template and the path resolver. It is
//! cheap to clone and never mutated, so every request task reads the same shared state without
//! locking.

use crate::resolver::{default_path_resolver, PathResolver};
use axum::{
    extract::{Request, State},
    http::{request::Parts, StatusCode},
    response::Html,
};
use cyoa_core::{Story, Template, NOT_FOUND_BODY, RENDER_FAILED_BODY};
use std::sync::Arc;

/// Shared, read-only state for serving chapters.
#[derive(Clone)]
pub struct StoryHandler {
    story: Arc<Story>,
    template: Arc<Template>,
    resolve: PathResolver,
}

impl std::fmt::Debug for StoryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryHandler")
            .field("chapters", &self.story.len())
            .finish_non_exhaustive()
    }
}

impl StoryHandler {
    /// A handler with the built-in template and the default path resolver.
    pub fn new(story: Story) -> Self {
        Self::builder(story).build()
    }

    /// Start building a handler for `story`.
    pub fn builder(story: impl Into<Arc<Story>>) -> StoryHandlerBuilder {
        StoryHandlerBuilder {
            story: story.into(),
            template: None,
            resolve: None,
        }
    }

    /// The story this handler serves.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// The template chapters are rendered with.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Chapter key for a request, as decided by the configured resolver.
    pub fn resolve_key(&self, parts: &Parts) -> String {
        (self.resolve)(parts)
    }

    /// Resolve, look up and render the chapter a request asks for.
    ///
    /// The chapter is rendered into a fresh buffer, so a failed render never produces a partial
    /// body. Failure detail is logged here and replaced with a generic message.
    pub fn respond(&self, parts: &Parts) -> Result<Html<Vec<u8>>, (StatusCode, &'static str)> {
        let key = self.resolve_key(parts);

        let Some(chapter) = self.story.get(&key) else {
            tracing::debug!("Chapter not found: {:?}", key);
            return Err((StatusCode::NOT_FOUND, NOT_FOUND_BODY));
        };

        let mut body = Vec::new();
        match self.template.render(chapter, &mut body) {
            Ok(()) => Ok(Html(body)),
            Err(e) => {
                tracing::error!("Render chapter {:?} error: {:?}", key, e);
                Err((StatusCode::INTERNAL_SERVER_ERROR, RENDER_FAILED_BODY))
            }
        }
    }
}

/// Construction-time configuration for [`StoryHandler`].
pub struct StoryHandlerBuilder {
    story: Arc<Story>,
    template: Option<Arc<Template>>,
    resolve: Option<PathResolver>,
}

impl StoryHandlerBuilder {
    /// Replace the built-in template. The template is already compiled, so it is known to be
    /// well-formed.
    pub fn template(mut self, template: impl Into<Arc<Template>>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Replace the default path resolver.
    pub fn path_resolver<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&Parts) -> String + Send + Sync + 'static,
    {
        self.resolve = Some(Arc::new(resolve));
        self
    }

    /// Replace the default path resolver with an already shared one.
    pub fn shared_path_resolver(mut self, resolve: PathResolver) -> Self {
        self.resolve = Some(resolve);
        self
    }

    /// Finish the handler, filling unset hooks with the built-in template and default resolver.
    pub fn build(self) -> StoryHandler {
        StoryHandler {
            story: self.story,
            template: self.template.unwrap_or_else(Template::builtin),
            resolve: self.resolve.unwrap_or_else(default_path_resolver),
        }
    }
}

/// Serve the chapter named by any request path.
///
/// # Returns
/// * `Ok(Html)` - The rendered chapter
/// * `Err((StatusCode, &str))` - `404 Chapter not found` or `500 Something went wrong...`
#[axum::debug_handler]
pub async fn serve_chapter(
    State(handler): State<StoryHandler>,
    request: Request,
) -> Result<Html<Vec<u8>>, (StatusCode, &'static str)> {
    let (parts, _body) = request.into_parts();
    handler.respond(&parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(uri: &str) -> Parts {
        let (parts, ()) = HttpRequest::builder()
            .uri(uri)
            .body(())
            .expect("request")
            .into_parts();
        parts
    }

    fn story() -> Story {
        Story::from_json(
            r#"{
                "intro": {"title": "Intro", "story": ["p1"], "options": [{"text": "go", "arc": "ch2"}]},
                "ch2": {"title": "Chapter Two", "story": ["p2"]}
            }"#,
        )
        .expect("parse story")
    }

    #[test]
    fn renders_known_chapter() {
        let handler = StoryHandler::new(story());
        let Html(body) = handler.respond(&parts("/ch2")).expect("hit");
        let html = String::from_utf8(body).expect("utf8");
        assert!(html.contains("Chapter Two"), "{html}");
    }

    #[test]
    fn misses_with_not_found() {
        let handler = StoryHandler::new(story());
        let err = handler.respond(&parts("/ch3")).expect_err("miss");
        assert_eq!(err, (StatusCode::NOT_FOUND, "Chapter not found"));
    }

    #[test]
    fn render_failure_is_generic() {
        let template = Template::compile("{{.Missing}}").expect("compile");
        let handler = StoryHandler::builder(story()).template(template).build();
        let err = handler.respond(&parts("/")).expect_err("render failure");
        assert_eq!(
            err,
            (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong...")
        );
    }

    #[test]
    fn builder_defaults_to_builtin_template() {
        let handler = StoryHandler::new(story());
        let builtin = Template::builtin();
        assert!(std::ptr::eq(handler.template(), builtin.as_ref()));
    }

    #[test]
    fn custom_resolver_replaces_key_derivation() {
        let handler = StoryHandler::builder(story())
            .path_resolver(|_: &Parts| "ch2".to_string())
            .build();
        assert_eq!(handler.resolve_key(&parts("/intro")), "ch2");
        assert_eq!(handler.resolve_key(&parts("/anything")), "ch2");
    }

    #[test]
    fn handlers_share_one_story() {
        let shared = Arc::new(story());
        let a = StoryHandler::builder(Arc::clone(&shared)).build();
        let b = a.clone();
        assert!(std::ptr::eq(a.story(), b.story()));
        assert_eq!(Arc::strong_count(&shared), 3);
    }
}
