//! Constants used throughout the CYOA core crate.
//!
//! Default keys, file locations and response bodies live here so the loader, the
//! HTTP layer and the CLI agree on them.

/// Chapter served when a request names no chapter.
pub const DEFAULT_CHAPTER_KEY: &str = "intro";

/// Default listen address for the story server.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Default story document, relative to the working directory.
pub const DEFAULT_STORY_FILE: &str = "stories/gopher.json";

/// Embedded source of the built-in chapter template.
pub const DEFAULT_TEMPLATE_SOURCE: &str = include_str!("../templates/chapter.html");

/// Body returned when the resolved key names no chapter.
pub const NOT_FOUND_BODY: &str = "Chapter not found";

/// Body returned when rendering fails. Never carries error detail.
pub const RENDER_FAILED_BODY: &str = "Something went wrong...";
