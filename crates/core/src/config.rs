//! Server runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the story server. Only the
//! binary reads environment variables; this module works on the values it hands over, so
//! request handling and tests never depend on process-wide state.

use crate::constants::{DEFAULT_REST_ADDR, DEFAULT_STORY_FILE};
use crate::story::Story;
use crate::template::Template;
use crate::{StoryError, StoryResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Story server configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    rest_addr: String,
    story_file: PathBuf,
    template_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Create a new `ServerConfig`.
    pub fn new(
        rest_addr: String,
        story_file: PathBuf,
        template_file: Option<PathBuf>,
    ) -> StoryResult<Self> {
        if rest_addr.trim().is_empty() {
            return Err(StoryError::InvalidInput("rest_addr cannot be empty".into()));
        }
        if story_file.as_os_str().is_empty() {
            return Err(StoryError::InvalidInput("story_file cannot be empty".into()));
        }

        Ok(Self {
            rest_addr,
            story_file,
            template_file,
        })
    }

    /// Build a config from raw environment values.
    ///
    /// `None`, empty and whitespace-only values fall back to the defaults; the template override
    /// is simply absent in that case.
    pub fn from_env_values(
        rest_addr: Option<String>,
        story_file: Option<String>,
        template_file: Option<String>,
    ) -> StoryResult<Self> {
        fn non_blank(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self::new(
            non_blank(rest_addr).unwrap_or_else(|| DEFAULT_REST_ADDR.into()),
            PathBuf::from(non_blank(story_file).unwrap_or_else(|| DEFAULT_STORY_FILE.into())),
            non_blank(template_file).map(PathBuf::from),
        )
    }

    /// Address the server binds.
    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    /// Story document to load.
    pub fn story_file(&self) -> &Path {
        &self.story_file
    }

    /// Template override file, if configured.
    pub fn template_file(&self) -> Option<&Path> {
        self.template_file.as_deref()
    }

    /// Load the configured story document.
    pub fn load_story(&self) -> StoryResult<Story> {
        Story::from_path(&self.story_file)
    }

    /// Compile the configured template override, or hand back the built-in template.
    pub fn load_template(&self) -> StoryResult<Arc<Template>> {
        match &self.template_file {
            Some(path) => Template::from_path(path).map(Arc::new),
            None => Ok(Template::builtin()),
        }
    }
}
