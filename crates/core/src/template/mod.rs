//! Chapter templates.
//!
//! A [`Template`] is compiled once and then rendered for any number of chapters, from any
//! number of threads. Compilation rejects malformed source up front; rendering can still fail
//! when a well-formed template asks for data a chapter does not have.
//!
//! ## Syntax
//! - `{{.}}` prints the current value, `{{.Title}}` or `{{.A.B}}` print a field
//! - `{{range .Options}} ... {{else}} ... {{end}}` repeats its body for each element
//! - `{{if .Options}} ... {{else}} ... {{end}}` renders a branch; empty text and lists are false
//! - `{{/* ... */}}` is a comment
//! - `{{- ` and ` -}}` trim whitespace on that side of the action
//!
//! A chapter exposes `Title`, `Paragraphs` and `Options`; an option exposes `Text` and
//! `Chapter`. Printed values are HTML-escaped.

mod exec;
mod parse;

use crate::constants::DEFAULT_TEMPLATE_SOURCE;
use crate::story::Chapter;
use crate::{StoryError, StoryResult};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, LazyLock};

// Compiled on first use. `StoryHandler` construction forces this before the server binds.
static BUILTIN: LazyLock<Arc<Template>> = LazyLock::new(|| {
    Arc::new(
        Template::compile(DEFAULT_TEMPLATE_SOURCE)
            .expect("embedded chapter template must compile"),
    )
});

/// A compiled chapter template.
#[derive(Debug, Clone)]
pub struct Template {
    nodes: Vec<parse::Node>,
}

impl Template {
    /// Compile template source.
    ///
    /// # Errors
    /// Returns `StoryError::TemplateSyntax` with the offending line if the source is malformed.
    pub fn compile(source: &str) -> StoryResult<Self> {
        let nodes = parse::compile(source)?;
        Ok(Self { nodes })
    }

    /// Read and compile a template file.
    ///
    /// # Errors
    /// Returns `StoryError::FileRead` if the file cannot be read, or
    /// `StoryError::TemplateSyntax` if it does not compile.
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        let source = std::fs::read_to_string(path).map_err(StoryError::FileRead)?;
        Self::compile(&source)
    }

    /// The process-wide built-in template.
    ///
    /// # Panics
    /// Panics on first call if the embedded template does not compile. This is a startup
    /// assertion on a compile-time constant, not a runtime condition.
    pub fn builtin() -> Arc<Template> {
        Arc::clone(&BUILTIN)
    }

    /// Render `chapter` into `out`.
    ///
    /// Output already written before a failure is not rolled back; callers that must not leak
    /// partial output should render into a buffer.
    ///
    /// # Errors
    /// Returns `StoryError::Render` if the template references data the chapter does not
    /// provide, or `StoryError::Write` if `out` fails.
    pub fn render<W: Write>(&self, chapter: &Chapter, out: &mut W) -> StoryResult<()> {
        exec::execute(&self.nodes, chapter, out)
    }

    /// Render `chapter` into a new string.
    pub fn render_to_string(&self, chapter: &Chapter) -> StoryResult<String> {
        let mut buf = Vec::new();
        self.render(chapter, &mut buf)?;
        // Templates are `str` and every interpolated value is `str`.
        String::from_utf8(buf).map_err(|e| StoryError::Render(e.to_string()))
    }
}
