#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to parse story document: {0}")]
    Parse(serde_json::Error),
    #[error("template syntax error on line {line}: {message}")]
    TemplateSyntax { line: usize, message: String },
    #[error("failed to render chapter: {0}")]
    Render(String),
    #[error("failed to write rendered output: {0}")]
    Write(std::io::Error),
}

impl StoryError {
    /// Whether the error belongs to per-request rendering rather than startup.
    pub fn is_render_failure(&self) -> bool {
        matches!(self, StoryError::Render(_) | StoryError::Write(_))
    }
}

pub type StoryResult<T> = std::result::Result<T, StoryError>;
