//! Optional link checking for a loaded story.
//!
//! Serving never consults this; a dangling option still resolves to "not found" only when a
//! reader follows it. The report exists for tooling and startup diagnostics.

use crate::story::Story;

/// An option whose target key is not a chapter of the story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingOption {
    /// Chapter that carries the option.
    pub chapter: String,
    /// Label of the option.
    pub text: String,
    /// Missing target key.
    pub target: String,
}

impl std::fmt::Display for DanglingOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: option {:?} points at missing chapter {:?}",
            self.chapter, self.text, self.target
        )
    }
}

impl Story {
    /// Every option whose target is absent, ordered by chapter key then option position.
    pub fn dangling_options(&self) -> Vec<DanglingOption> {
        let mut dangling = Vec::new();
        for key in self.keys() {
            let Some(chapter) = self.get(key) else {
                continue;
            };
            for option in &chapter.options {
                if !self.contains(&option.chapter) {
                    dangling.push(DanglingOption {
                        chapter: key.to_string(),
                        text: option.text.clone(),
                        target: option.chapter.clone(),
                    });
                }
            }
        }
        dangling
    }
}
