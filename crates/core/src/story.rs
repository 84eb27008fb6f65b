//! Story data model and loader.
//!
//! A [`Story`] is the whole narrative graph: a map from chapter key to [`Chapter`]. It is
//! loaded once from a JSON document and never mutated afterwards. Option targets are not
//! checked here; a dangling target only shows up as a miss when a reader follows it.
//!
//! ## Document shape
//!
//! ```json
//! {
//!   "intro": {
//!     "title": "The Little Blue Gopher",
//!     "story": ["Once upon a time..."],
//!     "options": [{ "text": "Go to New York", "arc": "new-york" }]
//!   }
//! }
//! ```
//!
//! Missing fields default to empty values and unknown fields are ignored.

use crate::{StoryError, StoryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// A single node of the narrative graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default)]
    pub title: String,
    #[serde(default, rename = "story")]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub options: Vec<StoryOption>,
}

/// A labelled link from one chapter to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOption {
    /// Link label shown to the reader.
    #[serde(default)]
    pub text: String,
    /// Key of the target chapter.
    #[serde(default, rename = "arc")]
    pub chapter: String,
}

/// The complete narrative graph, keyed by chapter identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Story {
    chapters: HashMap<String, Chapter>,
}

impl Story {
    /// Build a story from already-parsed chapters.
    ///
    /// # Errors
    /// Returns `StoryError::InvalidInput` if any chapter key is empty.
    pub fn new(chapters: HashMap<String, Chapter>) -> StoryResult<Self> {
        if chapters.contains_key("") {
            return Err(StoryError::InvalidInput(
                "chapter keys cannot be empty".into(),
            ));
        }
        Ok(Self { chapters })
    }

    /// Parse a story document from any byte stream.
    ///
    /// # Errors
    /// Returns `StoryError::Parse` if the document is not a JSON object of chapters, or
    /// `StoryError::InvalidInput` if a chapter key is empty.
    pub fn from_reader<R: Read>(reader: R) -> StoryResult<Self> {
        let chapters: HashMap<String, Chapter> =
            serde_json::from_reader(reader).map_err(StoryError::Parse)?;
        Self::new(chapters)
    }

    /// Parse a story document held in memory.
    pub fn from_json(input: &str) -> StoryResult<Self> {
        Self::from_reader(input.as_bytes())
    }

    /// Open and parse a story document from disk.
    ///
    /// # Errors
    /// Returns `StoryError::FileRead` if the file cannot be opened, otherwise the same errors
    /// as [`Story::from_reader`].
    pub fn from_path(path: &Path) -> StoryResult<Self> {
        let file = File::open(path).map_err(StoryError::FileRead)?;
        let story = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(
            "loaded {} chapters from {}",
            story.len(),
            path.display()
        );
        Ok(story)
    }

    /// The chapter stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Chapter> {
        self.chapters.get(key)
    }

    /// Whether `key` names a chapter.
    pub fn contains(&self, key: &str) -> bool {
        self.chapters.contains_key(key)
    }

    /// Number of chapters.
    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    /// Whether the story has no chapters.
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Chapter keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.chapters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Iterate chapters in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Chapter)> {
        self.chapters.iter().map(|(k, c)| (k.as_str(), c))
    }
}
