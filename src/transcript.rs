/*!
 * Reference transcript used as ground truth during correction.
 */

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

// SSML and other markup tags
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalized, immutable transcript text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptReference {
    text: String,
}

impl TranscriptReference {
    /// Strip markup tags, collapse whitespace runs (newlines included) to a
    /// single space and trim both ends.
    pub fn normalize(raw: &str) -> Self {
        let without_tags = TAG_REGEX.replace_all(raw, "");
        let collapsed = WHITESPACE_REGEX.replace_all(&without_tags, " ");
        Self {
            text: collapsed.trim().to_string(),
        }
    }

    /// Load a UTF-8 transcript file and normalize it
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript file: {}", path.display()))?;
        Ok(Self::normalize(&raw))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl fmt::Display for TranscriptReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
