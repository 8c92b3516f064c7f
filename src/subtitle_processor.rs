use std::fmt;
use std::fs;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{warn, debug};

use crate::timecode::{format_timecode, parse_timecode};

// @module: Subtitle track parsing and serialization

// @const: One SRT block: index line, timing line, one or more non-empty text lines
static BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(\d+)[ \t]*\n[ \t]*(\d{2,}:\d{2}:\d{2}[,.]\d{3})[ \t]*-->[ \t]*(\d{2,}:\d{2}:\d{2}[,.]\d{3})[^\n]*\n((?:[^\n]*\S[^\n]*(?:\n|$))+)"
    ).unwrap()
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub index: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Subtitle text, lines joined by '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(index: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            index,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        format_timecode(self.start_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        format_timecode(self.end_ms)
    }

    /// Number of characters in the text, as counted by the length-delta check
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Ordered subtitle entries for one audio asset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    /// Create a track from already-built entries
    pub fn new(entries: Vec<SubtitleEntry>) -> Self {
        SubtitleTrack { entries }
    }

    /// Parse SRT text into a track.
    ///
    /// Parsing is lenient: spans that do not form a complete block are
    /// ignored, and blocks whose timecodes cannot be decoded are skipped with
    /// a warning. Empty or unparseable input gives an empty track. Entries
    /// keep their file order.
    pub fn parse(content: &str) -> Self {
        let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
        let normalized = normalized.trim_start_matches('\u{feff}');

        let mut entries = Vec::new();
        for caps in BLOCK_REGEX.captures_iter(normalized) {
            let index = match caps[1].parse::<usize>() {
                Ok(index) => index,
                Err(e) => {
                    warn!("Skipping subtitle block with invalid index '{}': {}", &caps[1], e);
                    continue;
                }
            };

            let (start_ms, end_ms) = match (parse_timecode(&caps[2]), parse_timecode(&caps[3])) {
                (Ok(start), Ok(end)) => (start, end),
                (Err(e), _) | (_, Err(e)) => {
                    warn!("Skipping subtitle block {}: {}", index, e);
                    continue;
                }
            };

            let text = caps[4]
                .lines()
                .map(str::trim_end)
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string();

            entries.push(SubtitleEntry::new(index, start_ms, end_ms, text));
        }

        if entries.is_empty() && !normalized.trim().is_empty() {
            warn!("No valid subtitle entries found in content");
        } else {
            debug!("Parsed {} subtitle entries", entries.len());
        }

        SubtitleTrack { entries }
    }

    /// Serialize to SRT text, blocks in ascending index order
    pub fn serialize(&self) -> String {
        let mut ordered: Vec<&SubtitleEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|entry| entry.index);

        ordered.iter().map(|entry| entry.to_string()).collect()
    }

    /// Read and parse an SRT file
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read subtitle file: {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Write subtitles to an SRT file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        fs::write(path, self.serialize())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))
    }

    /// Entry indices in file order
    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|entry| entry.index).collect()
    }

    /// Look up an entry by its index
    pub fn get(&self, index: usize) -> Option<&SubtitleEntry> {
        self.entries.iter().find(|entry| entry.index == index)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the track has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End time of the last entry in file order
    pub fn last_end_ms(&self) -> Option<u64> {
        self.entries.last().map(|entry| entry.end_ms)
    }
}

impl fmt::Display for SubtitleTrack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
