/*!
 * Append-only audit log of accepted corrections.
 */

use std::fmt;

/// Line written when a run produced no change notes
pub const NO_CHANGES_PLACEHOLDER: &str = "No corrections were made.";

/// Human-readable change descriptions, one per line, in batch order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrectionReport {
    lines: Vec<String>,
}

impl CorrectionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the non-blank lines of a report section
    pub fn extend_from_section(&mut self, section: &str) {
        self.lines.extend(
            section
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Text for persistence; an empty report renders as a placeholder line
    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            format!("{}\n", NO_CHANGES_PLACEHOLDER)
        } else {
            let mut text = self.lines.join("\n");
            text.push('\n');
            text
        }
    }
}

impl fmt::Display for CorrectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
