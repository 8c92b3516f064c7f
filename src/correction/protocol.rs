/*!
 * Line protocol shared by prompt construction and response parsing.
 *
 * Request lines look like `[CONTEXT] 7: text` or `[CORRECT] 9: text`.
 * The response repeats the corrected lines as `index: text` (markers
 * tolerated), optionally followed by `REPORT_DELIMITER` and free-text
 * change notes. Line breaks inside an entry travel as the two-character
 * escape `\n`, and literal backslashes as `\\`.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::batch::Batch;

/// Prefix for lines the AI must leave untouched
pub const CONTEXT_MARKER: &str = "[CONTEXT]";

/// Prefix for lines the AI must correct
pub const TARGET_MARKER: &str = "[CORRECT]";

/// Separates rewritten lines from the change report
pub const REPORT_DELIMITER: &str = "<<<REPORT>>>";

const LINE_BREAK_ESCAPE: &str = "\\n";

static RESPONSE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:[-*]\s*)?(?:\[(?:CONTEXT|CORRECT)\]\s*)?(\d+)\s*:\s?(.*)$").unwrap()
});

/// One rewritten line recovered from a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    pub index: usize,
    pub text: String,
}

/// A response split into its two sections
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedResponse {
    /// Rewritten lines in response order
    pub lines: Vec<ResponseLine>,
    /// Report section, if the delimiter was present
    pub report: Option<String>,
}

/// Render one request line
pub fn format_line(index: usize, text: &str, is_target: bool) -> String {
    let marker = if is_target { TARGET_MARKER } else { CONTEXT_MARKER };
    format!("{} {}: {}", marker, index, escape_line_breaks(text))
}

/// Render all lines of a batch, context first, using `text_of` to read the
/// live text of each index
pub fn format_batch<'a, F>(batch: &Batch, text_of: F) -> String
where
    F: Fn(usize) -> Option<&'a str>,
{
    batch
        .all_indices()
        .filter_map(|index| {
            text_of(index).map(|text| format_line(index, text, batch.is_target(index)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split a response at the first delimiter and extract `index: text` lines
/// from the first part. Lines that do not match are ignored.
pub fn parse_response(response: &str) -> ParsedResponse {
    let (body, report) = match response.split_once(REPORT_DELIMITER) {
        Some((body, report)) => (body, Some(report.trim().to_string())),
        None => (response, None),
    };

    let lines = body
        .lines()
        .filter_map(|line| {
            let caps = RESPONSE_LINE_REGEX.captures(line)?;
            let index = caps[1].parse().ok()?;
            Some(ResponseLine {
                index,
                text: unescape_line_breaks(caps[2].trim()),
            })
        })
        .collect();

    ParsedResponse { lines, report }
}

fn escape_line_breaks(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\n', LINE_BREAK_ESCAPE)
}

// Unknown escapes and a trailing backslash are kept verbatim
fn unescape_line_breaks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
