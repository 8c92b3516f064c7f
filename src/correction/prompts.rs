/*!
 * Prompt template for subtitle correction.
 */

use super::protocol::{CONTEXT_MARKER, REPORT_DELIMITER, TARGET_MARKER};

/// Placeholder replaced by the normalized transcript
pub const TRANSCRIPT_PLACEHOLDER: &str = "{transcript}";

/// Placeholder replaced by the marked subtitle lines
pub const SUBTITLES_PLACEHOLDER: &str = "{subtitles}";

/// Correction prompt with `{transcript}` and `{subtitles}` placeholders.
#[derive(Debug, Clone)]
pub struct CorrectionPromptTemplate {
    template: String,
}

impl CorrectionPromptTemplate {
    /// The default correction prompt.
    pub const SUBTITLE_CORRECTOR: &'static str = r#"You are a meticulous subtitle proofreader. The subtitles below were produced by speech recognition and contain recognition errors: wrong characters, homophones, duplicated words and missing punctuation. The reference transcript is the authoritative text that was spoken.

## Reference transcript (read-only)
{transcript}

## Subtitles
Each line is `<marker> <number>: <text>`.
- Lines marked {context_marker} are context from the previous batch. Do NOT return them.
- Lines marked {target_marker} must be corrected against the transcript.
- A literal \n inside a line is a line break; keep it where it is.

{subtitles}

## Rules
- Fix wording only so that it matches the transcript; never merge, split, add or drop lines.
- Keep every number exactly as given and keep each line's length close to the original.
- Do not add timestamps or commentary to the subtitle lines.

## Output format
Return every {target_marker} line as `<number>: <corrected text>`, one per line, in the original order.
Then write the delimiter {delimiter} on its own line, followed by one line per change in the form
`<number>: <old> -> <new>`. If nothing changed, omit the delimiter and the change list."#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default correction template.
    pub fn subtitle_corrector() -> Self {
        Self::new(Self::SUBTITLE_CORRECTOR)
    }

    /// Whether a custom template carries both required placeholders
    pub fn has_required_placeholders(template: &str) -> bool {
        template.contains(TRANSCRIPT_PLACEHOLDER) && template.contains(SUBTITLES_PLACEHOLDER)
    }

    /// Render the template with the given transcript and subtitle lines.
    pub fn render(&self, transcript: &str, subtitles: &str) -> String {
        // Protocol constants go first so that user content is never rescanned.
        self.template
            .replace("{context_marker}", CONTEXT_MARKER)
            .replace("{target_marker}", TARGET_MARKER)
            .replace("{delimiter}", REPORT_DELIMITER)
            .replace(TRANSCRIPT_PLACEHOLDER, transcript)
            .replace(SUBTITLES_PLACEHOLDER, subtitles)
    }
}

impl Default for CorrectionPromptTemplate {
    fn default() -> Self {
        Self::subtitle_corrector()
    }
}
