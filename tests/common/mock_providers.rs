/*!
 * Response builders and provider wiring for tests
 *
 * The mock provider itself lives in `subcorrect::providers::mock`; these
 * helpers build well-formed AI responses and common corrector setups so no
 * test makes an external request.
 */

use std::sync::Arc;

use subcorrect::correction::protocol::REPORT_DELIMITER;
use subcorrect::correction::{CorrectionOptions, RecordingSleeper, SubtitleCorrector};
use subcorrect::providers::mock::MockProvider;

/// Build a response with `index: text` lines and an optional report section
pub fn corrected_response(lines: &[(usize, &str)], report: &[&str]) -> String {
    let mut response = lines
        .iter()
        .map(|(index, text)| format!("{}: {}", index, text))
        .collect::<Vec<_>>()
        .join("\n");

    if !report.is_empty() {
        response.push('\n');
        response.push_str(REPORT_DELIMITER);
        response.push('\n');
        response.push_str(&report.join("\n"));
    }
    response
}

/// Corrector over `provider` whose delays are recorded instead of slept
pub fn recording_corrector(provider: &MockProvider) -> (SubtitleCorrector, RecordingSleeper) {
    let sleeper = RecordingSleeper::new();
    let corrector = SubtitleCorrector::new(Arc::new(provider.clone()), CorrectionOptions::default())
        .with_sleeper(Arc::new(sleeper.clone()));
    (corrector, sleeper)
}
