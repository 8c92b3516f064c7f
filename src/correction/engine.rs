/*!
 * Batched subtitle correction against a reference transcript.
 *
 * A run parses the track, splits it into overlapping batches and asks the
 * provider to rewrite each batch in turn. Accepted text is written into a
 * working copy, so later batches see already-corrected context. Nothing is
 * returned unless every batch succeeds and the result passes structural
 * validation.
 */

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::errors::{CorrectionError, FormatError};
use crate::providers::Provider;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};
use crate::transcript::TranscriptReference;
use crate::validation::structure::{StructuralValidator, DEFAULT_MAX_LENGTH_DELTA};

use super::batch::{self, Batch};
use super::prompts::CorrectionPromptTemplate;
use super::protocol::{self, ParsedResponse};
use super::report::CorrectionReport;
use super::retry::{complete_with_retry, CancellationFlag, RetryPolicy, Sleeper, TokioSleeper};

/// Default pause before every batch after the first
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_secs(5);

/// Called with `(completed_batches, total_batches)` after each batch
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Tunables for a correction run
#[derive(Debug, Clone)]
pub struct CorrectionOptions {
    /// Retry behavior for rate-limited calls
    pub retry: RetryPolicy,
    /// Pause inserted before each batch after the first
    pub pacing_delay: Duration,
    /// Maximum relative text-length change per entry
    pub max_length_delta: f64,
    /// Prompt sent for every batch
    pub template: CorrectionPromptTemplate,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            pacing_delay: DEFAULT_PACING_DELAY,
            max_length_delta: DEFAULT_MAX_LENGTH_DELTA,
            template: CorrectionPromptTemplate::default(),
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionOutcome {
    /// Corrected entries in ascending index order
    pub track: SubtitleTrack,
    /// Change notes collected from every batch
    pub report: CorrectionReport,
}

/// Correction engine bound to one provider
pub struct SubtitleCorrector {
    provider: Arc<dyn Provider>,
    options: CorrectionOptions,
    sleeper: Arc<dyn Sleeper>,
    cancellation: Option<CancellationFlag>,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for SubtitleCorrector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubtitleCorrector")
            .field("provider", &self.provider.name())
            .field("options", &self.options)
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

impl SubtitleCorrector {
    /// Create a corrector that sleeps on the tokio timer
    pub fn new(provider: Arc<dyn Provider>, options: CorrectionOptions) -> Self {
        Self {
            provider,
            options,
            sleeper: Arc::new(TokioSleeper),
            cancellation: None,
            progress: None,
        }
    }

    /// Replace the source of pacing and backoff delays
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Stop between batches once `flag` is cancelled
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Report progress after each batch
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn options(&self) -> &CorrectionOptions {
        &self.options
    }

    /// Correct raw subtitle text against a raw transcript.
    ///
    /// The transcript is normalized and the subtitles parsed leniently before
    /// the run starts.
    pub async fn correct_subtitles(
        &self,
        transcript_text: &str,
        subtitle_text: &str,
        batch_size: usize,
    ) -> Result<CorrectionOutcome, CorrectionError> {
        let transcript = TranscriptReference::normalize(transcript_text);
        let track = SubtitleTrack::parse(subtitle_text);
        self.correct_track(&transcript, &track, batch_size).await
    }

    /// Correct an already parsed track
    pub async fn correct_track(
        &self,
        transcript: &TranscriptReference,
        original: &SubtitleTrack,
        batch_size: usize,
    ) -> Result<CorrectionOutcome, CorrectionError> {
        // Later duplicates of an index replace earlier ones
        let mut working: BTreeMap<usize, SubtitleEntry> = original
            .entries
            .iter()
            .map(|entry| (entry.index, entry.clone()))
            .collect();
        let keys: Vec<usize> = working.keys().copied().collect();

        let batches = batch::segment(&keys, batch_size)?;
        if batches.is_empty() {
            return Err(FormatError::EmptyTrack.into());
        }

        let run_id = Uuid::new_v4();
        let total = batches.len();
        let started = Instant::now();
        let mut report = CorrectionReport::new();

        info!(
            "[{}] Correcting {} entries in {} batch(es) with {}",
            run_id,
            keys.len(),
            total,
            self.provider.name()
        );
        if transcript.is_empty() {
            warn!("[{}] Reference transcript is empty", run_id);
        }

        for batch in &batches {
            if self.cancellation.as_ref().is_some_and(CancellationFlag::is_cancelled) {
                warn!("[{}] Cancelled before batch {}/{}", run_id, batch.number, total);
                return Err(CorrectionError::Cancelled {
                    completed_batches: batch.number - 1,
                    total_batches: total,
                });
            }

            if batch.number > 1 && !self.options.pacing_delay.is_zero() {
                debug!("[{}] Pacing {:?} before batch {}", run_id, self.options.pacing_delay, batch.number);
                self.sleeper.sleep(self.options.pacing_delay).await;
            }

            let lines = protocol::format_batch(batch, |index| {
                working.get(&index).map(|entry| entry.text.as_str())
            });
            let prompt = self.options.template.render(transcript.as_str(), &lines);

            let (response, attempts) = complete_with_retry(
                self.provider.as_ref(),
                &prompt,
                &self.options.retry,
                self.sleeper.as_ref(),
            )
            .await
            .map_err(|failure| CorrectionError::Batch {
                batch: batch.number,
                attempts: failure.attempts,
                source: failure.error,
            })?;

            let parsed = protocol::parse_response(&response);
            let applied = apply_batch(&mut working, batch, &parsed, run_id);

            if let Some(section) = parsed.report.as_deref() {
                report.extend_from_section(section);
            }

            info!(
                "[{}] Batch {}/{}: {}/{} line(s) applied after {} attempt(s)",
                run_id,
                batch.number,
                total,
                applied,
                batch.targets.len(),
                attempts
            );

            if let Some(progress) = &self.progress {
                progress(batch.number, total);
            }
        }

        let corrected = SubtitleTrack::new(working.into_values().collect());
        StructuralValidator::with_max_length_delta(self.options.max_length_delta)
            .validate(original, &corrected)?;

        info!(
            "[{}] Correction finished in {:.1}s with {} report line(s)",
            run_id,
            started.elapsed().as_secs_f64(),
            report.lines().len()
        );

        Ok(CorrectionOutcome {
            track: corrected,
            report,
        })
    }
}

/// Write the response's target lines into the working copy.
///
/// Returns the number of targets that received text. Echoed context lines
/// and unknown indices are ignored; targets missing from the response keep
/// their current text.
fn apply_batch(
    working: &mut BTreeMap<usize, SubtitleEntry>,
    batch: &Batch,
    parsed: &ParsedResponse,
    run_id: Uuid,
) -> usize {
    let mut answered = HashSet::new();

    for line in &parsed.lines {
        if !batch.is_target(line.index) {
            debug!("[{}] Ignoring out-of-scope line {} in batch {}", run_id, line.index, batch.number);
            continue;
        }
        if let Some(entry) = working.get_mut(&line.index) {
            entry.text = line.text.clone();
            answered.insert(line.index);
        }
    }

    for index in batch.targets.iter().filter(|index| !answered.contains(index)) {
        warn!(
            "[{}] Batch {}: no correction returned for entry {}, keeping original text",
            run_id, batch.number, index
        );
    }

    answered.len()
}
