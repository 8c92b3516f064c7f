/*!
 * Subtitle correction against a reference transcript.
 *
 * This module is organized into several submodules:
 * - `batch`: splitting entries into overlapping batches
 * - `protocol`: the line format shared by prompts and responses
 * - `prompts`: the correction prompt template
 * - `retry`: retry policy, injectable sleeping and cancellation
 * - `report`: the accumulated change report
 * - `engine`: the batch-by-batch correction run
 */

pub mod batch;
pub mod engine;
pub mod prompts;
pub mod protocol;
pub mod report;
pub mod retry;

// Re-export main types
pub use batch::{segment, Batch, CONTEXT_OVERLAP, DEFAULT_BATCH_SIZE};
pub use engine::{CorrectionOptions, CorrectionOutcome, ProgressCallback, SubtitleCorrector, DEFAULT_PACING_DELAY};
pub use prompts::CorrectionPromptTemplate;
pub use report::{CorrectionReport, NO_CHANGES_PLACEHOLDER};
pub use retry::{CancellationFlag, RecordingSleeper, RetryPolicy, Sleeper, TokioSleeper};
