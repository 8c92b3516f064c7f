/*!
 * # subcorrect - AI-assisted subtitle correction
 *
 * A Rust library for reconciling speech-recognition subtitles with the
 * trusted transcript they were spoken from.
 *
 * ## Features
 *
 * - Batched AI correction with read-only context carried between batches
 * - Providers:
 *   - Gemini API
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Timing, ordering and entry count preserved, enforced by a structural gate
 * - Retry with exponential backoff on rate limits, pacing between batches
 * - Proportional timestamp rescaling and multi-segment merging
 * - Dictionary-driven homophone replacement for speech synthesis input
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `timecode`: SRT timecode parsing and formatting
 * - `subtitle_processor`: Subtitle track parsing and serialization
 * - `transcript`: Reference transcript normalization
 * - `correction`: The correction engine:
 *   - `correction::batch`: Overlapping batch segmentation
 *   - `correction::protocol`: Prompt/response line protocol
 *   - `correction::retry`: Retry policy, sleeping and cancellation
 *   - `correction::engine`: Batch-by-batch correction runs
 * - `validation`: Structural checks on corrected tracks
 * - `timing`: Rescaling and merging of timestamps
 * - `homophone`: Homophone dictionary replacement
 * - `providers`: Client implementations for various LLM providers
 * - `app_config`: Configuration management
 * - `app_controller`: File-level workflows
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod correction;
pub mod errors;
pub mod file_utils;
pub mod homophone;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod timecode;
pub mod timing;
pub mod transcript;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use correction::{CorrectionOptions, CorrectionOutcome, CorrectionReport, SubtitleCorrector};
pub use errors::{ConfigError, CorrectionError, FormatError, ProviderError, ValidationError};
pub use subtitle_processor::{SubtitleEntry, SubtitleTrack};
pub use transcript::TranscriptReference;
pub use validation::StructuralValidator;
