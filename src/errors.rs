/*!
 * Error types for the subcorrect application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while decoding timecodes or subtitle blocks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Timecode text does not match `HH:MM:SS,mmm`
    #[error("Invalid timecode '{0}': expected HH:MM:SS,mmm")]
    InvalidTimecode(String),

    /// Timecode fields are out of range (minutes or seconds >= 60)
    #[error("Timecode component out of range in '{0}'")]
    ComponentOutOfRange(String),

    /// Subtitle track text contained no parseable block
    #[error("No subtitle entries could be parsed")]
    EmptyTrack,
}

/// Errors caused by an invalid configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Batch size does not leave room for the context overlap
    #[error("Batch size {batch_size} must be greater than the context overlap {overlap}")]
    BatchSizeTooSmall {
        /// Requested batch size
        batch_size: usize,
        /// Fixed context overlap
        overlap: usize,
    },

    /// Any other invalid setting
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the failure is transient throttling that may be retried
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code == 429,
            _ => false,
        }
    }

    /// Map a non-success HTTP status and its body onto a provider error
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            429 => Self::RateLimitExceeded(message),
            401 | 403 => Self::AuthenticationError(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Structural invariant violations found after correction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Corrected index set differs from the original one
    #[error("Index mismatch: missing {missing:?}, extra {extra:?}")]
    IndexMismatch {
        /// Indices present in the original but not in the corrected track
        missing: Vec<usize>,
        /// Indices present in the corrected track only
        extra: Vec<usize>,
    },

    /// Start or end time of an entry changed
    #[error("Timestamp of entry {index} was modified")]
    TimestampChanged {
        /// Offending entry index
        index: usize,
    },

    /// Text length changed by more than the allowed ratio
    #[error("Text length of entry {index} changed too much: original {original_len}, corrected {corrected_len}")]
    LengthDeltaExceeded {
        /// Offending entry index
        index: usize,
        /// Character count before correction
        original_len: usize,
        /// Character count after correction
        corrected_len: usize,
    },
}

/// Errors returned by a correction run; no partial output accompanies any of them
#[derive(Error, Debug)]
pub enum CorrectionError {
    /// Invalid batch configuration, raised before any AI call
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Subtitle input could not be used
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// A batch failed; the whole run is discarded
    #[error("Batch {batch} correction failed after {attempts} attempt(s): {source}")]
    Batch {
        /// 1-based batch number
        batch: usize,
        /// Number of AI calls made for this batch
        attempts: u32,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// Corrected track violates a structural invariant
    #[error("Structure validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The run was cancelled between batches
    #[error("Correction cancelled after {completed_batches} of {total_batches} batch(es)")]
    Cancelled {
        /// Batches finished before cancellation was observed
        completed_batches: usize,
        /// Total batches planned for the run
        total_batches: usize,
    },
}
