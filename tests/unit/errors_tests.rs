/*!
 * Tests for error types and their messages
 */

use std::error::Error;
use subcorrect::errors::{ConfigError, CorrectionError, FormatError, ProviderError, ValidationError};

/// Test provider error display
#[test]
fn test_providerError_display_shouldFormatCorrectly() {
    let error = ProviderError::ApiError {
        status_code: 500,
        message: "Internal server error".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 500 - Internal server error");

    let error = ProviderError::RateLimitExceeded("slow down".to_string());
    assert_eq!(error.to_string(), "Rate limit exceeded: slow down");
}

/// Only throttling counts as a rate limit
#[test]
fn test_isRateLimit_shouldMatchThrottlingOnly() {
    assert!(ProviderError::RateLimitExceeded(String::new()).is_rate_limit());
    assert!(ProviderError::ApiError { status_code: 429, message: String::new() }.is_rate_limit());
    assert!(!ProviderError::ApiError { status_code: 503, message: String::new() }.is_rate_limit());
    assert!(!ProviderError::AuthenticationError(String::new()).is_rate_limit());
    assert!(!ProviderError::ConnectionError(String::new()).is_rate_limit());
}

/// HTTP statuses map onto the matching variants
#[test]
fn test_fromStatus_shouldClassifyStatusCodes() {
    assert!(matches!(
        ProviderError::from_status(429, "busy".into()),
        ProviderError::RateLimitExceeded(_)
    ));
    assert!(matches!(
        ProviderError::from_status(401, "bad key".into()),
        ProviderError::AuthenticationError(_)
    ));
    assert!(matches!(
        ProviderError::from_status(403, "forbidden".into()),
        ProviderError::AuthenticationError(_)
    ));
    assert_eq!(
        ProviderError::from_status(400, "bad".into()),
        ProviderError::ApiError { status_code: 400, message: "bad".into() }
    );
}

/// Batch errors name the batch and keep the provider error as source
#[test]
fn test_correctionError_batch_shouldExposeSource() {
    let error = CorrectionError::Batch {
        batch: 2,
        attempts: 3,
        source: ProviderError::RateLimitExceeded("quota".to_string()),
    };

    let message = error.to_string();
    assert!(message.contains("Batch 2"));
    assert!(message.contains("3 attempt(s)"));

    let source = error.source().expect("batch error should have a source");
    assert_eq!(source.to_string(), "Rate limit exceeded: quota");
}

/// Lower-level errors convert into correction errors
#[test]
fn test_correctionError_from_shouldWrapVariants() {
    let config: CorrectionError = ConfigError::BatchSizeTooSmall { batch_size: 1, overlap: 2 }.into();
    assert!(matches!(config, CorrectionError::Config(_)));
    assert_eq!(
        config.to_string(),
        "Configuration error: Batch size 1 must be greater than the context overlap 2"
    );

    let format: CorrectionError = FormatError::EmptyTrack.into();
    assert!(matches!(format, CorrectionError::Format(FormatError::EmptyTrack)));

    let validation: CorrectionError = ValidationError::TimestampChanged { index: 4 }.into();
    assert_eq!(
        validation.to_string(),
        "Structure validation failed: Timestamp of entry 4 was modified"
    );
}

/// Validation messages carry indices and lengths
#[test]
fn test_validationError_display_shouldIncludeDetails() {
    let error = ValidationError::IndexMismatch { missing: vec![2], extra: vec![3] };
    assert_eq!(error.to_string(), "Index mismatch: missing [2], extra [3]");

    let error = ValidationError::LengthDeltaExceeded { index: 1, original_len: 10, corrected_len: 14 };
    assert!(error.to_string().contains("original 10, corrected 14"));
}

#[test]
fn test_cancelled_display_shouldCountBatches() {
    let error = CorrectionError::Cancelled { completed_batches: 1, total_batches: 3 };
    assert_eq!(error.to_string(), "Correction cancelled after 1 of 3 batch(es)");
}
