/*!
 * Correction runs end to end against mock providers.
 *
 * Every test injects a `RecordingSleeper`, so pacing and backoff delays are
 * recorded rather than waited for.
 */

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use subcorrect::correction::{CancellationFlag, DEFAULT_PACING_DELAY};
use subcorrect::errors::{CorrectionError, FormatError, ProviderError, ValidationError};
use subcorrect::providers::mock::MockProvider;
use crate::common;
use crate::common::mock_providers::{corrected_response, recording_corrector};

/// The recognizer errors in the Chinese sample are fixed, timing untouched
#[tokio::test]
async fn test_correctSubtitles_withChineseSample_shouldFixTextAndKeepTiming() {
    common::init_logger();
    let provider = MockProvider::scripted(vec![Ok(corrected_response(
        &[(1, "這是一個測試字幕"), (2, "句子中有錯別字和重複的詞")],
        &["1: 字慕 -> 字幕", "2: 和和 -> 和, 重復 -> 重複"],
    ))]);
    let (corrector, sleeper) = recording_corrector(&provider);

    let outcome = corrector
        .correct_subtitles(common::CHINESE_TRANSCRIPT, common::CHINESE_SRT, 10)
        .await
        .unwrap();

    assert_eq!(
        outcome.track.serialize(),
        "1\n00:00:00,000 --> 00:00:05,000\n這是一個測試字幕\n\n\
         2\n00:00:05,000 --> 00:00:10,000\n句子中有錯別字和重複的詞\n\n"
    );
    assert_eq!(outcome.report.lines().len(), 2);
    assert!(sleeper.recorded().is_empty());

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("這是一個測試字幕。 句子中有錯別字和重複的詞。"));
    assert!(prompts[0].contains("[CORRECT] 1: 這是一個測試字慕"));
    assert!(prompts[0].contains("[CORRECT] 2: 句子中有錯別字和和重復的詞"));
    assert!(!prompts[0].contains("[CONTEXT] 1:"));
}

/// Two throttled calls are retried after 5 s and 10 s
#[tokio::test]
async fn test_correctSubtitles_withTransientRateLimit_shouldBackOffAndSucceed() {
    let provider = MockProvider::scripted(vec![
        Err(ProviderError::RateLimitExceeded("quota".to_string())),
        Err(ProviderError::ApiError { status_code: 429, message: "busy".to_string() }),
        Ok(corrected_response(&[(2, "It contains several entries.")], &[])),
    ]);
    let (corrector, sleeper) = recording_corrector(&provider);

    let outcome = corrector
        .correct_subtitles("transcript", common::SAMPLE_SRT, 20)
        .await
        .unwrap();

    assert_eq!(provider.request_count(), 3);
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(5), Duration::from_secs(10)]);
    assert_eq!(outcome.track.get(2).unwrap().text, "It contains several entries.");
    assert!(outcome.report.is_empty());
}

/// A provider that never stops throttling fails after three attempts
#[tokio::test]
async fn test_correctSubtitles_withPersistentRateLimit_shouldFailAfterThreeAttempts() {
    let provider = MockProvider::rate_limited();
    let (corrector, sleeper) = recording_corrector(&provider);

    let result = corrector.correct_subtitles("transcript", common::SAMPLE_SRT, 20).await;

    match result {
        Err(CorrectionError::Batch { batch, attempts, source }) => {
            assert_eq!(batch, 1);
            assert_eq!(attempts, 3);
            assert!(matches!(source, ProviderError::RateLimitExceeded(_)));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(provider.request_count(), 3);
    assert_eq!(sleeper.recorded(), vec![Duration::from_secs(5), Duration::from_secs(10)]);
}

/// A fatal error in the second batch discards the first batch's work
#[tokio::test]
async fn test_correctSubtitles_withFailureInSecondBatch_shouldReportBatchNumber() {
    let provider = MockProvider::scripted(vec![
        Ok(corrected_response(&[(1, "LINE 1")], &["1: line 1 -> LINE 1"])),
        Err(ProviderError::ApiError { status_code: 500, message: "boom".to_string() }),
    ]);
    let (corrector, sleeper) = recording_corrector(&provider);

    let result = corrector.correct_subtitles("transcript", &common::numbered_srt(5), 3).await;

    match result {
        Err(CorrectionError::Batch { batch, attempts, source }) => {
            assert_eq!(batch, 2);
            assert_eq!(attempts, 1);
            assert_eq!(source, ProviderError::ApiError { status_code: 500, message: "boom".to_string() });
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(provider.request_count(), 2);
    assert_eq!(sleeper.recorded(), vec![DEFAULT_PACING_DELAY]);
}

/// A run cancelled up front makes no provider call
#[tokio::test]
async fn test_correctSubtitles_withCancelledFlag_shouldNotCallProvider() {
    let provider = MockProvider::echo();
    let (corrector, _sleeper) = recording_corrector(&provider);
    let flag = CancellationFlag::new();
    flag.cancel();

    let result = corrector
        .with_cancellation(flag)
        .correct_subtitles("transcript", common::SAMPLE_SRT, 20)
        .await;

    assert!(matches!(
        result,
        Err(CorrectionError::Cancelled { completed_batches: 0, total_batches: 1 })
    ));
    assert_eq!(provider.request_count(), 0);
}

/// Cancelling during a run stops before the next batch
#[tokio::test]
async fn test_correctSubtitles_withCancellationAfterFirstBatch_shouldStopBetweenBatches() {
    let provider = MockProvider::echo();
    let (corrector, sleeper) = recording_corrector(&provider);
    let flag = CancellationFlag::new();
    let trigger = flag.clone();

    let result = corrector
        .with_cancellation(flag)
        .with_progress_callback(Arc::new(move |completed: usize, _total: usize| {
            if completed == 1 {
                trigger.cancel();
            }
        }))
        .correct_subtitles("transcript", &common::numbered_srt(5), 3)
        .await;

    assert!(matches!(
        result,
        Err(CorrectionError::Cancelled { completed_batches: 1, total_batches: 3 })
    ));
    assert_eq!(provider.request_count(), 1);
    assert!(sleeper.recorded().is_empty());
}

/// A rewrite that changes length too much fails the whole run
#[tokio::test]
async fn test_correctSubtitles_withOverlongRewrite_shouldFailValidation() {
    let provider = MockProvider::scripted(vec![Ok(corrected_response(
        &[(1, "This is a completely different and much longer subtitle line.")],
        &[],
    ))]);
    let (corrector, _sleeper) = recording_corrector(&provider);

    let result = corrector.correct_subtitles("transcript", common::SAMPLE_SRT, 20).await;

    match result {
        Err(CorrectionError::Validation(ValidationError::LengthDeltaExceeded { index, original_len, .. })) => {
            assert_eq!(index, 1);
            assert_eq!(original_len, 24);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

/// Context comes from the corrected working copy, and echoed context is ignored
#[tokio::test]
async fn test_correctSubtitles_withOverlappingBatches_shouldUseCorrectedContext() {
    let provider = MockProvider::scripted(vec![
        Ok(corrected_response(&[(2, "LINE 2")], &[])),
        Ok(corrected_response(&[(2, "IGNORED"), (3, "LINE 3")], &[])),
    ]);
    let (corrector, sleeper) = recording_corrector(&provider);

    let outcome = corrector
        .correct_subtitles("transcript", &common::numbered_srt(6), 4)
        .await
        .unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("[CONTEXT] 1: line 1"));
    assert!(prompts[1].contains("[CONTEXT] 2: LINE 2"));
    assert!(prompts[1].contains("[CORRECT] 3: line 3"));
    assert!(!prompts[1].contains("[CORRECT] 2:"));

    let texts: Vec<&str> = outcome.track.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["line 1", "LINE 2", "LINE 3", "line 4", "line 5", "line 6"]);
    assert_eq!(sleeper.recorded(), vec![DEFAULT_PACING_DELAY]);
}

/// Lines returned out of order still land in ascending index order
#[tokio::test]
async fn test_correctSubtitles_withOutOfOrderResponse_shouldEmitAscendingIndices() {
    let provider = MockProvider::scripted(vec![Ok(corrected_response(
        &[(3, "For testing purposes!"), (1, "This is a test subtitle!"), (2, "It contains multiple entries!")],
        &[],
    ))]);
    let (corrector, _sleeper) = recording_corrector(&provider);

    let outcome = corrector
        .correct_subtitles("transcript", common::SAMPLE_SRT, 20)
        .await
        .unwrap();

    assert_eq!(outcome.track.indices(), vec![1, 2, 3]);
    assert_eq!(outcome.track.entries[0].text, "This is a test subtitle!");
    assert_eq!(outcome.track.entries[2].text, "For testing purposes!");
}

/// Progress is reported once per batch, and reports accumulate in batch order
#[tokio::test]
async fn test_correctSubtitles_withSeveralBatches_shouldReportProgressAndNotes() {
    let provider = MockProvider::scripted(vec![
        Ok(corrected_response(&[(1, "Line 1")], &["first note"])),
        Ok(corrected_response(&[], &["second note", "", "third note"])),
    ]);
    let (corrector, _sleeper) = recording_corrector(&provider);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&calls);

    let outcome = corrector
        .with_progress_callback(Arc::new(move |completed: usize, total: usize| {
            recorder.lock().push((completed, total));
        }))
        .correct_subtitles("transcript", &common::numbered_srt(5), 3)
        .await
        .unwrap();

    assert_eq!(*calls.lock(), vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(outcome.report.lines(), ["first note", "second note", "third note"]);
    assert_eq!(outcome.track.entries[0].text, "Line 1");
}

/// Multi-line entries travel escaped and come back as real line breaks
#[tokio::test]
async fn test_correctSubtitles_withMultilineEntry_shouldPreserveLineBreak() {
    let subtitles = "1\n00:00:01,000 --> 00:00:02,000\nHello\nWorld\n";
    let provider = MockProvider::echo();
    let (corrector, _sleeper) = recording_corrector(&provider);

    let outcome = corrector.correct_subtitles("Hello World", subtitles, 20).await.unwrap();

    assert!(provider.prompts()[0].contains("[CORRECT] 1: Hello\\nWorld"));
    assert_eq!(outcome.track.entries[0].text, "Hello\nWorld");
}

/// No subtitle blocks at all is a format error
#[tokio::test]
async fn test_correctSubtitles_withEmptySubtitles_shouldFailWithEmptyTrack() {
    let provider = MockProvider::echo();
    let (corrector, _sleeper) = recording_corrector(&provider);

    let result = corrector.correct_subtitles("transcript", "", 20).await;

    assert!(matches!(result, Err(CorrectionError::Format(FormatError::EmptyTrack))));
    assert_eq!(provider.request_count(), 0);
}

/// Independent runs share nothing and can proceed concurrently
#[tokio::test]
async fn test_correctSubtitles_withConcurrentRuns_shouldNotInterfere() {
    let first_provider = MockProvider::echo();
    let second_provider = MockProvider::scripted(vec![Ok(corrected_response(&[(1, "LINE 1")], &[]))]);
    let (first, _) = recording_corrector(&first_provider);
    let (second, _) = recording_corrector(&second_provider);
    let first_input = common::numbered_srt(4);
    let second_input = common::numbered_srt(2);

    let (first_result, second_result) = futures::join!(
        first.correct_subtitles("a", &first_input, 20),
        second.correct_subtitles("b", &second_input, 20),
    );

    let first_outcome = first_result.unwrap();
    let second_outcome = second_result.unwrap();
    assert_eq!(first_outcome.track.len(), 4);
    assert_eq!(first_outcome.track.entries[0].text, "line 1");
    assert_eq!(second_outcome.track.entries[0].text, "LINE 1");
    assert_eq!(first_provider.request_count(), 1);
    assert_eq!(second_provider.request_count(), 1);
}
