/*!
 * Tests for batch segmentation
 */

use subcorrect::correction::batch::{segment, CONTEXT_OVERLAP};

/// Exactly `batch_size` entries make one batch
#[test]
fn test_segment_withKeysEqualToBatchSize_shouldMakeOneBatch() {
    let keys: Vec<usize> = (1..=20).collect();
    let batches = segment(&keys, 20).unwrap();

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].targets, keys);
}

/// One entry past the batch size starts a short second batch
#[test]
fn test_segment_withOneExtraKey_shouldMakeShortFinalBatch() {
    let keys: Vec<usize> = (1..=11).collect();
    let batches = segment(&keys, 10).unwrap();

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[1].context, vec![7, 8]);
    assert_eq!(batches[1].targets, vec![9, 10, 11]);
}

/// Every key is targeted at least once and batch numbers count from 1
#[test]
fn test_segment_withManyKeys_shouldCoverEveryKey() {
    let keys: Vec<usize> = (1..=97).collect();
    let batches = segment(&keys, 15).unwrap();

    for key in &keys {
        assert!(batches.iter().any(|b| b.is_target(*key)), "key {} never targeted", key);
    }
    for (position, batch) in batches.iter().enumerate() {
        assert_eq!(batch.number, position + 1);
        assert!(batch.context.len() <= CONTEXT_OVERLAP);
    }
    assert_eq!(batches.last().unwrap().targets.last(), Some(&97));
}

/// Context and targets are sent context first
#[test]
fn test_allIndices_shouldListContextBeforeTargets() {
    let keys: Vec<usize> = (1..=6).collect();
    let batches = segment(&keys, 4).unwrap();

    assert_eq!(batches[1].all_indices().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5, 6]);
}

/// Non-dense keys are strided by position, not value
#[test]
fn test_segment_withSparseKeys_shouldUsePositions() {
    let keys = vec![3, 5, 8, 13, 21];
    let batches = segment(&keys, 3).unwrap();

    assert_eq!(batches[0].targets, vec![3, 5, 8]);
    assert_eq!(batches[1].context, vec![3]);
    assert_eq!(batches[1].targets, vec![5, 8, 13]);
}
