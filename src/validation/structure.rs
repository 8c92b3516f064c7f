/*!
 * Structural validation of a corrected subtitle track.
 *
 * Three checks run in order and the first failure wins:
 * - the index set is unchanged
 * - every shared entry keeps its start and end time
 * - no entry's text length moves by more than the allowed ratio
 */

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::errors::ValidationError;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};

/// Default maximum relative text-length change per entry (inclusive)
pub const DEFAULT_MAX_LENGTH_DELTA: f64 = 0.3;

/// Gate that rejects a correction violating structural invariants
#[derive(Debug, Clone)]
pub struct StructuralValidator {
    max_length_delta: f64,
}

impl Default for StructuralValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralValidator {
    pub fn new() -> Self {
        Self {
            max_length_delta: DEFAULT_MAX_LENGTH_DELTA,
        }
    }

    pub fn with_max_length_delta(max_length_delta: f64) -> Self {
        Self { max_length_delta }
    }

    /// Relative length change `|orig - new| / max(1, orig)`, in characters
    pub fn length_delta(original: &str, corrected: &str) -> f64 {
        let original_len = original.chars().count();
        let corrected_len = corrected.chars().count();
        original_len.abs_diff(corrected_len) as f64 / original_len.max(1) as f64
    }

    /// Validate `corrected` against `original`
    pub fn validate(
        &self,
        original: &SubtitleTrack,
        corrected: &SubtitleTrack,
    ) -> Result<(), ValidationError> {
        let original_map = by_index(original);
        let corrected_map = by_index(corrected);

        let original_keys: BTreeSet<usize> = original_map.keys().copied().collect();
        let corrected_keys: BTreeSet<usize> = corrected_map.keys().copied().collect();

        if original_keys != corrected_keys {
            return Err(ValidationError::IndexMismatch {
                missing: original_keys.difference(&corrected_keys).copied().collect(),
                extra: corrected_keys.difference(&original_keys).copied().collect(),
            });
        }

        for (index, before) in &original_map {
            let after = corrected_map[index];
            if before.start_ms != after.start_ms || before.end_ms != after.end_ms {
                return Err(ValidationError::TimestampChanged { index: *index });
            }
        }

        for (index, before) in &original_map {
            let after = corrected_map[index];
            if Self::length_delta(&before.text, &after.text) > self.max_length_delta {
                return Err(ValidationError::LengthDeltaExceeded {
                    index: *index,
                    original_len: before.char_len(),
                    corrected_len: after.char_len(),
                });
            }
        }

        debug!("Structure validation passed for {} entries", original_map.len());
        Ok(())
    }
}

// Later duplicates of an index replace earlier ones
fn by_index(track: &SubtitleTrack) -> BTreeMap<usize, &SubtitleEntry> {
    track.entries.iter().map(|entry| (entry.index, entry)).collect()
}
