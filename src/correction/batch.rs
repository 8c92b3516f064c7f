/*!
 * Batch segmentation for subtitle correction.
 *
 * Entries are split into overlapping batches. Each batch after the first
 * carries the `CONTEXT_OVERLAP` entries that precede its targets as
 * read-only context.
 */

use log::debug;

use crate::errors::ConfigError;

/// Number of entries carried from the previous batch as context
pub const CONTEXT_OVERLAP: usize = 2;

/// Default number of target entries per batch
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// One unit of correction work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 1-based batch number, used in logs and errors
    pub number: usize,
    /// Indices sent as reference only
    pub context: Vec<usize>,
    /// Indices the AI is asked to rewrite
    pub targets: Vec<usize>,
}

impl Batch {
    /// Whether `index` is one of this batch's targets
    pub fn is_target(&self, index: usize) -> bool {
        self.targets.contains(&index)
    }

    /// Context followed by targets, the order lines are sent in
    pub fn all_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.context.iter().chain(self.targets.iter()).copied()
    }
}

/// Split `keys` into batches of `batch_size` targets, striding by
/// `batch_size - CONTEXT_OVERLAP`.
///
/// Batch `i` targets `keys[i*step .. i*step + batch_size]` and, for `i > 0`,
/// carries `keys[i*step - overlap .. i*step]` as context. Striding stops at
/// the first batch that reaches the end of `keys`, so a trailing batch never
/// consists only of entries already targeted.
pub fn segment(keys: &[usize], batch_size: usize) -> Result<Vec<Batch>, ConfigError> {
    if batch_size <= CONTEXT_OVERLAP {
        return Err(ConfigError::BatchSizeTooSmall {
            batch_size,
            overlap: CONTEXT_OVERLAP,
        });
    }

    let step = batch_size - CONTEXT_OVERLAP;
    let mut batches = Vec::new();
    let mut start = 0;

    while start < keys.len() {
        let end = (start + batch_size).min(keys.len());
        let context_start = start.saturating_sub(CONTEXT_OVERLAP);

        batches.push(Batch {
            number: batches.len() + 1,
            context: keys[context_start..start].to_vec(),
            targets: keys[start..end].to_vec(),
        });

        if end == keys.len() {
            break;
        }
        start += step;
    }

    debug!(
        "Segmented {} entries into {} batch(es) of up to {} (step {})",
        keys.len(),
        batches.len(),
        batch_size,
        step
    );

    Ok(batches)
}
