/*!
 * Validation module for corrected subtitle tracks.
 *
 * - `structure`: index-set, timestamp and length-delta checks applied to a
 *   whole correction run before its output is accepted
 */

pub mod structure;

// Re-export main types
pub use structure::{StructuralValidator, DEFAULT_MAX_LENGTH_DELTA};
