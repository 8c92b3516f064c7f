/*!
 * Timestamp adjustments applied outside of text correction.
 *
 * - `rescale_to_duration`: stretch recognizer timestamps so the track ends
 *   at the measured audio duration
 * - `merge_tracks`: join per-segment tracks into one continuous track
 */

use log::{debug, warn};

use crate::language_utils::is_chinese;
use crate::subtitle_processor::{SubtitleEntry, SubtitleTrack};

/// ASCII punctuation and its full-width form, applied to Chinese tracks
pub const FULL_WIDTH_PUNCTUATION: [(char, char); 5] = [
    (',', '，'),
    ('.', '。'),
    (':', '：'),
    ('?', '？'),
    ('!', '！'),
];

/// Scale every timestamp by `true_duration / last_end`.
///
/// The last entry's end time is taken as the recognizer's idea of the total
/// duration. Returns the track unchanged when it is empty, when its last end
/// is zero, or when `true_duration_secs` is zero, negative or not finite.
/// Scaled values are truncated to whole milliseconds.
pub fn rescale_to_duration(track: &SubtitleTrack, true_duration_secs: f64) -> SubtitleTrack {
    if track.is_empty() || !true_duration_secs.is_finite() || true_duration_secs <= 0.0 {
        return track.clone();
    }

    let reported_end_ms = track.last_end_ms().unwrap_or(0);
    if reported_end_ms == 0 {
        warn!("Cannot rescale a track whose last entry ends at 0 ms");
        return track.clone();
    }

    let factor = true_duration_secs * 1000.0 / reported_end_ms as f64;
    debug!(
        "Rescaling {} entries by {:.4} ({} ms -> {:.0} ms)",
        track.len(),
        factor,
        reported_end_ms,
        true_duration_secs * 1000.0
    );

    let entries = track
        .entries
        .iter()
        .map(|entry| SubtitleEntry {
            start_ms: scale(entry.start_ms, factor),
            end_ms: scale(entry.end_ms, factor),
            ..entry.clone()
        })
        .collect();

    SubtitleTrack::new(entries)
}

/// Text form of `rescale_to_duration`; unparseable input is returned as is
pub fn rescale_srt(content: &str, true_duration_secs: f64) -> String {
    let track = SubtitleTrack::parse(content);
    if track.is_empty() || !true_duration_secs.is_finite() || true_duration_secs <= 0.0 {
        return content.to_string();
    }
    rescale_to_duration(&track, true_duration_secs).serialize()
}

fn scale(ms: u64, factor: f64) -> u64 {
    (ms as f64 * factor) as u64
}

/// Join per-segment tracks, in the order given, into one track.
///
/// Each segment after the first is shifted so that it starts where the
/// previous non-empty segment ended. Entries are renumbered from 1. For
/// Chinese, ASCII punctuation is replaced by its full-width form.
pub fn merge_tracks(segments: &[SubtitleTrack], language: &str) -> SubtitleTrack {
    let full_width = is_chinese(language);
    let mut merged: Vec<SubtitleEntry> = Vec::new();
    let mut previous_end: Option<u64> = None;

    for (position, segment) in segments.iter().enumerate() {
        let Some(first) = segment.entries.first() else {
            debug!("Skipping empty segment {}", position + 1);
            continue;
        };

        let offset = previous_end.map_or(0, |end| end as i64 - first.start_ms as i64);
        debug!("Segment {}: {} entries, offset {} ms", position + 1, segment.len(), offset);

        for entry in &segment.entries {
            let text = if full_width {
                to_full_width_punctuation(&entry.text)
            } else {
                entry.text.clone()
            };
            merged.push(SubtitleEntry::new(
                merged.len() + 1,
                shift(entry.start_ms, offset),
                shift(entry.end_ms, offset),
                text,
            ));
        }

        previous_end = merged.last().map(|entry| entry.end_ms);
    }

    SubtitleTrack::new(merged)
}

fn shift(ms: u64, offset: i64) -> u64 {
    (ms as i64 + offset).max(0) as u64
}

/// Replace `, . : ? !` with their full-width counterparts
pub fn to_full_width_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| {
            FULL_WIDTH_PUNCTUATION
                .iter()
                .find(|(half, _)| *half == c)
                .map_or(c, |(_, full)| *full)
        })
        .collect()
}
