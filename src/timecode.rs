/*!
 * Conversion between SRT timecode text and millisecond offsets.
 */

use crate::errors::FormatError;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Parse an `HH:MM:SS,mmm` timecode into milliseconds.
///
/// A period is accepted in place of the comma. Hours may have more than two
/// digits; minutes and seconds must be below 60.
pub fn parse_timecode(text: &str) -> Result<u64, FormatError> {
    let trimmed = text.trim();
    let invalid = || FormatError::InvalidTimecode(trimmed.to_string());

    let (clock, millis) = trimmed
        .split_once([',', '.'])
        .ok_or_else(invalid)?;

    let mut fields = clock.split(':');
    let (Some(hours), Some(minutes), Some(seconds), None) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(invalid());
    };

    if minutes.len() != 2 || seconds.len() != 2 || millis.len() != 3 || hours.len() < 2 {
        return Err(invalid());
    }

    let hours = parse_digits(hours).ok_or_else(invalid)?;
    let minutes = parse_digits(minutes).ok_or_else(invalid)?;
    let seconds = parse_digits(seconds).ok_or_else(invalid)?;
    let millis = parse_digits(millis).ok_or_else(invalid)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(FormatError::ComponentOutOfRange(trimmed.to_string()));
    }

    hours
        .checked_mul(MS_PER_HOUR)
        .and_then(|ms| ms.checked_add(minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis))
        .ok_or_else(|| FormatError::ComponentOutOfRange(trimmed.to_string()))
}

/// Format milliseconds as a zero-padded `HH:MM:SS,mmm` timecode
pub fn format_timecode(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

// Digits only; `u64::from_str` alone would accept a leading '+'
fn parse_digits(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
