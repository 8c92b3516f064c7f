/*!
 * Tests for the timecode codec
 */

use subcorrect::errors::FormatError;
use subcorrect::timecode::{format_timecode, parse_timecode};

/// Every minute boundary of a day survives a round trip
#[test]
fn test_roundTrip_withMinuteBoundaries_shouldBeIdentity() {
    for minute in 0..(24 * 60) {
        let ms = minute * 60_000;
        assert_eq!(parse_timecode(&format_timecode(ms)).unwrap(), ms);
        assert_eq!(parse_timecode(&format_timecode(ms + 59_999)).unwrap(), ms + 59_999);
    }
}

/// Surrounding whitespace is ignored
#[test]
fn test_parseTimecode_withWhitespace_shouldTrim() {
    assert_eq!(parse_timecode("  00:00:02,500\t").unwrap(), 2_500);
}

/// The error carries the offending text
#[test]
fn test_parseTimecode_withGarbage_shouldReportInput() {
    assert_eq!(
        parse_timecode("12:34"),
        Err(FormatError::InvalidTimecode("12:34".to_string()))
    );
}

/// Seconds at 60 are out of range rather than carried
#[test]
fn test_parseTimecode_withSixtySeconds_shouldBeOutOfRange() {
    assert!(matches!(
        parse_timecode("00:00:60,000"),
        Err(FormatError::ComponentOutOfRange(_))
    ));
}
