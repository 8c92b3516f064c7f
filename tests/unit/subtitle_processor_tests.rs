/*!
 * Tests for subtitle parsing and serialization
 */

use std::fmt::Write;
use anyhow::Result;
use subcorrect::subtitle_processor::{SubtitleEntry, SubtitleTrack};
use crate::common;

/// Test subtitle entry display formatting
#[test]
fn test_subtitleEntry_display_withMultilineText_shouldFormatBlock() {
    let entry = SubtitleEntry::new(7, 61_234, 65_432, "Hello\nWorld");
    let mut output = String::new();
    write!(output, "{}", entry).unwrap();

    assert_eq!(output, "7\n00:01:01,234 --> 00:01:05,432\nHello\nWorld\n\n");
}

/// Parsing then serializing keeps indices, timestamps and text
#[test]
fn test_serializeParse_withSampleTrack_shouldBeEquivalent() {
    let track = SubtitleTrack::parse(common::SAMPLE_SRT);
    assert_eq!(track.len(), 3);

    let reparsed = SubtitleTrack::parse(&track.serialize());
    assert_eq!(reparsed, track);
    assert_eq!(reparsed.entries[1].start_ms, 5_000);
    assert_eq!(reparsed.entries[2].text, "For testing purposes.");
}

/// Extra spacing and period separators still parse
#[test]
fn test_parse_withLooseWhitespace_shouldReadEntries() {
    let content = "  1  \n00:00:01.000   -->   00:00:02.000  \nfirst\n\n\n\n2\n00:00:03,000 --> 00:00:04,000\nsecond\n";
    let track = SubtitleTrack::parse(content);

    assert_eq!(track.indices(), vec![1, 2]);
    assert_eq!(track.entries[0].end_ms, 2_000);
}

/// Malformed blocks are skipped, the rest survive
#[test]
fn test_parse_withMalformedBlocks_shouldSkipThem() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nkept\n\n\
                   two\n00:00:02,000 --> 00:00:03,000\nno index\n\n\
                   3\nnot a timing line\nno timing\n\n\
                   4\n00:00:04,000 --> 00:00:05,000\nalso kept\n";
    let track = SubtitleTrack::parse(content);

    assert_eq!(track.indices(), vec![1, 4]);
}

/// A timecode too large for milliseconds skips the block instead of overflowing
#[test]
fn test_parse_withOverflowingHours_shouldSkipBlock() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nkept\n\n\
                   2\n99999999999999:00:00,000 --> 99999999999999:00:01,000\nhuge\n";
    let track = SubtitleTrack::parse(content);

    assert_eq!(track.indices(), vec![1]);
    assert_eq!(track.entries[0].text, "kept");
}

/// Empty or unrelated input gives an empty track, not an error
#[test]
fn test_parse_withNoBlocks_shouldReturnEmptyTrack() {
    assert!(SubtitleTrack::parse("").is_empty());
    assert!(SubtitleTrack::parse("just some\nplain text\n").is_empty());
    assert_eq!(SubtitleTrack::parse("").serialize(), "");
}

/// Parse keeps file order; serialize sorts by index
#[test]
fn test_serialize_withUnorderedEntries_shouldEmitAscendingIndices() {
    let content = "2\n00:00:02,000 --> 00:00:03,000\nb\n\n1\n00:00:01,000 --> 00:00:02,000\na\n";
    let track = SubtitleTrack::parse(content);

    assert_eq!(track.indices(), vec![2, 1]);
    assert!(track.serialize().starts_with("1\n00:00:01,000"));
}

/// Round trip through the file system
#[test]
fn test_writeAndRead_withTempFile_shouldPreserveTrack() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested").join("out.srt");

    let track = SubtitleTrack::parse(common::CHINESE_SRT);
    track.write_to_file(&path)?;

    assert_eq!(SubtitleTrack::read_from_file(&path)?, track);
    Ok(())
}
