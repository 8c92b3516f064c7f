/*!
 * Common test utilities for the subcorrect test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

// Re-export the mock provider helpers
pub mod mock_providers;

static INIT_LOGGER: Once = Once::new();

/// Route library logs through env_logger (RUST_LOG controls the level)
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Three English entries
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Recognizer output with a wrong character and a duplicated word
pub const CHINESE_SRT: &str = "1
00:00:00,000 --> 00:00:05,000
這是一個測試字慕

2
00:00:05,000 --> 00:00:10,000
句子中有錯別字和和重復的詞
";

/// Source transcript for `CHINESE_SRT`
pub const CHINESE_TRANSCRIPT: &str = "這是一個測試字幕。\n句子中有錯別字和重複的詞。";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// SRT text with `count` entries, each two seconds long, text `line N`
pub fn numbered_srt(count: usize) -> String {
    (1..=count)
        .map(|i| {
            let start = (i as u64 - 1) * 2000;
            format!(
                "{}\n{} --> {}\nline {}\n\n",
                i,
                subcorrect::timecode::format_timecode(start),
                subcorrect::timecode::format_timecode(start + 2000),
                i
            )
        })
        .collect()
}
