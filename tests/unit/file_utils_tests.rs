/*!
 * Tests for file and directory utilities
 */

use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;
use subcorrect::file_utils::FileManager;
use crate::common;

/// An empty output directory gives a bare file name
#[test]
fn test_generateOutputPath_withEmptyOutputDir_shouldReturnFileName() {
    let report = FileManager::generate_output_path("media/talk.srt", "", "corrections", "txt");
    assert_eq!(report, PathBuf::from("talk.corrections.txt"));
}

/// Test finding files by extension, recursively and case-insensitively
#[test]
fn test_findFiles_withMixedExtensions_shouldReturnOnlyMatches() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path();
    fs::create_dir(root.join("nested"))?;

    common::create_test_file(root, "1_a.srt", "")?;
    common::create_test_file(root, "notes.txt", "")?;
    common::create_test_file(&root.join("nested"), "2_b.SRT", "")?;

    let mut found = FileManager::find_files(root, ".srt")?;
    found.sort();

    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|p| p.extension().is_some()));
    assert!(found.iter().any(|p| p.ends_with("nested/2_b.SRT")));
    Ok(())
}

/// Numeric prefixes sort numerically, unnumbered files last
#[test]
fn test_sortByNumericPrefix_shouldOrderNumerically() {
    let mut paths: Vec<PathBuf> = ["10_end.srt", "intro.srt", "2_middle.srt", "1_start.srt", "extra.srt"]
        .iter()
        .map(|name| Path::new("segments").join(name))
        .collect();

    FileManager::sort_by_numeric_prefix(&mut paths);

    let names: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["1_start.srt", "2_middle.srt", "10_end.srt", "extra.srt", "intro.srt"]);
}

#[test]
fn test_numericPrefix_shouldReadLeadingDigitsOfFileName() {
    assert_eq!(FileManager::numeric_prefix("dir9/012_part.srt"), Some(12));
    assert_eq!(FileManager::numeric_prefix("part_3.srt"), None);
}

/// Writing creates missing parent directories
#[test]
fn test_writeToFile_withMissingParent_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("a").join("b").join("out.txt");

    FileManager::write_to_file(&path, "content")?;

    assert!(FileManager::file_exists(&path));
    assert!(FileManager::dir_exists(path.parent().unwrap()));
    assert_eq!(FileManager::read_to_string(&path)?, "content");
    Ok(())
}

/// Reading a missing file is an error
#[test]
fn test_readToString_withMissingFile_shouldFail() {
    assert!(FileManager::read_to_string("/definitely/not/here.srt").is_err());
}
