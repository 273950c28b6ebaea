/*!
 * Tests for file and path utilities
 */

use std::path::{Path, PathBuf};
use fontsub::file_utils::FileManager;
use crate::common;

/// Unsafe characters collapse to underscores, safe ones pass through
#[test]
fn test_sanitize_name_withMixedInput_shouldReplaceUnsafeChars() {
    assert_eq!(FileManager::sanitize_name("Arial"), "Arial");
    assert_eq!(FileManager::sanitize_name("Noto Sans CJK"), "Noto_Sans_CJK");
    assert_eq!(FileManager::sanitize_name("a/b\\c:d"), "a_b_c_d");
    assert_eq!(FileManager::sanitize_name("文泉驛微米黑"), "文泉驛微米黑");
    assert_eq!(FileManager::sanitize_name("my-font_2"), "my-font_2");
}

/// Subset output names keep the source extension, lowercased
#[test]
fn test_subset_file_name_withVariousSources_shouldKeepExtension() {
    assert_eq!(
        FileManager::subset_file_name("Arial", Path::new("/fonts/arial.TTF")),
        "Arial.subset.ttf"
    );
    assert_eq!(
        FileManager::subset_file_name("Noto Sans", Path::new("/fonts/noto.otf")),
        "Noto_Sans.subset.otf"
    );
    assert_eq!(
        FileManager::subset_file_name("Bare", Path::new("/fonts/noext")),
        "Bare.subset.ttf"
    );
}

/// The default embedded output sits next to the input with a new extension
#[test]
fn test_embedded_output_path_shouldDeriveFromInput() {
    let path = FileManager::embedded_output_path(Path::new("/subs/movie.ass"));
    assert_eq!(path, PathBuf::from("/subs/movie.embedded.ass"));
}

/// Existence checks distinguish files from directories
#[test]
fn test_existence_checks_shouldDistinguishFilesAndDirs() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let file = common::create_test_file(&dir, "a.txt", "content").unwrap();

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(&dir));
    assert!(FileManager::dir_exists(&dir));
    assert!(!FileManager::dir_exists(&file));
    assert!(!FileManager::file_exists(dir.join("missing.txt")));
}

/// ensure_dir creates nested directories and tolerates existing ones
#[test]
fn test_ensure_dir_withNestedPath_shouldCreateAll() {
    let temp_dir = common::create_temp_dir().unwrap();
    let nested = temp_dir.path().join("a").join("b").join("c");

    FileManager::ensure_dir(&nested).unwrap();
    assert!(FileManager::dir_exists(&nested));

    // Second call is a no-op
    FileManager::ensure_dir(&nested).unwrap();
}

/// String and byte writes create parent directories and read back intact
#[test]
fn test_write_withMissingParent_shouldCreateAndRoundTrip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let text_path = temp_dir.path().join("out").join("doc.txt");
    let bytes_path = temp_dir.path().join("out").join("font.bin");

    FileManager::write_to_file(&text_path, "hello").unwrap();
    FileManager::write_bytes(&bytes_path, &[1, 2, 3]).unwrap();

    assert_eq!(FileManager::read_to_string(&text_path).unwrap(), "hello");
    assert_eq!(std::fs::read(&bytes_path).unwrap(), vec![1, 2, 3]);
}

/// Reading a missing file is an error with the path in the message
#[test]
fn test_read_to_string_withMissingFile_shouldFail() {
    let result = FileManager::read_to_string("/nonexistent/file.txt");

    assert!(result.is_err());
    assert!(format!("{:?}", result.unwrap_err()).contains("file.txt"));
}
