/*!
 * Tests for the application controller
 */

use fontsub::app_config::Config;
use fontsub::app_controller::{Controller, SubsetOptions};
use crate::common;

/// The test constructor builds a usable controller
#[test]
fn test_new_for_test_shouldInitialize() {
    let controller = Controller::new_for_test().unwrap();
    assert!(controller.is_initialized());
}

/// Invalid configuration is rejected at construction time
#[test]
fn test_with_config_withInvalidConfig_shouldFail() {
    let config = Config {
        concurrent_subsets: 0,
        ..Config::default()
    };

    assert!(Controller::with_config(config).is_err());
}

/// Analyze succeeds on a well-formed subtitle file
#[test]
fn test_run_analyze_withValidFile_shouldSucceed() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let ass_file = common::create_test_subtitle(&dir, "movie.ass").unwrap();

    let controller = Controller::new_for_test().unwrap();
    assert!(controller.run_analyze(&ass_file).is_ok());
}

/// Analyze fails on a missing input file
#[test]
fn test_run_analyze_withMissingFile_shouldFail() {
    let controller = Controller::new_for_test().unwrap();
    assert!(controller.run_analyze("/nonexistent/movie.ass".as_ref()).is_err());
}

/// Analyze fails on content that is not ASS at all
#[test]
fn test_run_analyze_withNonAssContent_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let file = common::create_test_file(&dir, "notes.ass", "plain text, no sections").unwrap();

    let controller = Controller::new_for_test().unwrap();
    assert!(controller.run_analyze(&file).is_err());
}

/// Info fails on a file that is not a font
#[test]
fn test_run_info_withGarbageFont_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let file = common::create_test_bytes(&dir, "bad.ttf", b"garbage").unwrap();

    let controller = Controller::new_for_test().unwrap();
    assert!(controller.run_info(&file).is_err());
}

/// A missing fonts directory sinks the subset run
#[tokio::test]
async fn test_run_subset_withMissingFontsDir_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let ass_file = common::create_test_subtitle(&dir, "movie.ass").unwrap();

    let controller = Controller::new_for_test().unwrap();
    let result = controller
        .run_subset(SubsetOptions {
            ass_file,
            fonts_dir: "/nonexistent/fonts".into(),
            output_dir: None,
            embed: false,
            output_ass: None,
            dry_run: false,
        })
        .await;

    assert!(result.is_err());
}

/// A subtitle without any font usage sinks the run before scanning
#[tokio::test]
async fn test_run_subset_withEmptyRequirement_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let doc = common::simple_ass("Arial", &[]);
    let ass_file = common::create_test_file(&dir, "empty.ass", &doc).unwrap();

    let controller = Controller::new_for_test().unwrap();
    let result = controller
        .run_subset(SubsetOptions {
            ass_file,
            fonts_dir: dir.clone(),
            output_dir: None,
            embed: false,
            output_ass: None,
            dry_run: false,
        })
        .await;

    assert!(result.is_err());
}

/// An empty fonts directory sinks the run after scanning
#[tokio::test]
async fn test_run_subset_withEmptyFontsDir_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let ass_file = common::create_test_subtitle(&dir, "movie.ass").unwrap();
    let fonts_dir = dir.join("fonts");
    std::fs::create_dir(&fonts_dir).unwrap();

    let controller = Controller::new_for_test().unwrap();
    let result = controller
        .run_subset(SubsetOptions {
            ass_file,
            fonts_dir,
            output_dir: None,
            embed: false,
            output_ass: None,
            dry_run: false,
        })
        .await;

    assert!(result.is_err());
}
