/*!
 * End-to-end tests of the subset workflow across the library seams
 */

use fontsub::UsageExtractor;
use fontsub::app_controller::{Controller, SubsetOptions};
use fontsub::embed_codec::{self, EmbeddedFont};
use fontsub::font_index::FontNameIndex;
use fontsub::font_matcher;
use crate::common;

fn exts() -> Vec<String> {
    vec!["ttf".to_string(), "otf".to_string()]
}

/// When every candidate font file is unreadable the run reports the
/// fonts rather than silently writing nothing
#[tokio::test]
async fn test_workflow_withOnlyUnreadableFonts_shouldFailWithSummary() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let ass_file = common::create_test_subtitle(&dir, "movie.ass").unwrap();

    let fonts_dir = dir.join("fonts");
    std::fs::create_dir(&fonts_dir).unwrap();
    common::create_test_bytes(&fonts_dir, "arial.ttf", b"not really a font").unwrap();

    let controller = Controller::new_for_test().unwrap();
    let result = controller
        .run_subset(SubsetOptions {
            ass_file,
            fonts_dir,
            output_dir: Some(dir.join("out")),
            embed: false,
            output_ass: None,
            dry_run: false,
        })
        .await;

    // The only candidate was skipped as unreadable, so nothing matched
    assert!(result.is_err());
    assert!(!dir.join("out").join("Arial.subset.ttf").exists());
}

/// Dry-run never writes output even when the pipeline would
#[tokio::test]
async fn test_workflow_withDryRun_shouldWriteNothing() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();
    let ass_file = common::create_test_subtitle(&dir, "movie.ass").unwrap();

    let fonts_dir = dir.join("fonts");
    std::fs::create_dir(&fonts_dir).unwrap();
    common::create_test_bytes(&fonts_dir, "arial.ttf", b"broken").unwrap();

    let output_dir = dir.join("out");
    let controller = Controller::new_for_test().unwrap();
    let _ = controller
        .run_subset(SubsetOptions {
            ass_file,
            fonts_dir,
            output_dir: Some(output_dir.clone()),
            embed: false,
            output_ass: None,
            dry_run: true,
        })
        .await;

    assert!(!output_dir.exists());
}

/// Extraction, matching, and the embed codec compose end to end: the
/// fonts a subtitle needs can be resolved against a scanned directory
/// and the unreadable files show up in the scan report
#[test]
fn test_workflow_withExtractionAndScan_shouldReportUnmatchedAndSkipped() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path().to_path_buf();

    let doc = common::simple_ass("Arial", &["Hello", r"{\fnMissing Font}x"]);
    common::create_test_file(&dir, "movie.ass", &doc).unwrap();
    common::create_test_bytes(&dir, "arial.ttf", b"junk bytes").unwrap();

    let requirement = UsageExtractor::new("Arial").extract(&doc).unwrap();
    assert_eq!(requirement.len(), 2);

    let index = FontNameIndex::scan_directory(&dir, &exts()).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.skipped.len(), 1);

    for font_name in requirement.usages.keys() {
        assert!(!font_matcher::match_font(font_name, &index).is_matched());
    }
}

/// A subtitle survives embedding and re-extraction: the [Fonts] section
/// round-trips and never disturbs the dialogue analysis
#[test]
fn test_workflow_withEmbedRoundTrip_shouldPreserveUsageAndFonts() {
    let doc = common::simple_ass("Arial", &["Hello World"]);
    let fonts = vec![EmbeddedFont {
        filename: "Arial.subset.ttf".to_string(),
        data: (0u8..=255).collect(),
    }];

    let embedded = embed_codec::embed_fonts(&doc, &fonts);

    let parsed = embed_codec::parse_embedded_fonts(&embedded).unwrap();
    assert_eq!(parsed, fonts);

    let before = UsageExtractor::new("Arial").extract(&doc).unwrap();
    let after = UsageExtractor::new("Arial").extract(&embedded).unwrap();
    assert_eq!(before, after);
}
