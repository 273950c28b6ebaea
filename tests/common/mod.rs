/*!
 * Common test utilities for the fontsub test suite
 */

use std::path::PathBuf;
use std::fs;
use anyhow::Result;
use tempfile::TempDir;

/// Standard V4+ style Format line
pub const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, \
SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, \
ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, \
Encoding";

/// Standard event Format line
pub const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a test file with raw bytes in the specified directory
pub fn create_test_bytes(dir: &PathBuf, filename: &str, data: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, data)?;
    Ok(file_path)
}

/// Render a full V4+ style line for the standard format
pub fn style_line(name: &str, font: &str) -> String {
    format!(
        "Style: {},{},48,&H00FFFFFF,&H000000FF,&H00000000,&H00000000,\
0,0,0,0,100,100,0,0,1,2,2,2,10,10,10,1",
        name, font
    )
}

/// Render a dialogue line for the standard event format
pub fn dialogue_line(style: &str, text: &str) -> String {
    format!("Dialogue: 0,0:00:00.00,0:00:05.00,{},,0,0,0,,{}", style, text)
}

/// Build a complete minimal ASS document with one style and the given
/// dialogue lines (each using that style)
pub fn simple_ass(style_font: &str, dialogue_texts: &[&str]) -> String {
    let mut doc = String::from("[Script Info]\nTitle: fontsub test\nScriptType: v4.00+\n\n");
    doc.push_str("[V4+ Styles]\n");
    doc.push_str(STYLE_FORMAT);
    doc.push('\n');
    doc.push_str(&style_line("Default", style_font));
    doc.push_str("\n\n[Events]\n");
    doc.push_str(EVENT_FORMAT);
    doc.push('\n');
    for text in dialogue_texts {
        doc.push_str(&dialogue_line("Default", text));
        doc.push('\n');
    }
    doc
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &PathBuf, filename: &str) -> Result<PathBuf> {
    let content = simple_ass("Arial", &["Hello", "World"]);
    create_test_file(dir, filename, &content)
}
