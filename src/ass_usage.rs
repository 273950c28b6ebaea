use std::collections::{BTreeMap, BTreeSet, HashMap};
use once_cell::sync::Lazy;
use regex::Regex;
use log::warn;
use crate::errors::AssError;

// @module: ASS usage extraction - which fonts render which characters

// @const: Bracketed section header regex
static SECTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[([^\]]+)\]\s*$").unwrap()
});

/// Default V4+ style field order, used when a `[V4+ Styles]` section carries
/// no `Format:` line. Well-formed files always declare the order explicitly.
const DEFAULT_STYLE_FORMAT: &str = "Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
     OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, \
     Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

/// Default event field order, used when `[Events]` carries no `Format:` line.
const DEFAULT_EVENT_FORMAT: &str =
    "Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

// @struct: Style definition from the [V4+ Styles] section
#[derive(Debug, Clone)]
pub struct StyleDefinition {
    // @field: Style name, case-sensitive per format convention
    pub name: String,

    // @field: Default font for events using this style
    pub font_name: String,
}

/// One run of dialogue text with the font that renders it
#[derive(Debug, Clone, PartialEq)]
pub struct TextSegment {
    /// Active font name at this point of the event
    pub font_name: String,

    /// Literal text attributed to that font, tags stripped
    pub text: String,
}

/// Aggregated extraction result: which characters each font must render
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FontRequirement {
    /// Font name as it literally appears in a style or override tag,
    /// mapped to the exact set of characters it renders
    pub usages: BTreeMap<String, BTreeSet<char>>,

    /// Recoverable conditions hit during extraction (malformed lines,
    /// unresolved styles), surfaced to the caller instead of being dropped
    pub warnings: Vec<String>,
}

impl FontRequirement {
    /// Number of distinct fonts required
    pub fn len(&self) -> usize {
        self.usages.len()
    }

    /// True when no font usage was found
    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    /// Character set required for one font, if the font is used at all
    pub fn chars_for(&self, font_name: &str) -> Option<&BTreeSet<char>> {
        self.usages.get(font_name)
    }

    /// Attribute one character to a font
    fn add_char(&mut self, font_name: &str, c: char) {
        self.usages.entry(font_name.to_string()).or_default().insert(c);
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

// @struct: Field-name-to-index lookup built from a Format: line
#[derive(Debug)]
struct FormatSpec {
    // @field: Lowercased field name to column index
    indices: HashMap<String, usize>,

    // @field: Total number of declared fields
    len: usize,
}

impl FormatSpec {
    // @creates: Spec from the comma-delimited field list after "Format:"
    fn parse(fields: &str) -> Self {
        let mut indices = HashMap::new();
        let mut len = 0;
        for (idx, field) in fields.split(',').enumerate() {
            indices.insert(field.trim().to_lowercase(), idx);
            len = idx + 1;
        }
        FormatSpec { indices, len }
    }

    fn index_of(&self, field: &str) -> Option<usize> {
        self.indices.get(field).copied()
    }

    /// Split a data line into exactly the declared number of fields.
    /// The last field keeps any embedded commas (dialogue text).
    fn split_line<'a>(&self, line: &'a str) -> Vec<&'a str> {
        line.splitn(self.len, ',').collect()
    }
}

/// Extracts the (font name, character set) requirements from ASS text.
///
/// The extractor walks `[V4+ Styles]` and `[Events]`, honors the declared
/// `Format:` field order, and tracks inline `\fn` overrides mid-event so that
/// every rendered character is attributed to the font actually drawing it.
pub struct UsageExtractor {
    // @field: Fallback font when a dialogue references an unknown style
    default_font: String,
}

impl UsageExtractor {
    /// Create an extractor with the given fallback font name
    pub fn new<S: Into<String>>(default_font: S) -> Self {
        UsageExtractor {
            default_font: default_font.into(),
        }
    }

    /// Parse a full ASS document and produce its font requirement.
    ///
    /// Fails only when the document has no bracketed section structure at
    /// all; per-line problems are recorded as warnings and skipped.
    pub fn extract(&self, content: &str) -> Result<FontRequirement, AssError> {
        let content = content.trim_start_matches('\u{feff}');

        let mut requirement = FontRequirement::default();
        let mut styles: HashMap<String, StyleDefinition> = HashMap::new();

        let mut section = String::new();
        let mut seen_section = false;
        let mut style_format: Option<FormatSpec> = None;
        let mut event_format: Option<FormatSpec> = None;

        // First pass: styles. The [Events] section may precede [V4+ Styles]
        // in sloppy files, so dialogue lines are collected and resolved after.
        let mut dialogues: Vec<(String, String)> = Vec::new();

        for (line_no, raw_line) in content.lines().enumerate() {
            let line = raw_line.trim_end_matches('\r');

            if let Some(caps) = SECTION_REGEX.captures(line) {
                section = caps[1].trim().to_lowercase();
                seen_section = true;
                continue;
            }

            match section.as_str() {
                "v4+ styles" | "v4 styles" => {
                    if let Some(rest) = strip_line_prefix(line, "Format:") {
                        style_format = Some(FormatSpec::parse(rest));
                    } else if let Some(rest) = strip_line_prefix(line, "Style:") {
                        if style_format.is_none() {
                            requirement.warn(
                                "No Format: line before styles, assuming default field order"
                                    .to_string(),
                            );
                            style_format = Some(FormatSpec::parse(DEFAULT_STYLE_FORMAT));
                        }
                        let Some(format) = &style_format else {
                            continue;
                        };
                        match parse_style(rest, format) {
                            Ok(style) => {
                                styles.insert(style.name.clone(), style);
                            }
                            Err(reason) => {
                                requirement.warn(format!(
                                    "Skipping malformed Style line {}: {}",
                                    line_no + 1,
                                    reason
                                ));
                            }
                        }
                    }
                }
                "events" => {
                    if let Some(rest) = strip_line_prefix(line, "Format:") {
                        event_format = Some(FormatSpec::parse(rest));
                    } else if let Some(rest) = strip_line_prefix(line, "Dialogue:") {
                        if event_format.is_none() {
                            requirement.warn(
                                "No Format: line before events, assuming default field order"
                                    .to_string(),
                            );
                            event_format = Some(FormatSpec::parse(DEFAULT_EVENT_FORMAT));
                        }
                        let Some(format) = &event_format else {
                            continue;
                        };
                        match parse_dialogue(rest, format) {
                            Ok((style_name, text)) => dialogues.push((style_name, text)),
                            Err(reason) => {
                                requirement.warn(format!(
                                    "Skipping malformed Dialogue line {}: {}",
                                    line_no + 1,
                                    reason
                                ));
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        if !seen_section {
            return Err(AssError::Parse(
                "no bracketed section headers found, not an ASS document".to_string(),
            ));
        }

        for (style_name, text) in dialogues {
            let base_font = match styles.get(&style_name) {
                Some(style) => style.font_name.clone(),
                None => {
                    requirement.warn(format!(
                        "Dialogue references unknown style '{}', falling back to '{}'",
                        style_name, self.default_font
                    ));
                    self.default_font.clone()
                }
            };

            for segment in split_segments(&text, &base_font, &styles) {
                for c in segment.text.chars() {
                    // Control characters never render; everything else does
                    if (c as u32) >= 0x20 {
                        requirement.add_char(&segment.font_name, c);
                    }
                }
            }
        }

        Ok(requirement)
    }
}

// @parses: One Style: line into a StyleDefinition
fn parse_style(rest: &str, format: &FormatSpec) -> Result<StyleDefinition, String> {
    let name_idx = format.index_of("name").ok_or("Format declares no Name field")?;
    let font_idx = format
        .index_of("fontname")
        .ok_or("Format declares no Fontname field")?;

    let fields = format.split_line(rest);
    if fields.len() < format.len {
        return Err(format!(
            "expected {} fields, found {}",
            format.len,
            fields.len()
        ));
    }

    Ok(StyleDefinition {
        name: fields[name_idx].trim().to_string(),
        font_name: normalize_font_name(fields[font_idx]),
    })
}

// @parses: One Dialogue: line into (style name, text field)
fn parse_dialogue<'a>(rest: &'a str, format: &FormatSpec) -> Result<(String, String), String> {
    let style_idx = format
        .index_of("style")
        .ok_or("Format declares no Style field")?;
    let text_idx = format
        .index_of("text")
        .ok_or("Format declares no Text field")?;

    let fields: Vec<&'a str> = format.split_line(rest);
    if fields.len() < format.len {
        return Err(format!(
            "expected {} fields, found {}",
            format.len,
            fields.len()
        ));
    }

    Ok((fields[style_idx].trim().to_string(), fields[text_idx].to_string()))
}

/// Split dialogue text into segments tagged with the font active at each
/// point. Override blocks contribute no characters themselves; `\fn` inside
/// them moves the font register, `\r` resets it, `\p` toggles drawing mode.
pub fn split_segments(
    text: &str,
    base_font: &str,
    styles: &HashMap<String, StyleDefinition>,
) -> Vec<TextSegment> {
    let mut segments: Vec<TextSegment> = Vec::new();
    let mut current_font = base_font.to_string();
    let mut drawing = false;

    let mut push_text = |font: &str, chunk: String, segments: &mut Vec<TextSegment>| {
        if chunk.is_empty() {
            return;
        }
        match segments.last_mut() {
            Some(last) if last.font_name == font => last.text.push_str(&chunk),
            _ => segments.push(TextSegment {
                font_name: font.to_string(),
                text: chunk,
            }),
        }
    };

    let mut rest = text;
    loop {
        match rest.find('{') {
            Some(start) => {
                let after_brace = &rest[start + 1..];
                match after_brace.find('}') {
                    Some(end) => {
                        if !drawing {
                            let chunk = plain_chars(&rest[..start]);
                            push_text(&current_font, chunk, &mut segments);
                        }
                        apply_overrides(
                            &after_brace[..end],
                            base_font,
                            styles,
                            &mut current_font,
                            &mut drawing,
                        );
                        rest = &after_brace[end + 1..];
                    }
                    None => {
                        // Unclosed brace renders literally
                        if !drawing {
                            let chunk = plain_chars(rest);
                            push_text(&current_font, chunk, &mut segments);
                        }
                        break;
                    }
                }
            }
            None => {
                if !drawing {
                    let chunk = plain_chars(rest);
                    push_text(&current_font, chunk, &mut segments);
                }
                break;
            }
        }
    }

    segments
}

/// Resolve escape sequences in plain (non-block) text: `\N` and `\n` are
/// line breaks and render nothing, `\h` is a hard space.
fn plain_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('N') | Some('n') => {
                    chars.next();
                }
                Some('h') => {
                    chars.next();
                    out.push(' ');
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }

    out
}

// @applies: Override tags within one {...} block to the font/drawing registers
fn apply_overrides(
    block: &str,
    base_font: &str,
    styles: &HashMap<String, StyleDefinition>,
    current_font: &mut String,
    drawing: &mut bool,
) {
    // Text before the first backslash is a comment, not a tag
    for tag in block.split('\\').skip(1) {
        if let Some(name) = tag.strip_prefix("fn") {
            let name = name.trim();
            if name.is_empty() {
                // {\fn} resets to the style's default font
                *current_font = base_font.to_string();
            } else {
                *current_font = normalize_font_name(name);
            }
        } else if let Some(scale) = tag.strip_prefix('p') {
            // \p<n> enters drawing mode, \p0 leaves it. Only digit arguments
            // qualify, so \pos(...) and \pbo are left alone.
            let scale = scale.trim();
            if !scale.is_empty() && scale.chars().all(|c| c.is_ascii_digit()) {
                *drawing = scale != "0";
            }
        } else if let Some(style_name) = tag.strip_prefix('r') {
            // \r resets to the event style, \r<Style> to the named style
            let style_name = style_name.trim();
            if style_name.is_empty() {
                *current_font = base_font.to_string();
            } else {
                *current_font = styles
                    .get(style_name)
                    .map(|s| s.font_name.clone())
                    .unwrap_or_else(|| base_font.to_string());
            }
        }
    }
}

/// Trim a font name and strip the `@` vertical-layout prefix, which names
/// the same font file as its horizontal variant
pub fn normalize_font_name(name: &str) -> String {
    let name = name.trim();
    name.strip_prefix('@').unwrap_or(name).trim().to_string()
}

// @matches: "Prefix: rest" with case-insensitive prefix, returns rest
fn strip_line_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let trimmed = line.trim_start();
    match trimmed.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&trimmed[prefix.len()..]),
        _ => None,
    }
}
