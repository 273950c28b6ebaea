/*!
 * Codec for the ASS `[Fonts]` embedding section.
 *
 * Font bytes travel through the format's uuencode-derived scheme: groups of
 * 3 bytes become 4 printable characters (6-bit values offset by 33, `'!'`
 * through `` '`' ``), lines carry at most 60 bytes (80 data characters) and
 * start with one length character valued `33 + byte_count`. A trailing
 * 2-byte group encodes to 3 characters and a trailing 1-byte group to 2,
 * with zero padding bits, so decode recovers the input byte-for-byte.
 *
 * Decode validates the length prefix and every data character; a violation
 * is corruption, never a guess.
 */

use crate::errors::CodecError;

/// Offset mapping 6-bit values into the printable ASCII range
const OFFSET: u8 = 33;

/// Maximum bytes per encoded line (80 data characters)
const LINE_BYTES: usize = 60;

/// One font entry of a `[Fonts]` section
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFont {
    /// File name from the `fontname:` header line
    pub filename: String,

    /// Decoded font bytes
    pub data: Vec<u8>,
}

/// Encode font bytes into length-prefixed printable lines
pub fn encode(data: &[u8]) -> Vec<String> {
    let mut lines = Vec::with_capacity(data.len().div_ceil(LINE_BYTES));

    for chunk in data.chunks(LINE_BYTES) {
        let mut line = String::with_capacity(1 + chunk.len().div_ceil(3) * 4);
        line.push((OFFSET + chunk.len() as u8) as char);

        for group in chunk.chunks(3) {
            let b1 = group[0];
            let b2 = group.get(1).copied().unwrap_or(0);
            let b3 = group.get(2).copied().unwrap_or(0);

            let values = [
                b1 >> 2,
                ((b1 & 0x03) << 4) | (b2 >> 4),
                ((b2 & 0x0F) << 2) | (b3 >> 6),
                b3 & 0x3F,
            ];

            // Partial groups emit only the characters that carry data bits
            for &value in &values[..group.len() + 1] {
                line.push((OFFSET + value) as char);
            }
        }

        lines.push(line);
    }

    lines
}

/// Decode length-prefixed lines back to the original bytes.
/// Exact inverse of [`encode`]; any malformed line is [`CodecError`].
pub fn decode<'a, I>(lines: I) -> Result<Vec<u8>, CodecError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut data = Vec::new();

    for (idx, raw_line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim_end_matches(['\r', '\n']);

        let mut chars = line.chars();
        let prefix = chars.next().ok_or(CodecError::InvalidLengthPrefix {
            prefix: ' ',
            line: line_no,
        })?;

        let byte_count = (prefix as u32).wrapping_sub(OFFSET as u32) as usize;
        if !(1..=LINE_BYTES).contains(&byte_count) || !prefix.is_ascii() {
            return Err(CodecError::InvalidLengthPrefix {
                prefix,
                line: line_no,
            });
        }

        let expected_chars = byte_count.div_ceil(3) * 4 - pad_chars(byte_count);
        let payload: Vec<u8> = chars
            .map(|c| {
                if c.is_ascii() && (OFFSET..OFFSET + 64).contains(&(c as u8)) {
                    Ok(c as u8 - OFFSET)
                } else {
                    Err(CodecError::InvalidCharacter(c, line_no))
                }
            })
            .collect::<Result<_, _>>()?;

        if payload.len() != expected_chars {
            return Err(CodecError::LengthMismatch {
                line: line_no,
                expected: expected_chars,
                actual: payload.len(),
            });
        }

        for group in payload.chunks(4) {
            let v1 = group[0];
            let v2 = group.get(1).copied().unwrap_or(0);
            let v3 = group.get(2).copied().unwrap_or(0);
            let v4 = group.get(3).copied().unwrap_or(0);

            data.push((v1 << 2) | (v2 >> 4));
            if group.len() >= 3 {
                data.push((v2 << 4) | (v3 >> 2));
            }
            if group.len() == 4 {
                data.push((v3 << 6) | v4);
            }
        }
    }

    Ok(data)
}

// @returns: Characters saved on the final partial group for n bytes
fn pad_chars(byte_count: usize) -> usize {
    match byte_count % 3 {
        0 => 0,
        1 => 2,
        _ => 1,
    }
}

/// Render a complete `[Fonts]` section for the given fonts
pub fn build_fonts_section(fonts: &[EmbeddedFont]) -> String {
    let mut section = String::from("[Fonts]\n");

    for font in fonts {
        section.push_str("fontname: ");
        section.push_str(&font.filename);
        section.push('\n');
        for line in encode(&font.data) {
            section.push_str(&line);
            section.push('\n');
        }
        // Blank line terminates the entry
        section.push('\n');
    }

    section
}

/// Remove any existing `[Fonts]` section from a document. The section runs
/// from its header to the next bracketed section header or end of input.
pub fn strip_fonts_section(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut in_fonts = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            in_fonts = trimmed.eq_ignore_ascii_case("[Fonts]");
        }
        if !in_fonts {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// Append a `[Fonts]` section to a document, replacing any existing one
pub fn embed_fonts(content: &str, fonts: &[EmbeddedFont]) -> String {
    let mut out = strip_fonts_section(content);

    if fonts.is_empty() {
        return out;
    }

    if !out.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&build_fonts_section(fonts));
    out
}

/// Parse the `[Fonts]` section of a document into its embedded fonts.
///
/// Works on any conforming section regardless of who produced it. Returns
/// an empty list when the document has no `[Fonts]` section; corruption in
/// an encoded line is fatal for the decode path.
pub fn parse_embedded_fonts(content: &str) -> Result<Vec<EmbeddedFont>, CodecError> {
    let mut fonts = Vec::new();
    let mut in_fonts = false;
    let mut current_name: Option<String> = None;
    let mut current_lines: Vec<&str> = Vec::new();

    let mut finish =
        |name: &mut Option<String>, lines: &mut Vec<&str>, fonts: &mut Vec<EmbeddedFont>| {
            if let Some(filename) = name.take() {
                let data = decode(lines.drain(..))?;
                fonts.push(EmbeddedFont { filename, data });
            }
            lines.clear();
            Ok::<(), CodecError>(())
        };

    for line in content.lines() {
        let trimmed = line.trim_end_matches('\r');

        if trimmed.trim().starts_with('[') && trimmed.trim().ends_with(']') {
            finish(&mut current_name, &mut current_lines, &mut fonts)?;
            in_fonts = trimmed.trim().eq_ignore_ascii_case("[Fonts]");
            continue;
        }

        if !in_fonts {
            continue;
        }

        if let Some(rest) = header_value(trimmed) {
            finish(&mut current_name, &mut current_lines, &mut fonts)?;
            current_name = Some(rest.to_string());
        } else if trimmed.trim().is_empty() {
            finish(&mut current_name, &mut current_lines, &mut fonts)?;
        } else if current_name.is_some() {
            current_lines.push(trimmed);
        }
    }

    finish(&mut current_name, &mut current_lines, &mut fonts)?;
    Ok(fonts)
}

// @matches: "fontname: <file>" header, case-insensitive
fn header_value(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    const PREFIX: &str = "fontname:";
    match trimmed.get(..PREFIX.len()) {
        Some(head) if head.eq_ignore_ascii_case(PREFIX) => {
            Some(trimmed[PREFIX.len()..].trim())
        }
        _ => None,
    }
}
