use std::sync::Arc;
use log::debug;
use crate::font_index::{FontFileRecord, FontNameIndex, FontNameKind};

// @module: Resolution of required font names against the directory index

/// A successfully resolved font, with the name kind that matched it
/// recorded for diagnostics
#[derive(Debug, Clone)]
pub struct ResolvedFont {
    /// The face record the name resolved to
    pub record: Arc<FontFileRecord>,

    /// Which of the record's names produced the match
    pub matched_kind: FontNameKind,
}

/// Outcome of matching one required font name. Computed once per subset
/// run and not mutated afterwards.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The required name, as it appeared in the subtitle
    pub font_name: String,

    /// The resolved font, or None when nothing in the index matched
    pub resolved: Option<ResolvedFont>,
}

impl MatchResult {
    /// True when a font file was found for the required name
    pub fn is_matched(&self) -> bool {
        self.resolved.is_some()
    }
}

/// Resolve a required font name against the index.
///
/// Priority order, first hit wins: family name, then full name, then file
/// stem, each compared case-insensitively. When several records tie at one
/// level the record whose path sorts first lexicographically wins (face
/// index breaks path ties within a collection), so repeated runs over the
/// same directory always pick the same file.
pub fn match_font(font_name: &str, index: &FontNameIndex) -> MatchResult {
    let needle = font_name.to_lowercase();
    let candidates = index.candidates(font_name);

    for kind in [
        FontNameKind::Family,
        FontNameKind::FullName,
        FontNameKind::FileStem,
    ] {
        let mut tied: Vec<&Arc<FontFileRecord>> = candidates
            .iter()
            .filter(|record| record.has_name(kind, &needle))
            .collect();

        tied.sort_by(|a, b| a.path.cmp(&b.path).then(a.face_index.cmp(&b.face_index)));

        if let Some(first) = tied.first() {
            debug!(
                "Matched '{}' to {:?} via {}",
                font_name,
                first.path,
                kind.label()
            );
            return MatchResult {
                font_name: font_name.to_string(),
                resolved: Some(ResolvedFont {
                    record: Arc::clone(first),
                    matched_kind: kind,
                }),
            };
        }
    }

    MatchResult {
        font_name: font_name.to_string(),
        resolved: None,
    }
}
