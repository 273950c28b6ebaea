/*!
 * Per-font subsetting, fanned out over a bounded number of blocking tasks.
 *
 * Each job owns its own file read and produces an independent result; the
 * glyph/table reduction itself is delegated to the subsetter crate. One
 * font's failure never cancels its siblings - results are collected for all
 * jobs and partitioned by the caller.
 */

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use futures::stream::{self, StreamExt};
use log::debug;
use subsetter::GlyphRemapper;
use tokio::task;

use crate::errors::FontError;
use crate::font_index::FontFileRecord;

/// One unit of subsetting work: a matched face and the characters it
/// must keep rendering
#[derive(Debug, Clone)]
pub struct SubsetRequest {
    /// Required font name, as it appeared in the subtitle
    pub font_name: String,

    /// The face record the name resolved to
    pub record: Arc<FontFileRecord>,

    /// Characters the subset must retain
    pub chars: BTreeSet<char>,
}

/// Result of subsetting one font
#[derive(Debug, Clone)]
pub struct SubsetResult {
    // @field: Required font name
    pub font_name: String,

    // @field: Source font file
    pub source_path: PathBuf,

    // @field: Face index within the source file
    pub face_index: u32,

    // @field: Glyphs before subsetting
    pub original_glyphs: u16,

    // @field: Glyphs retained
    pub subset_glyphs: u16,

    // @field: Source file size in bytes
    pub original_size: usize,

    // @field: Subsetted font size in bytes
    pub subset_size: usize,

    // @field: The subsetted font bytes
    pub data: Vec<u8>,
}

/// Subset every request, at most `max_concurrent` at a time.
///
/// Returns one `(font name, outcome)` pair per request, in request order.
/// `progress` is invoked with (completed, total) as jobs finish.
pub async fn subset_all(
    requests: Vec<SubsetRequest>,
    max_concurrent: usize,
    progress: impl Fn(usize, usize) + Clone + Send + 'static,
) -> Vec<(String, Result<SubsetResult, FontError>)> {
    let total = requests.len();
    let completed = Arc::new(AtomicUsize::new(0));

    let results = stream::iter(requests.into_iter().enumerate())
        .map(|(idx, request)| {
            let completed = completed.clone();
            let progress = progress.clone();

            async move {
                let font_name = request.font_name.clone();
                let outcome = match task::spawn_blocking(move || subset_one(request)).await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(FontError::SubsetEngine {
                        font_name: font_name.clone(),
                        reason: format!("subset task panicked: {}", e),
                    }),
                };

                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                progress(done, total);

                (idx, font_name, outcome)
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect::<Vec<_>>()
        .await;

    // Restore request order so reports are deterministic
    let mut sorted = results;
    sorted.sort_by_key(|(idx, _, _)| *idx);
    sorted
        .into_iter()
        .map(|(_, name, outcome)| (name, outcome))
        .collect()
}

/// Subset a single font synchronously. Runs on a blocking task.
pub fn subset_one(request: SubsetRequest) -> Result<SubsetResult, FontError> {
    let path = &request.record.path;
    let data = fs::read(path).map_err(|e| FontError::Unreadable {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let face = ttf_parser::Face::parse(&data, request.record.face_index).map_err(|e| {
        FontError::Unreadable {
            path: path.clone(),
            reason: e.to_string(),
        }
    })?;

    // Required characters plus the space baseline; the engine always keeps
    // glyph 0 (.notdef) itself
    let mut chars = request.chars.clone();
    chars.insert(' ');

    let mut glyph_ids: BTreeSet<u16> = BTreeSet::new();
    for c in chars {
        match face.glyph_index(c) {
            Some(gid) => {
                glyph_ids.insert(gid.0);
            }
            None => {
                debug!(
                    "Font '{}' has no glyph for U+{:04X}, character dropped from subset",
                    request.font_name, c as u32
                );
            }
        }
    }

    let gids: Vec<u16> = glyph_ids.into_iter().collect();
    let remapper = GlyphRemapper::new_from_glyphs(&gids);

    let subset_data = subsetter::subset(&data, request.record.face_index, &remapper).map_err(
        |e| FontError::SubsetEngine {
            font_name: request.font_name.clone(),
            reason: e.to_string(),
        },
    )?;

    Ok(SubsetResult {
        font_name: request.font_name,
        source_path: path.clone(),
        face_index: request.record.face_index,
        original_glyphs: face.number_of_glyphs(),
        subset_glyphs: remapper.num_gids(),
        original_size: data.len(),
        subset_size: subset_data.len(),
        data: subset_data,
    })
}
