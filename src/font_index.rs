use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::{Result, anyhow};
use log::{warn, debug};
use walkdir::WalkDir;
use crate::errors::FontError;

// @module: Font file discovery and name-table indexing

/// Which name-table record a name came from. Recorded per name so the
/// matcher can apply its priority order and diagnostics can say how a
/// font was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FontNameKind {
    /// Family name (name IDs 1 and 16)
    Family,
    /// Full font name (name ID 4)
    FullName,
    /// Synthetic: the file's base name without extension
    FileStem,
}

impl FontNameKind {
    /// Human-readable label for diagnostics
    pub fn label(&self) -> &'static str {
        match self {
            FontNameKind::Family => "family name",
            FontNameKind::FullName => "full name",
            FontNameKind::FileStem => "file name",
        }
    }
}

/// One font face on disk and every name it is known by. Immutable once read.
#[derive(Debug, Clone)]
pub struct FontFileRecord {
    // @field: Font file path
    pub path: PathBuf,

    // @field: Face index within the file (non-zero only for collections)
    pub face_index: u32,

    // @field: All collected (kind, name) pairs, duplicates removed
    pub names: Vec<(FontNameKind, String)>,

    // @field: Glyphs in the face before subsetting (diagnostics/statistics)
    pub glyph_count: u16,
}

impl FontFileRecord {
    /// True when the record exposes `name` (already lowercased) under `kind`
    pub fn has_name(&self, kind: FontNameKind, name_lower: &str) -> bool {
        self.names
            .iter()
            .any(|(k, n)| *k == kind && n.to_lowercase() == name_lower)
    }
}

/// Read every name a font file is known by, one record per face.
///
/// Handles single TrueType/OpenType fonts and collections. Name records are
/// taken from the name table wherever ttf-parser can decode them to Unicode,
/// which prefers the Windows/Unicode platform encodings; undecodable legacy
/// records are skipped. A corrupt face within a collection is skipped with a
/// warning and the remaining faces are kept; only a file with no parseable
/// face at all yields [`FontError::Unreadable`] so the directory scan can
/// report it and move on.
pub fn read_font_records(path: &Path, data: &[u8]) -> Result<Vec<FontFileRecord>, FontError> {
    let face_count = ttf_parser::fonts_in_collection(data).unwrap_or(1);

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut records = Vec::new();
    let mut last_error: Option<String> = None;
    for face_index in 0..face_count {
        // One corrupt face must not discard a collection's other faces
        let face = match ttf_parser::Face::parse(data, face_index) {
            Ok(face) => face,
            Err(e) => {
                warn!("Skipping unparseable face {} of {:?}: {}", face_index, path, e);
                last_error = Some(e.to_string());
                continue;
            }
        };

        let mut names: Vec<(FontNameKind, String)> = Vec::new();
        let mut push_unique = |kind: FontNameKind, value: String| {
            if !value.is_empty() && !names.iter().any(|(k, n)| *k == kind && *n == value) {
                names.push((kind, value));
            }
        };

        for name in face.names().into_iter() {
            let kind = match name.name_id {
                ttf_parser::name_id::FAMILY | ttf_parser::name_id::TYPOGRAPHIC_FAMILY => {
                    FontNameKind::Family
                }
                ttf_parser::name_id::FULL_NAME => FontNameKind::FullName,
                _ => continue,
            };

            // Localized records decode too; all of them are valid lookup keys
            if let Some(value) = name.to_string() {
                push_unique(kind, value.trim().to_string());
            }
        }

        push_unique(FontNameKind::FileStem, stem.clone());

        records.push(FontFileRecord {
            path: path.to_path_buf(),
            face_index,
            names,
            glyph_count: face.number_of_glyphs(),
        });
    }

    if records.is_empty() {
        return Err(FontError::Unreadable {
            path: path.to_path_buf(),
            reason: last_error
                .unwrap_or_else(|| "file contains no parseable font face".to_string()),
        });
    }

    Ok(records)
}

/// Case-normalized name to font-face records, built once per run and
/// immutable afterwards. Ambiguous names keep every candidate so the
/// matcher can apply its own tie-break.
#[derive(Debug, Default)]
pub struct FontNameIndex {
    // @field: All readable face records, scan order
    records: Vec<Arc<FontFileRecord>>,

    // @field: Lowercased name to indices into records
    by_name: HashMap<String, Vec<usize>>,

    // @field: Files that failed to read, with the reason (diagnostic)
    pub skipped: Vec<(PathBuf, String)>,
}

impl FontNameIndex {
    /// Build an index from pre-read records (used directly by tests; the
    /// normal entry point is [`FontNameIndex::scan_directory`])
    pub fn build(records: Vec<FontFileRecord>) -> Self {
        let mut index = FontNameIndex::default();
        for record in records {
            index.insert(record);
        }
        index
    }

    /// Scan a directory for font files and index every name they expose.
    ///
    /// A missing directory is fatal. Files that fail to read are recorded
    /// in `skipped` and surfaced as warnings, not errors.
    pub fn scan_directory<P: AsRef<Path>>(dir: P, extensions: &[String]) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(anyhow!("Fonts directory does not exist: {:?}", dir));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if path.is_file() && has_extension(path, extensions) {
                paths.push(path.to_path_buf());
            }
        }
        // Scan order is part of the deterministic tie-break story
        paths.sort();

        let mut index = FontNameIndex::default();
        for path in paths {
            let data = match fs::read(&path) {
                Ok(data) => data,
                Err(e) => {
                    warn!("Skipping unreadable file {:?}: {}", path, e);
                    index.skipped.push((path, e.to_string()));
                    continue;
                }
            };

            match read_font_records(&path, &data) {
                Ok(records) => {
                    for record in records {
                        debug!(
                            "Indexed {:?} face {} with {} name(s)",
                            record.path,
                            record.face_index,
                            record.names.len()
                        );
                        index.insert(record);
                    }
                }
                Err(e) => {
                    warn!("{}", e);
                    index.skipped.push((path, e.to_string()));
                }
            }
        }

        Ok(index)
    }

    // @inserts: One record under every name it exposes
    fn insert(&mut self, record: FontFileRecord) {
        let idx = self.records.len();
        let record = Arc::new(record);
        for (_, name) in &record.names {
            self.by_name
                .entry(name.to_lowercase())
                .or_default()
                .push(idx);
        }
        self.records.push(record);
    }

    /// Every record exposing the given name, case-insensitively.
    /// Multiple files may legitimately tie; the matcher decides.
    pub fn candidates(&self, name: &str) -> Vec<Arc<FontFileRecord>> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|indices| indices.iter().map(|&i| self.records[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Number of indexed face records
    pub fn face_count(&self) -> usize {
        self.records.len()
    }

    /// Number of distinct names in the index
    pub fn name_count(&self) -> usize {
        self.by_name.len()
    }

    /// True when the scan found nothing usable
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All indexed records, scan order
    pub fn records(&self) -> &[Arc<FontFileRecord>] {
        &self.records
    }
}

// @checks: Extension membership, case-insensitive, no leading dot expected
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy();
            extensions.iter().any(|e| ext.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}
