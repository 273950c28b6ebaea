/*!
 * # fontsub - Font subsetting for ASS subtitles
 *
 * A Rust library for reducing fonts to the characters an ASS subtitle
 * actually renders, and for embedding the reduced fonts back into the
 * subtitle file.
 *
 * ## Features
 *
 * - Extract (font name, character set) usage from ASS documents,
 *   including inline `\fn` override tags and style fallbacks
 * - Scan a fonts directory and index every name each font is known by
 * - Resolve required names to files with a deterministic matching policy
 * - Subset matched fonts through the subsetter crate
 * - Encode/decode the `[Fonts]` section's uuencode-derived embedding
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `ass_usage`: ASS parsing and font/character usage extraction
 * - `font_index`: Font file discovery and name-table indexing
 * - `font_matcher`: Required-name resolution with tie-breaking
 * - `subset_orchestrator`: Concurrent per-font subsetting
 * - `embed_codec`: `[Fonts]` section encoding and decoding
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod ass_usage;
pub mod font_index;
pub mod font_matcher;
pub mod subset_orchestrator;
pub mod embed_codec;
pub mod app_controller;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use ass_usage::{FontRequirement, UsageExtractor};
pub use font_index::{FontFileRecord, FontNameIndex, FontNameKind};
pub use font_matcher::MatchResult;
pub use subset_orchestrator::{SubsetRequest, SubsetResult};
pub use errors::{AppError, AssError, CodecError, FontError};
