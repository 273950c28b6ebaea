/*!
 * Error types for the fontsub application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Propagation policy: anything that prevents determining what fonts are needed
 * (a malformed subtitle) is fatal. Anything that prevents satisfying the need
 * for one specific font (unreadable file, no match, engine failure) is isolated
 * per font and surfaced as a warning so the batch can complete with partial
 * results.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when parsing ASS subtitle content
#[derive(Error, Debug)]
pub enum AssError {
    /// Malformed subtitle structure - fatal, aborts the whole run
    #[error("Malformed subtitle: {0}")]
    Parse(String),

    /// The document contains no usable styles or events
    #[error("No font usage found: {0}")]
    Empty(String),
}

/// Errors that can occur for one specific font during a subset run.
/// These are recoverable: the affected font is skipped and reported,
/// other fonts continue.
#[derive(Error, Debug)]
pub enum FontError {
    /// Font file could not be parsed (corrupt or unsupported format)
    #[error("Unreadable font file {path}: {reason}")]
    Unreadable {
        /// Path of the offending file
        path: PathBuf,
        /// Parser error description
        reason: String,
    },

    /// No font file in the index exposes the required name
    #[error("No font file matched required font '{0}'")]
    Unmatched(String),

    /// The external subsetting engine rejected the font
    #[error("Subset engine failed for '{font_name}': {reason}")]
    SubsetEngine {
        /// Required font name being processed
        font_name: String,
        /// Engine error description
        reason: String,
    },
}

/// Errors that can occur in the `[Fonts]` embed codec.
/// Corruption is fatal only on the decode path.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Line carries a length character outside the valid range
    #[error("Invalid length prefix '{prefix}' on encoded line {line}")]
    InvalidLengthPrefix {
        /// The offending prefix character
        prefix: char,
        /// 1-based line number within the font entry
        line: usize,
    },

    /// Line length does not agree with its length prefix
    #[error("Encoded line {line} has {actual} data characters, expected {expected}")]
    LengthMismatch {
        /// 1-based line number within the font entry
        line: usize,
        /// Data characters required by the prefix
        expected: usize,
        /// Data characters present
        actual: usize,
    },

    /// A data character falls outside the 6-bit printable range
    #[error("Invalid encoded character '{0}' on line {1}")]
    InvalidCharacter(char, usize),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle parsing
    #[error("Subtitle error: {0}")]
    Ass(#[from] AssError),

    /// Error from font handling
    #[error("Font error: {0}")]
    Font(#[from] FontError),

    /// Error from the embed codec
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
