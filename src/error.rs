//! Error types for the `epsplit` crate.
//!
//! This module defines [`EpsplitError`], the unified error type returned by all
//! fallible operations in the crate. Every variant is fatal to a split run:
//! nothing is retried and files written before the failure are left in place.

use std::{io::Error as IoError, path::PathBuf};

use thiserror::Error;

/// The unified error type for all `epsplit` operations.
///
/// Variants carry the path involved so the CLI can report the failure
/// without additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EpsplitError {
    /// Chapter metadata could not be read from a media file.
    ///
    /// Raised when the probe tool cannot be started, exits non-zero, or
    /// prints a document that does not match the expected chapter schema.
    #[error("Failed to read chapters from {path}: {reason}")]
    Probe {
        /// Media file that was being probed.
        path: PathBuf,
        /// Underlying reason the probe failed.
        reason: String,
    },

    /// An episode could not be extracted.
    #[error("Failed to extract episode to {path}: {reason}")]
    Extract {
        /// Output file that was being written.
        path: PathBuf,
        /// Underlying reason the extraction failed.
        reason: String,
    },

    /// Leftover chapters were found while the extras policy is
    /// [`ExtrasPolicy::Error`](crate::ExtrasPolicy::Error).
    #[error("Found {leftover} unused chapters at the end of {path}")]
    ExtrasPolicyViolation {
        /// Media file with leftover chapters.
        path: PathBuf,
        /// Number of chapters that do not fill a whole episode.
        leftover: usize,
    },

    /// A chapter boundary is not a finite decimal number of seconds.
    #[error("Invalid timestamp {0:?}: expected decimal seconds")]
    InvalidTimestamp(String),

    /// A grouping option is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The output filename template could not be parsed.
    #[error("Invalid output format {template:?}: {reason}")]
    InvalidTemplate {
        /// The template as given.
        template: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An I/O error occurred, e.g. while prompting for a title.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

impl EpsplitError {
    /// Process exit status for this error.
    ///
    /// An extras policy violation exits with the leftover chapter count
    /// (clamped to 255 so it never wraps to success); everything else
    /// exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            EpsplitError::ExtrasPolicyViolation { leftover, .. } => (*leftover).clamp(1, 255) as i32,
            _ => 1,
        }
    }
}
