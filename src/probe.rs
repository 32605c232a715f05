//! Reading chapter metadata.
//!
//! [`ChapterReader`] is the boundary between the grouping logic and whatever
//! knows how to look inside a media container. [`FfprobeReader`] implements
//! it by running `ffprobe` and parsing its JSON output; tests substitute an
//! in-memory reader.
//!
//! # Example
//!
//! ```no_run
//! use epsplit::{ChapterReader, FfprobeReader};
//!
//! let chapters = FfprobeReader::new().read_chapters("input.mkv".as_ref())?;
//! for chapter in &chapters {
//!     println!("{} -> {}", chapter.start_time, chapter.end_time);
//! }
//! # Ok::<(), epsplit::EpsplitError>(())
//! ```

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;

use crate::error::EpsplitError;
use crate::metadata::{Chapter, Timestamp};

/// Something that can list the chapters of a media file.
pub trait ChapterReader {
    /// Return the chapters of `path` in container order.
    ///
    /// # Errors
    ///
    /// Implementations return [`EpsplitError::Probe`] when the chapters
    /// cannot be read.
    fn read_chapters(&self, path: &Path) -> Result<Vec<Chapter>, EpsplitError>;
}

impl<R: ChapterReader + ?Sized> ChapterReader for &R {
    fn read_chapters(&self, path: &Path) -> Result<Vec<Chapter>, EpsplitError> {
        (**self).read_chapters(path)
    }
}

impl<R: ChapterReader + ?Sized> ChapterReader for Box<R> {
    fn read_chapters(&self, path: &Path) -> Result<Vec<Chapter>, EpsplitError> {
        (**self).read_chapters(path)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    chapters: Vec<ProbeChapter>,
}

#[derive(Debug, Deserialize)]
struct ProbeChapter {
    start_time: Timestamp,
    end_time: Timestamp,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    tags: Option<ProbeTags>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    #[serde(default)]
    title: Option<String>,
}

impl From<ProbeChapter> for Chapter {
    fn from(raw: ProbeChapter) -> Self {
        let title = raw
            .tags
            .and_then(|tags| tags.title)
            .or(raw.title);
        Chapter {
            start_time: raw.start_time,
            end_time: raw.end_time,
            title,
        }
    }
}

/// Parse the JSON document printed by `ffprobe -print_format json
/// -show_chapters`.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns [`EpsplitError::Probe`] if the document is not valid JSON, has no
/// `chapters` array, or contains a chapter without numeric `start_time` and
/// `end_time`.
pub fn parse_probe_output(path: &Path, output: &[u8]) -> Result<Vec<Chapter>, EpsplitError> {
    let document: ProbeDocument =
        serde_json::from_slice(output).map_err(|e| EpsplitError::Probe {
            path: path.to_path_buf(),
            reason: format!("unexpected probe output: {e}"),
        })?;
    Ok(document.chapters.into_iter().map(Chapter::from).collect())
}

/// Reads chapters by running `ffprobe`.
///
/// The probe is run as
/// `ffprobe -i <path> -print_format json -show_chapters -loglevel error`.
/// No timeout is applied.
#[derive(Debug, Clone)]
pub struct FfprobeReader {
    program: OsString,
}

impl Default for FfprobeReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FfprobeReader {
    /// Use `ffprobe` from `PATH`.
    pub fn new() -> Self {
        Self {
            program: OsString::from("ffprobe"),
        }
    }

    /// Use a specific probe executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-i")
            .arg(path)
            .args(["-print_format", "json", "-show_chapters", "-loglevel", "error"]);
        command
    }
}

impl ChapterReader for FfprobeReader {
    fn read_chapters(&self, path: &Path) -> Result<Vec<Chapter>, EpsplitError> {
        log::debug!("Probing chapters of {}", path.display());

        let probe_error = |reason: String| EpsplitError::Probe {
            path: path.to_path_buf(),
            reason,
        };

        let output = self.command(path).output().map_err(|e| {
            probe_error(format!(
                "could not run {}: {e}",
                Path::new(&self.program).display()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(probe_error(format!(
                "{} exited with {}: {}",
                Path::new(&self.program).display(),
                output.status,
                stderr.trim()
            )));
        }

        let chapters = parse_probe_output(path, &output.stdout)?;
        log::info!("Found {} chapters in {}", chapters.len(), path.display());
        Ok(chapters)
    }
}
