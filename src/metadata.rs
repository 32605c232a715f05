//! Chapter and episode types.
//!
//! [`Chapter`] values are produced by a [`ChapterReader`](crate::ChapterReader)
//! and are read-only afterwards. [`EpisodeSpec`] values are derived by the
//! [`EpisodeGrouper`](crate::EpisodeGrouper) and consumed immediately by the
//! extractor.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de::Error as DeError};

use crate::error::EpsplitError;

/// A chapter boundary in decimal seconds.
///
/// The textual form reported by the probe is kept verbatim so it can be
/// handed back to the extractor without any rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    text: String,
    seconds: f64,
}

impl Timestamp {
    /// Build a timestamp from a number of seconds, formatted with
    /// microsecond precision the way `ffprobe` prints chapter times.
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            text: format!("{seconds:.6}"),
            seconds,
        }
    }

    /// The timestamp exactly as reported.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The timestamp as a floating point number of seconds.
    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }
}

impl FromStr for Timestamp {
    type Err = EpsplitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() => Ok(Self {
                text: trimmed.to_string(),
                seconds,
            }),
            _ => Err(EpsplitError::InvalidTimestamp(value.to_string())),
        }
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.text)
    }
}

/// Probes report times either as strings (`"12.345000"`) or as numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(text) => text.parse().map_err(D::Error::custom),
            RawTimestamp::Number(number) => number.to_string().parse().map_err(D::Error::custom),
        }
    }
}

/// A named time interval embedded in a media container.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Chapter {
    /// Start of the chapter.
    pub start_time: Timestamp,
    /// End of the chapter.
    pub end_time: Timestamp,
    /// Chapter title, if the container carries one.
    pub title: Option<String>,
}

impl Chapter {
    /// Create an untitled chapter.
    pub fn new(start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            start_time,
            end_time,
            title: None,
        }
    }

    /// Create an untitled chapter from second offsets.
    pub fn from_seconds(start: f64, end: f64) -> Self {
        Self::new(Timestamp::from_seconds(start), Timestamp::from_seconds(end))
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A media file together with its chapter list, in probe order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// Path of the media file.
    pub path: PathBuf,
    /// Chapters in the order the probe returned them.
    pub chapters: Vec<Chapter>,
}

impl SourceFile {
    /// Pair a path with its chapters.
    pub fn new(path: impl Into<PathBuf>, chapters: Vec<Chapter>) -> Self {
        Self {
            path: path.into(),
            chapters,
        }
    }

    /// The extension used for output names: everything after the final
    /// `.` of the path, or the whole path when it contains no `.`.
    pub fn extension(&self) -> String {
        source_extension(&self.path)
    }
}

/// Everything after the final `.` of `path`.
pub(crate) fn source_extension(path: &Path) -> String {
    let text = path.to_string_lossy();
    match text.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => text.into_owned(),
    }
}

/// One episode: a run of consecutive chapters from a single source file.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct EpisodeSpec {
    /// Episode number, continuous across all files of a run.
    pub episode_number: i64,
    /// Start of the first chapter in the group.
    pub start_time: Timestamp,
    /// End of the last chapter in the group.
    pub end_time: Timestamp,
    /// Position of the source file in the input list.
    pub source_index: usize,
    /// Index of the first chapter of the group within its file.
    pub first_chapter: usize,
    /// Number of chapters in the group.
    pub chapter_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_from_string_keeps_text() {
        let timestamp: Timestamp = serde_json::from_str("\"12.345000\"").unwrap();
        assert_eq!(timestamp.as_str(), "12.345000");
        assert!((timestamp.as_seconds() - 12.345).abs() < 1e-9);
    }

    #[test]
    fn timestamp_from_number() {
        let timestamp: Timestamp = serde_json::from_str("20").unwrap();
        assert_eq!(timestamp.as_str(), "20");
        assert_eq!(timestamp.as_seconds(), 20.0);
    }

    #[test]
    fn timestamp_rejects_non_numeric_text() {
        assert!(serde_json::from_str::<Timestamp>("\"soon\"").is_err());
        assert!("NaN".parse::<Timestamp>().is_err());
    }

    #[test]
    fn unparseable_timestamp_has_its_own_error() {
        let error = "x".parse::<Timestamp>().unwrap_err();
        assert!(matches!(error, EpsplitError::InvalidTimestamp(ref value) if value == "x"));
        assert!(error.to_string().contains("expected decimal seconds"));
    }

    #[test]
    fn extension_is_text_after_last_dot() {
        assert_eq!(SourceFile::new("show.s01.mkv", vec![]).extension(), "mkv");
        assert_eq!(SourceFile::new("dir.d/video", vec![]).extension(), "d/video");
        assert_eq!(SourceFile::new("video", vec![]).extension(), "video");
    }
}
