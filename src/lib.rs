//! # epsplit
//!
//! Split concatenated video files into per-episode files using the chapter
//! markers embedded in the container.
//!
//! A run reads the chapters of each input file, groups consecutive chapters
//! into episodes, and copies each episode's time range into a new file
//! without re-encoding. Reading chapters and copying ranges are delegated to
//! `ffprobe` and `ffmpeg`; this crate decides which ranges to copy and what
//! to call them.
//!
//! ## Quick Start
//!
//! ### Split a file, two chapters per episode
//!
//! ```no_run
//! use epsplit::{FfmpegRemuxer, FfprobeReader, GroupingConfig, Splitter};
//!
//! let config = GroupingConfig::new().with_episode_length(2);
//! Splitter::new(FfprobeReader::new(), FfmpegRemuxer::new(), config)
//!     .split(&["season1.mkv"])?;
//! # Ok::<(), epsplit::EpsplitError>(())
//! ```
//!
//! ### Plan episodes from chapters already in memory
//!
//! ```
//! use epsplit::{Chapter, GroupingConfig, SourceFile, group};
//!
//! let sources = vec![
//!     SourceFile::new("disc1.mkv", vec![Chapter::from_seconds(0.0, 60.0); 3]),
//!     SourceFile::new("disc2.mkv", vec![Chapter::from_seconds(0.0, 60.0); 2]),
//! ];
//! let config = GroupingConfig::new().with_start_number(5);
//!
//! let numbers: Vec<i64> = group(&sources, &config)?
//!     .map(|episode| episode.map(|e| e.episode_number))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(numbers, [5, 6, 7, 8, 9]);
//! # Ok::<(), epsplit::EpsplitError>(())
//! ```
//!
//! ## Features
//!
//! - **Chapter grouping**: fixed-length runs of chapters, a skip count at the
//!   start of every file, and a global episode cap
//! - **Continuous numbering**: episode numbers carry over from one input
//!   file to the next
//! - **Extras policy**: warn about, drop, or refuse chapters that do not
//!   fill a whole episode
//! - **Output templates**: `str.format`-style names built from the episode
//!   number, an optional title and the source extension
//! - **Title prompts**: ask the operator for each episode's title
//! - **Pluggable boundaries**: [`ChapterReader`], [`EpisodeExtractor`] and
//!   [`TitleResolver`] can be replaced, e.g. by fakes in tests
//!
//! ## Requirements
//!
//! `ffprobe` and `ffmpeg` must be installed and on `PATH` (or passed
//! explicitly to [`FfprobeReader::with_program`] and
//! [`FfmpegRemuxer::with_program`]).

pub mod config;
pub mod error;
pub mod grouper;
pub mod metadata;
pub mod probe;
pub mod progress;
pub mod remux;
pub mod split;
pub mod template;
pub mod title;

pub use config::{DEFAULT_FORMAT, ExtrasPolicy, GroupingConfig};
pub use error::EpsplitError;
pub use grouper::{
    EXTRAS_LOG_TARGET, EpisodeGrouper, Episodes, FileCursor, FilePlan, group, plan_file,
};
pub use metadata::{Chapter, EpisodeSpec, SourceFile, Timestamp};
pub use probe::{ChapterReader, FfprobeReader, parse_probe_output};
pub use progress::{ProgressCallback, ProgressInfo, ProgressStage};
pub use remux::{EpisodeExtractor, FfmpegRemuxer};
pub use split::{PlannedEpisode, SplitSummary, Splitter};
pub use template::{OutputTemplate, TemplateValues};
pub use title::{FixedTitles, NoTitle, PromptTitle, TitleResolver};
