//! Grouping chapters into episodes.
//!
//! An [`EpisodeGrouper`] carries the running episode number and the count of
//! episodes emitted so far. Both survive from one source file to the next,
//! so numbering is continuous across a multi-file run and the episode cap is
//! global. Each file is processed in two steps:
//!
//! 1. [`EpisodeGrouper::start_file`] applies the extras policy and returns a
//!    [`FileCursor`] positioned after the skipped chapters.
//! 2. [`EpisodeGrouper::next_episode`] is called until it returns
//!    `Ok(None)`, yielding one [`EpisodeSpec`] per full run of chapters.
//!
//! Driving the steps explicitly lets callers do work between files (such as
//! probing the next file only when it is needed). [`group`] wraps the same
//! steps in a lazy iterator over chapter lists that are already in memory.
//!
//! # Example
//!
//! ```
//! use epsplit::{Chapter, GroupingConfig, SourceFile, group};
//!
//! let chapters = vec![
//!     Chapter::from_seconds(0.0, 10.0),
//!     Chapter::from_seconds(10.0, 20.0),
//!     Chapter::from_seconds(20.0, 30.0),
//!     Chapter::from_seconds(30.0, 35.0),
//! ];
//! let sources = vec![SourceFile::new("show.mkv", chapters)];
//! let config = GroupingConfig::new().with_episode_length(2);
//!
//! let episodes = group(&sources, &config)?.collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(episodes.len(), 2);
//! assert_eq!(episodes[1].start_time.as_seconds(), 20.0);
//! assert_eq!(episodes[1].end_time.as_seconds(), 35.0);
//! # Ok::<(), epsplit::EpsplitError>(())
//! ```

use crate::config::{ExtrasPolicy, GroupingConfig};
use crate::error::EpsplitError;
use crate::metadata::{EpisodeSpec, SourceFile};

/// Log target of the leftover-chapters warning, so a front end that reports
/// the warning itself can filter out the log record.
pub const EXTRAS_LOG_TARGET: &str = "epsplit::extras";

/// How a file with a given chapter count splits into episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePlan {
    /// Number of full episodes.
    pub groups: usize,
    /// Chapters after the last full episode.
    pub leftover: usize,
}

/// Compute the number of full groups and leftover chapters for a file.
///
/// Skipped chapters count towards neither. When the skip count exceeds the
/// chapter count both values are zero.
///
/// # Panics
///
/// Panics if `episode_length` is zero. A validated [`GroupingConfig`] never
/// has a zero length.
pub fn plan_file(chapter_count: usize, skip_count: usize, episode_length: usize) -> FilePlan {
    let usable = chapter_count.saturating_sub(skip_count);
    FilePlan {
        groups: usable / episode_length,
        leftover: usable % episode_length,
    }
}

/// Position within one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct FileCursor {
    source_index: usize,
    next_chapter: usize,
    plan: FilePlan,
}

impl FileCursor {
    /// Chapters left over after the last full episode.
    pub fn leftover(&self) -> usize {
        self.plan.leftover
    }
}

/// The running state of a grouping run.
///
/// Holds the next episode number and the number of episodes emitted so far.
/// Neither is reset between files.
#[derive(Debug, Clone)]
pub struct EpisodeGrouper<'c> {
    config: &'c GroupingConfig,
    /// `None` once an episode numbered `i64::MAX` has been emitted.
    next_episode_number: Option<i64>,
    emitted: u64,
    files_started: usize,
}

impl<'c> EpisodeGrouper<'c> {
    /// Start a run.
    ///
    /// # Errors
    ///
    /// Returns [`EpsplitError::InvalidConfiguration`] if the configuration
    /// does not validate.
    pub fn new(config: &'c GroupingConfig) -> Result<Self, EpsplitError> {
        config.validate()?;
        Ok(Self {
            config,
            next_episode_number: Some(config.start_number),
            emitted: 0,
            files_started: 0,
        })
    }

    /// Number the next emitted episode will get, or `None` if the numbers
    /// have run out.
    pub fn next_episode_number(&self) -> Option<i64> {
        self.next_episode_number
    }

    /// Episodes emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Returns `true` once the episode cap has been reached. No further
    /// episodes will be produced from any file.
    pub fn is_capped(&self) -> bool {
        self.config.max_episodes == Some(self.emitted)
    }

    /// Begin grouping a source file.
    ///
    /// Applies the extras policy before any episode of the file is produced:
    /// under [`ExtrasPolicy::Warn`] a warning is logged, under
    /// [`ExtrasPolicy::Drop`] nothing happens, and under
    /// [`ExtrasPolicy::Error`] the run is aborted.
    ///
    /// # Errors
    ///
    /// Returns [`EpsplitError::ExtrasPolicyViolation`] when the file has
    /// leftover chapters and the policy is [`ExtrasPolicy::Error`].
    pub fn start_file(&mut self, source: &SourceFile) -> Result<FileCursor, EpsplitError> {
        let source_index = self.files_started;
        self.files_started += 1;

        let plan = plan_file(
            source.chapters.len(),
            self.config.skip_count,
            self.config.episode_length,
        );
        log::debug!(
            "Grouping {} ({} chapters, skip={}, length={}): {} episode(s), {} leftover",
            source.path.display(),
            source.chapters.len(),
            self.config.skip_count,
            self.config.episode_length,
            plan.groups,
            plan.leftover,
        );

        if plan.leftover > 0 {
            match self.config.extras_policy {
                ExtrasPolicy::Warn => log::warn!(
                    target: EXTRAS_LOG_TARGET,
                    "Found {} unused chapters at the end of {}",
                    plan.leftover,
                    source.path.display()
                ),
                ExtrasPolicy::Drop => {}
                ExtrasPolicy::Error => {
                    return Err(EpsplitError::ExtrasPolicyViolation {
                        path: source.path.clone(),
                        leftover: plan.leftover,
                    });
                }
            }
        }

        Ok(FileCursor {
            source_index,
            next_chapter: self.config.skip_count,
            plan,
        })
    }

    /// Produce the next episode of the file `cursor` was started on.
    ///
    /// Returns `Ok(None)` when the file has no full group left or the
    /// episode cap has been reached.
    ///
    /// # Errors
    ///
    /// Returns [`EpsplitError::InvalidConfiguration`] if the episode would
    /// need a number past `i64::MAX`. Nothing is emitted in that case.
    pub fn next_episode(
        &mut self,
        cursor: &mut FileCursor,
        source: &SourceFile,
    ) -> Result<Option<EpisodeSpec>, EpsplitError> {
        if self.is_capped() {
            return Ok(None);
        }

        let length = self.config.episode_length;
        let first = cursor.next_chapter;
        let Some(last) = first.checked_add(length - 1) else {
            return Ok(None);
        };
        if last >= source.chapters.len() {
            return Ok(None);
        }

        let Some(episode_number) = self.next_episode_number else {
            return Err(EpsplitError::InvalidConfiguration(format!(
                "episode numbers starting at {} run past {}",
                self.config.start_number,
                i64::MAX
            )));
        };

        let episode = EpisodeSpec {
            episode_number,
            start_time: source.chapters[first].start_time.clone(),
            end_time: source.chapters[last].end_time.clone(),
            source_index: cursor.source_index,
            first_chapter: first,
            chapter_count: length,
        };

        cursor.next_chapter += length;
        self.next_episode_number = episode_number.checked_add(1);
        self.emitted += 1;
        Ok(Some(episode))
    }
}

/// Lazy iterator over the episodes of a list of source files.
///
/// Created by [`group`]. Yields at most one `Err`, after which it is
/// exhausted.
#[derive(Debug)]
pub struct Episodes<'a> {
    grouper: EpisodeGrouper<'a>,
    sources: &'a [SourceFile],
    next_source: usize,
    current: Option<FileCursor>,
    failed: bool,
}

impl Iterator for Episodes<'_> {
    type Item = Result<EpisodeSpec, EpsplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed || self.grouper.is_capped() {
                return None;
            }

            if let Some(cursor) = self.current.as_mut() {
                let source = &self.sources[cursor.source_index];
                match self.grouper.next_episode(cursor, source) {
                    Ok(Some(episode)) => return Some(Ok(episode)),
                    Ok(None) => self.current = None,
                    Err(error) => {
                        self.failed = true;
                        return Some(Err(error));
                    }
                }
            }

            let source = self.sources.get(self.next_source)?;
            self.next_source += 1;
            match self.grouper.start_file(source) {
                Ok(cursor) => self.current = Some(cursor),
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Group the chapters of `sources` into episodes.
///
/// Files are processed in order; episode numbers continue across files and
/// the episode cap applies to the whole sequence. Each call starts from a
/// fresh state, so identical inputs always produce identical episodes.
///
/// # Errors
///
/// Returns [`EpsplitError::InvalidConfiguration`] if the configuration does
/// not validate. The iterator itself yields
/// [`EpsplitError::ExtrasPolicyViolation`] when a file has leftover
/// chapters under [`ExtrasPolicy::Error`], and
/// [`EpsplitError::InvalidConfiguration`] when episode numbers would run
/// past `i64::MAX`.
pub fn group<'a>(
    sources: &'a [SourceFile],
    config: &'a GroupingConfig,
) -> Result<Episodes<'a>, EpsplitError> {
    Ok(Episodes {
        grouper: EpisodeGrouper::new(config)?,
        sources,
        next_source: 0,
        current: None,
        failed: false,
    })
}
