//! Progress reporting.
//!
//! This module provides [`ProgressCallback`] for observing a split run and
//! [`ProgressInfo`] for the snapshots it receives. Callbacks observe but
//! cannot halt the run.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use epsplit::{GroupingConfig, ProgressCallback, ProgressInfo, ProgressStage};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if info.stage == ProgressStage::EpisodeWritten {
//!             println!("{} episode(s) written", info.episodes_emitted);
//!         }
//!     }
//! }
//!
//! let config = GroupingConfig::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What the run was doing when a [`ProgressInfo`] was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressStage {
    /// Chapters of a source file were read.
    FileProbed,
    /// Leftover chapters were found in a source file and the extras policy
    /// asks for a warning.
    ExtrasFound,
    /// An episode was written (or planned, in a dry run).
    EpisodeWritten,
    /// The run is over.
    Finished,
}

/// A snapshot of split progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What just happened.
    pub stage: ProgressStage,
    /// The source file being processed, if any.
    pub source: Option<PathBuf>,
    /// Episodes emitted so far across all files.
    pub episodes_emitted: u64,
    /// The global episode cap, if one is set.
    pub episode_limit: Option<u64>,
    /// Source files probed so far.
    pub files_probed: usize,
    /// Total number of source files in the run.
    pub files_total: usize,
    /// Chapters in the current source file.
    pub chapter_count: Option<usize>,
    /// Leftover chapters in the current source file
    /// ([`ProgressStage::ExtrasFound`] only).
    pub leftover: Option<usize>,
    /// The output path of the episode just written
    /// ([`ProgressStage::EpisodeWritten`] only).
    pub output: Option<PathBuf>,
    /// Wall-clock time elapsed since the run started.
    pub elapsed: Duration,
}

/// Trait for receiving progress updates during a split run.
///
/// Implementations must be [`Send`] and [`Sync`] so a configuration can be
/// shared freely.
pub trait ProgressCallback: Send + Sync {
    /// Called after each notable step of the run.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks counters and timing for one run and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    start_time: Instant,
    files_total: usize,
    files_probed: usize,
    episode_limit: Option<u64>,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        files_total: usize,
        episode_limit: Option<u64>,
    ) -> Self {
        Self {
            callback,
            start_time: Instant::now(),
            files_total,
            files_probed: 0,
            episode_limit,
        }
    }

    pub(crate) fn file_probed(&mut self, source: &Path, chapter_count: usize, emitted: u64) {
        self.files_probed += 1;
        let mut info = self.snapshot(ProgressStage::FileProbed, emitted);
        info.source = Some(source.to_path_buf());
        info.chapter_count = Some(chapter_count);
        self.callback.on_progress(&info);
    }

    pub(crate) fn extras_found(&self, source: &Path, leftover: usize, emitted: u64) {
        let mut info = self.snapshot(ProgressStage::ExtrasFound, emitted);
        info.source = Some(source.to_path_buf());
        info.leftover = Some(leftover);
        self.callback.on_progress(&info);
    }

    pub(crate) fn episode_written(&self, source: &Path, output: &Path, emitted: u64) {
        let mut info = self.snapshot(ProgressStage::EpisodeWritten, emitted);
        info.source = Some(source.to_path_buf());
        info.output = Some(output.to_path_buf());
        self.callback.on_progress(&info);
    }

    pub(crate) fn finish(&self, emitted: u64) {
        let info = self.snapshot(ProgressStage::Finished, emitted);
        self.callback.on_progress(&info);
    }

    fn snapshot(&self, stage: ProgressStage, emitted: u64) -> ProgressInfo {
        ProgressInfo {
            stage,
            source: None,
            episodes_emitted: emitted,
            episode_limit: self.episode_limit,
            files_probed: self.files_probed,
            files_total: self.files_total,
            chapter_count: None,
            leftover: None,
            output: None,
            elapsed: self.start_time.elapsed(),
        }
    }
}
