//! The split pipeline.
//!
//! [`Splitter`] ties the pieces together: for each input file it reads the
//! chapters, groups them, resolves a title and an output name for every
//! episode, and hands the range to the extractor. Everything runs
//! sequentially; a file is probed only after every episode of the previous
//! file has been written, and no file is probed once the episode cap is
//! reached.
//!
//! Any error aborts the run immediately. Episodes written before the error
//! are kept.
//!
//! # Example
//!
//! ```no_run
//! use epsplit::{FfmpegRemuxer, FfprobeReader, GroupingConfig, Splitter};
//!
//! let config = GroupingConfig::new().with_episode_length(2);
//! let summary = Splitter::new(FfprobeReader::new(), FfmpegRemuxer::new(), config)
//!     .split(&["part1.mkv", "part2.mkv"])?;
//! println!("wrote {} episodes", summary.episodes.len());
//! # Ok::<(), epsplit::EpsplitError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::config::{ExtrasPolicy, GroupingConfig};
use crate::error::EpsplitError;
use crate::grouper::EpisodeGrouper;
use crate::metadata::{EpisodeSpec, SourceFile};
use crate::probe::ChapterReader;
use crate::progress::ProgressTracker;
use crate::remux::EpisodeExtractor;
use crate::template::TemplateValues;
use crate::title::{PromptTitle, TitleResolver};

/// An episode together with the names it was resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedEpisode {
    /// Grouping result.
    pub spec: EpisodeSpec,
    /// Source media file.
    pub source: PathBuf,
    /// Title substituted into the template.
    pub title: String,
    /// Rendered output path.
    pub output: PathBuf,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitSummary {
    /// Episodes in emission order. In a dry run these were planned but not
    /// written.
    pub episodes: Vec<PlannedEpisode>,
    /// Number of input files whose chapters were read.
    pub files_probed: usize,
}

/// Splits media files into episodes.
pub struct Splitter<R, E> {
    reader: R,
    extractor: E,
    titles: Box<dyn TitleResolver>,
    config: GroupingConfig,
    dry_run: bool,
}

impl<R: ChapterReader, E: EpisodeExtractor> Splitter<R, E> {
    /// Create a splitter.
    ///
    /// When the configuration asks for title prompts, titles are read from
    /// standard input unless another resolver is set with
    /// [`with_title_resolver`](Self::with_title_resolver).
    pub fn new(reader: R, extractor: E, config: GroupingConfig) -> Self {
        Self {
            reader,
            extractor,
            titles: Box::new(PromptTitle::stdio()),
            config,
            dry_run: false,
        }
    }

    /// Use `resolver` for title prompts.
    #[must_use]
    pub fn with_title_resolver(mut self, resolver: impl TitleResolver + 'static) -> Self {
        self.titles = Box::new(resolver);
        self
    }

    /// Plan episodes and names without running the extractor.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Split `paths`, in order.
    ///
    /// # Errors
    ///
    /// Returns the first error met: an invalid configuration, a failed
    /// probe, an extras policy violation, episode numbers running out, a
    /// failed title prompt, or a failed extraction.
    pub fn split<P: AsRef<Path>>(&self, paths: &[P]) -> Result<SplitSummary, EpsplitError> {
        let mut grouper = EpisodeGrouper::new(&self.config)?;
        let mut tracker = ProgressTracker::new(
            self.config.progress.clone(),
            paths.len(),
            self.config.max_episodes,
        );
        let mut summary = SplitSummary::default();

        log::info!(
            "Splitting {} file(s), {} chapter(s) per episode, starting at episode {}",
            paths.len(),
            self.config.episode_length,
            self.config.start_number,
        );

        for path in paths {
            if grouper.is_capped() {
                log::info!("Reached the limit of {} episode(s)", grouper.emitted());
                break;
            }

            let path = path.as_ref();
            let source = SourceFile::new(path, self.reader.read_chapters(path)?);
            summary.files_probed += 1;
            tracker.file_probed(path, source.chapters.len(), grouper.emitted());

            let mut cursor = grouper.start_file(&source)?;
            if cursor.leftover() > 0 && self.config.extras_policy == ExtrasPolicy::Warn {
                tracker.extras_found(path, cursor.leftover(), grouper.emitted());
            }

            let ext = source.extension();
            while let Some(spec) = grouper.next_episode(&mut cursor, &source)? {
                let title = if self.config.title_prompt {
                    self.titles.resolve(spec.episode_number)?
                } else {
                    String::new()
                };
                let output = PathBuf::from(self.config.output_format.render(&TemplateValues {
                    episode_num: spec.episode_number,
                    title: &title,
                    ext: &ext,
                }));

                if self.dry_run {
                    log::info!(
                        "Would write episode {} [{} -> {}] to {}",
                        spec.episode_number,
                        spec.start_time,
                        spec.end_time,
                        output.display()
                    );
                } else {
                    self.extractor
                        .extract(path, &spec.start_time, &spec.end_time, &output)?;
                    log::info!("Wrote episode {} to {}", spec.episode_number, output.display());
                }
                tracker.episode_written(path, &output, grouper.emitted());

                summary.episodes.push(PlannedEpisode {
                    spec,
                    source: path.to_path_buf(),
                    title,
                    output,
                });
            }
        }

        tracker.finish(grouper.emitted());
        Ok(summary)
    }
}
