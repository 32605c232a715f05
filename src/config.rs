//! Grouping configuration.
//!
//! [`GroupingConfig`] is a builder that carries every option controlling how
//! chapters are grouped into episodes and how those episodes are named,
//! together with an optional progress callback.
//!
//! # Example
//!
//! ```
//! use epsplit::{ExtrasPolicy, GroupingConfig};
//!
//! let config = GroupingConfig::new()
//!     .with_episode_length(2)
//!     .with_skip_count(1)
//!     .with_start_number(5)
//!     .with_extras_policy(ExtrasPolicy::Drop)
//!     .with_max_episodes(Some(10));
//! assert!(config.validate().is_ok());
//! ```

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

use clap::ValueEnum;

use crate::error::EpsplitError;
use crate::progress::{NoOpProgress, ProgressCallback};
use crate::template::OutputTemplate;

/// Default output filename template.
pub const DEFAULT_FORMAT: &str = "{episode_num:02d}{title}.{ext}";

/// What to do with chapters left over after forming full episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExtrasPolicy {
    /// Report the leftover chapters and carry on. This is the default.
    #[default]
    Warn,
    /// Ignore the leftover chapters silently.
    Drop,
    /// Abort the whole run.
    Error,
}

impl Display for ExtrasPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            ExtrasPolicy::Warn => "warn",
            ExtrasPolicy::Drop => "drop",
            ExtrasPolicy::Error => "error",
        };
        f.write_str(name)
    }
}

impl FromStr for ExtrasPolicy {
    type Err = EpsplitError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "warn" => Ok(ExtrasPolicy::Warn),
            "drop" => Ok(ExtrasPolicy::Drop),
            "error" => Ok(ExtrasPolicy::Error),
            other => Err(EpsplitError::InvalidConfiguration(format!(
                "unknown extras policy {other:?} (expected warn, drop or error)"
            ))),
        }
    }
}

/// Configuration for grouping chapters into episodes.
///
/// All fields have defaults matching the command-line defaults: one chapter
/// per episode, numbering from 1, nothing skipped, no cap, warn on extras.
#[derive(Clone)]
pub struct GroupingConfig {
    pub(crate) output_format: OutputTemplate,
    pub(crate) start_number: i64,
    pub(crate) episode_length: usize,
    pub(crate) extras_policy: ExtrasPolicy,
    pub(crate) skip_count: usize,
    pub(crate) title_prompt: bool,
    pub(crate) max_episodes: Option<u64>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for GroupingConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GroupingConfig")
            .field("output_format", &self.output_format.as_str())
            .field("start_number", &self.start_number)
            .field("episode_length", &self.episode_length)
            .field("extras_policy", &self.extras_policy)
            .field("skip_count", &self.skip_count)
            .field("title_prompt", &self.title_prompt)
            .field("max_episodes", &self.max_episodes)
            .finish()
    }
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupingConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            output_format: OutputTemplate::default(),
            start_number: 1,
            episode_length: 1,
            extras_policy: ExtrasPolicy::Warn,
            skip_count: 0,
            title_prompt: false,
            max_episodes: None,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the output filename template.
    #[must_use]
    pub fn with_output_format(mut self, template: OutputTemplate) -> Self {
        self.output_format = template;
        self
    }

    /// Set the number given to the first episode of the run. Negative
    /// numbers are allowed.
    #[must_use]
    pub fn with_start_number(mut self, number: i64) -> Self {
        self.start_number = number;
        self
    }

    /// Set how many chapters make up one episode.
    ///
    /// Zero is accepted here but rejected by [`validate`](Self::validate).
    #[must_use]
    pub fn with_episode_length(mut self, length: usize) -> Self {
        self.episode_length = length;
        self
    }

    /// Set the extras policy.
    #[must_use]
    pub fn with_extras_policy(mut self, policy: ExtrasPolicy) -> Self {
        self.extras_policy = policy;
        self
    }

    /// Set how many chapters to ignore at the start of every file.
    #[must_use]
    pub fn with_skip_count(mut self, count: usize) -> Self {
        self.skip_count = count;
        self
    }

    /// Ask the operator for a title before naming each episode.
    #[must_use]
    pub fn with_title_prompt(mut self, prompt: bool) -> Self {
        self.title_prompt = prompt;
        self
    }

    /// Cap the number of episodes produced across all files.
    /// `None` means unbounded.
    #[must_use]
    pub fn with_max_episodes(mut self, max: Option<u64>) -> Self {
        self.max_episodes = max;
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The output filename template.
    pub fn output_format(&self) -> &OutputTemplate {
        &self.output_format
    }

    /// Number of the first episode of the run.
    pub fn start_number(&self) -> i64 {
        self.start_number
    }

    /// Chapters per episode.
    pub fn episode_length(&self) -> usize {
        self.episode_length
    }

    /// The extras policy.
    pub fn extras_policy(&self) -> ExtrasPolicy {
        self.extras_policy
    }

    /// Chapters ignored at the start of every file.
    pub fn skip_count(&self) -> usize {
        self.skip_count
    }

    /// Whether a title is requested for each episode.
    pub fn title_prompt(&self) -> bool {
        self.title_prompt
    }

    /// The episode cap, if any.
    pub fn max_episodes(&self) -> Option<u64> {
        self.max_episodes
    }

    /// Check option ranges.
    ///
    /// # Errors
    ///
    /// Returns [`EpsplitError::InvalidConfiguration`] when the episode
    /// length is zero, since no group could ever be completed.
    pub fn validate(&self) -> Result<(), EpsplitError> {
        if self.episode_length == 0 {
            return Err(EpsplitError::InvalidConfiguration(
                "episode length must be at least 1 chapter".to_string(),
            ));
        }
        Ok(())
    }
}
