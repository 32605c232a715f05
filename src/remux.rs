//! Lossless extraction of a time range (remuxing).
//!
//! [`EpisodeExtractor`] is the boundary through which episodes are written.
//! [`FfmpegRemuxer`] implements it with a stream copy, equivalent to
//!
//! ```text
//! ffmpeg -ss <start> -to <end> -i <source> -map 0 -codec copy -max_interleave_delta 0 <output>
//! ```
//!
//! so every stream of the source is kept and nothing is re-encoded.
//!
//! # Example
//!
//! ```no_run
//! use epsplit::{EpisodeExtractor, FfmpegRemuxer, Timestamp};
//!
//! FfmpegRemuxer::new().extract(
//!     "input.mkv".as_ref(),
//!     &Timestamp::from_seconds(0.0),
//!     &Timestamp::from_seconds(1320.0),
//!     "01.mkv".as_ref(),
//! )?;
//! # Ok::<(), epsplit::EpsplitError>(())
//! ```

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::EpsplitError;
use crate::metadata::Timestamp;

/// Something that can copy a time range of a media file into a new file.
pub trait EpisodeExtractor {
    /// Copy `[start, end]` of `source` into `output`.
    ///
    /// # Errors
    ///
    /// Implementations return [`EpsplitError::Extract`] on failure. A
    /// partially written output is not removed.
    fn extract(
        &self,
        source: &Path,
        start: &Timestamp,
        end: &Timestamp,
        output: &Path,
    ) -> Result<(), EpsplitError>;
}

impl<E: EpisodeExtractor + ?Sized> EpisodeExtractor for &E {
    fn extract(
        &self,
        source: &Path,
        start: &Timestamp,
        end: &Timestamp,
        output: &Path,
    ) -> Result<(), EpsplitError> {
        (**self).extract(source, start, end, output)
    }
}

impl<E: EpisodeExtractor + ?Sized> EpisodeExtractor for Box<E> {
    fn extract(
        &self,
        source: &Path,
        start: &Timestamp,
        end: &Timestamp,
        output: &Path,
    ) -> Result<(), EpsplitError> {
        (**self).extract(source, start, end, output)
    }
}

/// Stream-copy extractor backed by the `ffmpeg` executable.
///
/// By default an existing output file is overwritten (`-y`). With
/// [`no_overwrite`](FfmpegRemuxer::no_overwrite) ffmpeg is told to refuse
/// instead (`-n`), which surfaces as an extraction error.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    program: OsString,
    overwrite: bool,
}

impl Default for FfmpegRemuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegRemuxer {
    /// Use `ffmpeg` from `PATH`, overwriting existing outputs.
    pub fn new() -> Self {
        Self {
            program: OsString::from("ffmpeg"),
            overwrite: true,
        }
    }

    /// Use a specific ffmpeg executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Fail instead of overwriting an existing output file.
    #[must_use]
    pub fn no_overwrite(mut self) -> Self {
        self.overwrite = false;
        self
    }

    /// Build the ffmpeg invocation for one episode.
    pub fn command(
        &self,
        source: &Path,
        start: &Timestamp,
        end: &Timestamp,
        output: &Path,
    ) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg(if self.overwrite { "-y" } else { "-n" })
            .args(["-ss", start.as_str(), "-to", end.as_str()])
            .arg("-i")
            .arg(source)
            .args(["-map", "0", "-codec", "copy", "-max_interleave_delta", "0"])
            .arg(output)
            .stdin(Stdio::null());
        command
    }
}

impl EpisodeExtractor for FfmpegRemuxer {
    fn extract(
        &self,
        source: &Path,
        start: &Timestamp,
        end: &Timestamp,
        output: &Path,
    ) -> Result<(), EpsplitError> {
        log::debug!(
            "Extracting {} [{} -> {}] to {}",
            source.display(),
            start,
            end,
            output.display()
        );

        let extract_error = |reason: String| EpsplitError::Extract {
            path: output.to_path_buf(),
            reason,
        };

        let status = self
            .command(source, start, end, output)
            .status()
            .map_err(|e| {
                extract_error(format!(
                    "could not run {}: {e}",
                    Path::new(&self.program).display()
                ))
            })?;

        if !status.success() {
            return Err(extract_error(format!(
                "{} exited with {status}",
                Path::new(&self.program).display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arguments(command: &Command) -> Vec<String> {
        command
            .get_args()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn command_copies_every_stream() {
        let command = FfmpegRemuxer::new().command(
            Path::new("in.mkv"),
            &"0.000000".parse().unwrap(),
            &"1320.500000".parse().unwrap(),
            Path::new("01.mkv"),
        );
        assert_eq!(command.get_program(), "ffmpeg");
        assert_eq!(
            arguments(&command),
            [
                "-y",
                "-ss",
                "0.000000",
                "-to",
                "1320.500000",
                "-i",
                "in.mkv",
                "-map",
                "0",
                "-codec",
                "copy",
                "-max_interleave_delta",
                "0",
                "01.mkv",
            ]
        );
    }

    #[test]
    fn no_overwrite_passes_refuse_flag() {
        let command = FfmpegRemuxer::new().no_overwrite().command(
            Path::new("in.mkv"),
            &Timestamp::from_seconds(0.0),
            &Timestamp::from_seconds(1.0),
            Path::new("out.mkv"),
        );
        assert_eq!(arguments(&command)[0], "-n");
    }

    #[test]
    fn custom_program() {
        let command = FfmpegRemuxer::new().with_program("/opt/ffmpeg/bin/ffmpeg").command(
            Path::new("in.mkv"),
            &Timestamp::from_seconds(0.0),
            &Timestamp::from_seconds(1.0),
            Path::new("out.mkv"),
        );
        assert_eq!(command.get_program(), "/opt/ffmpeg/bin/ffmpeg");
    }
}
