//! Episode title resolution.
//!
//! A [`TitleResolver`] is asked for a title exactly once per emitted
//! episode, in emission order. The answer fills the `{title}` placeholder of
//! the output template.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, ErrorKind, Stdin, Stdout, Write};
use std::sync::{Arc, Mutex};

use crate::error::EpsplitError;

/// Supplies the title of each episode.
pub trait TitleResolver {
    /// Return the title for `episode_number`. An empty string is a valid
    /// answer.
    ///
    /// # Errors
    ///
    /// Returns [`EpsplitError::IoError`] if the title cannot be obtained.
    fn resolve(&self, episode_number: i64) -> Result<String, EpsplitError>;
}

impl<T: TitleResolver + ?Sized> TitleResolver for &T {
    fn resolve(&self, episode_number: i64) -> Result<String, EpsplitError> {
        (**self).resolve(episode_number)
    }
}

impl<T: TitleResolver + ?Sized> TitleResolver for Box<T> {
    fn resolve(&self, episode_number: i64) -> Result<String, EpsplitError> {
        (**self).resolve(episode_number)
    }
}

impl<T: TitleResolver + ?Sized> TitleResolver for Arc<T> {
    fn resolve(&self, episode_number: i64) -> Result<String, EpsplitError> {
        (**self).resolve(episode_number)
    }
}

/// Always resolves to the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTitle;

impl TitleResolver for NoTitle {
    fn resolve(&self, _episode_number: i64) -> Result<String, EpsplitError> {
        Ok(String::new())
    }
}

/// Hands out a fixed list of titles in order, then empty strings.
#[derive(Debug, Default)]
pub struct FixedTitles {
    titles: Mutex<VecDeque<String>>,
}

impl FixedTitles {
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: Mutex::new(titles.into_iter().map(Into::into).collect()),
        }
    }

    /// Titles not handed out yet.
    pub fn remaining(&self) -> usize {
        self.titles.lock().map(|titles| titles.len()).unwrap_or(0)
    }
}

impl TitleResolver for FixedTitles {
    fn resolve(&self, _episode_number: i64) -> Result<String, EpsplitError> {
        let mut titles = self
            .titles
            .lock()
            .map_err(|_| std::io::Error::other("title list lock poisoned"))?;
        Ok(titles.pop_front().unwrap_or_default())
    }
}

/// Asks the operator for each title.
///
/// Writes `Title for episode N: ` to the output stream and reads one line
/// from the input stream. The trailing line break is removed; nothing else
/// is trimmed. Reaching end of input is an error, since the run cannot
/// continue without an answer.
pub struct PromptTitle<R, W> {
    io: Mutex<(R, W)>,
}

impl PromptTitle<BufReader<Stdin>, Stdout> {
    /// Prompt on standard output and read from standard input.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptTitle<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            io: Mutex::new((input, output)),
        }
    }

    /// Give back the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        match self.io.into_inner() {
            Ok(io) => io,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<R: BufRead, W: Write> TitleResolver for PromptTitle<R, W> {
    fn resolve(&self, episode_number: i64) -> Result<String, EpsplitError> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| std::io::Error::other("prompt lock poisoned"))?;
        let (input, output) = &mut *guard;

        write!(output, "Title for episode {episode_number}: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("no title given for episode {episode_number}"),
            )
            .into());
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }
}
