//! Operator input for the decision pass

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::io::{BufRead, IsTerminal, Write};

/// What the operator asked for at a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// `y` / `a`
    Approve,
    /// `n` / `d`
    Decline,
    /// `s`: print the PR descriptions and ask again
    ShowComment,
    /// `q`: stop without committing anything
    Quit,
}

/// Parse one line of operator input
///
/// Case-insensitive, surrounding whitespace ignored.
pub fn parse_action(input: &str) -> Option<Action> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "a" => Some(Action::Approve),
        "n" | "d" => Some(Action::Decline),
        "s" => Some(Action::ShowComment),
        "q" => Some(Action::Quit),
        _ => None,
    }
}

/// Source of operator answers
///
/// Blocking by nature; the pass is sequential.
pub trait InputSource {
    /// Read one answer, `Ok(None)` at end of input
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads answers from the terminal
///
/// Uses an interactive prompt when stdin and stdout are terminals and plain
/// line reads from stdin otherwise, so answers can be piped in.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if !(std::io::stdin().is_terminal() && std::io::stdout().is_terminal()) {
            return LineInput::new(std::io::stdin().lock(), std::io::stdout()).next_line(prompt);
        }

        match dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => Ok(Some(line)),
            Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                Ok(None)
            }
            Err(e) => Err(Error::Input(format!("failed to read answer: {e}"))),
        }
    }
}

/// Writes the prompt and reads one line per answer from any reader
#[derive(Debug)]
pub struct LineInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LineInput<R, W> {
    /// Read answers from `reader`, echoing prompts to `writer`
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> InputSource for LineInput<R, W> {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.writer, "{prompt} ")
            .and_then(|()| self.writer.flush())
            .map_err(|e| Error::Input(format!("failed to write prompt: {e}")))?;

        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| Error::Input(format!("failed to read answer: {e}")))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

/// Replays a fixed list of answers
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    /// Answers are returned in order, then end of input
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}
