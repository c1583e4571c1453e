use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use super::UserPort;

/// `UserPort` over a line-based reader and writer, normally stdin/stdout
pub struct TerminalPort<R, W> {
    input: R,
    output: W,
}

impl TerminalPort<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPort<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Read a line of input, trimming whitespace and newlines
    fn read_line(&mut self) -> Result<String> {
        self.output.flush()?;

        let mut input = String::new();
        let read = self
            .input
            .read_line(&mut input)
            .context("Failed to read from terminal")?;
        if read == 0 {
            bail!("Input closed");
        }

        Ok(input.trim().to_string())
    }
}

impl<R: BufRead, W: Write> UserPort for TerminalPort<R, W> {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        match default {
            Some(default) => write!(self.output, "{}\n[{}] > ", message.trim_end(), default)?,
            None => write!(self.output, "{}\n> ", message.trim_end())?,
        }

        let line = self.read_line()?;
        Ok(Some(match default {
            Some(default) if line.is_empty() => default.to_string(),
            _ => line,
        }))
    }

    fn alert(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "\n{}\n", message)?;
        Ok(())
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        write!(self.output, "{} [y/N]: ", message)?;
        let answer = self.read_line()?.to_lowercase();
        Ok(answer == "y" || answer == "yes")
    }
}
