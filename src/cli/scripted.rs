use anyhow::{anyhow, Result};
use std::collections::VecDeque;

use super::UserPort;

/// A `UserPort` that replays canned answers and records what it was shown.
///
/// Answers are consumed in order by `prompt`; confirmations are consumed by
/// `confirm`. Running out of either is reported as a closed input stream.
#[derive(Debug, Default)]
pub struct ScriptedPort {
    answers: VecDeque<Option<String>>,
    confirmations: VecDeque<bool>,
    pub prompts: Vec<String>,
    pub defaults: Vec<String>,
    pub alerts: Vec<String>,
    pub questions: Vec<String>,
}

impl ScriptedPort {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_answers(answers)
    }

    pub fn with_answers<I, S>(mut self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.answers
            .extend(answers.into_iter().map(|answer| Some(answer.into())));
        self
    }

    /// Queue a cancelled prompt
    pub fn with_cancel(mut self) -> Self {
        self.answers.push_back(None);
        self
    }

    pub fn with_confirmations<I>(mut self, confirmations: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        self.confirmations.extend(confirmations);
        self
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl UserPort for ScriptedPort {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Result<Option<String>> {
        self.prompts.push(message.to_string());
        if let Some(default) = default {
            self.defaults.push(default.to_string());
        }

        let answer = self
            .answers
            .pop_front()
            .ok_or_else(|| anyhow!("Input closed: no scripted answer for {:?}", message))?;

        Ok(match (answer, default) {
            (Some(text), Some(default)) if text.is_empty() => Some(default.to_string()),
            (answer, _) => answer,
        })
    }

    fn alert(&mut self, message: &str) -> Result<()> {
        self.alerts.push(message.to_string());
        Ok(())
    }

    fn confirm(&mut self, message: &str) -> Result<bool> {
        self.questions.push(message.to_string());
        self.confirmations
            .pop_front()
            .ok_or_else(|| anyhow!("Input closed: no scripted confirmation for {:?}", message))
    }
}
