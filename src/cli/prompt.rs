use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{Result, RewardsError};

/// Source of answers for the interactive session.
///
/// `Ok(None)` means the user closed the input (Ctrl-D / Ctrl-C).
pub trait Prompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>>;

    /// Ask a y/n question; only `y` and `yes` (any case) count as yes.
    fn confirm(&mut self, question: &str) -> Result<Option<bool>> {
        Ok(self.ask(question)?.map(|answer| is_yes(&answer)))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Terminal prompter backed by rustyline.
pub struct LinePrompter {
    editor: DefaultEditor,
}

impl LinePrompter {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_error)?;
        Ok(Self { editor })
    }
}

impl Prompter for LinePrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        match self.editor.readline(question) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(readline_error(e)),
        }
    }
}

fn readline_error(e: ReadlineError) -> RewardsError {
    match e {
        ReadlineError::Io(io) => RewardsError::Io(io),
        other => RewardsError::Io(std::io::Error::other(other.to_string())),
    }
}

/// Replays canned answers; used by tests.
#[cfg(test)]
pub(crate) struct ScriptedPrompter {
    answers: std::collections::VecDeque<String>,
    pub(crate) questions: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub(crate) fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|s| s.to_string()).collect(),
            questions: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.questions.push(question.to_string());
        Ok(self.answers.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn test_confirm_end_of_input() {
        let mut prompter = ScriptedPrompter::new(&["Y"]);
        assert_eq!(prompter.confirm("ok? ").unwrap(), Some(true));
        assert_eq!(prompter.confirm("again? ").unwrap(), None);
    }
}
