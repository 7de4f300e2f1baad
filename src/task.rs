//! Request-scoped value types shared by the prompt builder, the pipeline and
//! the HTTP boundary.

use std::fmt;

/// The three writing-assistance operations the editor can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Produce alternative phrasings of a sentence.
    Rephrase,
    /// Fix grammar, spelling and tense.
    GrammarCheck,
    /// Fix misspelled words only.
    SpellCheck,
}

impl Task {
    /// Grammar and spell checks pick a model from the live catalog;
    /// rephrasing uses a pinned model.
    pub fn requires_model_selection(self) -> bool {
        matches!(self, Task::GrammarCheck | Task::SpellCheck)
    }

    pub fn label(self) -> &'static str {
        match self {
            Task::Rephrase => "rephrase",
            Task::GrammarCheck => "grammar-check",
            Task::SpellCheck => "spell-check",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One unit of work handed to [`RequestPipeline`](crate::pipeline::RequestPipeline).
///
/// `input_text` is taken as-is; the pipeline rejects it when it is blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionRequest {
    pub task: Task,
    pub input_text: String,
}

impl CorrectionRequest {
    pub fn new(task: Task, input_text: impl Into<String>) -> Self {
        Self {
            task,
            input_text: input_text.into(),
        }
    }
}

/// Structured outcome of a successful request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionResult {
    /// Grammar / spell check output.
    Corrected { corrected_text: String },
    /// Rephrase output; usually three items but may be empty.
    Rephrased { alternatives: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_checks_select_a_model() {
        assert!(!Task::Rephrase.requires_model_selection());
        assert!(Task::GrammarCheck.requires_model_selection());
        assert!(Task::SpellCheck.requires_model_selection());
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Task::SpellCheck.to_string(), "spell-check");
    }
}
