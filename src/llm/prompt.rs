//! Prompt builder for the three writing-assistance tasks.
//!
//! Every prompt is a single flat string (the provider takes one text part):
//! instruction block, few-shot examples, then the quoted user text.  The
//! spell-check prompt is intentionally narrower than the grammar prompt and
//! carries two examples so the model leaves grammar alone.

use crate::task::Task;

/// JSON key the rephrase prompt asks the model to fill.
pub const REPHRASE_KEY: &str = "rephrases";

/// Number of alternatives requested from the model.
pub const REPHRASE_COUNT: usize = 3;

// ---------------------------------------------------------------------------
// Instructions
// ---------------------------------------------------------------------------

const REPHRASE_INSTRUCTION: &str = "\
You are a rewriting assistant.
Return exactly a JSON object with key \"rephrases\" holding 3 alternative rephrasings of the provided sentence.
Rules: preserve meaning; improve clarity and grammar; vary tone slightly; no extra keys or text.";

const GRAMMAR_INSTRUCTION: &str = "\
You are an English grammar correction assistant.
Fix any grammatical, spelling, or tense mistakes.
Return only the corrected sentence. Do not explain.";

const SPELL_INSTRUCTION: &str = "\
You are a spell checker.
Task: ONLY fix misspelled words. Do not change grammar, word order, tone, style, or punctuation unless a punctuation mark is itself misspelled or obviously wrong (e.g., repeated characters). Preserve original capitalization and spacing except where correcting the misspelled word requires it.

Return only the corrected text with no extra words or explanations.";

// ---------------------------------------------------------------------------
// Few-shot examples
// ---------------------------------------------------------------------------

const REPHRASE_EXAMPLE: &str = "
Example output:
{\"rephrases\": [\"Alt 1\", \"Alt 2\", \"Alt 3\"]}
";

const GRAMMAR_EXAMPLE: &str = "
Example:
Input: I ate tomorrow
Output: I will eat tomorrow.
";

const SPELL_EXAMPLES: &str = "
Examples:
Input: I am goin to shcool.
Output: I am goin to school.

Input: where are yu going
Output: where are you going
";

// ---------------------------------------------------------------------------
// PromptBuilder
// ---------------------------------------------------------------------------

/// Builds the instruction text sent to the provider for a given [`Task`].
///
/// # Example
/// ```rust
/// use writing_assistant::llm::PromptBuilder;
/// use writing_assistant::task::Task;
///
/// let prompt = PromptBuilder::build(Task::GrammarCheck, "I ate tomorrow");
/// assert!(prompt.contains("grammar correction assistant"));
/// assert!(prompt.ends_with("\"I ate tomorrow\"\n"));
/// ```
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the full prompt.  Pure; the caller has already rejected blank
    /// input.
    pub fn build(task: Task, input: &str) -> String {
        let (instruction, examples, cue) = match task {
            Task::Rephrase => (REPHRASE_INSTRUCTION, REPHRASE_EXAMPLE, "Sentence:"),
            Task::GrammarCheck => (GRAMMAR_INSTRUCTION, GRAMMAR_EXAMPLE, "Now correct this text:"),
            Task::SpellCheck => (SPELL_INSTRUCTION, SPELL_EXAMPLES, "Text to correct:"),
        };

        let mut prompt =
            String::with_capacity(instruction.len() + examples.len() + input.len() + 32);
        prompt.push_str(instruction);
        prompt.push('\n');
        prompt.push_str(examples);
        prompt.push('\n');
        prompt.push_str(cue);
        prompt.push_str(&format!("\n\"{}\"\n", input));
        prompt
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
