//! Turns the provider's free-form reply into a strict [`CorrectionResult`].
//!
//! Text extraction is the only step that can fail.  After that, grammar and
//! spell results are the trimmed text (or a fixed message when blank) and
//! rephrase results go through an ordered chain of [`RephraseStrategy`]s.
//! The first strategy that yields at least one item wins; if none do, the
//! result is an empty list, which is still a success.

use std::sync::OnceLock;

use regex::Regex;

use crate::llm::client::{LlmError, RawProviderResponse};
use crate::llm::prompt::{REPHRASE_COUNT, REPHRASE_KEY};
use crate::task::{CorrectionResult, Task};

/// Returned as the corrected text when the model answered with nothing.
pub const FALLBACK_CORRECTION: &str = "Could not generate correction.";

const TEXT_POINTER: &str = "/candidates/0/content/parts/0/text";

// ---------------------------------------------------------------------------
// Rephrase strategies
// ---------------------------------------------------------------------------

/// One way of reading alternatives out of raw model text.
///
/// Returns `None` when the strategy finds no usable item, letting the next
/// strategy try.
pub trait RephraseStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn parse(&self, raw: &str) -> Option<Vec<String>>;
}

/// Slices from the first `{` to the last `}` and reads a string array under
/// `key`.  Tolerates prose or markdown fences around the object.
pub struct JsonObjectStrategy {
    key: &'static str,
}

impl JsonObjectStrategy {
    pub fn new(key: &'static str) -> Self {
        Self { key }
    }
}

impl RephraseStrategy for JsonObjectStrategy {
    fn name(&self) -> &'static str {
        "json-object"
    }

    fn parse(&self, raw: &str) -> Option<Vec<String>> {
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        if end < start {
            return None;
        }

        let value: serde_json::Value = serde_json::from_str(&raw[start..=end]).ok()?;
        let items: Vec<String> = value
            .get(self.key)?
            .as_array()?
            .iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                serde_json::Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect();

        (!items.is_empty()).then_some(items)
    }
}

fn enumeration_marker() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*\d+\.?[)\]:-]?\s*").expect("static regex"))
}

/// Treats each non-blank line as an alternative, stripping a leading
/// `1.` / `2)` style marker, and keeps at most `limit` lines.
pub struct EnumeratedLinesStrategy {
    limit: usize,
}

impl EnumeratedLinesStrategy {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl RephraseStrategy for EnumeratedLinesStrategy {
    fn name(&self) -> &'static str {
        "enumerated-lines"
    }

    fn parse(&self, raw: &str) -> Option<Vec<String>> {
        let marker = enumeration_marker();
        let items: Vec<String> = raw
            .split('\n')
            .map(|line| marker.replace(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .take(self.limit)
            .collect();

        (!items.is_empty()).then_some(items)
    }
}

// ---------------------------------------------------------------------------
// ResponseNormalizer
// ---------------------------------------------------------------------------

/// Stateless; one instance can serve every request.
pub struct ResponseNormalizer {
    strategies: Vec<Box<dyn RephraseStrategy>>,
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseNormalizer {
    /// JSON object first, then enumerated lines capped at three.
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(JsonObjectStrategy::new(REPHRASE_KEY)),
            Box::new(EnumeratedLinesStrategy::new(REPHRASE_COUNT)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn RephraseStrategy>>) -> Self {
        Self { strategies }
    }

    /// Text of the first part of the first candidate.
    pub fn extract_text(raw: &RawProviderResponse) -> Result<String, LlmError> {
        raw.json()
            .pointer(TEXT_POINTER)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                LlmError::Malformed("missing candidates[0].content.parts[0].text".into())
            })
    }

    /// Grammar / spell output: trimmed text, or [`FALLBACK_CORRECTION`].
    pub fn corrected_text(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            log::warn!("provider returned blank correction; using fallback message");
            FALLBACK_CORRECTION.to_string()
        } else {
            trimmed.to_string()
        }
    }

    /// Rephrase output: first non-empty strategy result, else empty.
    pub fn rephrasings(&self, text: &str) -> Vec<String> {
        for strategy in &self.strategies {
            if let Some(items) = strategy.parse(text) {
                log::debug!("rephrase parsed by {} ({} items)", strategy.name(), items.len());
                return items;
            }
        }
        log::warn!("no rephrase strategy produced alternatives");
        Vec::new()
    }

    /// Extract and shape the reply for `task`.
    pub fn normalize(
        &self,
        task: Task,
        raw: &RawProviderResponse,
    ) -> Result<CorrectionResult, LlmError> {
        let text = Self::extract_text(raw)?;
        Ok(match task {
            Task::Rephrase => CorrectionResult::Rephrased {
                alternatives: self.rephrasings(&text),
            },
            Task::GrammarCheck | Task::SpellCheck => CorrectionResult::Corrected {
                corrected_text: self.corrected_text(&text),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rephrase(raw: &str) -> Vec<String> {
        ResponseNormalizer::new().rephrasings(raw)
    }

    // -----------------------------------------------------------------------
    // extract_text
    // -----------------------------------------------------------------------

    #[test]
    fn extracts_first_candidate_text() {
        let raw = RawProviderResponse(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "first" }, { "text": "second" } ] } },
                { "content": { "parts": [ { "text": "other" } ] } }
            ]
        }));
        assert_eq!(ResponseNormalizer::extract_text(&raw).unwrap(), "first");
    }

    #[test]
    fn missing_path_is_malformed() {
        for value in [
            serde_json::json!({}),
            serde_json::json!({ "candidates": [] }),
            serde_json::json!({ "candidates": [ { "content": { "parts": [] } } ] }),
            serde_json::json!({ "candidates": [ { "content": { "parts": [ { "text": 7 } ] } } ] }),
        ] {
            let err = ResponseNormalizer::extract_text(&RawProviderResponse(value)).unwrap_err();
            assert!(matches!(err, LlmError::Malformed(_)));
        }
    }

    #[test]
    fn extract_text_is_idempotent() {
        let raw = RawProviderResponse::from_text("  same  ");
        let first = ResponseNormalizer::extract_text(&raw).unwrap();
        let second = ResponseNormalizer::extract_text(&raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(raw, RawProviderResponse::from_text("  same  "));
    }

    // -----------------------------------------------------------------------
    // Grammar / spell
    // -----------------------------------------------------------------------

    #[test]
    fn corrected_text_is_trimmed() {
        let n = ResponseNormalizer::new();
        let result = n
            .normalize(Task::SpellCheck, &RawProviderResponse::from_text("\n I am goin to school.\n"))
            .unwrap();
        assert_eq!(
            result,
            CorrectionResult::Corrected {
                corrected_text: "I am goin to school.".into()
            }
        );
    }

    #[test]
    fn blank_correction_uses_fallback_message() {
        let n = ResponseNormalizer::new();
        let result = n
            .normalize(Task::GrammarCheck, &RawProviderResponse::from_text("   "))
            .unwrap();
        assert_eq!(
            result,
            CorrectionResult::Corrected {
                corrected_text: FALLBACK_CORRECTION.into()
            }
        );
    }

    // -----------------------------------------------------------------------
    // Rephrase
    // -----------------------------------------------------------------------

    #[test]
    fn strict_json_is_read() {
        assert_eq!(
            rephrase(r#"{"rephrases": ["A.", "B.", "C."]}"#),
            vec!["A.", "B.", "C."]
        );
    }

    #[test]
    fn fenced_json_with_blank_items() {
        let raw = "Sure! Here you go:\n```json\n{\"rephrases\": [\" A \", \"\", \"B\"]}\n```";
        assert_eq!(rephrase(raw), vec!["A", "B"]);
    }

    #[test]
    fn enumerated_lines_fallback() {
        assert_eq!(
            rephrase("1. First option\n2. Second option"),
            vec!["First option", "Second option"]
        );
    }

    #[test]
    fn line_fallback_strips_markers_and_caps_at_three() {
        let raw = "1) one\n\n\n2: two\n3 three\n4. four";
        assert_eq!(rephrase(raw), vec!["one", "two", "three"]);
    }

    #[test]
    fn malformed_json_falls_through_to_lines() {
        let raw = "{\"rephrases\": [\"A\", }\nPlain alternative";
        assert_eq!(rephrase(raw), vec!["{\"rephrases\": [\"A\", }", "Plain alternative"]);
    }

    #[test]
    fn wrong_key_falls_through_to_lines() {
        assert_eq!(rephrase(r#"{"options": ["x"]}"#), vec![r#"{"options": ["x"]}"#]);
    }

    #[test]
    fn empty_text_gives_empty_success() {
        let n = ResponseNormalizer::new();
        let result = n
            .normalize(Task::Rephrase, &RawProviderResponse::from_text(""))
            .unwrap();
        assert_eq!(
            result,
            CorrectionResult::Rephrased {
                alternatives: vec![]
            }
        );
    }

    #[test]
    fn custom_strategy_chain_is_respected() {
        let n = ResponseNormalizer::with_strategies(vec![Box::new(EnumeratedLinesStrategy::new(1))]);
        assert_eq!(n.rephrasings(r#"{"rephrases": ["A", "B"]}"#).len(), 1);
    }
}
