//! Model selection over the provider's live catalog.
//!
//! The selector knows nothing about HTTP or the catalog's wire shape; it sees
//! an ordered list of [`ModelCandidate`]s and an ordered [`ModelPreference`]
//! and deterministically returns one candidate.

use std::sync::OnceLock;

use regex::Regex;

use crate::llm::client::LlmError;

// ---------------------------------------------------------------------------
// ModelCandidate
// ---------------------------------------------------------------------------

/// Coarse capability class inferred from a model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Pro,
    Flash,
    Other,
}

/// One selectable model from the provider catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    /// Identifier exactly as listed (e.g. `"models/gemini-1.5-pro"`).
    pub id: String,
    pub tier: ModelTier,
    /// Version marker such as `"1.5"` or `"2.0"`, when the id carries one.
    pub version: Option<String>,
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"gemini-(\d+(?:\.\d+)?)").expect("static regex"))
}

impl ModelCandidate {
    /// Build a candidate, tagging it from its name.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let lower = id.to_ascii_lowercase();

        let tier = if lower.contains("flash") {
            ModelTier::Flash
        } else if lower.contains("pro") {
            ModelTier::Pro
        } else {
            ModelTier::Other
        };

        let version = version_pattern()
            .captures(&lower)
            .map(|caps| caps[1].to_string());

        Self { id, tier, version }
    }
}

// ---------------------------------------------------------------------------
// ModelPreference
// ---------------------------------------------------------------------------

/// A single match rule in a [`ModelPreference`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRule {
    /// Identifier contains the given substring.
    Contains(String),
    /// Accepts the first listed candidate.
    Any,
}

impl ModelRule {
    fn matches(&self, candidate: &ModelCandidate) -> bool {
        match self {
            ModelRule::Contains(needle) => candidate.id.contains(needle.as_str()),
            ModelRule::Any => true,
        }
    }
}

/// Ordered list of rules; earlier rules win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPreference {
    rules: Vec<ModelRule>,
}

impl ModelPreference {
    pub fn new(rules: Vec<ModelRule>) -> Self {
        Self { rules }
    }

    /// Parse config patterns; `"*"` becomes [`ModelRule::Any`], blank entries
    /// are skipped.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Self {
        let rules = patterns
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(|p| match p {
                "*" => ModelRule::Any,
                other => ModelRule::Contains(other.to_string()),
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[ModelRule] {
        &self.rules
    }
}

impl Default for ModelPreference {
    fn default() -> Self {
        Self::from_patterns(&["gemini-2.0-pro", "gemini-1.5-pro", "gemini-1.5-flash", "*"])
    }
}

// ---------------------------------------------------------------------------
// ModelSelector
// ---------------------------------------------------------------------------

/// Picks one model from a catalog according to a [`ModelPreference`].
#[derive(Debug, Clone, Default)]
pub struct ModelSelector {
    preference: ModelPreference,
}

impl ModelSelector {
    pub fn new(preference: ModelPreference) -> Self {
        Self { preference }
    }

    /// Return the first candidate matching the earliest rule.  When no rule
    /// matches, the first candidate in listing order is returned, so an
    /// unfamiliar catalog still yields a model.
    ///
    /// Fails only when the catalog is empty.
    pub fn select(&self, candidates: &[ModelCandidate]) -> Result<ModelCandidate, LlmError> {
        let first = candidates.first().ok_or(LlmError::EmptyCatalog)?;

        let chosen = self
            .preference
            .rules()
            .iter()
            .find_map(|rule| candidates.iter().find(|c| rule.matches(c)))
            .unwrap_or(first);

        Ok(chosen.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
