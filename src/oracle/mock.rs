//! Mock oracle for testing.
//!
//! Provides deterministic responses based on prompt patterns, plus failure
//! modes for exercising the fail-open and fail-closed policies.

use async_trait::async_trait;

use crate::error::{Result, SqlwardError};
use crate::oracle::{GenerationConfig, Oracle};

/// How the mock behaves when asked to generate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum MockMode {
    /// Answer from the pattern table.
    #[default]
    Respond,
    /// Fail every call with a transport error.
    Fail,
    /// Return a completion with no text part.
    NonTextual,
}

/// Mock oracle that returns canned responses based on prompt patterns.
///
/// Used for unit testing without making real API calls.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    mode: MockMode,
}

impl MockOracle {
    /// Creates a new mock oracle with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock oracle that fails every call.
    pub fn failing() -> Self {
        Self {
            custom_responses: Vec::new(),
            mode: MockMode::Fail,
        }
    }

    /// Creates a mock oracle that returns completions without a text part.
    pub fn non_textual() -> Self {
        Self {
            custom_responses: Vec::new(),
            mode: MockMode::NonTextual,
        }
    }

    /// Adds a custom response mapping.
    ///
    /// When the prompt contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Generates a mock response based on the prompt.
    ///
    /// Question heuristics match against the final question line only: the
    /// real prompt templates carry few-shot examples that would otherwise
    /// trigger on every call.
    fn mock_response(&self, prompt: &str) -> String {
        let prompt_lower = prompt.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        let question = match prompt_lower.rfind("question") {
            Some(idx) => &prompt_lower[idx..],
            None => prompt_lower.as_str(),
        };

        // Scope-classification prompts
        if prompt_lower.contains("in_scope") && prompt_lower.contains("out_of_scope") {
            let out_of_scope_markers = ["capitale", "coupe du monde", "galaxie", "meaning of life"];
            if out_of_scope_markers.iter().any(|m| question.contains(m)) {
                return "out_of_scope".to_string();
            }
            return "in_scope".to_string();
        }

        // Semantic-judge prompts
        if prompt_lower.contains("single digit") {
            return "2".to_string();
        }

        // Generation prompts
        if question.contains("chiffre d'affaires") || question.contains("revenue") {
            return "SELECT SUM(montant) AS total FROM tickets".to_string();
        }

        if question.contains("combien") || question.contains("how many") {
            return "SELECT COUNT(*) AS total FROM ventes WHERE solde = TRUE".to_string();
        }

        "SELECT * FROM tickets LIMIT 10".to_string()
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn generate(&self, prompt: &str, _config: &GenerationConfig) -> Result<Option<String>> {
        match self.mode {
            MockMode::Fail => Err(SqlwardError::oracle("simulated transport failure")),
            MockMode::NonTextual => Ok(None),
            MockMode::Respond => Ok(Some(self.mock_response(prompt))),
        }
    }
}
