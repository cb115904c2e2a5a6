//! Semantic similarity judging for evaluation.
//!
//! Scores how close a predicted query is to the reference query for a given
//! question, via a single oracle call. The judge fails CLOSED: any oracle
//! error or unparseable response scores 0.0, so a flaky oracle deflates
//! reported quality instead of inflating it — the opposite policy from the
//! scope classifier.

use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use crate::oracle::{GenerationConfig, Oracle};

/// Maximum score the judge can award.
pub const MAX_SCORE: f64 = 2.0;

/// Prompt template for the similarity judgment.
const JUDGE_PROMPT_TEMPLATE: &str = r#"Evaluate the semantic similarity between these two SQL queries for the given question.
Reply with a single digit: 0 (wrong), 1 (acceptable) or 2 (excellent).

Question: {question}
Expected SQL: {expected}
Predicted SQL: {predicted}"#;

/// Scores similarity between an expected and a predicted query.
pub struct SemanticJudge {
    oracle: Arc<dyn Oracle>,
    digit_pattern: Regex,
}

impl SemanticJudge {
    /// Creates a judge over the given oracle.
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        // Static pattern, cannot fail to compile.
        let digit_pattern = Regex::new(r"\b([0-2])\b").expect("digit pattern is static and valid");
        Self {
            oracle,
            digit_pattern,
        }
    }

    /// Scores the predicted query against the reference, in [0.0, 2.0].
    pub async fn score(&self, question: &str, reference_sql: &str, predicted_sql: &str) -> f64 {
        let prompt = JUDGE_PROMPT_TEMPLATE
            .replace("{question}", question)
            .replace("{expected}", reference_sql)
            .replace("{predicted}", predicted_sql);

        let response = self
            .oracle
            .generate(&prompt, &GenerationConfig::deterministic())
            .await;

        let text = match response {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn!("judge oracle returned a non-textual completion, scoring 0.0");
                return 0.0;
            }
            Err(e) => {
                warn!(error = %e, "judge oracle call failed, scoring 0.0");
                return 0.0;
            }
        };

        let score = self
            .digit_pattern
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0);

        score.clamp(0.0, MAX_SCORE)
    }
}
