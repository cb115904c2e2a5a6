//! Generative-oracle integration for sqlward.
//!
//! Provides the trait and implementations for the external text-generation
//! service used for SQL generation, scope classification and semantic
//! judging. The oracle is injected at the seams so every consumer can run
//! against a deterministic stub.

pub mod gemini;
pub mod mock;
pub mod prompt;

pub use gemini::GeminiClient;
pub use mock::MockOracle;
pub use prompt::{build_generation_prompt, REFUSAL_TOKEN};

use async_trait::async_trait;
use std::str::FromStr;

use crate::config::OracleConfig;
use crate::error::Result;

/// Per-call generation parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationConfig {
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token budget.
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    /// Settings for judgment calls (scope, semantic scoring): greedy and short.
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            max_output_tokens: 512,
        }
    }

    /// Settings for SQL generation, taken from the oracle configuration.
    pub fn for_generation(config: &OracleConfig) -> Self {
        Self {
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

/// Trait for oracle clients that can generate text completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async
/// operations. A call is a single attempt; retry and backoff are the
/// caller's or the remote service's concern.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Generates a completion for the given prompt.
    ///
    /// Returns `Ok(None)` when the service answered with a completion that
    /// carries no text part (blocked candidate, empty response).
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<Option<String>>;
}

/// Oracle provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OracleProvider {
    /// Vertex AI Gemini.
    #[default]
    Gemini,
    /// Mock oracle for testing (no API key required).
    Mock,
}

impl OracleProvider {
    /// Returns the provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for OracleProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown oracle provider: {s}")),
        }
    }
}

impl std::fmt::Display for OracleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
