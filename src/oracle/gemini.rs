//! Vertex AI Gemini oracle client.
//!
//! Implements the Oracle trait over the Vertex AI `generateContent` REST API,
//! targeting either a published base model or a deployed fine-tuned endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::OracleConfig;
use crate::error::{Result, SqlwardError};
use crate::oracle::{GenerationConfig, Oracle};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable holding the OAuth bearer token.
const ACCESS_TOKEN_ENV: &str = "SQLWARD_ACCESS_TOKEN";

/// What the client targets: a published model or a deployed endpoint.
#[derive(Debug, Clone)]
enum Target {
    /// Published base model, e.g. "gemini-2.0-flash-001".
    Model(String),
    /// Deployed fine-tuned endpoint ID.
    Endpoint(String),
}

/// Vertex AI Gemini oracle client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    project: String,
    location: String,
    target: Target,
    access_token: String,
    client: Client,
}

impl GeminiClient {
    /// Creates a client for the configured base model.
    pub fn for_model(config: &OracleConfig) -> Result<Self> {
        Self::build(config, Target::Model(config.model.clone()))
    }

    /// Creates a client for the configured fine-tuned endpoint.
    pub fn for_tuned_endpoint(config: &OracleConfig) -> Result<Self> {
        let endpoint = config
            .tuned_endpoint
            .clone()
            .ok_or_else(|| SqlwardError::config("oracle tuned_endpoint is required"))?;
        Self::build(config, Target::Endpoint(endpoint))
    }

    fn build(config: &OracleConfig, target: Target) -> Result<Self> {
        let project = config
            .project
            .clone()
            .ok_or_else(|| SqlwardError::config("oracle project is required"))?;

        let access_token = std::env::var(ACCESS_TOKEN_ENV).map_err(|_| {
            SqlwardError::oracle(format!("{ACCESS_TOKEN_ENV} environment variable not set"))
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| SqlwardError::oracle(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            project,
            location: config.location.clone(),
            target,
            access_token,
            client,
        })
    }

    /// Builds the generateContent URL for the configured target.
    fn request_url(&self) -> String {
        let base = format!(
            "https://{loc}-aiplatform.googleapis.com/v1/projects/{proj}/locations/{loc}",
            loc = self.location,
            proj = self.project,
        );
        match &self.target {
            Target::Model(model) => {
                format!("{base}/publishers/google/models/{model}:generateContent")
            }
            Target::Endpoint(endpoint) => format!("{base}/endpoints/{endpoint}:generateContent"),
        }
    }

    /// Maps an API error response to a SqlwardError.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> SqlwardError {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return SqlwardError::oracle(format!(
                "Authentication failed. Check your {ACCESS_TOKEN_ENV}."
            ));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return SqlwardError::oracle("Rate limited. Please wait and try again.");
        }

        if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(body) {
            return SqlwardError::oracle(format!(
                "Vertex AI error: {}",
                error_response.error.message
            ));
        }

        SqlwardError::oracle(format!("Vertex AI error ({status}): {body}"))
    }
}

#[async_trait]
impl Oracle for GeminiClient {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<Option<String>> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
            safety_settings: GeminiSafetySetting::permissive(),
        };

        debug!(target = ?self.target, "Vertex AI generateContent request");

        let response = self
            .client
            .post(self.request_url())
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| SqlwardError::oracle(format!("Request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SqlwardError::oracle(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| SqlwardError::oracle(format!("Failed to parse response: {e}")))?;

        // A completion may come back with no text part at all (blocked
        // candidate, empty parts). That is a non-textual completion, not an
        // error; the safety gate decides what to do with it. An empty string
        // inside a part stays textual and is rejected downstream as empty.
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .filter(|content| !content.parts.is_empty())
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .concat()
            });

        Ok(text)
    }
}

// === Wire types ===

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
    #[serde(rename = "safetySettings")]
    safety_settings: Vec<GeminiSafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl GeminiSafetySetting {
    /// Content filters are disabled for SQL generation; the safety gate on
    /// our side is the authority on what gets executed.
    fn permissive() -> Vec<Self> {
        [
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_HARASSMENT",
        ]
        .into_iter()
        .map(|category| Self {
            category,
            threshold: "BLOCK_NONE",
        })
        .collect()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
