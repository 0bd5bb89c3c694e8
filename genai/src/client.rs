use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Gemini API request structure
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// A single-turn request carrying one text prompt.
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

/// Response from the Gemini API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> Result<String> {
        let candidate = match self.candidates.first() {
            Some(candidate) => candidate,
            None => {
                let reason = self
                    .prompt_feedback
                    .as_ref()
                    .and_then(|f| f.block_reason.as_deref())
                    .unwrap_or("no candidates returned");
                return Err(anyhow!("gemini returned no content: {reason}"));
            }
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|content| content.parts.iter())
            .map(|part| part.text.as_str())
            .collect();

        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("empty response");
            return Err(anyhow!("gemini returned no text: {reason}"));
        }
        Ok(text)
    }
}

/// Minimal Gemini `generateContent` client
pub struct GeminiClient {
    api_key: String,
    pub model: String,
    api_base: String,
    http: reqwest::Client,
}

impl GeminiClient {
    /// `api_base` is the versioned API root, e.g.
    /// `https://generativelanguage.googleapis.com/v1beta`.
    pub fn new(api_key: String, model: String, api_base: String) -> Self {
        Self {
            api_key,
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    /// Send one prompt and return the generated text.
    pub async fn generate_content(&self, prompt: &str) -> Result<String> {
        let body = GenerateContentRequest::from_prompt(prompt);
        let endpoint = self.endpoint();
        tracing::debug!(model = %self.model, %endpoint, prompt_chars = prompt.len(), "gemini request");

        let resp = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {endpoint} failed"))?;

        let status = resp.status();
        let text = resp.text().await.context("failed to read gemini response")?;
        tracing::debug!(%status, bytes = text.len(), "gemini response");

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
                Ok(envelope) => format!("{} {}", envelope.error.code, envelope.error.message),
                Err(_) => text,
            };
            return Err(anyhow!("gemini http {status}: {message}"));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).context("malformed gemini response")?;
        parsed.text()
    }
}
