use crate::client::{GeminiAdapter, ModelClient};
use crate::error::{Result, SlideError};
use slidegen_common::{PresentationRequest, SlideConfig};
use std::fmt;
use std::sync::Arc;

pub const MISSING_API_KEY_TEXT: &str = "Error: Missing API key.";
pub const GENERATION_FAILED_TEXT: &str = "Error generating content.";

/// Text returned by the content requester. Failures are reported in-band as
/// a string starting with "Error".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedText(String);

impl GeneratedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn is_error(&self) -> bool {
        self.0.starts_with("Error")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split the in-band error channel into a `Result`.
    pub fn into_result(self) -> Result<String> {
        if self.is_error() {
            Err(SlideError::Generation(self.0))
        } else {
            Ok(self.0)
        }
    }
}

impl fmt::Display for GeneratedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The one prompt sent for a request.
pub fn build_prompt(request: &PresentationRequest) -> String {
    format!(
        "Generate ppt for the topic: {} under title {}",
        request.topics.join(", "),
        request.title
    )
}

/// Sends one prompt per request to the configured model.
#[derive(Clone)]
pub struct ContentRequester {
    client: Option<Arc<dyn ModelClient>>,
}

impl ContentRequester {
    /// `None` stands for "no credential configured".
    pub fn new(client: Option<Arc<dyn ModelClient>>) -> Self {
        Self { client }
    }

    pub fn with_client(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn from_config(config: &SlideConfig) -> Self {
        let client = GeminiAdapter::from_config(config)
            .map(|adapter| Arc::new(adapter) as Arc<dyn ModelClient>);
        if client.is_none() {
            tracing::warn!("no Gemini API key configured; generation will fail");
        }
        Self { client }
    }

    /// Typed variant of [`ContentRequester::request`].
    pub async fn try_request(&self, request: &PresentationRequest) -> Result<String> {
        let client = self.client.as_ref().ok_or(SlideError::MissingApiKey)?;
        let prompt = build_prompt(request);
        tracing::info!(title = %request.title, topics = request.topics.len(), "requesting content");
        let text = client.generate(&prompt).await?;
        tracing::info!(chars = text.chars().count(), "content received");
        Ok(text)
    }

    /// Request content, reporting failures as an "Error..." string.
    pub async fn request(&self, request: &PresentationRequest) -> GeneratedText {
        match self.try_request(request).await {
            Ok(text) => GeneratedText(text),
            Err(SlideError::MissingApiKey) => {
                tracing::error!("Gemini API key not found");
                GeneratedText::new(MISSING_API_KEY_TEXT)
            }
            Err(err) => {
                tracing::error!("content generation failed: {err:#}");
                GeneratedText::new(GENERATION_FAILED_TEXT)
            }
        }
    }
}
