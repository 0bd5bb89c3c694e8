use anyhow::Result;
use async_trait::async_trait;
use slidegen_common::SlideConfig;

/// A text-generation backend: one prompt in, one text blob out.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Returns a fixed text for every prompt. Used for offline assembly from a
/// saved text file and in tests.
pub struct StubClient {
    text: String,
}

impl StubClient {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ModelClient for StubClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Adapter to wrap GeminiClient into ModelClient
pub struct GeminiAdapter {
    inner: slidegen_genai::GeminiClient,
}

impl GeminiAdapter {
    /// Build from config; `None` when no API key is configured.
    pub fn from_config(config: &SlideConfig) -> Option<Self> {
        if !config.has_api_key() {
            return None;
        }
        let api_key = config.api_key.clone()?;
        Some(Self {
            inner: slidegen_genai::GeminiClient::new(
                api_key,
                config.model.clone(),
                config.api_base.clone(),
            ),
        })
    }

    pub fn model(&self) -> &str {
        &self.inner.model
    }
}

#[async_trait]
impl ModelClient for GeminiAdapter {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.inner.generate_content(prompt).await
    }
}
