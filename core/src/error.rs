use slidegen_common::ConfigError;
use thiserror::Error;

pub const NO_TOPICS_MESSAGE: &str = "Please enter at least one topic.";

/// Core error types for the generation pipeline
#[derive(Error, Debug)]
pub enum SlideError {
    /// The request carried no topics
    #[error("{}", NO_TOPICS_MESSAGE)]
    NoTopics,

    /// No credential is configured for the model service
    #[error("Missing API key: set GOOGLE_API_KEY")]
    MissingApiKey,

    /// The model call failed or the generated text is an "Error..." sentinel
    #[error("{0}")]
    Generation(String),

    /// Writing the presentation package failed
    #[error("Presentation error: {0}")]
    Package(#[from] slidegen_pptx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl SlideError {
    /// Format error for user display
    pub fn user_message(&self) -> String {
        match self {
            SlideError::NoTopics => NO_TOPICS_MESSAGE.to_string(),
            SlideError::MissingApiKey => {
                "Gemini API key not found. Set GOOGLE_API_KEY in the environment or a .env file, or add api_key to the config file."
                    .to_string()
            }
            SlideError::Generation(message) => message.clone(),
            SlideError::Package(err) => format!("Could not build the presentation: {err}"),
            SlideError::Config(err) => format!("Configuration problem: {err}"),
            SlideError::Io(err) => format!("File operation failed: {err}"),
            SlideError::Generic(err) => format!("Unexpected error: {err}"),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SlideError>;
