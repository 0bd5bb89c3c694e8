mod serve;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use slidegen_common::{PresentationRequest, SegmentMode, SlideConfig, DEFAULT_TITLE};
use slidegen_core::{Generator, StubClient};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::Level;

pub use serve::{serve, WebApp, DEFAULT_ADDR};

#[derive(Debug, Parser)]
#[command(name = "slidegen")]
#[command(about = "Generate slide decks from a title and a list of topics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Write debug-level logs
    #[arg(long, global = true)]
    pub debug: bool,

    /// Override model (e.g., gemini-1.5-flash, gemini-1.5-pro)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Read configuration from this JSON or TOML file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive terminal form (default)
    Form,
    /// Generate a deck without the form
    Generate {
        /// Presentation title
        #[arg(long, default_value = DEFAULT_TITLE)]
        title: String,
        /// Topic to cover; repeat for several topics
        #[arg(short, long = "topic", required = true)]
        topics: Vec<String>,
        /// How generated text is cut into slides
        #[arg(long, value_enum)]
        mode: Option<SegmentMode>,
        /// Maximum characters per fixed-length fragment
        #[arg(long)]
        max_chars: Option<usize>,
        /// Directory the deck is written to
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Build the deck from previously generated text instead of calling the API
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Serve the form as a local web page
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_ADDR)]
        addr: String,
        /// Open the form in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Write the current settings (minus the API key) to a config file
    InitConfig {
        /// Target file; defaults to the user config location
        path: Option<PathBuf>,
    },
    /// Segment a saved text file and page through the fragments
    Preview {
        #[arg(long, value_enum)]
        mode: Option<SegmentMode>,
        #[arg(long)]
        max_chars: Option<usize>,
        /// Path to generated text
        file: PathBuf,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    // Variables from a `.env` file fill in whatever the environment leaves unset.
    let dotenv = dotenvy::dotenv();
    let config = load_config(&cli).await?;
    init_logging(&config, cli.debug);
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => eprintln!("Warning: ignoring .env file: {err}"),
    }

    match cli.command {
        Some(Commands::Form) | None => {
            slidegen_tui::run_form(config).await?;
        }
        Some(Commands::Generate {
            title,
            topics,
            mode,
            max_chars,
            output_dir,
            content_file,
        }) => {
            let mut config = config;
            if let Some(mode) = mode {
                config.segment_mode = mode;
            }
            if let Some(max_chars) = max_chars {
                config.max_chunk_chars = max_chars;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            let request = request_from_args(&title, &topics);
            generate_deck(&config, &request, content_file.as_deref()).await?;
        }
        Some(Commands::Serve { addr, open }) => {
            serve(config, &addr, open).await?;
        }
        Some(Commands::InitConfig { path }) => {
            let saved = write_config(config, path.as_deref()).await?;
            println!("Wrote {}", saved.display());
        }
        Some(Commands::Preview {
            mode,
            max_chars,
            file,
        }) => {
            let mode = mode.unwrap_or(config.segment_mode);
            let max_chars = max_chars.unwrap_or(config.max_chunk_chars);
            slidegen_tui::run_preview(&file, mode, max_chars).await?;
        }
    }

    Ok(())
}

/// Config file (explicit or default location), then environment, then flags.
async fn load_config(cli: &Cli) -> Result<SlideConfig> {
    let mut config = match &cli.config {
        Some(path) => SlideConfig::load_from_file(path)
            .await
            .with_context(|| format!("failed to load config from {}", path.display()))?
            .with_env_overrides(),
        None => SlideConfig::load().await.unwrap_or_else(|err| {
            eprintln!("Warning: ignoring config file: {err}");
            SlideConfig::default().with_env_overrides()
        }),
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    Ok(config)
}

/// Route `tracing` output to the log file; the terminal belongs to the UI.
fn init_logging(config: &SlideConfig, debug: bool) {
    let path = config.log_path();
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("Warning: cannot open log file {}: {err}", path.display());
            return;
        }
    };

    let level = if debug { Level::DEBUG } else { Level::INFO };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    if installed.is_ok() {
        tracing::debug!(log = %path.display(), "logging initialised");
    }
}

/// The key usually comes from the environment; it is never written out.
async fn write_config(mut config: SlideConfig, path: Option<&Path>) -> Result<PathBuf> {
    config.api_key = None;
    let path = match path {
        Some(path) => {
            config.save_to_file(path).await?;
            path.to_path_buf()
        }
        None => config.save().await?,
    };
    tracing::info!(path = %path.display(), "config written");
    Ok(path)
}

fn request_from_args(title: &str, topics: &[String]) -> PresentationRequest {
    PresentationRequest::from_form(title, &topics.join("\n"))
}

async fn generate_deck(
    config: &SlideConfig,
    request: &PresentationRequest,
    content_file: Option<&Path>,
) -> Result<()> {
    let generator = match content_file {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            Generator::with_client(Arc::new(StubClient::new(text)))
                .with_mode(config.segment_mode)
                .with_max_chunk_chars(config.max_chunk_chars)
        }
        None => Generator::from_config(config),
    };

    let deck = generator
        .generate(request)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    let path = deck
        .save_to_dir(&config.output_dir)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;

    println!(
        "Saved {} ({} slides, {} fragments)",
        path.display(),
        deck.slide_count(),
        deck.fragments.len()
    );
    Ok(())
}
