mod app;
mod form;
mod preview;

use anyhow::{Context, Result};
use slidegen_common::{SegmentMode, SlideConfig};
use slidegen_core::segment_text;
use std::path::Path;

pub use app::FormApp;
pub use form::{Field, FormAction, FormState};
pub use preview::SlidePreview;

/// Run the interactive generation form.
pub async fn run_form(config: SlideConfig) -> Result<()> {
    let mut app = FormApp::new(config);
    app.run().await
}

/// Segment a saved text blob and page through the fragments.
pub async fn run_preview<P: AsRef<Path>>(
    file_path: P,
    mode: SegmentMode,
    max_chunk_chars: usize,
) -> Result<()> {
    let path = file_path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let fragments = segment_text(&content, mode, max_chunk_chars);
    tracing::info!(fragments = fragments.len(), %mode, "previewing {}", path.display());

    let mut preview = SlidePreview::new(fragments);
    preview.run().await
}
