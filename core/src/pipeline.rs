//! Request → segment → assemble, with optional progress reporting.
use crate::assemble::DeckAssembler;
use crate::client::ModelClient;
use crate::error::{Result, SlideError};
use crate::requester::ContentRequester;
use crate::segment::{remove_marker_formatting, split_content, split_into_slides};
use slidegen_common::{
    deck_file_name, download_file_name, ensure_output_dir, save_deck, PresentationRequest,
    SegmentMode, SlideConfig, DEFAULT_MAX_CHUNK_CHARS,
};
use slidegen_pptx::Presentation;
use slidegen_protocol::Event;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Cut generated text into fragments the way `mode` prescribes.
pub fn segment_text(text: &str, mode: SegmentMode, max_chunk_chars: usize) -> Vec<String> {
    match mode {
        SegmentMode::FixedLength => split_content(text, max_chunk_chars),
        SegmentMode::Markers => remove_marker_formatting(&split_into_slides(text)),
    }
}

/// The outcome of one generation cycle.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    pub id: Uuid,
    pub request: PresentationRequest,
    pub mode: SegmentMode,
    pub raw_text: String,
    pub fragments: Vec<String>,
    pub presentation: Presentation,
}

impl GeneratedDeck {
    /// Fixed-length decks are named after the title, marker decks carry a
    /// `_presentation` suffix.
    pub fn file_name(&self) -> String {
        match self.mode {
            SegmentMode::FixedLength => deck_file_name(&self.request.title),
            SegmentMode::Markers => download_file_name(&self.request.title),
        }
    }

    pub fn slide_count(&self) -> usize {
        self.presentation.slide_count()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.presentation.to_bytes()?)
    }

    /// Write the deck into `dir`, replacing a file of the same name.
    pub async fn save_to_dir<P: AsRef<Path>>(&self, dir: P) -> Result<PathBuf> {
        let dir = dir.as_ref();
        let file_name = self.file_name();
        let path = match self.mode {
            SegmentMode::FixedLength => {
                ensure_output_dir(dir).await?;
                let path = dir.join(&file_name);
                self.presentation.save(&path)?;
                path
            }
            SegmentMode::Markers => save_deck(dir, &file_name, &self.to_bytes()?).await?,
        };
        tracing::info!(path = %path.display(), "deck saved");
        Ok(path)
    }
}

/// Runs one generation cycle per call. Holds no per-request state.
#[derive(Clone)]
pub struct Generator {
    requester: ContentRequester,
    mode: SegmentMode,
    max_chunk_chars: usize,
    assembler: DeckAssembler,
}

impl Generator {
    pub fn new(requester: ContentRequester) -> Self {
        Self {
            requester,
            mode: SegmentMode::default(),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            assembler: DeckAssembler::default(),
        }
    }

    pub fn with_client(client: Arc<dyn ModelClient>) -> Self {
        Self::new(ContentRequester::with_client(client))
    }

    pub fn from_config(config: &SlideConfig) -> Self {
        Self::new(ContentRequester::from_config(config))
            .with_mode(config.segment_mode)
            .with_max_chunk_chars(config.max_chunk_chars)
    }

    pub fn with_mode(mut self, mode: SegmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    pub async fn generate(&self, request: &PresentationRequest) -> Result<GeneratedDeck> {
        self.run(request, None, None).await
    }

    /// Like [`Generator::generate`], reporting each stage on `events`.
    pub async fn generate_with_events(
        &self,
        request: &PresentationRequest,
        events: &mpsc::Sender<Event>,
    ) -> Result<GeneratedDeck> {
        self.run(request, None, Some(events)).await
    }

    /// Generate and write the deck into `dir`; the saved path is reported
    /// with [`Event::DeckSaved`].
    pub async fn generate_and_save(
        &self,
        request: &PresentationRequest,
        dir: &Path,
        events: &mpsc::Sender<Event>,
    ) -> Result<(GeneratedDeck, PathBuf)> {
        let deck = self.run(request, Some(dir), Some(events)).await?;
        let path = dir.join(deck.file_name());
        Ok((deck, path))
    }

    async fn run(
        &self,
        request: &PresentationRequest,
        save_dir: Option<&Path>,
        events: Option<&mpsc::Sender<Event>>,
    ) -> Result<GeneratedDeck> {
        let id = Uuid::new_v4();
        let result = self.run_stages(id, request, save_dir, events).await;
        match &result {
            Ok(_) => emit(events, Event::TaskComplete { id }).await,
            Err(err) => {
                tracing::error!(%id, "generation failed: {err}");
                emit(
                    events,
                    Event::Error {
                        message: err.user_message(),
                    },
                )
                .await;
            }
        }
        result
    }

    async fn run_stages(
        &self,
        id: Uuid,
        request: &PresentationRequest,
        save_dir: Option<&Path>,
        events: Option<&mpsc::Sender<Event>>,
    ) -> Result<GeneratedDeck> {
        if !request.has_topics() {
            return Err(SlideError::NoTopics);
        }
        emit(
            events,
            Event::TaskStarted {
                id,
                title: request.title.clone(),
                topics: request.topics.len(),
            },
        )
        .await;

        let raw_text = self.requester.request(request).await.into_result()?;
        emit(
            events,
            Event::ContentReceived {
                chars: raw_text.chars().count(),
            },
        )
        .await;

        let fragments = segment_text(&raw_text, self.mode, self.max_chunk_chars);
        tracing::debug!(mode = %self.mode, fragments = fragments.len(), "segmented content");
        emit(
            events,
            Event::Segmented {
                fragments: fragments.len(),
            },
        )
        .await;

        let presentation = match self.mode {
            SegmentMode::FixedLength => self.assembler.assemble_fixed_length(request, &fragments),
            SegmentMode::Markers => {
                let mut skipped = Vec::new();
                let pres = self
                    .assembler
                    .assemble_markers(&request.title, &fragments, |index| skipped.push(index));
                for index in skipped {
                    emit(events, Event::FragmentSkipped { index }).await;
                }
                pres
            }
        };
        emit(
            events,
            Event::DeckAssembled {
                slides: presentation.slide_count(),
            },
        )
        .await;

        let deck = GeneratedDeck {
            id,
            request: request.clone(),
            mode: self.mode,
            raw_text,
            fragments,
            presentation,
        };

        if let Some(dir) = save_dir {
            let path = deck.save_to_dir(dir).await?;
            emit(events, Event::DeckSaved { path }).await;
        }
        Ok(deck)
    }
}

async fn emit(events: Option<&mpsc::Sender<Event>>, event: Event) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is watching.
        let _ = tx.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::StubClient;
    use crate::requester::MISSING_API_KEY_TEXT;

    const MARKED: &str = "**Slide 1: Intro**\n* What\n* Why\n\n\
        **Slide 2:Broken**\n* Chat\n\n\
        **Slide 3: End**\n* Bye\n\n";

    fn request() -> PresentationRequest {
        PresentationRequest::new("Gen AI", vec!["A".into(), "B".into()])
    }

    async fn drain(mut rx: mpsc::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn fixed_length_deck_repeats_chunks_per_topic() {
        let blob = "lorem ipsum ".repeat(200);
        let generator = Generator::with_client(Arc::new(StubClient::new(blob.clone())));

        let deck = generator.generate(&request()).await.unwrap();
        let chunks = split_content(&blob, DEFAULT_MAX_CHUNK_CHARS);
        assert_eq!(deck.fragments, chunks);
        assert_eq!(deck.slide_count(), 1 + chunks.len() * 2);
        assert_eq!(deck.file_name(), "Gen_AI.pptx");
        assert_eq!(deck.raw_text, blob);
    }

    #[tokio::test]
    async fn marker_deck_skips_malformed_fragments() {
        let generator =
            Generator::with_client(Arc::new(StubClient::new(MARKED))).with_mode(SegmentMode::Markers);
        let deck = generator.generate(&request()).await.unwrap();

        assert_eq!(deck.fragments.len(), 3);
        assert_eq!(deck.slide_count(), 3);
        assert_eq!(deck.presentation.slides()[1].title().text(), "1.Intro");
        assert_eq!(deck.presentation.slides()[1].body().text(), "What, Why");
        assert_eq!(deck.presentation.slides()[2].title().text(), "3.End");
        assert_eq!(deck.file_name(), "Gen_AI_presentation.pptx");
    }

    #[tokio::test]
    async fn missing_credential_produces_no_deck() {
        let generator = Generator::new(ContentRequester::new(None));
        let (tx, rx) = mpsc::channel(16);

        let err = generator.generate_with_events(&request(), &tx).await.unwrap_err();
        drop(tx);
        match err {
            SlideError::Generation(message) => assert_eq!(message, MISSING_API_KEY_TEXT),
            other => panic!("unexpected error: {other:?}"),
        }

        let events = drain(rx).await;
        assert!(matches!(events.first(), Some(Event::TaskStarted { .. })));
        assert_eq!(
            events.last(),
            Some(&Event::Error {
                message: MISSING_API_KEY_TEXT.to_string()
            })
        );
    }

    #[tokio::test]
    async fn empty_topics_are_rejected() {
        let generator = Generator::with_client(Arc::new(StubClient::new("text")));
        let request = PresentationRequest::from_form("Gen AI", "  \n\n");
        let err = generator.generate(&request).await.unwrap_err();
        assert!(matches!(err, SlideError::NoTopics));
        assert_eq!(err.user_message(), "Please enter at least one topic.");
    }

    #[tokio::test]
    async fn events_follow_the_stages() {
        let generator =
            Generator::with_client(Arc::new(StubClient::new(MARKED))).with_mode(SegmentMode::Markers);
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel(32);

        let (deck, path) = generator
            .generate_and_save(&request(), dir.path(), &tx)
            .await
            .unwrap();
        drop(tx);

        assert!(path.exists());
        assert_eq!(path, dir.path().join("Gen_AI_presentation.pptx"));

        let events = drain(rx).await;
        assert!(matches!(events[0], Event::TaskStarted { topics: 2, .. }));
        assert!(matches!(events[1], Event::ContentReceived { .. }));
        assert_eq!(events[2], Event::Segmented { fragments: 3 });
        assert_eq!(events[3], Event::FragmentSkipped { index: 1 });
        assert_eq!(events[4], Event::DeckAssembled { slides: 3 });
        assert_eq!(events[5], Event::DeckSaved { path: path.clone() });
        assert_eq!(events[6], Event::TaskComplete { id: deck.id });
        assert_eq!(events.len(), 7);
    }

    #[tokio::test]
    async fn saves_fixed_length_deck_under_title() {
        let generator = Generator::with_client(Arc::new(StubClient::new("short body")));
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("decks");

        let deck = generator.generate(&request()).await.unwrap();
        let path = deck.save_to_dir(&out).await.unwrap();
        assert_eq!(path, out.join("Gen_AI.pptx"));

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn segment_text_by_mode() {
        assert_eq!(segment_text("aaa bbb", SegmentMode::FixedLength, 4), vec!["aaa", "bbb"]);
        assert_eq!(
            segment_text("Slide 1: **A**\n* x\n\n\n", SegmentMode::Markers, 900),
            vec!["Slide 1: A\n* x"]
        );
    }
}
