//! Local web form: `GET /` shows the form, `POST /generate` runs the
//! pipeline, `GET /download/<id>` hands out the deck.
use anyhow::{anyhow, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use slidegen_common::{
    PresentationRequest, SegmentMode, SlideConfig, DEFAULT_TITLE, DEFAULT_TOPICS, PPTX_MIME,
};
use slidegen_core::{GeneratedDeck, Generator};
use std::collections::{HashMap, VecDeque};
use std::io::Read;
use std::path::{Path, PathBuf};
use tiny_http::{Header, Method, Request, Response, Server};
use tokio::runtime::Handle;
use uuid::Uuid;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";

/// Generated decks kept for download.
const DECK_CAPACITY: usize = 16;
/// Upper bound on a form submission body.
const MAX_BODY_BYTES: u64 = 64 * 1024;

struct StoredDeck {
    file_name: String,
    bytes: Vec<u8>,
}

/// The most recent decks, oldest evicted first.
struct DeckStore {
    decks: VecDeque<(Uuid, StoredDeck)>,
    capacity: usize,
}

impl DeckStore {
    fn new(capacity: usize) -> Self {
        Self {
            decks: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    fn insert(&mut self, id: Uuid, file_name: String, bytes: Vec<u8>) {
        while self.decks.len() >= self.capacity {
            self.decks.pop_front();
        }
        self.decks.push_back((id, StoredDeck { file_name, bytes }));
    }

    fn get(&self, id: &Uuid) -> Option<&StoredDeck> {
        self.decks
            .iter()
            .find(|(stored, _)| stored == id)
            .map(|(_, deck)| deck)
    }
}

/// A response before it is handed to the HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct WebResponse {
    pub status: u16,
    pub content_type: String,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl WebResponse {
    fn html(status: u16, page: String) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8".to_string(),
            content_disposition: None,
            body: page.into_bytes(),
        }
    }

    fn attachment(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: PPTX_MIME.to_string(),
            content_disposition: Some(content_disposition(file_name)),
            body: bytes,
        }
    }

    fn not_found() -> Self {
        Self::html(404, page("Not found", "<p>Nothing here.</p><p><a href=\"/\">Back</a></p>"))
    }

    fn into_tiny_http(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_data(self.body).with_status_code(self.status);
        let headers = [
            Some(("Content-Type", self.content_type)),
            self.content_disposition.map(|value| ("Content-Disposition", value)),
        ];
        for (name, value) in headers.into_iter().flatten() {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => response.add_header(header),
                Err(()) => tracing::warn!(name, %value, "dropping invalid header"),
            }
        }
        response
    }
}

/// `attachment` disposition with an ASCII fallback name and the exact name
/// percent-encoded.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}

/// Decode an `application/x-www-form-urlencoded` body. Later keys win.
pub fn parse_form(body: &str) -> HashMap<String, String> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>body{{font-family:sans-serif;max-width:48rem;margin:2rem auto}}\
         textarea,input,select{{width:100%;margin-bottom:1rem}}\
         pre{{white-space:pre-wrap;background:#f4f4f4;padding:.5rem}}</style>\
         </head><body>\n{body}\n</body></html>\n",
        encode_text(title)
    )
}

/// The input form, optionally with an error line above it.
pub fn render_form_page(title: &str, topics: &str, mode: SegmentMode, error: Option<&str>) -> String {
    let error_html = error
        .map(|message| format!("<p style=\"color:#b00\">{}</p>\n", encode_text(message)))
        .unwrap_or_default();
    let option = |value: SegmentMode, label: &str| {
        let selected = if value == mode { " selected" } else { "" };
        format!("<option value=\"{}\"{selected}>{label}</option>", value.as_str())
    };

    let body = format!(
        "<h1>AI Presentation Generator</h1>\n{error_html}\
         <form method=\"post\" action=\"/generate\">\n\
         <label>Presentation title<input name=\"title\" value=\"{}\"></label>\n\
         <label>Topics (one per line)<textarea name=\"topics\" rows=\"6\">{}</textarea></label>\n\
         <label>Segmentation<select name=\"mode\">{}{}</select></label>\n\
         <button type=\"submit\">Generate</button>\n</form>",
        encode_double_quoted_attribute(title),
        encode_text(topics),
        option(SegmentMode::FixedLength, "Fixed length"),
        option(SegmentMode::Markers, "Slide markers"),
    );
    page("AI Presentation Generator", &body)
}

/// Generated content, its fragments and the download link. `saved` is where
/// the deck was also written on disk, if anywhere.
pub fn render_result_page(deck: &GeneratedDeck, saved: Option<&Path>) -> String {
    let file_name = deck.file_name();
    let saved_html = saved
        .map(|path| format!("<p>Saved to {}</p>\n", encode_text(&path.display().to_string())))
        .unwrap_or_default();
    let fragments: String = deck
        .fragments
        .iter()
        .enumerate()
        .map(|(index, fragment)| {
            format!(
                "<h3>Fragment {}</h3>\n<pre>{}</pre>\n",
                index + 1,
                encode_text(fragment)
            )
        })
        .collect();

    let body = format!(
        "<h1>{}</h1>\n<p>{} slides. <a href=\"/download/{}\" download=\"{}\">Download {}</a></p>\n\
         {saved_html}<h2>Generated content</h2>\n<pre>{}</pre>\n<h2>Fragments</h2>\n{fragments}\
         <p><a href=\"/\">Generate another</a></p>",
        encode_text(&deck.request.title),
        deck.slide_count(),
        deck.id,
        encode_double_quoted_attribute(&file_name),
        encode_text(&file_name),
        encode_text(&deck.raw_text),
    );
    page(&deck.request.title, &body)
}

/// Request router. One request is handled at a time.
pub struct WebApp {
    generator: Generator,
    output_dir: PathBuf,
    decks: DeckStore,
}

impl WebApp {
    /// Fixed-length decks are also written to `output_dir`.
    pub fn new(generator: Generator, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            generator,
            output_dir: output_dir.into(),
            decks: DeckStore::new(DECK_CAPACITY),
        }
    }

    pub async fn handle(&mut self, method: &Method, url: &str, body: &str) -> WebResponse {
        let path = url.split('?').next().unwrap_or(url);
        tracing::debug!(%method, path, "web request");

        match (method, path) {
            (Method::Get, "/") => WebResponse::html(
                200,
                render_form_page(DEFAULT_TITLE, DEFAULT_TOPICS, self.generator.mode(), None),
            ),
            (Method::Post, "/generate") => self.generate(body).await,
            (Method::Get, _) => match path.strip_prefix("/download/") {
                Some(id) => self.download(id),
                None => WebResponse::not_found(),
            },
            _ => WebResponse::not_found(),
        }
    }

    async fn generate(&mut self, body: &str) -> WebResponse {
        let form = parse_form(body);
        let title = form.get("title").map(String::as_str).unwrap_or_default();
        let topics = form.get("topics").map(String::as_str).unwrap_or_default();
        let mode = form
            .get("mode")
            .and_then(|value| SegmentMode::parse(value))
            .unwrap_or(self.generator.mode());

        let request = PresentationRequest::from_form(title, topics);
        let generator = self.generator.clone().with_mode(mode);

        let deck = match generator.generate(&request).await {
            Ok(deck) => deck,
            Err(err) => {
                return WebResponse::html(
                    200,
                    render_form_page(title, topics, mode, Some(&err.user_message())),
                );
            }
        };

        let saved = match mode {
            SegmentMode::FixedLength => match deck.save_to_dir(&self.output_dir).await {
                Ok(path) => Some(path),
                Err(err) => {
                    tracing::error!("failed to save deck: {err}");
                    return WebResponse::html(
                        500,
                        render_form_page(title, topics, mode, Some(&err.user_message())),
                    );
                }
            },
            SegmentMode::Markers => None,
        };

        match deck.to_bytes() {
            Ok(bytes) => {
                self.decks.insert(deck.id, deck.file_name(), bytes);
                WebResponse::html(200, render_result_page(&deck, saved.as_deref()))
            }
            Err(err) => {
                tracing::error!("failed to serialize deck: {err}");
                WebResponse::html(
                    500,
                    render_form_page(title, topics, mode, Some(&err.user_message())),
                )
            }
        }
    }

    fn download(&self, id: &str) -> WebResponse {
        let Ok(id) = Uuid::parse_str(id) else {
            return WebResponse::not_found();
        };
        match self.decks.get(&id) {
            Some(deck) => WebResponse::attachment(&deck.file_name, deck.bytes.clone()),
            None => WebResponse::not_found(),
        }
    }
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(config: SlideConfig, addr: &str, open_browser: bool) -> Result<()> {
    let server = Server::http(addr).map_err(|err| anyhow!("failed to bind {addr}: {err}"))?;
    let url = format!("http://{addr}/");
    tracing::info!(%url, "web form listening");
    println!("Serving the presentation form on {url} (Ctrl+C to stop)");

    if !config.has_api_key() {
        println!("Warning: GOOGLE_API_KEY is not set; generation will report an error.");
    }
    if open_browser {
        if let Err(err) = webbrowser::open(&url) {
            tracing::warn!("could not open a browser: {err}");
        }
    }

    let app = WebApp::new(Generator::from_config(&config), config.output_dir.clone());
    let handle = Handle::current();
    tokio::task::spawn_blocking(move || serve_loop(server, app, handle)).await?;
    Ok(())
}

fn serve_loop(server: Server, mut app: WebApp, handle: Handle) {
    for mut request in server.incoming_requests() {
        let body = match read_body(&mut request) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("failed to read request body: {err}");
                String::new()
            }
        };
        let method = request.method().clone();
        let url = request.url().to_string();

        let response = handle.block_on(app.handle(&method, &url, &body));
        tracing::info!(%method, %url, status = response.status, "served");
        if let Err(err) = request.respond(response.into_tiny_http()) {
            tracing::warn!("failed to send response: {err}");
        }
    }
}

fn read_body(request: &mut Request) -> std::io::Result<String> {
    let mut body = String::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES)
        .read_to_string(&mut body)?;
    Ok(body)
}
