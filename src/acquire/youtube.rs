//! YouTube transcript scraping through a remote browser.
//!
//! YouTube exposes no transcript download endpoint, so the transcript panel
//! is scraped out of the rendered watch page: a hosted Chrome instance
//! (Browserless) navigates to the video, the "show transcript" control is
//! activated, and the segment elements are read out of the DOM. One attempt
//! per request; there is no retry layer.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;
use tokio::time::{Instant, sleep};

use super::cdp::{CdpConnection, CdpError, PageSession};

/// Marker that identifies a YouTube watch URL in the request.
pub const WATCH_URL_MARKER: &str = "youtube.com/watch?v=";

/// Bound on the wait for the transcript segment elements.
const SELECTOR_WAIT: Duration = Duration::from_secs(10);
/// Bound on the wait for the initial page load.
const LOAD_WAIT: Duration = Duration::from_secs(10);
/// Poll cadence for both waits.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Activates the "show transcript" control when the panel offers one.
const REVEAL_TRANSCRIPT_JS: &str =
    r#"document.querySelector("ytd-video-description-transcript-section-renderer button")?.click()"#;
/// True once at least one transcript segment is in the DOM.
const SEGMENTS_PRESENT_JS: &str =
    r##"document.querySelector("#segments-container yt-formatted-string") !== null"##;
/// Joins every visible segment's text, one per line, in document order.
const COLLECT_SEGMENTS_JS: &str = r##"Array.from(document.querySelectorAll("#segments-container yt-formatted-string")).map((element) => element.textContent.trim()).join("\n")"##;
/// True once the document has finished loading.
const PAGE_COMPLETE_JS: &str = r#"document.readyState === "complete""#;

/// Returns true when `url` should be treated as a transcript request.
pub fn is_watch_url(url: &str) -> bool {
    url.contains(WATCH_URL_MARKER)
}

/// Errors from transcript acquisition.
#[derive(Debug, Error, Diagnostic)]
pub enum TranscriptError {
    /// No Browserless token was configured for this deployment.
    #[error("browserless API key is not set in environment variables")]
    #[diagnostic(
        code(gistsmith::acquire::transcript::credentials),
        help("Set BROWSERLESS_API_KEY to serve YouTube transcript requests.")
    )]
    MissingCredentials,

    /// Browser control failed beneath the scrape.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Cdp(#[from] CdpError),

    /// A bounded wait elapsed.
    #[error("timed out after {seconds}s waiting for {what}")]
    #[diagnostic(code(gistsmith::acquire::transcript::wait))]
    Wait { what: &'static str, seconds: u64 },

    /// The page returned something other than the expected value shape.
    #[error("unexpected evaluation result while reading {what}")]
    #[diagnostic(code(gistsmith::acquire::transcript::evaluation))]
    Evaluation { what: &'static str },

    /// Generic fetch failure, used by non-browser fetchers and test mocks.
    #[error("transcript fetch failed: {message}")]
    #[diagnostic(code(gistsmith::acquire::transcript::fetch))]
    Fetch { message: String },
}

/// Opaque video-URL-to-transcript function.
///
/// The returned transcript may be empty; deciding what an empty transcript
/// means is the caller's concern, not the fetcher's.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch_transcript(&self, video_url: &str) -> Result<String, TranscriptError>;
}

/// Transcript fetcher backed by a Browserless-hosted Chrome.
pub struct BrowserlessFetcher {
    endpoint: String,
    api_key: Option<String>,
}

impl BrowserlessFetcher {
    /// Creates a fetcher against `endpoint` (a `wss://` host).
    ///
    /// A missing API key is not an error here: it only surfaces when a
    /// transcript request actually arrives, so text- and PDF-only
    /// deployments run without browser credentials.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
        }
    }

    async fn scrape(
        connection: &mut CdpConnection,
        video_url: &str,
    ) -> Result<String, TranscriptError> {
        let page = PageSession::open(connection).await?;
        let outcome = Self::extract(connection, &page, video_url).await;
        page.close(connection).await;
        outcome
    }

    async fn extract(
        connection: &mut CdpConnection,
        page: &PageSession,
        video_url: &str,
    ) -> Result<String, TranscriptError> {
        page.navigate(connection, video_url).await?;
        wait_until(connection, page, PAGE_COMPLETE_JS, "page load", LOAD_WAIT).await?;

        // Best-effort: the control is absent when the description carries no
        // transcript section, and the selector wait below decides the outcome.
        page.evaluate(connection, REVEAL_TRANSCRIPT_JS).await?;

        wait_until(
            connection,
            page,
            SEGMENTS_PRESENT_JS,
            "transcript segments",
            SELECTOR_WAIT,
        )
        .await?;

        match page.evaluate(connection, COLLECT_SEGMENTS_JS).await? {
            Value::String(transcript) => Ok(transcript),
            _ => Err(TranscriptError::Evaluation {
                what: "transcript segments",
            }),
        }
    }
}

#[async_trait]
impl TranscriptFetcher for BrowserlessFetcher {
    async fn fetch_transcript(&self, video_url: &str) -> Result<String, TranscriptError> {
        let token = self
            .api_key
            .as_deref()
            .ok_or(TranscriptError::MissingCredentials)?;
        let endpoint = format!("{}?token={}", self.endpoint, token);

        tracing::info!(video_url, "fetching transcript via remote browser");

        let mut connection = CdpConnection::connect(&endpoint).await?;
        let result = Self::scrape(&mut connection, video_url).await;
        // The session is released on success and failure alike.
        connection.close().await;
        result
    }
}

/// Polls `expression` until it evaluates to `true` or `bound` elapses.
async fn wait_until(
    connection: &mut CdpConnection,
    page: &PageSession,
    expression: &str,
    what: &'static str,
    bound: Duration,
) -> Result<(), TranscriptError> {
    let deadline = Instant::now() + bound;
    loop {
        if page.evaluate(connection, expression).await? == Value::Bool(true) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(TranscriptError::Wait {
                what,
                seconds: bound.as_secs(),
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}

/// Scripted transcript fetcher for tests.
///
/// Records every requested URL and replays a fixed outcome, so request
/// routing and error mapping can be exercised without a remote browser.
#[derive(Debug)]
pub struct MockTranscriptFetcher {
    outcome: Result<String, String>,
    requests: Mutex<Vec<String>>,
}

impl MockTranscriptFetcher {
    /// A mock that yields `transcript` for every video.
    pub fn returning(transcript: impl Into<String>) -> Self {
        Self {
            outcome: Ok(transcript.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A mock whose every fetch fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every URL requested so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("mock lock poisoned").clone()
    }
}

#[async_trait]
impl TranscriptFetcher for MockTranscriptFetcher {
    async fn fetch_transcript(&self, video_url: &str) -> Result<String, TranscriptError> {
        self.requests
            .lock()
            .expect("mock lock poisoned")
            .push(video_url.to_string());
        match &self.outcome {
            Ok(transcript) => Ok(transcript.clone()),
            Err(message) => Err(TranscriptError::Fetch {
                message: message.clone(),
            }),
        }
    }
}
