//! End-to-end tests: the full router with mock backends, driven over a
//! real listener with multipart requests.

use std::net::SocketAddr;
use std::sync::Arc;

use gistsmith::acquire::MockTranscriptFetcher;
use gistsmith::genai::MockGenerator;
use gistsmith::pipeline::Summarizer;
use gistsmith::server::{ApiResponse, AppState, WELCOME_MESSAGE, router};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use tokio::net::TcpListener;

async fn spawn_app(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    addr
}

fn state_with(
    generator: Arc<MockGenerator>,
    transcripts: Arc<MockTranscriptFetcher>,
) -> AppState {
    AppState {
        summarizer: Arc::new(Summarizer::new(generator)),
        transcripts,
    }
}

fn unused_transcripts() -> Arc<MockTranscriptFetcher> {
    Arc::new(MockTranscriptFetcher::failing(
        "transcript fetcher should not be called",
    ))
}

#[tokio::test]
async fn welcome_route_greets() {
    let addr = spawn_app(state_with(
        Arc::new(MockGenerator::new()),
        unused_transcripts(),
    ))
    .await;

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), WELCOME_MESSAGE);
}

#[tokio::test]
async fn inline_text_summarizes_end_to_end() {
    let generator = Arc::new(MockGenerator::with_replies([
        "chunk digest",
        "the final bulleted summary",
    ]));
    let addr = spawn_app(state_with(generator.clone(), unused_transcripts())).await;

    let form = Form::new()
        .text("text", "Hello   world.  ")
        .text("url", "");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/text"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(body.success);
    assert_eq!(body.message, "the final bulleted summary");

    // Whitespace was collapsed before chunking, and exactly one chunk call
    // preceded the consolidation call.
    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].ends_with("Hello world."));
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn unparseable_file_answers_500_with_extraction_error() {
    let generator = Arc::new(MockGenerator::new());
    let addr = spawn_app(state_with(generator.clone(), unused_transcripts())).await;

    let form = Form::new()
        .text("text", "inline text that must not be used")
        .part(
            "file",
            Part::bytes(b"not a pdf at all".to_vec())
                .file_name("upload.pdf")
                .mime_str("application/pdf")
                .unwrap(),
        );
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/text"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(!body.success);
    assert!(
        body.message.contains("parsing PDF"),
        "message should carry the extraction error: {}",
        body.message
    );
    // The file path is fatal: no fall-through to the inline text.
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn youtube_url_with_empty_text_fetches_transcript() {
    let generator = Arc::new(MockGenerator::with_replies(["digest", "final"]));
    let transcripts = Arc::new(MockTranscriptFetcher::returning(
        "first caption\nsecond caption",
    ));
    let addr = spawn_app(state_with(generator.clone(), transcripts.clone())).await;

    let form = Form::new()
        .text("text", "")
        .text("url", "https://www.youtube.com/watch?v=abc123");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/text"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(body.success);
    assert_eq!(body.message, "final");

    assert_eq!(
        transcripts.requests(),
        vec!["https://www.youtube.com/watch?v=abc123"]
    );
    // The transcript was normalized onto one line before chunking.
    assert!(generator.prompts()[0].contains("first caption second caption"));
}

#[tokio::test]
async fn empty_transcript_answers_404() {
    let transcripts = Arc::new(MockTranscriptFetcher::returning(""));
    let addr = spawn_app(state_with(Arc::new(MockGenerator::new()), transcripts)).await;

    let form = Form::new()
        .text("text", "")
        .text("url", "https://www.youtube.com/watch?v=silent");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/text"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(!body.success);
    assert!(body.message.contains("No transcript found"));
}

#[tokio::test]
async fn transcript_fetch_failure_answers_500() {
    let transcripts = Arc::new(MockTranscriptFetcher::failing("browser unreachable"));
    let addr = spawn_app(state_with(Arc::new(MockGenerator::new()), transcripts)).await;

    let form = Form::new()
        .text("text", "")
        .text("url", "https://www.youtube.com/watch?v=abc123");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/text"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(!body.success);
    assert!(body.message.contains("browser unreachable"));
}

#[tokio::test]
async fn generation_failure_answers_500_instead_of_hanging() {
    let generator = Arc::new(MockGenerator::failing("model overloaded"));
    let addr = spawn_app(state_with(generator, unused_transcripts())).await;

    let form = Form::new().text("text", "Some text.").text("url", "");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/text"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ApiResponse = response.json().await.unwrap();
    assert!(!body.success);
    assert!(body.message.contains("model overloaded"));
}

#[tokio::test]
async fn inline_text_wins_over_youtube_url() {
    let generator = Arc::new(MockGenerator::with_replies(["digest", "final"]));
    let transcripts = unused_transcripts();
    let addr = spawn_app(state_with(generator.clone(), transcripts.clone())).await;

    let form = Form::new()
        .text("text", "use me instead")
        .text("url", "https://www.youtube.com/watch?v=abc123");
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/text"))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(transcripts.requests().is_empty());
    assert!(generator.prompts()[0].contains("use me instead"));
}
