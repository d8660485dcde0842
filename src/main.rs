use std::sync::Arc;

use miette::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt};

use gistsmith::acquire::{BrowserlessFetcher, TranscriptFetcher};
use gistsmith::config::Settings;
use gistsmith::genai::TextGenerator;
use gistsmith::pipeline::Summarizer;
use gistsmith::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let settings = Settings::from_env()?;

    let generator: Arc<dyn TextGenerator> = Arc::new(settings.gemini_client());
    let transcripts: Arc<dyn TranscriptFetcher> = Arc::new(BrowserlessFetcher::new(
        settings.browserless_endpoint.clone(),
        settings.browserless_api_key.clone(),
    ));

    let state = AppState {
        summarizer: Arc::new(Summarizer::new(generator)),
        transcripts,
    };

    server::serve(state, settings.port).await?;

    Ok(())
}
