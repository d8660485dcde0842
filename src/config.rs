//! Process configuration.
//!
//! Settings are read from the environment once at startup (a `.env` file is
//! honored when present) and passed into constructors explicitly. Nothing
//! in the library reads the environment after this point.

use miette::Diagnostic;
use thiserror::Error;
use url::Url;

use crate::genai::GeminiClient;

/// Errors raised while loading [`Settings`] from the environment.
#[derive(Debug, Error, Diagnostic)]
pub enum SettingsError {
    #[error("GEMINI_API_KEY is not set")]
    #[diagnostic(
        code(gistsmith::config::missing_gemini_key),
        help("Set GEMINI_API_KEY in the environment or a .env file.")
    )]
    MissingGeminiKey,

    #[error("PORT is not a valid port number: {value}")]
    #[diagnostic(code(gistsmith::config::invalid_port))]
    InvalidPort { value: String },

    #[error("{variable} is not a valid URL: {source}")]
    #[diagnostic(code(gistsmith::config::invalid_url))]
    InvalidUrl {
        variable: &'static str,
        source: url::ParseError,
    },
}

/// Runtime settings for the service.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Listening port for the HTTP server.
    pub port: u16,
    /// API key for the Gemini endpoint.
    pub gemini_api_key: String,
    /// Host the Gemini client talks to.
    pub gemini_base_url: Url,
    /// Model identifier passed on every generation call.
    pub gemini_model: String,
    /// Token for the remote browser service. Optional: deployments that
    /// never serve transcript requests do not need one.
    pub browserless_api_key: Option<String>,
    /// WebSocket host of the remote browser service.
    pub browserless_endpoint: String,
}

impl Settings {
    /// Port used when `PORT` is not set.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Browserless region endpoint used when `BROWSERLESS_ENDPOINT` is not set.
    pub const DEFAULT_BROWSERLESS_ENDPOINT: &'static str =
        "wss://production-sfo.browserless.io";

    /// Loads settings from the process environment.
    ///
    /// Recognized variables: `GEMINI_API_KEY` (required), `PORT`,
    /// `GEMINI_BASE_URL`, `GEMINI_MODEL`, `BROWSERLESS_API_KEY`,
    /// `BROWSERLESS_ENDPOINT`.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let gemini_api_key =
            std::env::var("GEMINI_API_KEY").map_err(|_| SettingsError::MissingGeminiKey)?;

        let port = match std::env::var("PORT") {
            Ok(value) => value
                .parse::<u16>()
                .map_err(|_| SettingsError::InvalidPort { value })?,
            Err(_) => Self::DEFAULT_PORT,
        };

        let gemini_base_url = match std::env::var("GEMINI_BASE_URL") {
            Ok(value) => Url::parse(&value).map_err(|source| SettingsError::InvalidUrl {
                variable: "GEMINI_BASE_URL",
                source,
            })?,
            Err(_) => Url::parse(GeminiClient::DEFAULT_BASE_URL)
                .expect("default base URL is valid"),
        };

        let gemini_model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| GeminiClient::DEFAULT_MODEL.to_string());

        let browserless_api_key = std::env::var("BROWSERLESS_API_KEY").ok();
        let browserless_endpoint = std::env::var("BROWSERLESS_ENDPOINT")
            .unwrap_or_else(|_| Self::DEFAULT_BROWSERLESS_ENDPOINT.to_string());

        Ok(Self {
            port,
            gemini_api_key,
            gemini_base_url,
            gemini_model,
            browserless_api_key,
            browserless_endpoint,
        })
    }

    /// Builds the Gemini client described by these settings.
    pub fn gemini_client(&self) -> GeminiClient {
        GeminiClient::new(self.gemini_api_key.clone())
            .with_model(self.gemini_model.clone())
            .with_base_url(self.gemini_base_url.clone())
    }
}
