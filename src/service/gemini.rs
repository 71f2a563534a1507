//! `ContentGenerator` backed by the Gemini `generateContent` REST endpoint.

use crate::query::builder::StructuredQuery;
use crate::query::schema::Schema;
use crate::service::config::ServiceConfig;
use crate::service::error::DataFetchError;
use crate::service::generator::ContentGenerator;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Schema,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// HTTP client for the generative data service.
pub struct GeminiClient {
    config: ServiceConfig,
    http: Client,
}

impl GeminiClient {
    pub fn new(config: ServiceConfig) -> Result<Self, DataFetchError> {
        // No timeout: a hung call leaves the widget loading.
        let http = Client::builder()
            .build()
            .map_err(DataFetchError::ClientBuild)?;
        Ok(Self { config, http })
    }

    /// Client configured from the process environment, see [`ServiceConfig::from_env`].
    pub fn from_env() -> Result<Self, DataFetchError> {
        Self::new(ServiceConfig::from_env()?)
    }

    async fn send(&self, query: &StructuredQuery) -> Result<String, DataFetchError> {
        let url = self.config.generate_url();
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: &query.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &query.response_schema,
            },
        };

        info!(
            "Requesting {} day(s) of {} for {} from {}",
            query.range.days(),
            query
                .metrics
                .iter()
                .map(|m| m.english_name())
                .collect::<Vec<_>>()
                .join(", "),
            query.region,
            self.config.model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DataFetchError::NetworkRequest(url.clone(), e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DataFetchError::NetworkRequest(url.clone(), e))?;

        if !status.is_success() {
            warn!("HTTP error {} for {}", status, url);
        }
        interpret_response(status, &text)
    }
}

/// Maps a raw `generateContent` reply to the generated text or a [`DataFetchError`].
fn interpret_response(status: StatusCode, body: &str) -> Result<String, DataFetchError> {
    let api_error = serde_json::from_str::<ApiErrorBody>(body).ok();

    if !status.is_success() {
        let message = api_error
            .map(|e| e.error.message)
            .unwrap_or_else(|| body.to_string());
        return Err(DataFetchError::HttpStatus { status, message });
    }
    if let Some(e) = api_error {
        return Err(DataFetchError::Service(e.error.message));
    }

    let parsed: GenerateContentResponse = serde_json::from_str(body)?;
    extract_text(parsed)
}

impl ContentGenerator for GeminiClient {
    async fn generate(&self, query: &StructuredQuery) -> Result<String, DataFetchError> {
        self.send(query).await
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, DataFetchError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(DataFetchError::Service(format!("prompt blocked: {reason}")));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(DataFetchError::NoContent)?;
    debug!("Candidate finish reason: {:?}", candidate.finish_reason);

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(DataFetchError::NoContent);
    }
    Ok(text)
}
