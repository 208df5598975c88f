//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use url::Url;

use mednexa_shared::{
    AggregatedRecord, GeminiConfig, MednexaError, NarrativeGenerator, NarrativeOutput, Result,
};

use crate::prompt::build_prompt;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Longest slice of an error body kept in error messages.
const MAX_ERROR_BODY: usize = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

// ---------------------------------------------------------------------------
// GeminiNarrator
// ---------------------------------------------------------------------------

/// Summarizes aggregated records through the Gemini REST API.
pub struct GeminiNarrator {
    client: Client,
    endpoint: Url,
    model: String,
    api_key: String,
}

impl GeminiNarrator {
    /// Build a client for `config.model` at `config.base_url`.
    pub fn new(config: &GeminiConfig, api_key: String) -> Result<Self> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join(&format!("v1beta/models/{}:generateContent", config.model)))
            .map_err(|e| {
                MednexaError::config(format!("invalid gemini base_url {}: {e}", config.base_url))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MednexaError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| MednexaError::Network(format!("gemini request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MednexaError::Network(format!("gemini: failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            MednexaError::Narrative(format!("malformed gemini response: {e} (got: {})", snippet(&body)))
        })?;

        parsed
            .into_text()
            .ok_or_else(|| MednexaError::Narrative("gemini returned no text".into()))
    }
}

#[async_trait]
impl NarrativeGenerator for GeminiNarrator {
    #[instrument(skip_all, fields(model = %self.model, sources = record.worker_results.len()))]
    async fn summarize(&self, record: &AggregatedRecord) -> Result<NarrativeOutput> {
        let prompt = build_prompt(record);
        debug!(prompt_chars = prompt.len(), "sending gemini request");

        let summary = self.generate(&prompt).await.inspect_err(|e| {
            warn!(error = %e, "gemini summarization failed");
        })?;

        info!(summary_chars = summary.len(), "narrative generated");
        Ok(NarrativeOutput {
            summary,
            model: self.model.clone(),
            generated_at: Utc::now(),
        })
    }
}

fn status_error(status: StatusCode, body: &str) -> MednexaError {
    let detail = format!("gemini: HTTP {status}: {}", snippet(body));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MednexaError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => MednexaError::Quota(detail),
        _ => MednexaError::Narrative(detail),
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use mednexa_shared::{ExtractedEntities, QueryContext, SourceId, SourceOutput};
    use serde_json::json;

    const PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            base_url: base_url.into(),
            timeout_secs: 5,
            ..GeminiConfig::default()
        }
    }

    fn record() -> AggregatedRecord {
        let mut data = serde_json::Map::new();
        data.insert("market_size_usd".into(), json!(4_200_000_000u64));
        let mut worker_results = BTreeMap::new();
        worker_results.insert(SourceId::Iqvia, SourceOutput::new(SourceId::Iqvia, data));

        AggregatedRecord {
            query_context: QueryContext {
                original_query: "market size for Drug X".into(),
                entities: ExtractedEntities::default(),
                required_sources: vec![SourceId::Iqvia],
            },
            worker_results,
            aggregated_at: Utc::now(),
        }
    }

    async fn respond_with(template: wiremock::ResponseTemplate) -> wiremock::MockServer {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(PATH))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn endpoint_joins_model_path() {
        let narrator =
            GeminiNarrator::new(&config("https://generativelanguage.googleapis.com/"), "k".into())
                .unwrap();
        assert_eq!(
            narrator.endpoint().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let err = GeminiNarrator::new(&config("not a url"), "k".into()).err().unwrap();
        assert!(matches!(err, MednexaError::Config { .. }));
    }

    #[tokio::test]
    async fn summarize_concatenates_candidate_parts() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(PATH))
            .and(wiremock::matchers::header("x-goog-api-key", "test-key"))
            .and(wiremock::matchers::body_string_contains("Do NOT invent"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [
                        { "text": "## Executive Summary\n" },
                        { "text": "Drug X market is $4.20B." }
                    ]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let narrator = GeminiNarrator::new(&config(&server.uri()), "test-key".into()).unwrap();
        let output = narrator.summarize(&record()).await.unwrap();

        assert_eq!(output.summary, "## Executive Summary\nDrug X market is $4.20B.");
        assert_eq!(output.model, "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth() {
        let server = respond_with(wiremock::ResponseTemplate::new(403)).await;
        let narrator = GeminiNarrator::new(&config(&server.uri()), "bad".into()).unwrap();
        let err = narrator.summarize(&record()).await.unwrap_err();
        assert!(matches!(err, MednexaError::Auth(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn rate_limit_maps_to_quota() {
        let server = respond_with(
            wiremock::ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"),
        )
        .await;
        let narrator = GeminiNarrator::new(&config(&server.uri()), "k".into()).unwrap();
        let err = narrator.summarize(&record()).await.unwrap_err();
        match err {
            MednexaError::Quota(msg) => assert!(msg.contains("RESOURCE_EXHAUSTED")),
            other => panic!("expected Quota, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn server_error_maps_to_narrative() {
        let server = respond_with(wiremock::ResponseTemplate::new(500)).await;
        let narrator = GeminiNarrator::new(&config(&server.uri()), "k".into()).unwrap();
        let err = narrator.summarize(&record()).await.unwrap_err();
        assert!(matches!(err, MednexaError::Narrative(_)));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_narrative() {
        let server =
            respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>")).await;
        let narrator = GeminiNarrator::new(&config(&server.uri()), "k".into()).unwrap();
        let err = narrator.summarize(&record()).await.unwrap_err();
        assert!(matches!(err, MednexaError::Narrative(_)));
    }

    #[tokio::test]
    async fn empty_candidates_map_to_narrative() {
        let server = respond_with(
            wiremock::ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })),
        )
        .await;
        let narrator = GeminiNarrator::new(&config(&server.uri()), "k".into()).unwrap();
        let err = narrator.summarize(&record()).await.unwrap_err();
        assert!(matches!(err, MednexaError::Narrative(_)));
    }

    #[tokio::test]
    async fn unreachable_host_maps_to_network() {
        // Reserve a free port, then release it so nothing is listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let uri = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let narrator = GeminiNarrator::new(&config(&uri), "k".into()).unwrap();
        let err = narrator.summarize(&record()).await.unwrap_err();
        assert!(matches!(err, MednexaError::Network(_)), "got {err:?}");
    }
}
