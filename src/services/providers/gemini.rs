//! Gemini answer provider.
//!
//! Talks to the Gemini REST API using the SSE streaming endpoint and
//! accumulates the streamed chunks into a single answer string.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use super::{AnswerProvider, ProviderError};
use crate::config::GeminiConfig;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The key travels in this header rather than the query string; transport
/// errors render the full request URL, so a `?key=` parameter would leak
/// into error messages and logs.
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider {
    api_key: Secret<String>,
    model: String,
    base_url: String,
    // No request timeout: answers can take as long as the model needs.
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: GEMINI_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl AnswerProvider for GeminiProvider {
    async fn answer(&self, question: &str) -> Result<String, ProviderError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: Some(question.to_string()),
                }],
            }],
        };

        tracing::debug!(
            model = %self.model,
            question_len = question.len(),
            "Starting streaming request to Gemini API"
        );

        let response = self
            .client
            .post(self.stream_url())
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let mut stream = response.bytes_stream();
        let mut events = SseEventBuffer::new();
        let mut answer = String::new();
        let mut finish_reason: Option<String> = None;

        while let Some(chunk_result) = stream.next().await {
            let chunk =
                chunk_result.map_err(|e| ProviderError::NetworkError(e.to_string()))?;
            events.extend(&chunk);

            while let Some(event) = events.next_event() {
                accumulate_event(&event, &mut answer, &mut finish_reason);
            }
        }

        // The final event is usually terminated, but drain any leftover just
        // in case the stream closed without the trailing blank line.
        if let Some(event) = events.into_remainder() {
            accumulate_event(&event, &mut answer, &mut finish_reason);
        }

        tracing::debug!(
            model = %self.model,
            answer_len = answer.len(),
            finish_reason = finish_reason.as_deref().unwrap_or("-"),
            "Gemini stream complete"
        );

        Ok(answer)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Splits the raw byte stream into complete SSE events.
///
/// Transport chunks can cut a multi-byte UTF-8 character in half, so bytes
/// are buffered undecoded and only turned into text once an event is
/// complete. The `\n\n` terminator is ASCII and cannot occur inside a
/// multi-byte sequence, so the byte-level split is always on a character
/// boundary.
struct SseEventBuffer {
    buf: Vec<u8>,
}

impl SseEventBuffer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete event, without its terminator.
    fn next_event(&mut self) -> Option<String> {
        let end = self.buf.windows(2).position(|w| w == b"\n\n")?;
        let event = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        self.buf.drain(..end + 2);
        Some(event)
    }

    /// Whatever is left when the stream closes without a trailing blank line.
    fn into_remainder(self) -> Option<String> {
        if self.buf.iter().all(|b| b.is_ascii_whitespace()) {
            return None;
        }
        Some(String::from_utf8_lossy(&self.buf).trim_end().to_string())
    }
}

/// Parse one SSE event and append its text chunks to the answer.
///
/// Events that are not data lines or do not parse are skipped; the API
/// interleaves keep-alive comments with data.
fn accumulate_event(event: &str, answer: &mut String, finish_reason: &mut Option<String>) {
    let Some(data) = event.strip_prefix("data: ") else {
        return;
    };

    let Ok(response) = serde_json::from_str::<GenerateContentResponse>(data) else {
        tracing::debug!("Skipping unparseable SSE event");
        return;
    };

    if let Some(candidate) = response.candidates.first() {
        for part in &candidate.content.parts {
            if let Some(text) = &part.text {
                answer.push_str(text);
            }
        }

        if let Some(reason) = &candidate.finish_reason {
            *finish_reason = Some(reason.clone());
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    #[serde(default)]
    finish_reason: Option<String>,
}
