//! Gemini `generateContent` client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerateError, TextGenerator};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// [`TextGenerator`] backed by the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerateError::Request(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE.to_string(),
        })
    }

    /// Point at a different API host (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerateError::Request(format!("{}: {}", status, text)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Response(e.to_string()))?;
        Ok(parsed.into_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        let g = GeminiGenerator::new("k", "gemini-2.5-flash", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://proxy.local/v1beta/");
        assert_eq!(
            g.endpoint(),
            "http://proxy.local/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_response_text() {
        let raw = serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "**Dish Name:** " }, { "text": "Omelette" } ] } },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.into_text(), "**Dish Name:** Omelette");

        let blocked: GenerateResponse = serde_json::from_value(serde_json::json!({ "candidates": [ {} ] })).unwrap();
        assert_eq!(blocked.into_text(), "");
    }
}
