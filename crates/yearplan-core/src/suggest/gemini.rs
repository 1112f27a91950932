//! `generateContent` client for Google's generative-language API.

use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{GenerationRequest, SuggestError, TextGenerator};
use crate::config::SuggestConfig;

#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    endpoint: String,
    model: String,
    api_key_env: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiGenerator {
    /// Build from config, reading the API key from the configured
    /// environment variable.
    #[must_use]
    pub fn from_config(config: &SuggestConfig) -> Self {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty());
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    #[must_use]
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

/// JSON body for a `generateContent` call.
#[must_use]
pub fn request_body(req: &GenerationRequest) -> Value {
    let mut body = json!({
        "contents": [{ "parts": [{ "text": req.prompt }] }],
    });
    if req.structured {
        body["generationConfig"] = json!({
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "description": { "type": "STRING" },
                },
                "required": ["title", "description"],
            },
        });
    }
    body
}

/// Concatenated text parts of the first candidate.
///
/// # Errors
///
/// [`SuggestError::EmptyResponse`] when there is no candidate text.
pub fn extract_text(response: &Value) -> Result<String, SuggestError> {
    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or(SuggestError::EmptyResponse)?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        return Err(SuggestError::EmptyResponse);
    }
    Ok(text)
}

impl TextGenerator for GeminiGenerator {
    fn generate(&self, req: &GenerationRequest) -> Result<String, SuggestError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(SuggestError::MissingApiKey(self.api_key_env.clone()));
        };

        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        debug!(model = %self.model, structured = req.structured, "requesting generation");

        let response = agent
            .post(&self.url())
            .set("Content-Type", "application/json")
            .set("x-goog-api-key", key)
            .send_json(request_body(req))
            .map_err(|err| match err {
                ureq::Error::Status(code, _) => SuggestError::Status(code),
                ureq::Error::Transport(t) => SuggestError::Transport(t.to_string()),
            })?;

        let body: Value = response
            .into_json()
            .map_err(|e| SuggestError::Decode(e.to_string()))?;
        extract_text(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SuggestConfig {
        SuggestConfig {
            endpoint: "http://127.0.0.1:9/v1beta/".into(),
            api_key_env: "YEARPLAN_TEST_UNSET_KEY_VAR".into(),
            ..SuggestConfig::default()
        }
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let generator = GeminiGenerator::from_config(&config());
        assert_eq!(
            generator.url(),
            "http://127.0.0.1:9/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let generator = GeminiGenerator::from_config(&config());
        assert!(!generator.has_api_key());
        let err = generator
            .generate(&GenerationRequest {
                prompt: "hi".into(),
                structured: false,
            })
            .expect_err("no key");
        assert!(matches!(err, SuggestError::MissingApiKey(ref var) if var == "YEARPLAN_TEST_UNSET_KEY_VAR"));
    }

    #[test]
    fn structured_requests_carry_a_schema() {
        let plain = request_body(&GenerationRequest {
            prompt: "p".into(),
            structured: false,
        });
        assert!(plain.get("generationConfig").is_none());
        assert_eq!(plain["contents"][0]["parts"][0]["text"], "p");

        let structured = request_body(&GenerationRequest {
            prompt: "p".into(),
            structured: true,
        });
        assert_eq!(
            structured["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            structured["generationConfig"]["responseSchema"]["required"],
            json!(["title", "description"])
        );
    }

    #[test]
    fn text_is_pulled_from_first_candidate() {
        let response = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        assert_eq!(extract_text(&response).expect("text"), "Hello, world");
    }

    #[test]
    fn missing_candidates_is_empty() {
        assert!(matches!(
            extract_text(&json!({"candidates": []})),
            Err(SuggestError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(&json!({"candidates": [{"content": {"parts": [{"text": " "}]}}]})),
            Err(SuggestError::EmptyResponse)
        ));
    }

    #[test]
    fn unreachable_endpoint_is_a_transport_error() {
        let generator = GeminiGenerator::from_config(&SuggestConfig {
            timeout_secs: 1,
            ..config()
        })
        .with_api_key(Some("test-key".into()));
        let err = generator
            .generate(&GenerationRequest {
                prompt: "hi".into(),
                structured: true,
            })
            .expect_err("nothing listens on port 9");
        assert!(matches!(err, SuggestError::Transport(_)));
    }
}
