//! HTTP feedback collaborator backed by the Generative Language API.

use reqwest::blocking::Client;
use serde_json::json;

use crate::config::FeedbackConfig;
use crate::feedback::{build_prompt, FeedbackCollaborator, FeedbackError, FeedbackRequest};

pub struct GeminiClient {
    config: FeedbackConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: FeedbackConfig) -> Result<Self, FeedbackError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

/// Concatenated text parts of the first candidate.
fn extract_text(body: &serde_json::Value) -> Option<String> {
    let parts = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text.trim().to_string())
    }
}

impl FeedbackCollaborator for GeminiClient {
    fn generate(&self, request: &FeedbackRequest) -> Result<String, FeedbackError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(FeedbackError::MissingConfig);
        };
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(request) }] }]
        });
        tracing::debug!(model = %self.config.model, student_id = %request.student_id, "requesting feedback");

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FeedbackError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let value: serde_json::Value = resp.json()?;
        extract_text(&value).ok_or(FeedbackError::Empty)
    }
}
