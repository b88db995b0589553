//! Google Gemini HTTP backend.
//!
//! Calls the `generateContent` endpoint once per request with a response
//! MIME type and schema derived from the requested [`OutputShape`].

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::trait_def::PlanModel;
use super::{GenerationRequest, OutputShape};

/// Default Generative Language API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model name.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Connection settings for [`GeminiModel`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Settings with the default model and API root.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// [`PlanModel`] backed by the Gemini REST API.
pub struct GeminiModel {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiModel {
    /// Build the backend and its HTTP client.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl PlanModel for GeminiModel {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        debug!(
            provider = "gemini",
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "invoking Gemini backend"
        );

        let body = build_request_body(request);
        let resp = self
            .client
            .post(self.config.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("HTTP request to Gemini failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Gemini API error {status}: {text}");
        }

        let parsed: GenerateContentResponse = resp
            .json()
            .await
            .context("failed to parse Gemini response")?;
        let text = extract_text(parsed)?;

        debug!(provider = "gemini", response_len = text.len(), "Gemini call completed");
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Gemini's OpenAPI-subset schema for an [`OutputShape`]: the shape's JSON
/// Schema with upper-case type names and an explicit property order.
fn response_schema(shape: &OutputShape) -> Value {
    let mut schema = shape.json_schema();
    upcase_types(&mut schema);
    let names: Vec<&str> = shape.fields.iter().map(|f| f.name).collect();
    schema["propertyOrdering"] = json!(names);
    schema
}

fn upcase_types(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                match child {
                    Value::String(name) if key == "type" => *name = name.to_uppercase(),
                    other => upcase_types(other),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(upcase_types),
        _ => {}
    }
}

fn build_request_body(request: &GenerationRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: Some(request.prompt.clone()),
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: request.shape.mime_type.to_string(),
            response_schema: response_schema(&request.shape),
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        bail!("Gemini blocked the prompt: {reason}");
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("Gemini response has no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        bail!("Gemini returned empty content (finish reason: {reason})");
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "monte um treino".to_string(),
            shape: OutputShape::plan_record(),
        }
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let mut cfg = GeminiConfig::new("key");
        cfg.base_url = "http://localhost:8080/v1beta/".to_string();
        assert_eq!(
            cfg.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn request_body_carries_prompt_and_schema() {
        let body = serde_json::to_value(build_request_body(&request())).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "monte um treino");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["avisos_importantes"]["type"], "ARRAY");
        assert_eq!(schema["required"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn response_schema_follows_the_shape_json_schema() {
        let shape = OutputShape::plan_record();
        let schema = response_schema(&shape);
        let generic = shape.json_schema();

        assert_eq!(schema["required"], generic["required"]);
        assert_eq!(schema["propertyOrdering"], generic["required"]);
        assert_eq!(schema["properties"]["plano_markdown"]["type"], "STRING");
        assert_eq!(
            schema["properties"]["avisos_importantes"]["items"]["type"],
            "STRING"
        );
        assert_eq!(
            schema["properties"].as_object().unwrap().len(),
            generic["properties"].as_object().unwrap().len()
        );
    }

    #[test]
    fn extract_text_joins_parts() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(resp).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extract_text_reports_block_reason() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = extract_text(resp).unwrap_err().to_string();
        assert!(err.contains("SAFETY"), "unexpected error: {err}");
    }

    #[test]
    fn extract_text_rejects_empty_candidates() {
        let resp: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert!(extract_text(resp).is_err());
    }

    #[test]
    fn extract_text_reports_finish_reason_when_empty() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        let err = extract_text(resp).unwrap_err().to_string();
        assert!(err.contains("MAX_TOKENS"), "unexpected error: {err}");
    }
}
