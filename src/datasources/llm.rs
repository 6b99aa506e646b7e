use crate::config::LlmConfig;
use crate::error::{CropWiseError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// A single structured prompt: instruction text plus the JSON schema the
/// model's answer must follow.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub name: &'static str,
    pub text: String,
    pub schema: Value,
}

impl Prompt {
    pub fn new(name: &'static str, text: impl Into<String>, schema: Value) -> Self {
        Self {
            name,
            text: text.into(),
            schema,
        }
    }
}

/// Request/response access to a language model. One call, no streaming.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<Value>;

    async fn test_connection(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Run a prompt and decode the answer into `T`. A response that does not fit
/// the expected shape is reported as an upstream error.
pub async fn generate_structured<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    prompt: &Prompt,
) -> Result<T> {
    let value = model.generate(prompt).await?;
    serde_json::from_value(value).map_err(|e| {
        CropWiseError::Upstream(format!("{} returned malformed output: {}", prompt.name, e))
    })
}

pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[allow(dead_code)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cropwise/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, config })
    }

    fn model_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<Value> {
        let url = format!("{}:generateContent", self.model_url());
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt.text }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": prompt.schema
            }
        });

        debug!("Calling {} for prompt {}", self.config.model, prompt.name);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CropWiseError::Upstream(format!("Gemini: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(CropWiseError::RateLimited(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CropWiseError::Upstream(format!(
                "Gemini returned {}: {}",
                status, body
            )));
        }

        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            CropWiseError::Upstream(format!("Failed to parse Gemini response: {}", e))
        })?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CropWiseError::Upstream(format!(
                "Gemini returned no content for {}",
                prompt.name
            )));
        }

        parse_json_object(&text)
    }

    async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| CropWiseError::Upstream(format!("Gemini: {}", e)))?;

        Ok(response.status().is_success())
    }
}

/// Parse model text as a JSON object, falling back to the outermost `{...}`
/// span when the model wraps the JSON in prose or code fences.
pub fn parse_json_object(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if let Ok(v @ Value::Object(_)) = serde_json::from_str::<Value>(trimmed) {
        return Ok(v);
    }

    let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
        return Err(CropWiseError::Upstream(
            "model did not return a JSON object".into(),
        ));
    };
    if end < start {
        return Err(CropWiseError::Upstream(
            "model did not return a JSON object".into(),
        ));
    }

    serde_json::from_str(&trimmed[start..=end])
        .map_err(|e| CropWiseError::Upstream(format!("model returned invalid JSON: {}", e)))
}
