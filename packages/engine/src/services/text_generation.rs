//! Remote text generation.
//!
//! Everything that asks a language model for copy goes through
//! [`TextGenerator`]. Callers treat every error as "use the local content";
//! none of these errors reach the page.

use gloo_net::http::Request;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("browser is offline")]
    Offline,

    #[error("request failed: {0}")]
    Network(String),

    #[error("generator answered with HTTP {0}")]
    Status(u16),

    #[error("generator returned no text")]
    Empty,

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Ask for `application/json` output
    pub json_output: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

// Wire format of `models/{model}:generateContent`.

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl From<&GenerationRequest> for GenerateContentBody {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part { text: text.clone() }],
            }),
            generation_config: request.json_output.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    fn into_text(self) -> Result<String, GenerationError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}

/// Gemini over `fetch`.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingCredential)
    }

    fn url(&self, key: &str) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model,
            key
        )
    }
}

fn browser_online() -> bool {
    web_sys::window().map_or(true, |w| w.navigator().on_line())
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let key = self.api_key()?;
        if !browser_online() {
            return Err(GenerationError::Offline);
        }

        let response = Request::post(&self.url(key))
            .json(&GenerateContentBody::from(request))
            .map_err(|e| GenerationError::Network(e.to_string()))?
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        if !response.ok() {
            return Err(GenerationError::Status(response.status()));
        }
        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;
        body.into_text()
    }
}
