//! Gemini HTTP client for prescription extraction.

use rxlens_core::ocr::OcrLine;
use rxlens_core::pipeline::{Extractor, ExtractorError};
use serde_json::{json, Value};
use tracing::debug;

use crate::extraction::parse_reply;
use crate::prompts::make_extraction_prompt;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-flash:generateContent";

/// Blocking Gemini client. One HTTP call per request, temperature 0.
pub struct GeminiExtractor {
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiExtractor {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Read the API key from `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self, ExtractorError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ExtractorError::Transport("GEMINI_API_KEY is not set".into()))?;
        Ok(Self::new(api_key))
    }
}

impl Extractor for GeminiExtractor {
    fn extract(&self, ocr_text: &str, _lines: &[OcrLine]) -> Result<Value, ExtractorError> {
        let payload = json!({
            "contents": [
                {"parts": [{"text": make_extraction_prompt(ocr_text)}]}
            ],
            "generationConfig": {"temperature": 0}
        });

        debug!("calling Gemini generateContent");
        let response = self
            .client
            .post(GEMINI_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .map_err(|e| ExtractorError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractorError::Transport(body));
        }

        let body: Value = response
            .json()
            .map_err(|e| ExtractorError::Transport(e.to_string()))?;
        let text = body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ExtractorError::InvalidReply("no candidate text in Gemini response".into())
            })?;

        parse_reply(text)
    }
}
