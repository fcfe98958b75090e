//! Raw `generateContent` forwarding for the `/api/genai` route.
//!
//! Unlike [`GeminiProvider`](crate::GeminiProvider), the system instruction
//! is folded into the prompt text and the upstream reply is handed back as-is.

use serde_json::{json, Value};
use tracing::debug;

use cellscope_core::config::LlmConfig;

use crate::provider::LlmError;

/// Upstream status code and JSON body, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PassthroughResponse {
    pub status: u16,
    pub body: Value,
}

pub struct GeminiPassthrough {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiPassthrough {
    pub fn new(api_key: Option<String>, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
        )
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, key: &str) -> String {
        format!(
            "{}/v1/models/{}:generateContent?key={}",
            self.base_url, self.model, key
        )
    }

    /// `system_instruction`, a blank line, then `prompt`.
    pub fn combine_prompt(prompt: &str, system_instruction: Option<&str>) -> String {
        match system_instruction {
            Some(system) if !system.is_empty() => format!("{system}\n\n{prompt}"),
            _ => prompt.to_string(),
        }
    }

    pub fn build_request_body(prompt: &str, system_instruction: Option<&str>) -> Value {
        json!({
            "contents": [
                { "parts": [{ "text": Self::combine_prompt(prompt, system_instruction) }] }
            ]
        })
    }

    /// POST the combined prompt upstream. Non-2xx replies are not errors; they
    /// come back with their status so the caller can relay them.
    pub async fn forward(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<PassthroughResponse, LlmError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::NotConfigured("GEMINI_API_KEY not set".into()))?;

        debug!(
            url = %self.endpoint("***"),
            prompt_chars = prompt.len(),
            "forwarding to gemini"
        );

        let response = self
            .client
            .post(self.endpoint(key))
            .header("Content-Type", "application/json")
            .json(&Self::build_request_body(prompt, system_instruction))
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text)
            .map_err(|e| LlmError::ParseError(format!("upstream returned non-JSON body: {e}")))?;

        debug!(status, "gemini replied");
        Ok(PassthroughResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passthrough(key: Option<&str>, base_url: &str) -> GeminiPassthrough {
        GeminiPassthrough::new(key.map(str::to_string), "gemini-2.5-pro".into(), base_url.into())
    }

    #[test]
    fn system_instruction_is_prepended() {
        let body = GeminiPassthrough::build_request_body("Diagnose cell 52.", Some("Be concise."));
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "Be concise.\n\nDiagnose cell 52."
        );
        assert!(body.get("system_instruction").is_none());
    }

    #[test]
    fn prompt_alone_without_instruction() {
        assert_eq!(GeminiPassthrough::combine_prompt("hi", None), "hi");
        assert_eq!(GeminiPassthrough::combine_prompt("hi", Some("")), "hi");
    }

    #[test]
    fn endpoint_targets_v1() {
        let p = passthrough(Some("abc"), "https://generativelanguage.googleapis.com/");
        assert_eq!(
            p.endpoint("abc"),
            "https://generativelanguage.googleapis.com/v1/models/gemini-2.5-pro:generateContent?key=abc"
        );
    }

    #[test]
    fn empty_key_counts_as_missing() {
        assert!(!passthrough(Some(""), "http://localhost").is_configured());
        assert!(passthrough(Some("k"), "http://localhost").is_configured());
    }

    #[tokio::test]
    async fn forward_without_key_is_not_configured() {
        let err = passthrough(None, "http://127.0.0.1:1").forward("x", None).await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_http_error() {
        let err = passthrough(Some("k"), "http://127.0.0.1:1")
            .forward("x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::HttpError(_)));
    }
}
