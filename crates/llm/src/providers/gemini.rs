use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{first_candidate_text, LlmError, LlmProvider, Message, Role};

/// Chat completions through the `v1beta` generateContent API, which accepts a
/// separate system instruction.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        )
    }

    /// Build the request body for the Gemini generateContent API.
    fn build_request_body(
        messages: &[Message],
        temperature: f32,
        max_tokens: u32,
    ) -> serde_json::Value {
        let system_msg = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>();

        let contents: Vec<serde_json::Value> = messages
            .iter()
            .filter_map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "model",
                    Role::System => return None,
                };
                Some(json!({ "role": role, "parts": [{ "text": m.content }] }))
            })
            .collect();

        let mut body = json!({
            "contents": contents,
            "generationConfig": {
                "temperature": temperature,
                "maxOutputTokens": max_tokens,
            },
        });

        if !system_msg.is_empty() {
            body["system_instruction"] = json!({
                "parts": [{ "text": system_msg.join("\n\n") }],
            });
        }

        body
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = Self::build_request_body(&messages, temperature, max_tokens);

        debug!(model = %self.model, messages = messages.len(), "gemini completion request");

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        first_candidate_text(&resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_instruction_is_separate() {
        let messages = vec![
            Message::system("You are an EV technician's assistant."),
            Message::user("Cell 52 reads 15 mOhm."),
            Message { role: Role::Assistant, content: "Check the busbar weld.".into() },
            Message::user("And then?"),
        ];

        let body = GeminiProvider::build_request_body(&messages, 0.2, 2048);

        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "You are an EV technician's assistant.",
        );

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][0]["text"], "Cell 52 reads 15 mOhm.");
        // Gemini calls the assistant "model".
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["role"], "user");

        let temp = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6, "temperature should be ~0.2, got {temp}");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
    }

    #[test]
    fn no_system_message_no_instruction() {
        let body = GeminiProvider::build_request_body(&[Message::user("Hello")], 0.5, 256);

        assert!(body.get("system_instruction").is_none());
        assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn endpoint_uses_base_url_and_model() {
        let provider = GeminiProvider::new(
            "abc".into(),
            "gemini-2.5-pro".into(),
            "http://localhost:9999/".into(),
        );
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-pro:generateContent?key=abc"
        );
    }
}
